//! Lustre CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! lustre migrate
//!
//! # Create a user (password from --password or LUSTRE_ADMIN_PASSWORD)
//! lustre admin create -u alice -r admin --password '...'
//!
//! # Reset a password
//! lustre admin set-password -u alice --password '...'
//!
//! # Insert the demo catalog into an empty database
//! lustre seed
//!
//! # Delete expired sessions
//! lustre sessions prune
//! ```
//!
//! The database is taken from `LUSTRE_DATABASE_URL`, then `DATABASE_URL`,
//! then `sqlite://lustre.db`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use secrecy::SecretString;

use lustre_core::Role;

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "lustre")]
#[command(author, version, about = "Lustre CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage back-office users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Insert a demo catalog when the catalog is empty
    Seed,
    /// Manage stored sessions
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new user
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Role (`admin`, `viewer`)
        #[arg(short, long, default_value = "admin")]
        role: Role,

        /// Password (min 8 characters)
        #[arg(long, env = "LUSTRE_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Replace an existing user's password
    SetPassword {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// New password (min 8 characters)
        #[arg(long, env = "LUSTRE_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SessionsAction {
    /// Delete expired sessions
    Prune,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    let pool = commands::connect().await?;

    match cli.command {
        Commands::Migrate => commands::migrate::run(&pool).await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                username,
                role,
                password,
            } => {
                let password = SecretString::from(password);
                commands::admin::create_user(&pool, &username, role, &password).await?;
            }
            AdminAction::SetPassword { username, password } => {
                let password = SecretString::from(password);
                commands::admin::set_password(&pool, &username, &password).await?;
            }
        },
        Commands::Seed => commands::seed::demo_catalog(&pool).await?,
        Commands::Sessions { action } => match action {
            SessionsAction::Prune => commands::sessions::prune(&pool).await?,
        },
    }
    Ok(())
}
