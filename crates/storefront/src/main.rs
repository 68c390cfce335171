//! Lustre storefront server.
//!
//! Serves the catalog, cart, favorites, login and admin back office.
//!
//! # Start-up
//!
//! 1. Load configuration from the environment (`.env` honored)
//! 2. Initialize Sentry and tracing
//! 3. Open the `SQLite` pool and apply migrations
//! 4. Seed the `admin` account when `LUSTRE_ADMIN_PASSWORD` is set
//! 5. Start the hourly expired-session sweep and serve HTTP

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::time::Duration;

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lustre_storefront::config::LustreConfig;
use lustre_storefront::middleware::create_session_layer;
use lustre_storefront::services::auth::{AuthService, SEED_ADMIN_USERNAME};
use lustre_storefront::state::AppState;
use lustre_storefront::{db, routes};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &LustreConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Periodically delete expired session records.
fn spawn_session_sweep(state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = state.sessions().prune_expired().await {
                tracing::warn!(error = %e, "Failed to prune expired sessions");
            }
        }
    });
}

#[tokio::main]
async fn main() {
    let config = LustreConfig::from_env().expect("Failed to load configuration");

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lustre_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!(database_url = %config.database_url, "Database ready");

    if let Some(password) = &config.admin_password {
        match AuthService::new(&pool).seed_admin(password).await {
            Ok(true) => tracing::info!(username = SEED_ADMIN_USERNAME, "Seeded admin account"),
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to seed admin account"),
        }
    }

    std::fs::create_dir_all(config.images_dir()).expect("Failed to create image upload directory");

    let state = AppState::new(config.clone(), pool);
    spawn_session_sweep(state.clone());

    let session_layer = create_session_layer(state.sessions().store().clone(), state.config())
        .expect("Failed to create session layer");

    let app = routes::app(state, session_layer)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
