//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LUSTRE_SESSION_SECRET` - Cookie signing key (min 64 chars, high entropy)
//!
//! ## Optional
//! - `LUSTRE_DATABASE_URL` - `SQLite` URL, falls back to `DATABASE_URL`
//!   (default: `sqlite://lustre.db`)
//! - `LUSTRE_HOST` - Bind address (default: 127.0.0.1)
//! - `LUSTRE_PORT` - Listen port (default: 5000)
//! - `LUSTRE_BASE_URL` - Public URL, used for same-origin redirects and the
//!   cookie `Secure` flag (default: `http://{host}:{port}`)
//! - `LUSTRE_STATIC_DIR` - Static files and uploaded images (default: `crates/storefront/static`)
//! - `LUSTRE_ADMIN_PASSWORD` - Creates the `admin` user on start-up if missing
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_SESSION_SECRET_LENGTH: usize = 64;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_DATABASE_URL: &str = "sqlite://lustre.db";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct LustreConfig {
    /// `SQLite` database URL
    pub database_url: String,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the storefront
    pub base_url: Url,
    /// Directory served under `/static`; uploads go to its `images/` child
    pub static_dir: PathBuf,
    /// Session cookie signing secret
    pub session_secret: SecretString,
    /// Password for the seeded `admin` user
    pub admin_password: Option<SecretString>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

impl LustreConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the session secret fails validation (length, placeholder, entropy).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = database_url_from_env();
        let host = get_env_or_default("LUSTRE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("LUSTRE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("LUSTRE_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("LUSTRE_PORT".to_string(), e.to_string()))?;
        let base_url = parse_base_url(
            &get_env_or_default("LUSTRE_BASE_URL", &format!("http://{host}:{port}")),
        )?;
        let static_dir = PathBuf::from(get_env_or_default(
            "LUSTRE_STATIC_DIR",
            "crates/storefront/static",
        ));

        let session_secret = get_validated_secret("LUSTRE_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "LUSTRE_SESSION_SECRET")?;

        let admin_password = get_optional_env("LUSTRE_ADMIN_PASSWORD").map(SecretString::from);
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            static_dir,
            session_secret,
            admin_password,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies must carry the `Secure` flag.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.scheme() == "https"
    }

    /// Directory that receives uploaded item images.
    #[must_use]
    pub fn images_dir(&self) -> PathBuf {
        self.static_dir.join("images")
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("LUSTRE_BASE_URL".to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "LUSTRE_BASE_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Resolve the database URL: `LUSTRE_DATABASE_URL`, then `DATABASE_URL`,
/// then the default file.
///
/// Does not load `.env`; callers that want it call `dotenvy::dotenv()` first.
#[must_use]
pub fn database_url_from_env() -> String {
    get_optional_env("LUSTRE_DATABASE_URL")
        .or_else(|| get_optional_env("DATABASE_URL"))
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const STRONG_SECRET: &str =
        "q7Vt2LmX9pR4sK8wZ1nB6yH3cJ5fD0gA-uE_oI2rT8vM4xN7bQ1zS9kW3hY6jL5p";

    fn config(base_url: &str) -> LustreConfig {
        LustreConfig {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            base_url: parse_base_url(base_url).unwrap(),
            static_dir: PathBuf::from("static"),
            session_secret: SecretString::from(STRONG_SECRET.to_owned()),
            admin_password: Some(SecretString::from("hunter2-but-longer".to_owned())),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let err = validate_secret_strength("your-session-key-here", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
        assert!(validate_secret_strength("changeme123", "TEST_VAR").is_err());
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let err = validate_secret_strength(&"ab".repeat(40), "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength(STRONG_SECRET, "TEST_VAR").is_ok());
    }

    #[test]
    fn test_session_secret_length() {
        let short = SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6".to_owned());
        assert!(validate_session_secret(&short, "TEST_SESSION").is_err());

        let strong = SecretString::from(STRONG_SECRET.to_owned());
        assert!(validate_session_secret(&strong, "TEST_SESSION").is_ok());
    }

    #[test]
    fn test_base_url_validation() {
        assert!(parse_base_url("https://shop.example.com").is_ok());
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("ftp://shop.example.com").is_err());
    }

    #[test]
    fn test_secure_cookies_follow_scheme() {
        assert!(!config("http://127.0.0.1:5000").secure_cookies());
        assert!(config("https://lustre.shop").secure_cookies());
    }

    #[test]
    fn test_socket_addr_and_images_dir() {
        let config = config("http://127.0.0.1:5000");
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 5000);
        assert_eq!(config.images_dir(), PathBuf::from("static/images"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug_output = format!("{:?}", config("http://127.0.0.1:5000"));
        assert!(!debug_output.contains(STRONG_SECRET));
        assert!(!debug_output.contains("hunter2"));
    }
}
