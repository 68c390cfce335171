//! Integration test harness for Lustre.
//!
//! Each test spawns the full storefront router on an ephemeral port, backed
//! by a private in-memory database and a throwaway static directory, and
//! drives it over HTTP with `reqwest`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p lustre-integration-tests
//! ```
//!
//! Clients keep cookies but never follow redirects, so tests assert on the
//! `303 See Other` and its `Location` before loading the next page.

use std::net::SocketAddr;
use std::path::PathBuf;

use reqwest::{Client, Response, StatusCode, header, redirect};
use secrecy::SecretString;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use url::Url;

use lustre_core::{ItemFields, JewelryItem, Role};
use lustre_storefront::config::LustreConfig;
use lustre_storefront::db::{self, CatalogRepository};
use lustre_storefront::middleware::create_session_layer;
use lustre_storefront::routes;
use lustre_storefront::services::auth::AuthService;
use lustre_storefront::state::AppState;

/// Signing key used by every test server.
const TEST_SESSION_SECRET: &str =
    "kQ7vR2mX9pL4wT8nB3cF6hJ1sD5gA0zY7uE2iO9qW4rT6yU8pM3nB5vC1xZ0aS2d";

/// Password given to users created with [`TestApp::create_user`].
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// A running storefront and handles to its storage.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: SqlitePool,
    pub static_dir: PathBuf,
}

impl TestApp {
    /// Start a server on `127.0.0.1` with an empty catalog.
    ///
    /// # Panics
    ///
    /// Panics if the database, listener or session layer cannot be set up.
    pub async fn spawn() -> Self {
        let pool = db::connect_in_memory()
            .await
            .expect("in-memory database");
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local address");

        let static_dir = std::env::temp_dir().join(format!("lustre-it-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(static_dir.join("images")).expect("create static dir");

        let config = LustreConfig {
            database_url: "sqlite::memory:".to_owned(),
            host: addr.ip(),
            port: addr.port(),
            base_url: Url::parse(&format!("http://{addr}")).expect("base url"),
            static_dir: static_dir.clone(),
            session_secret: SecretString::from(TEST_SESSION_SECRET.to_owned()),
            admin_password: None,
            sentry_dsn: None,
            sentry_environment: None,
        };

        let state = AppState::new(config, pool.clone());
        let session_layer = create_session_layer(state.sessions().store().clone(), state.config())
            .expect("session layer");
        let app = routes::app(state, session_layer);

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server");
        });

        Self {
            addr,
            pool,
            static_dir,
        }
    }

    /// Absolute URL for a path on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// A fresh visitor: its own cookie jar, redirects not followed.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn visitor(&self) -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .expect("http client")
    }

    /// Insert an item directly into the catalog.
    ///
    /// # Panics
    ///
    /// Panics if the insert fails.
    pub async fn seed_item(&self, fields: ItemFields) -> JewelryItem {
        CatalogRepository::new(&self.pool)
            .create(&fields)
            .await
            .expect("seed item")
    }

    /// Number of items in the catalog.
    ///
    /// # Panics
    ///
    /// Panics if the count query fails.
    pub async fn item_count(&self) -> i64 {
        CatalogRepository::new(&self.pool)
            .count()
            .await
            .expect("count items")
    }

    /// Create a user whose password is [`TEST_PASSWORD`].
    ///
    /// # Panics
    ///
    /// Panics if the user cannot be created.
    pub async fn create_user(&self, username: &str, role: Role) {
        AuthService::new(&self.pool)
            .create_user(username, TEST_PASSWORD, role)
            .await
            .expect("create user");
    }

    /// GET a path.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, client: &Client, path: &str) -> Response {
        client.get(self.url(path)).send().await.expect("GET request")
    }

    /// GET a path with a `Referer` header.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get_from(&self, client: &Client, path: &str, referer: &str) -> Response {
        client
            .get(self.url(path))
            .header(header::REFERER, referer)
            .send()
            .await
            .expect("GET request")
    }

    /// GET a path and return its body, asserting a 200.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the status is not 200.
    pub async fn page(&self, client: &Client, path: &str) -> String {
        let response = self.get(client, path).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {path}");
        response.text().await.expect("response body")
    }

    /// Submit the login form.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn log_in(&self, client: &Client, username: &str, password: &str) -> Response {
        client
            .post(self.url("/login"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .expect("POST /login")
    }

    /// A signed-in admin client.
    ///
    /// # Panics
    ///
    /// Panics if the login is not accepted.
    pub async fn admin(&self) -> Client {
        self.create_user("admin", Role::Admin).await;
        let client = self.visitor();
        let response = self.log_in(&client, "admin", TEST_PASSWORD).await;
        assert_eq!(location(&response).as_deref(), Some("/admin"));
        client
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.static_dir);
    }
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// The cart badge as rendered in the page header.
#[must_use]
pub fn cart_badge(count: usize) -> String {
    format!(r#"id="cart-count">{count}<"#)
}

/// Byte offset of each needle in `haystack`, asserting they appear in order.
///
/// # Panics
///
/// Panics if a needle is missing or out of order.
pub fn assert_in_order(haystack: &str, needles: &[&str]) {
    let mut last = 0;
    for needle in needles {
        let pos = haystack
            .find(needle)
            .unwrap_or_else(|| panic!("{needle:?} not found"));
        assert!(pos >= last, "{needle:?} is out of order in {needles:?}");
        last = pos;
    }
}
