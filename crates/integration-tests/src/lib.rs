//! Integration tests for the Univali customers API.
//!
//! Each test spawns the full application on an ephemeral port and talks to
//! it over HTTP, so routing, extractors and error bodies are exercised
//! exactly as a client sees them.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p univali-integration-tests
//! ```

use std::sync::Arc;

use univali_api::config::ApiConfig;
use univali_api::db::{self, InMemoryCustomerStore};
use univali_api::routes;
use univali_api::state::AppState;

/// A running API server plus an HTTP client pointed at it.
pub struct TestContext {
    pub client: reqwest::Client,
    pub base_url: String,
}

impl TestContext {
    /// Start a server over an empty store.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn empty() -> Self {
        Self::start(false).await
    }

    /// Start a server over a store holding the sample customers.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound or seeding fails.
    pub async fn seeded() -> Self {
        Self::start(true).await
    }

    async fn start(seed: bool) -> Self {
        let store = Arc::new(InMemoryCustomerStore::new());
        if seed {
            db::seed::seed(store.as_ref())
                .await
                .expect("Failed to seed store");
        }

        let config = ApiConfig {
            port: 0,
            seed_data: seed,
            ..ApiConfig::default()
        };
        let listener = tokio::net::TcpListener::bind(config.socket_addr())
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let app = routes::app(AppState::new(config, store));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            client: reqwest::Client::new(),
            base_url: format!("http://{addr}"),
        }
    }

    /// Absolute URL for a path on the test server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}
