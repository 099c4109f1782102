//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::CustomerRepository;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// customer repository and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    customers: Arc<dyn CustomerRepository>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration
    /// * `customers` - Repository the handlers read and mutate
    #[must_use]
    pub fn new(config: ApiConfig, customers: Arc<dyn CustomerRepository>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, customers }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the customer repository.
    #[must_use]
    pub fn customers(&self) -> &dyn CustomerRepository {
        self.inner.customers.as_ref()
    }
}
