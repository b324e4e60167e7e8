//! Application state shared across handlers.

use std::sync::Arc;

use crate::commerce::{CommerceClient, CommerceError};
use crate::config::StorefrontConfig;
use crate::services::OrderSubmissions;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    commerce: CommerceClient,
    orders: OrderSubmissions,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, CommerceError> {
        let commerce = CommerceClient::new(&config.commerce)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                commerce,
                orders: OrderSubmissions::new(),
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the commerce backend client.
    #[must_use]
    pub fn commerce(&self) -> &CommerceClient {
        &self.inner.commerce
    }

    /// Orders currently being placed, keyed by customer.
    #[must_use]
    pub fn orders(&self) -> &OrderSubmissions {
        &self.inner.orders
    }
}
