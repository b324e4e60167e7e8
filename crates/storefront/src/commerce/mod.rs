//! Commerce backend REST client.
//!
//! # Architecture
//!
//! - The backend is the source of truth - NO local sync, direct API calls
//! - Plain JSON over HTTP, one endpoint per operation, no auth headers
//! - Every request carries the configured timeout; nothing is retried
//! - Nothing is cached: each view re-reads what it renders
//!
//! # Example
//!
//! ```rust,ignore
//! use cartwheel_storefront::commerce::CommerceClient;
//!
//! let client = CommerceClient::new(&config.commerce)?;
//!
//! let products = client.search_products("shoe").await?;
//! client.add_to_cart(customer.id, products[0].id).await?;
//! let cart = client.get_cart(customer.id).await?;
//! ```

mod client;

pub use client::CommerceClient;

use thiserror::Error;

/// Errors that can occur when talking to the commerce backend.
///
/// The storefront treats every variant the same way (a failed network
/// call); the variants exist for logs and Sentry.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// Transport failure, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },

    /// The response body was not the JSON we expected.
    #[error("Could not parse {endpoint} response: {source}")]
    Parse {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl CommerceError {
    /// Whether the request timed out before the backend answered.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}
