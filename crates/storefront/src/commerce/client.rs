//! Commerce backend client implementation.
//!
//! Uses `reqwest` for HTTP and `serde_json` for response bodies. Responses
//! are read as text first so malformed bodies can be logged.

use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use cartwheel_core::{
    Address, Cart, CustomerId, NewAddress, NewPaymentMethod, OrderRequest, PaymentMethod,
    Product, ProductId,
};

use super::CommerceError;
use crate::config::CommerceApiConfig;

/// Maximum number of body characters included in error logs.
const LOG_BODY_CHARS: usize = 500;

/// Backend endpoints, relative to the configured origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    GetAddress,
    GetPaymentOption,
    GetCart,
    GetProducts,
    AddToCart,
    AddOrder,
    AddAddress,
    AddPaymentOption,
}

impl Endpoint {
    const fn path(self) -> &'static str {
        match self {
            Self::GetAddress => "get_address/",
            Self::GetPaymentOption => "get_payment_option/",
            Self::GetCart => "get_cart/",
            Self::GetProducts => "get_products/",
            Self::AddToCart => "add_to_cart/",
            Self::AddOrder => "add_order/",
            Self::AddAddress => "add_address/",
            Self::AddPaymentOption => "add_payment_option/",
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::GetAddress => "get_address",
            Self::GetPaymentOption => "get_payment_option",
            Self::GetCart => "get_cart",
            Self::GetProducts => "get_products",
            Self::AddToCart => "add_to_cart",
            Self::AddOrder => "add_order",
            Self::AddAddress => "add_address",
            Self::AddPaymentOption => "add_payment_option",
        }
    }
}

#[derive(Debug, Deserialize)]
struct AddressesResponse {
    #[serde(default)]
    addresses: Vec<Address>,
}

#[derive(Debug, Deserialize)]
struct PaymentsResponse {
    #[serde(default)]
    payments: Vec<PaymentMethod>,
}

// =============================================================================
// CommerceClient
// =============================================================================

/// Client for the commerce backend.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct CommerceClient {
    inner: Arc<CommerceClientInner>,
}

struct CommerceClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl CommerceClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &CommerceApiConfig) -> Result<Self, CommerceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(CommerceClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// Backend origin requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn url(&self, endpoint: Endpoint, query: &[(&str, &str)]) -> Result<Url, CommerceError> {
        let mut url = self.inner.base_url.join(endpoint.path())?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Read the body of a response, failing on non-success statuses.
    async fn success_body(
        endpoint: Endpoint,
        response: reqwest::Response,
    ) -> Result<String, CommerceError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                endpoint = endpoint.name(),
                status = %status,
                body = %snippet(&body),
                "Commerce API returned non-success status"
            );
            return Err(CommerceError::Status {
                endpoint: endpoint.name(),
                status,
            });
        }

        Ok(body)
    }

    /// Execute a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        query: &[(&str, &str)],
    ) -> Result<T, CommerceError> {
        let url = self.url(endpoint, query)?;
        debug!(%url, "GET");

        let response = self.inner.client.get(url).send().await?;
        let body = Self::success_body(endpoint, response).await?;

        serde_json::from_str(&body).map_err(|source| {
            tracing::error!(
                endpoint = endpoint.name(),
                error = %source,
                body = %snippet(&body),
                "Failed to parse commerce API response"
            );
            CommerceError::Parse {
                endpoint: endpoint.name(),
                source,
            }
        })
    }

    /// Execute a form-encoded POST whose response body is ignored.
    async fn post_form(
        &self,
        endpoint: Endpoint,
        fields: &[(&str, &str)],
    ) -> Result<(), CommerceError> {
        let url = self.url(endpoint, &[])?;
        debug!(%url, "POST form");

        let response = self.inner.client.post(url).form(fields).send().await?;
        Self::success_body(endpoint, response).await?;
        Ok(())
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Search products matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, CommerceError> {
        self.get_json(Endpoint::GetProducts, &[("query", query)])
            .await
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the customer's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a cart.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn get_cart(&self, customer_id: CustomerId) -> Result<Cart, CommerceError> {
        let id = customer_id.to_string();
        self.get_json(Endpoint::GetCart, &[("customer_id", id.as_str())])
            .await
    }

    /// Add one product to the customer's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self), fields(customer_id = %customer_id, product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<(), CommerceError> {
        let customer = customer_id.to_string();
        let product = product_id.to_string();
        self.post_form(
            Endpoint::AddToCart,
            &[("customer_id", customer.as_str()), ("product_id", product.as_str())],
        )
        .await
    }

    // =========================================================================
    // Addresses & Payment Methods
    // =========================================================================

    /// List the customer's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn get_addresses(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Address>, CommerceError> {
        let id = customer_id.to_string();
        let data: AddressesResponse = self
            .get_json(Endpoint::GetAddress, &[("customer_id", id.as_str())])
            .await?;
        Ok(data.addresses)
    }

    /// List the customer's saved payment methods.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn get_payment_options(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<PaymentMethod>, CommerceError> {
        let id = customer_id.to_string();
        let data: PaymentsResponse = self
            .get_json(Endpoint::GetPaymentOption, &[("customer_id", id.as_str())])
            .await?;
        Ok(data.payments)
    }

    /// Save a new address for the customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, address), fields(customer_id = %customer_id))]
    pub async fn add_address(
        &self,
        customer_id: CustomerId,
        address: &NewAddress,
    ) -> Result<(), CommerceError> {
        let id = customer_id.to_string();
        self.post_form(
            Endpoint::AddAddress,
            &[
                ("customer_id", id.as_str()),
                ("street_address", address.street_address.as_str()),
                ("city", address.city.as_str()),
                ("state", address.state.as_str()),
                ("postal_code", address.postal_code.as_str()),
                ("country", address.country.as_str()),
            ],
        )
        .await
    }

    /// Save a new payment method for the customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, payment), fields(customer_id = %customer_id))]
    pub async fn add_payment_option(
        &self,
        customer_id: CustomerId,
        payment: &NewPaymentMethod,
    ) -> Result<(), CommerceError> {
        let id = customer_id.to_string();
        self.post_form(
            Endpoint::AddPaymentOption,
            &[
                ("customer_id", id.as_str()),
                ("card_number", payment.card_number.as_str()),
                ("card_holder_name", payment.card_holder_name.as_str()),
                ("expiration_date", payment.expiration_date.as_str()),
            ],
        )
        .await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, order), fields(customer_id = %order.customer_id))]
    pub async fn add_order(&self, order: &OrderRequest) -> Result<(), CommerceError> {
        let url = self.url(Endpoint::AddOrder, &[])?;
        debug!(%url, total_price = %order.total_price, "POST order");

        let response = self.inner.client.post(url).json(order).send().await?;
        Self::success_body(Endpoint::AddOrder, response).await?;
        Ok(())
    }
}

/// First few hundred characters of a body, for logs.
fn snippet(body: &str) -> String {
    body.chars().take(LOG_BODY_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> CommerceClient {
        CommerceClient::new(&CommerceApiConfig::new(base).unwrap()).unwrap()
    }

    #[test]
    fn test_url_joins_endpoint_and_query() {
        let client = client("http://localhost:8000");
        let url = client
            .url(Endpoint::GetAddress, &[("customer_id", "7")])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/get_address/?customer_id=7");
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = client("https://api.example.com/shop");
        let url = client.url(Endpoint::AddOrder, &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/shop/add_order/");
    }

    #[test]
    fn test_url_encodes_search_query() {
        let client = client("http://localhost:8000");
        let url = client
            .url(Endpoint::GetProducts, &[("query", "red shoe&sock")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/get_products/?query=red+shoe%26sock"
        );
    }

    #[test]
    fn test_empty_search_query_is_still_sent() {
        let client = client("http://localhost:8000");
        let url = client.url(Endpoint::GetProducts, &[("query", "")]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/get_products/?query=");
    }

    #[test]
    fn test_snippet_truncates() {
        let body = "x".repeat(LOG_BODY_CHARS + 10);
        assert_eq!(snippet(&body).len(), LOG_BODY_CHARS);
        assert_eq!(snippet("short"), "short");
    }

    #[test]
    fn test_lists_default_to_empty() {
        let addresses: AddressesResponse = serde_json::from_str("{}").unwrap();
        assert!(addresses.addresses.is_empty());
        let payments: PaymentsResponse = serde_json::from_str(r#"{"payments": []}"#).unwrap();
        assert!(payments.payments.is_empty());
    }
}
