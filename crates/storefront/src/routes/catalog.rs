//! Catalog route handlers.
//!
//! The catalog keeps the last search results in the session so sorting and
//! add-to-cart work on what the shopper is looking at without re-fetching.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use cartwheel_core::{Customer, Product, ProductId, ProductSort};

use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalCustomer;
use crate::models::{CatalogState, Notice, session_keys};
use crate::services::{load_view, push_notice, save_view, take_notices};
use crate::state::AppState;

/// Inline error shown when a search fails.
pub const SEARCH_ERROR: &str = "Error fetching products. Please try again.";

/// Placeholder shown when there is nothing to list.
pub const EMPTY_STATE: &str = "No products found. Try searching for something to get started!";

// =============================================================================
// View Models
// =============================================================================

/// Product card display data.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub added: bool,
}

impl ProductView {
    fn new(product: &Product, catalog: &CatalogState) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
            added: catalog.is_added(product.id),
        }
    }

    /// Label of the add-to-cart button.
    #[must_use]
    pub const fn button_label(&self) -> &'static str {
        if self.added { "Added" } else { "Add to Cart" }
    }
}

/// One entry of the sort dropdown.
#[derive(Debug, Clone)]
pub struct SortOptionView {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

fn sort_options(active: Option<ProductSort>) -> Vec<SortOptionView> {
    ProductSort::ALL
        .iter()
        .map(|&sort| SortOptionView {
            value: sort.as_str(),
            label: sort.label(),
            selected: active == Some(sort),
        })
        .collect()
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/index.html")]
pub struct CatalogTemplate {
    pub customer_name: Option<String>,
    pub notices: Vec<Notice>,
    pub query: String,
    pub error: Option<String>,
    pub products: Vec<ProductView>,
    pub sort_options: Vec<SortOptionView>,
    pub can_add: bool,
    pub empty_state: &'static str,
}

impl CatalogTemplate {
    fn new(catalog: &CatalogState, customer: Option<&Customer>, notices: Vec<Notice>) -> Self {
        Self {
            customer_name: customer.map(Customer::display_name),
            notices,
            query: catalog.query.clone(),
            error: catalog.error.clone(),
            products: catalog
                .products
                .iter()
                .map(|p| ProductView::new(p, catalog))
                .collect(),
            sort_options: sort_options(catalog.sort),
            can_add: customer.is_some(),
            empty_state: EMPTY_STATE,
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

/// Sort form data.
#[derive(Debug, Deserialize)]
pub struct SortForm {
    #[serde(default)]
    pub sort: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the catalog page.
///
/// Leaving checkout for the catalog drops the checkout selections.
#[instrument(skip(state, session, customer))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalCustomer(customer): OptionalCustomer,
) -> Result<Response> {
    let catalog: CatalogState = load_view(&session, session_keys::CATALOG).await?;
    render(&state, &session, catalog, customer.as_ref()).await
}

/// Run a product search and show the results.
#[instrument(skip(state, session, customer), fields(query = %params.query))]
pub async fn search(
    State(state): State<AppState>,
    session: Session,
    OptionalCustomer(customer): OptionalCustomer,
    Query(params): Query<SearchQuery>,
) -> Result<Response> {
    let mut catalog: CatalogState = load_view(&session, session_keys::CATALOG).await?;

    match state.commerce().search_products(&params.query).await {
        Ok(products) => {
            tracing::debug!(count = products.len(), "Search returned products");
            catalog.show_results(params.query, products);
        }
        Err(e) => {
            tracing::warn!(error = %e, timeout = e.is_timeout(), "Product search failed");
            catalog.show_error(params.query, SEARCH_ERROR);
        }
    }

    render(&state, &session, catalog, customer.as_ref()).await
}

/// Reorder the held results.
#[instrument(skip(session))]
pub async fn sort(session: Session, Form(form): Form<SortForm>) -> Result<Redirect> {
    if let Some(sort) = ProductSort::parse(&form.sort) {
        let mut catalog: CatalogState = load_view(&session, session_keys::CATALOG).await?;
        catalog.apply_sort(sort);
        save_view(&session, session_keys::CATALOG, &catalog).await?;
    }

    Ok(Redirect::to("/products"))
}

/// Mirror the cart, store the view state and render the page.
async fn render(
    state: &AppState,
    session: &Session,
    mut catalog: CatalogState,
    customer: Option<&Customer>,
) -> Result<Response> {
    if let Some(customer) = customer {
        session.remove_value(session_keys::CHECKOUT).await?;

        match state.commerce().get_cart(customer.id).await {
            Ok(cart) => {
                catalog.seed_added(&cart);
                save_view(session, session_keys::CART, &cart).await?;
            }
            Err(e) => {
                tracing::warn!(
                    customer_id = %customer.id,
                    error = %e,
                    timeout = e.is_timeout(),
                    "Failed to fetch cart"
                );
                push_notice(session, Notice::error("Could not load your cart.")).await?;
            }
        }
    }

    // Anonymous visitors with nothing to remember get no session.
    if customer.is_some() || catalog != CatalogState::default() {
        save_view(session, session_keys::CATALOG, &catalog).await?;
    }
    let notices = take_notices(session).await?;

    Ok(CatalogTemplate::new(&catalog, customer, notices).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Decimal::new(1_999, 2),
            image_url: None,
        }
    }

    #[test]
    fn test_added_products_read_added() {
        let mut catalog = CatalogState::default();
        catalog.show_results("boot".to_string(), vec![product(1, "Boot"), product(2, "Sock")]);
        catalog.mark_added(ProductId::new(2));

        let view = CatalogTemplate::new(&catalog, None, Vec::new());
        let labels: Vec<_> = view.products.iter().map(ProductView::button_label).collect();
        assert_eq!(labels, vec!["Add to Cart", "Added"]);
        assert!(!view.can_add);
    }

    #[test]
    fn test_active_sort_is_selected() {
        let options = sort_options(Some(ProductSort::NameDesc));
        let selected: Vec<_> = options.iter().filter(|o| o.selected).map(|o| o.value).collect();
        assert_eq!(selected, vec!["name_desc"]);
        assert!(sort_options(None).iter().all(|o| !o.selected));
    }

    #[test]
    fn test_empty_catalog_renders_placeholder() {
        let catalog = CatalogState::default();
        let html = CatalogTemplate::new(&catalog, None, Vec::new())
            .render()
            .unwrap_or_default();
        assert!(html.contains(EMPTY_STATE));
    }

    #[test]
    fn test_search_error_replaces_results() {
        let mut catalog = CatalogState::default();
        catalog.show_results("boot".to_string(), vec![product(1, "Boot")]);
        catalog.show_error("boot".to_string(), SEARCH_ERROR);

        let html = CatalogTemplate::new(&catalog, None, Vec::new())
            .render()
            .unwrap_or_default();
        assert!(html.contains(SEARCH_ERROR));
        assert!(!html.contains("Add to Cart"));
    }
}
