//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Redirect to the catalog
//! GET  /health                    - Health check
//!
//! # Catalog
//! GET  /products                  - Catalog page (mirrors the cart)
//! GET  /products/search?query=    - Run a product search
//! POST /products/sort             - Reorder the held results
//! POST /cart/add                  - Add one product to the cart
//!
//! # Checkout (requires a customer)
//! GET  /checkout                  - Checkout page
//! POST /checkout/address          - Select a shipping address
//! POST /checkout/payment          - Select a payment method
//! POST /checkout/toggle/{section} - Expand or collapse a section
//! POST /checkout/addresses        - Save a new address
//! POST /checkout/payments         - Save a new payment method
//! POST /checkout/confirm          - Place the order
//!
//! # Session context
//! GET  /session                   - Customer handoff page
//! POST /session                   - Load a customer into the session
//! POST /session/refresh           - Drop view state, keep the customer
//! POST /session/logout            - Clear the session context
//! ```
//!
//! Every POST answers with a `303 See Other` back to a page, which drains
//! the notice queue when it renders.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod session;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::show))
        .route("/search", get(catalog::search))
        .route("/sort", post(catalog::sort))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new().route("/add", post(cart::add))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/address", post(checkout::select_address))
        .route("/payment", post(checkout::select_payment))
        .route("/toggle/{section}", post(checkout::toggle))
        .route("/addresses", post(checkout::add_address))
        .route("/payments", post(checkout::add_payment))
        .route("/confirm", post(checkout::confirm))
}

/// Create the session context routes router.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(session::show).post(session::load))
        .route("/refresh", post(session::refresh))
        .route("/logout", post(session::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .nest("/products", catalog_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/session", session_routes())
}

async fn home() -> Redirect {
    Redirect::to("/products")
}
