//! Cart route handlers.
//!
//! The storefront never edits the cart locally. After every change the whole
//! cart is fetched again and replaces the session mirror.

use axum::{
    Form,
    extract::State,
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use cartwheel_core::ProductId;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireCustomer;
use crate::models::{CatalogState, Notice, session_keys};
use crate::services::{load_view, push_notice, save_view};
use crate::state::AppState;

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
}

/// Add one product to the customer's cart.
///
/// On success the product's button switches to "Added" and the cart mirror
/// is refreshed from the backend. On failure nothing held changes.
#[instrument(skip(state, session, customer), fields(customer_id = %customer.id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireCustomer(customer): RequireCustomer,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    if let Err(e) = state
        .commerce()
        .add_to_cart(customer.id, form.product_id)
        .await
    {
        tracing::error!(
            product_id = %form.product_id,
            error = %e,
            timeout = e.is_timeout(),
            "Failed to add item to cart"
        );
        push_notice(
            &session,
            Notice::error("Could not add the item to your cart. Please try again."),
        )
        .await?;
        return Ok(Redirect::to("/products"));
    }

    let product_id = form.product_id.to_string();
    add_breadcrumb("cart", "Added product", &[("product_id", product_id.as_str())]);

    let mut catalog: CatalogState = load_view(&session, session_keys::CATALOG).await?;

    match state.commerce().get_cart(customer.id).await {
        Ok(cart) => {
            catalog.seed_added(&cart);
            save_view(&session, session_keys::CART, &cart).await?;
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                timeout = e.is_timeout(),
                "Failed to re-fetch cart after adding item"
            );
            push_notice(&session, Notice::error("Could not refresh your cart.")).await?;
        }
    }

    // Kept through the next seed in case the cart read lags.
    catalog.mark_added(form.product_id);
    save_view(&session, session_keys::CATALOG, &catalog).await?;

    push_notice(&session, Notice::success("Item added to cart!")).await?;
    Ok(Redirect::to("/products"))
}
