//! Session context extractors.
//!
//! The current customer is loaded into the session once (see
//! `routes::session`) and handed to handlers through these extractors, so
//! no handler reads session keys for it directly.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use cartwheel_core::Customer;

use crate::models::session_keys;

/// Where visitors without a customer are sent.
pub const SESSION_PAGE: &str = "/session";

/// Extractor that requires a customer in the session context.
///
/// If no customer is set, redirects to the session page.
///
/// # Example
///
/// ```rust,ignore
/// async fn checkout(RequireCustomer(customer): RequireCustomer) -> impl IntoResponse {
///     format!("Checking out for {}", customer.display_name())
/// }
/// ```
pub struct RequireCustomer(pub Customer);

/// Error returned when a customer is required but none is set.
pub enum CustomerRejection {
    /// Redirect to the session page.
    RedirectToSession,
    /// The session layer is missing.
    MissingSession,
}

impl IntoResponse for CustomerRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToSession => Redirect::to(SESSION_PAGE).into_response(),
            Self::MissingSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireCustomer
where
    S: Send + Sync,
{
    type Rejection = CustomerRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts.extensions.get::<Session>().ok_or_else(|| {
            tracing::error!("Session layer missing from router");
            CustomerRejection::MissingSession
        })?;

        let customer: Customer = session
            .get(session_keys::CURRENT_CUSTOMER)
            .await
            .ok()
            .flatten()
            .ok_or(CustomerRejection::RedirectToSession)?;

        Ok(Self(customer))
    }
}

/// Extractor that optionally gets the current customer.
///
/// Unlike `RequireCustomer`, this never rejects the request.
pub struct OptionalCustomer(pub Option<Customer>);

impl<S> FromRequestParts<S> for OptionalCustomer
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<Customer>(session_keys::CURRENT_CUSTOMER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(customer))
    }
}

/// Store the current customer in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_customer(
    session: &Session,
    customer: &Customer,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::CURRENT_CUSTOMER, customer)
        .await
}

/// Clear the current customer and every piece of view state held for them.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_customer(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<Customer>(session_keys::CURRENT_CUSTOMER)
        .await?;
    clear_view_state(session).await
}

/// Drop the cart mirror and the per-view state, keeping the customer.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_view_state(session: &Session) -> Result<(), tower_sessions::session::Error> {
    for key in [
        session_keys::CART,
        session_keys::CATALOG,
        session_keys::CHECKOUT,
    ] {
        session.remove_value(key).await?;
    }
    Ok(())
}
