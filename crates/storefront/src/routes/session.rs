//! Session context handlers.
//!
//! Signing in is handled elsewhere. These routes only hand an already known
//! customer to the storefront and take it away again.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use cartwheel_core::{Customer, CustomerId};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{
    OptionalCustomer, RequireCustomer, clear_current_customer, clear_view_state,
    set_current_customer,
};
use crate::models::Notice;
use crate::services::{push_notice, take_notices};

/// Session handoff form data.
#[derive(Debug, Deserialize)]
pub struct SessionForm {
    pub customer_id: CustomerId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl SessionForm {
    fn into_customer(self) -> Customer {
        Customer {
            id: self.customer_id,
            name: non_blank(self.name),
            email: non_blank(self.email),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Session handoff page template.
#[derive(Template, WebTemplate)]
#[template(path = "session/new.html")]
pub struct SessionTemplate {
    pub customer_name: Option<String>,
    pub notices: Vec<Notice>,
    pub customer_id: Option<CustomerId>,
}

/// Display the session handoff page.
#[instrument(skip(session, customer))]
pub async fn show(
    session: Session,
    OptionalCustomer(customer): OptionalCustomer,
) -> Result<Response> {
    let notices = take_notices(&session).await?;

    Ok(SessionTemplate {
        customer_name: customer.as_ref().map(Customer::display_name),
        notices,
        customer_id: customer.map(|c| c.id),
    }
    .into_response())
}

/// Load a customer into the session.
///
/// View state held for a previous customer is dropped.
#[instrument(skip(session, form), fields(customer_id = %form.customer_id))]
pub async fn load(session: Session, Form(form): Form<SessionForm>) -> Result<Redirect> {
    let customer = form.into_customer();

    clear_view_state(&session).await?;
    set_current_customer(&session, &customer).await?;
    set_sentry_user(&customer.id, customer.email.as_deref());

    tracing::info!("Customer loaded into session");
    push_notice(
        &session,
        Notice::success(format!("Shopping as {}.", customer.display_name())),
    )
    .await?;

    Ok(Redirect::to("/products"))
}

/// Drop every piece of view state while keeping the customer.
#[instrument(skip(session, customer), fields(customer_id = %customer.id))]
pub async fn refresh(
    session: Session,
    RequireCustomer(customer): RequireCustomer,
) -> Result<Redirect> {
    clear_view_state(&session).await?;
    set_current_customer(&session, &customer).await?;
    Ok(Redirect::to("/products"))
}

/// Clear the session context.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_customer(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/session"))
}
