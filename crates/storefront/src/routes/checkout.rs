//! Checkout route handlers.
//!
//! # Flow
//!
//! 1. `GET /checkout` fetches addresses, payment methods and the cart
//!    concurrently and keeps them in the session.
//! 2. The shopper picks one address and one payment method.
//! 3. `POST /checkout/confirm` places the order with the total computed from
//!    the held cart items.
//!
//! Selections survive a reload of the page; they are cleared when the order
//! goes through or when the shopper returns to the catalog.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use cartwheel_core::{
    AddressId, Cart, Customer, NewAddress, NewPaymentMethod, PaymentId,
};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireCustomer;
use crate::models::{CheckoutSection, CheckoutState, Notice, session_keys};
use crate::services::{load_view, push_notice, save_view, take_notices};
use crate::state::AppState;

/// Inline error shown when the backend rejects an order.
pub const ORDER_ERROR: &str = "Error placing order. Please try again later.";

/// Notice shown when the checkout is locked by an order in flight.
pub const ORDER_IN_FLIGHT: &str = "Your order is already being placed.";

// =============================================================================
// View Models
// =============================================================================

/// Address row display data.
#[derive(Debug, Clone)]
pub struct AddressView {
    pub id: AddressId,
    pub line: String,
    pub selected: bool,
}

/// Payment method row display data.
#[derive(Debug, Clone)]
pub struct PaymentView {
    pub id: PaymentId,
    pub card_holder_name: String,
    pub masked_card_number: String,
    pub expiration_date: String,
    pub selected: bool,
}

/// Order summary line display data.
#[derive(Debug, Clone)]
pub struct LineView {
    pub name: String,
    pub quantity: u32,
    pub price: Decimal,
    pub line_total: Decimal,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub customer_name: Option<String>,
    pub notices: Vec<Notice>,
    pub addresses: Vec<AddressView>,
    pub payments: Vec<PaymentView>,
    pub selected_address: Option<String>,
    pub selected_payment: Option<String>,
    pub address_expanded: bool,
    pub payment_expanded: bool,
    pub lines: Vec<LineView>,
    pub total: Decimal,
    pub can_confirm: bool,
    pub error: Option<String>,
}

impl CheckoutTemplate {
    fn new(
        checkout: &CheckoutState,
        customer: &Customer,
        notices: Vec<Notice>,
        submitting: bool,
    ) -> Self {
        let selection = &checkout.selection;
        let selected_address_id = selection.address().map(|a| a.id);
        let selected_payment_id = selection.payment().map(|p| p.id);

        Self {
            customer_name: Some(customer.display_name()),
            notices,
            addresses: checkout
                .addresses
                .iter()
                .map(|a| AddressView {
                    id: a.id,
                    line: a.one_line(),
                    selected: selected_address_id == Some(a.id),
                })
                .collect(),
            payments: checkout
                .payments
                .iter()
                .map(|p| PaymentView {
                    id: p.id,
                    card_holder_name: p.card_holder_name.clone(),
                    masked_card_number: p.masked_card_number(),
                    expiration_date: p.expiration_date.clone(),
                    selected: selected_payment_id == Some(p.id),
                })
                .collect(),
            selected_address: selection.address().map(|a| a.one_line()),
            selected_payment: selection
                .payment()
                .map(|p| format!("{} ({})", p.masked_card_number(), p.card_holder_name)),
            address_expanded: checkout.address_expanded,
            payment_expanded: checkout.payment_expanded,
            lines: checkout
                .cart_items
                .iter()
                .map(|item| LineView {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    price: item.price,
                    line_total: item.line_total(),
                })
                .collect(),
            total: checkout.total(),
            can_confirm: !submitting && selection.is_complete(),
            error: checkout.order_error.clone(),
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Address selection form data.
#[derive(Debug, Deserialize)]
pub struct SelectAddressForm {
    pub address_id: AddressId,
}

/// Payment selection form data.
#[derive(Debug, Deserialize)]
pub struct SelectPaymentForm {
    pub payment_id: PaymentId,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout page.
#[instrument(skip(state, session, customer), fields(customer_id = %customer.id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireCustomer(customer): RequireCustomer,
) -> Result<Response> {
    let mut checkout: CheckoutState = load_view(&session, session_keys::CHECKOUT).await?;
    let commerce = state.commerce();

    let (addresses, payments, cart) = tokio::join!(
        commerce.get_addresses(customer.id),
        commerce.get_payment_options(customer.id),
        commerce.get_cart(customer.id),
    );

    checkout.addresses = match addresses {
        Ok(addresses) => addresses,
        Err(e) => {
            tracing::error!(error = %e, timeout = e.is_timeout(), "Failed to fetch addresses");
            push_notice(&session, Notice::error("Could not load your addresses.")).await?;
            Vec::new()
        }
    };

    checkout.payments = match payments {
        Ok(payments) => payments,
        Err(e) => {
            tracing::error!(error = %e, timeout = e.is_timeout(), "Failed to fetch payment methods");
            push_notice(
                &session,
                Notice::error("Could not load your payment methods."),
            )
            .await?;
            Vec::new()
        }
    };

    checkout.cart_items = match cart {
        Ok(cart) => {
            save_view(&session, session_keys::CART, &cart).await?;
            cart.cart_items
        }
        Err(e) => {
            tracing::error!(error = %e, timeout = e.is_timeout(), "Failed to fetch cart");
            push_notice(&session, Notice::error("Could not load your cart.")).await?;
            Vec::new()
        }
    };

    save_view(&session, session_keys::CHECKOUT, &checkout).await?;

    let notices = take_notices(&session).await?;
    let submitting = state.orders().is_in_flight(customer.id);

    Ok(CheckoutTemplate::new(&checkout, &customer, notices, submitting).into_response())
}

/// Push a notice and return `true` if an order for `customer` is in flight.
///
/// The confirming request writes its session snapshot back when it ends, so
/// changes made meanwhile would be lost.
async fn refuse_while_ordering(
    state: &AppState,
    session: &Session,
    customer: &Customer,
) -> Result<bool> {
    if !state.orders().is_in_flight(customer.id) {
        return Ok(false);
    }

    tracing::warn!(customer_id = %customer.id, "Checkout change refused during order submission");
    push_notice(session, Notice::error(ORDER_IN_FLIGHT)).await?;
    Ok(true)
}

/// Select a shipping address from the held list.
#[instrument(skip(state, session, customer))]
pub async fn select_address(
    State(state): State<AppState>,
    session: Session,
    RequireCustomer(customer): RequireCustomer,
    Form(form): Form<SelectAddressForm>,
) -> Result<Redirect> {
    if refuse_while_ordering(&state, &session, &customer).await? {
        return Ok(Redirect::to("/checkout"));
    }

    let mut checkout: CheckoutState = load_view(&session, session_keys::CHECKOUT).await?;

    if !checkout.select_address(form.address_id) {
        return Err(AppError::BadRequest(format!(
            "unknown address {}",
            form.address_id
        )));
    }

    save_view(&session, session_keys::CHECKOUT, &checkout).await?;
    Ok(Redirect::to("/checkout"))
}

/// Select a payment method from the held list.
#[instrument(skip(state, session, customer))]
pub async fn select_payment(
    State(state): State<AppState>,
    session: Session,
    RequireCustomer(customer): RequireCustomer,
    Form(form): Form<SelectPaymentForm>,
) -> Result<Redirect> {
    if refuse_while_ordering(&state, &session, &customer).await? {
        return Ok(Redirect::to("/checkout"));
    }

    let mut checkout: CheckoutState = load_view(&session, session_keys::CHECKOUT).await?;

    if !checkout.select_payment(form.payment_id) {
        return Err(AppError::BadRequest(format!(
            "unknown payment method {}",
            form.payment_id
        )));
    }

    save_view(&session, session_keys::CHECKOUT, &checkout).await?;
    Ok(Redirect::to("/checkout"))
}

/// Expand or collapse one section.
#[instrument(skip(state, session, customer))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    RequireCustomer(customer): RequireCustomer,
    Path(section): Path<CheckoutSection>,
) -> Result<Redirect> {
    if refuse_while_ordering(&state, &session, &customer).await? {
        return Ok(Redirect::to("/checkout"));
    }

    let mut checkout: CheckoutState = load_view(&session, session_keys::CHECKOUT).await?;
    checkout.toggle(section);
    save_view(&session, session_keys::CHECKOUT, &checkout).await?;
    Ok(Redirect::to("/checkout"))
}

/// Save a new address. The list is re-fetched when the page renders.
#[instrument(skip(state, session, customer, address), fields(customer_id = %customer.id))]
pub async fn add_address(
    State(state): State<AppState>,
    session: Session,
    RequireCustomer(customer): RequireCustomer,
    Form(address): Form<NewAddress>,
) -> Result<Redirect> {
    let notice = if !address.is_complete() {
        Notice::error("Please fill in every address field.")
    } else if let Err(e) = state.commerce().add_address(customer.id, &address).await {
        tracing::error!(error = %e, timeout = e.is_timeout(), "Failed to save address");
        Notice::error("Could not save the address. Please try again.")
    } else {
        Notice::success("Address saved.")
    };

    push_notice(&session, notice).await?;
    Ok(Redirect::to("/checkout"))
}

/// Save a new payment method. The list is re-fetched when the page renders.
#[instrument(skip(state, session, customer, payment), fields(customer_id = %customer.id))]
pub async fn add_payment(
    State(state): State<AppState>,
    session: Session,
    RequireCustomer(customer): RequireCustomer,
    Form(payment): Form<NewPaymentMethod>,
) -> Result<Redirect> {
    let notice = if !payment.is_complete() {
        Notice::error("Please fill in every payment field.")
    } else if let Err(e) = state
        .commerce()
        .add_payment_option(customer.id, &payment)
        .await
    {
        tracing::error!(error = %e, timeout = e.is_timeout(), "Failed to save payment method");
        Notice::error("Could not save the payment method. Please try again.")
    } else {
        Notice::success("Payment method saved.")
    };

    push_notice(&session, notice).await?;
    Ok(Redirect::to("/checkout"))
}

/// Place the order for the current selection.
///
/// Does nothing unless both an address and a payment method are selected.
/// While the request is in flight the checkout is locked: a second
/// confirmation and any selection change are refused.
#[instrument(skip(state, session, customer), fields(customer_id = %customer.id))]
pub async fn confirm(
    State(state): State<AppState>,
    session: Session,
    RequireCustomer(customer): RequireCustomer,
) -> Result<Redirect> {
    let mut checkout: CheckoutState = load_view(&session, session_keys::CHECKOUT).await?;

    let Ok(order) = checkout
        .selection
        .order_request(customer.id, &checkout.cart_items)
    else {
        return Ok(Redirect::to("/checkout"));
    };

    let Some(_guard) = state.orders().begin(customer.id) else {
        tracing::warn!("Order submission already in flight");
        push_notice(&session, Notice::error(ORDER_IN_FLIGHT)).await?;
        return Ok(Redirect::to("/checkout"));
    };
    checkout.order_error = None;

    match state.commerce().add_order(&order).await {
        Ok(()) => {
            let total = order.total_price.to_string();
            add_breadcrumb("checkout", "Order placed", &[("total_price", total.as_str())]);
            tracing::info!(total_price = %order.total_price, "Order placed");

            session.remove::<Cart>(session_keys::CART).await?;
            session.remove::<CheckoutState>(session_keys::CHECKOUT).await?;
            push_notice(&session, Notice::success("Order confirmed!")).await?;
            Ok(Redirect::to("/"))
        }
        Err(e) => {
            tracing::error!(error = %e, timeout = e.is_timeout(), "Failed to place order");
            checkout.order_error = Some(ORDER_ERROR.to_string());
            save_view(&session, session_keys::CHECKOUT, &checkout).await?;
            Ok(Redirect::to("/checkout"))
        }
    }
}
