//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added in `main`, capture errors and transactions)
//! 2. `TraceLayer` (request span with an empty `request_id` field)
//! 3. Request ID (fill the span field, tag Sentry, echo the header)
//! 4. Session layer (tower-sessions with an in-memory store)

pub mod customer;
pub mod request_id;
pub mod session;

pub use customer::{
    OptionalCustomer, RequireCustomer, clear_current_customer, clear_view_state,
    set_current_customer,
};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use session::create_session_layer;
