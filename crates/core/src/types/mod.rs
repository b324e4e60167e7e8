//! Records exchanged with the commerce backend.
//!
//! Every record deserializes verbatim from the backend's JSON. Money is
//! carried as [`rust_decimal::Decimal`] and accepts JSON numbers or strings.

pub mod address;
pub mod cart;
pub mod customer;
pub mod id;
pub mod payment;
pub mod product;

pub use address::{Address, NewAddress};
pub use cart::{Cart, CartItem};
pub use customer::Customer;
pub use id::*;
pub use payment::{NewPaymentMethod, PaymentMethod};
pub use product::Product;
