//! Cartwheel Core - Shared storefront types and logic.
//!
//! This crate provides the pieces of the storefront that do not touch the
//! network:
//! - [`types`] - Typed IDs and the records returned by the commerce backend
//! - [`catalog`] - Product sort options and ordering
//! - [`checkout`] - Address/payment selection, cart totals, order requests
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no sessions. The storefront binary owns all of those and feeds
//! backend responses into the types defined here.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod checkout;
pub mod types;

pub use catalog::{ProductSort, sort_products};
pub use checkout::{CheckoutError, CheckoutSelection, OrderRequest, cart_total};
pub use types::*;
