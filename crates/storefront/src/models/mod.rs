//! Session-held view state for the storefront pages.
//!
//! Each page keeps the state a browser-side component would hold (held
//! search results, selections, expanded sections) in the visitor's session,
//! under one key per view. POST handlers mutate it and redirect back.

pub mod notice;
pub mod session;

pub use notice::{Notice, NoticeLevel};
pub use session::{CatalogState, CheckoutSection, CheckoutState, keys as session_keys};
