//! Session-backed services shared by route handlers.

pub mod notices;
pub mod orders;
pub mod view_state;

pub use notices::{push_notice, take_notices};
pub use orders::{OrderSubmissions, SubmissionGuard};
pub use view_state::{load_view, save_view};
