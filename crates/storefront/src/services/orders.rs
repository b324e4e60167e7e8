//! Registry of customers with an order submission in flight.
//!
//! Session data is written back only when a response completes, so two
//! concurrent confirmations from the same browser cannot see each other
//! through the session. This registry lives in the application state
//! instead and is shared by every request.
//!
//! While a customer is registered here the checkout page disables the
//! confirm button and refuses selection changes.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use cartwheel_core::CustomerId;

/// Customers with an `add_order` request in flight.
#[derive(Clone, Default)]
pub struct OrderSubmissions {
    in_flight: Arc<Mutex<HashSet<CustomerId>>>,
}

impl OrderSubmissions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the submission slot for `customer_id`.
    ///
    /// Returns `None` if a submission for this customer is already in
    /// flight. The slot is released when the returned guard is dropped,
    /// including when the request future is cancelled.
    #[must_use]
    pub fn begin(&self, customer_id: CustomerId) -> Option<SubmissionGuard> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        in_flight.insert(customer_id).then(|| SubmissionGuard {
            registry: self.clone(),
            customer_id,
        })
    }

    /// Whether a submission for `customer_id` is in flight.
    #[must_use]
    pub fn is_in_flight(&self, customer_id: CustomerId) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&customer_id)
    }
}

/// Holds a customer's submission slot until dropped.
#[must_use = "the submission slot is released as soon as the guard is dropped"]
pub struct SubmissionGuard {
    registry: OrderSubmissions,
    customer_id: CustomerId,
}

impl Drop for SubmissionGuard {
    fn drop(&mut self) {
        self.registry
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.customer_id);
    }
}
