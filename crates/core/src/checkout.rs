//! Checkout selection and the order-creation request.
//!
//! An order can only be built from a complete selection. Whether a request
//! is already in flight is tracked by the caller, not here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Address, AddressId, CartItem, CustomerId, PaymentId, PaymentMethod};

/// Reasons an order cannot be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("no shipping address selected")]
    MissingAddress,
    #[error("no payment method selected")]
    MissingPayment,
}

/// Sum of `unit price × quantity` over the given cart items.
#[must_use]
pub fn cart_total(items: &[CartItem]) -> Decimal {
    items.iter().map(CartItem::line_total).sum()
}

/// The shopper's single-select address and payment choices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSelection {
    address: Option<Address>,
    payment: Option<PaymentMethod>,
}

impl CheckoutSelection {
    /// Select an address, replacing any previous choice.
    pub fn select_address(&mut self, address: Address) {
        self.address = Some(address);
    }

    /// Select a payment method, replacing any previous choice.
    pub fn select_payment(&mut self, payment: PaymentMethod) {
        self.payment = Some(payment);
    }

    #[must_use]
    pub const fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    #[must_use]
    pub const fn payment(&self) -> Option<&PaymentMethod> {
        self.payment.as_ref()
    }

    /// Whether both an address and a payment method are selected.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.address.is_some() && self.payment.is_some()
    }

    /// Build the order-creation request for the current selection.
    ///
    /// The total is computed from `items` at call time.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MissingAddress`] or
    /// [`CheckoutError::MissingPayment`] when a selection is absent.
    pub fn order_request(
        &self,
        customer_id: CustomerId,
        items: &[CartItem],
    ) -> Result<OrderRequest, CheckoutError> {
        let address = self.address.as_ref().ok_or(CheckoutError::MissingAddress)?;
        let payment = self.payment.as_ref().ok_or(CheckoutError::MissingPayment)?;

        Ok(OrderRequest {
            customer_id,
            address_id: address.id,
            payment_id: payment.id,
            total_price: cart_total(items),
        })
    }
}

/// JSON body of the `add_order` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub customer_id: CustomerId,
    pub address_id: AddressId,
    pub payment_id: PaymentId,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}
