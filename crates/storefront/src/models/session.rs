//! Types stored in the session.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use cartwheel_core::{
    Address, AddressId, Cart, CartItem, CheckoutSelection, PaymentId,
    PaymentMethod, Product, ProductId, ProductSort, cart_total, sort_products,
};
use rust_decimal::Decimal;

/// Session keys.
pub mod keys {
    /// Key for the current customer (the session context).
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Key for the mirrored backend cart.
    pub const CART: &str = "cart";

    /// Key for catalog view state.
    pub const CATALOG: &str = "catalog";

    /// Key for checkout view state.
    pub const CHECKOUT: &str = "checkout";

    /// Key for queued notices.
    pub const NOTICES: &str = "notices";
}

// =============================================================================
// Catalog
// =============================================================================

/// What the catalog page is currently showing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogState {
    /// Last submitted search query.
    pub query: String,
    /// Results of the last successful search, in display order.
    pub products: Vec<Product>,
    /// Sort last applied to `products`.
    pub sort: Option<ProductSort>,
    /// Error from the last search attempt.
    pub error: Option<String>,
    /// Products whose "Add to Cart" button is disabled.
    pub added: BTreeSet<ProductId>,
    /// Products added since the last cart seed. Kept marked through one
    /// seed even if the cart read does not list them yet.
    #[serde(default)]
    pub pending_added: BTreeSet<ProductId>,
}

impl CatalogState {
    /// Replace the held results with a fresh search.
    pub fn show_results(&mut self, query: String, products: Vec<Product>) {
        self.query = query;
        self.products = products;
        self.sort = None;
        self.error = None;
    }

    /// Record a failed search. Held results are kept but hidden by the error.
    pub fn show_error(&mut self, query: String, message: impl Into<String>) {
        self.query = query;
        self.error = Some(message.into());
    }

    /// Reorder the held results without fetching.
    pub fn apply_sort(&mut self, sort: ProductSort) {
        sort_products(&mut self.products, sort);
        self.sort = Some(sort);
    }

    /// Reset the added markers from the customer's cart, keeping pending
    /// ones for this seed only.
    pub fn seed_added(&mut self, cart: &Cart) {
        let pending = std::mem::take(&mut self.pending_added);
        self.added = cart.product_refs().chain(pending).collect();
    }

    /// Mark a product as added until the next seed has seen it.
    pub fn mark_added(&mut self, product_id: ProductId) {
        self.added.insert(product_id);
        self.pending_added.insert(product_id);
    }

    #[must_use]
    pub fn is_added(&self, product_id: ProductId) -> bool {
        self.added.contains(&product_id)
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// Sections of the checkout page that can be expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutSection {
    Address,
    Payment,
}

/// What the checkout page is currently showing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutState {
    /// Addresses fetched when the page was last shown.
    pub addresses: Vec<Address>,
    /// Payment methods fetched when the page was last shown.
    pub payments: Vec<PaymentMethod>,
    /// Cart items fetched when the page was last shown.
    pub cart_items: Vec<CartItem>,
    pub selection: CheckoutSelection,
    pub address_expanded: bool,
    pub payment_expanded: bool,
    /// Inline error from the last rejected order.
    pub order_error: Option<String>,
}

impl CheckoutState {
    /// Select a held address by id. Returns `false` if it is not held.
    pub fn select_address(&mut self, id: AddressId) -> bool {
        match self.addresses.iter().find(|a| a.id == id) {
            Some(address) => {
                self.selection.select_address(address.clone());
                true
            }
            None => false,
        }
    }

    /// Select a held payment method by id. Returns `false` if it is not held.
    pub fn select_payment(&mut self, id: PaymentId) -> bool {
        match self.payments.iter().find(|p| p.id == id) {
            Some(payment) => {
                self.selection.select_payment(payment.clone());
                true
            }
            None => false,
        }
    }

    /// Flip the expansion of one section.
    pub fn toggle(&mut self, section: CheckoutSection) {
        match section {
            CheckoutSection::Address => self.address_expanded = !self.address_expanded,
            CheckoutSection::Payment => self.payment_expanded = !self.payment_expanded,
        }
    }

    /// Total of the held cart items, computed on every call.
    #[must_use]
    pub fn total(&self) -> Decimal {
        cart_total(&self.cart_items)
    }
}

#[cfg(test)]
mod tests {
    use cartwheel_core::CartItemId;

    use super::*;

    fn product(id: i64, name: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Decimal::from(price),
            image_url: None,
        }
    }

    fn address(id: i64) -> Address {
        Address {
            id: AddressId::new(id),
            street_address: format!("{id} Main St"),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62701".to_string(),
            country: "US".to_string(),
        }
    }

    #[test]
    fn test_new_search_resets_sort_and_error() {
        let mut state = CatalogState::default();
        state.show_error("boot".to_string(), "Error fetching products. Please try again.");
        state.show_results("boot".to_string(), vec![product(1, "Boot", 50)]);
        assert!(state.error.is_none());

        state.apply_sort(ProductSort::PriceDesc);
        assert_eq!(state.sort, Some(ProductSort::PriceDesc));

        state.show_results("sock".to_string(), vec![]);
        assert!(state.sort.is_none());
        assert!(state.products.is_empty());
    }

    fn cart_with(product_id: i64) -> Cart {
        Cart {
            cart_items: vec![CartItem {
                id: CartItemId::new(1),
                product_id: Some(ProductId::new(product_id)),
                name: "Boot".to_string(),
                price: Decimal::from(10),
                quantity: 1,
            }],
            total_price: None,
        }
    }

    #[test]
    fn test_seed_added_replaces_stale_markers() {
        let mut state = CatalogState {
            added: BTreeSet::from([ProductId::new(99)]),
            ..CatalogState::default()
        };
        state.seed_added(&cart_with(5));

        assert!(state.is_added(ProductId::new(5)));
        assert!(!state.is_added(ProductId::new(99)));
    }

    #[test]
    fn test_just_added_product_survives_one_lagging_seed() {
        let mut state = CatalogState::default();
        state.mark_added(ProductId::new(99));

        state.seed_added(&cart_with(5));
        assert!(state.is_added(ProductId::new(5)));
        assert!(state.is_added(ProductId::new(99)));

        state.seed_added(&cart_with(5));
        assert!(!state.is_added(ProductId::new(99)));
    }

    #[test]
    fn test_select_only_held_addresses() {
        let mut state = CheckoutState {
            addresses: vec![address(1), address(2)],
            ..CheckoutState::default()
        };

        assert!(state.select_address(AddressId::new(1)));
        assert!(state.select_address(AddressId::new(2)));
        assert_eq!(
            state.selection.address().map(|a| a.id),
            Some(AddressId::new(2))
        );

        assert!(!state.select_address(AddressId::new(3)));
        assert_eq!(
            state.selection.address().map(|a| a.id),
            Some(AddressId::new(2))
        );
        assert!(!state.select_payment(PaymentId::new(1)));
    }

    #[test]
    fn test_toggle_sections_independently() {
        let mut state = CheckoutState::default();
        state.toggle(CheckoutSection::Address);
        assert!(state.address_expanded);
        assert!(!state.payment_expanded);

        state.toggle(CheckoutSection::Address);
        state.toggle(CheckoutSection::Payment);
        assert!(!state.address_expanded);
        assert!(state.payment_expanded);
    }
}
