//! The backend-owned cart, mirrored by the storefront.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CartItemId, ProductId};

/// One line in the customer's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    /// Product this line refers to. Older backends omit it and use `id`.
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub name: String,
    /// Unit price.
    pub price: Decimal,
    pub quantity: u32,
}

impl CartItem {
    /// Product this line refers to.
    #[must_use]
    pub fn product_ref(&self) -> ProductId {
        self.product_id
            .unwrap_or_else(|| ProductId::new(self.id.as_i64()))
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Cart contents as returned by `get_cart`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub cart_items: Vec<CartItem>,
    /// Total as computed by the backend. Display code uses
    /// [`crate::cart_total`] instead.
    #[serde(default)]
    pub total_price: Option<Decimal>,
}

impl Cart {
    /// Product references of every line, in cart order.
    pub fn product_refs(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.cart_items.iter().map(CartItem::product_ref)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_deserializes_backend_shape() {
        let cart: Cart = serde_json::from_str(
            r#"{
                "cart_items": [
                    {"id": 4, "name": "Boot", "price": 10, "quantity": 2},
                    {"id": 9, "product_id": 21, "name": "Sock", "price": "5.00", "quantity": 3}
                ],
                "total_price": 35
            }"#,
        )
        .unwrap();

        assert_eq!(cart.cart_items.len(), 2);
        assert_eq!(cart.total_price, Some(Decimal::from(35)));
        let refs: Vec<_> = cart.product_refs().collect();
        assert_eq!(refs, vec![ProductId::new(4), ProductId::new(21)]);
    }

    #[test]
    fn test_cart_missing_items_is_empty() {
        let cart: Cart = serde_json::from_str(r#"{"total_price": 0}"#).unwrap();
        assert!(cart.cart_items.is_empty());
    }

    #[test]
    fn test_line_total() {
        let item = CartItem {
            id: CartItemId::new(1),
            product_id: None,
            name: "Boot".to_string(),
            price: Decimal::new(1250, 2),
            quantity: 4,
        };
        assert_eq!(item.line_total(), Decimal::from(50));
    }
}
