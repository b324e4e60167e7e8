//! Saved shipping addresses.

use serde::{Deserialize, Serialize};

use super::AddressId;

/// A customer's saved shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// Fields of the "add new address" sub-form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAddress {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl NewAddress {
    /// Whether every field has a non-blank value.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [
            &self.street_address,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }
}

impl Address {
    /// Single-line rendering used for the "Selected Address" summary.
    #[must_use]
    pub fn one_line(&self) -> String {
        format!(
            "{}, {}, {}, {}, {}",
            self.street_address, self.city, self.state, self.postal_code, self.country
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_address_deserializes_backend_shape() {
        let json = r#"{
            "id": 3,
            "street_address": "1 Main St",
            "city": "Springfield",
            "state": "IL",
            "postal_code": "62701",
            "country": "US"
        }"#;
        let address: Address = serde_json::from_str(json).unwrap();
        assert_eq!(address.id, AddressId::new(3));
        assert_eq!(address.one_line(), "1 Main St, Springfield, IL, 62701, US");
    }

    #[test]
    fn test_new_address_requires_every_field() {
        let mut address = NewAddress {
            street_address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62701".to_string(),
            country: "US".to_string(),
        };
        assert!(address.is_complete());

        address.city = "  ".to_string();
        assert!(!address.is_complete());
    }
}
