//! Saved payment methods.

use serde::{Deserialize, Serialize};

use super::PaymentId;

/// A customer's saved card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: PaymentId,
    pub card_number: String,
    pub card_holder_name: String,
    pub expiration_date: String,
}

/// Fields of the "add new payment method" sub-form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPaymentMethod {
    pub card_number: String,
    pub card_holder_name: String,
    pub expiration_date: String,
}

impl NewPaymentMethod {
    /// Whether every field has a non-blank value.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [&self.card_number, &self.card_holder_name, &self.expiration_date]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

impl PaymentMethod {
    /// Card number with everything but the last four digits hidden.
    ///
    /// Spaces and dashes in the stored number are ignored. Numbers with four
    /// or fewer digits are returned as-is.
    #[must_use]
    pub fn masked_card_number(&self) -> String {
        let digits: Vec<char> = self
            .card_number
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();

        if digits.len() <= 4 {
            return digits.into_iter().collect();
        }

        let hidden = digits.len() - 4;
        let last_four: String = digits.iter().skip(hidden).collect();
        format!("{}{last_four}", "*".repeat(hidden))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(number: &str) -> PaymentMethod {
        PaymentMethod {
            id: PaymentId::new(1),
            card_number: number.to_string(),
            card_holder_name: "Ada Lovelace".to_string(),
            expiration_date: "12/29".to_string(),
        }
    }

    #[test]
    fn test_masked_card_number_keeps_last_four() {
        assert_eq!(
            card("4111 1111 1111 1234").masked_card_number(),
            "************1234"
        );
        assert_eq!(card("4111-1111-1111-9876").masked_card_number(), "************9876");
    }

    #[test]
    fn test_masked_card_number_short_input() {
        assert_eq!(card("123").masked_card_number(), "123");
        assert_eq!(card("").masked_card_number(), "");
    }
}
