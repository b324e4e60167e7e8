//! The shopper the storefront is acting for.

use serde::{Deserialize, Serialize};

use super::CustomerId;

/// Customer identity held in the session context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Customer {
    /// Customer with no profile fields, only an identifier.
    #[must_use]
    pub const fn with_id(id: CustomerId) -> Self {
        Self {
            id,
            name: None,
            email: None,
        }
    }

    /// Name to greet the customer with, falling back to the email or the id.
    #[must_use]
    pub fn display_name(&self) -> String {
        non_blank(self.name.as_deref())
            .or_else(|| non_blank(self.email.as_deref()))
            .map_or_else(|| format!("Customer #{}", self.id), str::to_string)
    }
}

fn non_blank(field: Option<&str>) -> Option<&str> {
    field.filter(|s| !s.trim().is_empty())
}
