//! Client-side ordering of catalog search results.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::Product;

/// Sort options offered on the catalog page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    /// Price: low to high.
    PriceAsc,
    /// Price: high to low.
    PriceDesc,
    /// Name: A-Z.
    NameAsc,
    /// Name: Z-A.
    NameDesc,
}

impl ProductSort {
    /// Every option, in the order the sort dropdown lists them.
    pub const ALL: [Self; 4] = [Self::PriceAsc, Self::PriceDesc, Self::NameAsc, Self::NameDesc];

    /// Parse a sort option from a form value.
    ///
    /// Accepts the canonical values as well as the `lowToHigh`, `highToLow`,
    /// `aToZ`, `zToA` values older links use. Returns `None` for an empty or
    /// unknown value, which means "leave the list as it is".
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "price_asc" | "lowToHigh" => Some(Self::PriceAsc),
            "price_desc" | "highToLow" => Some(Self::PriceDesc),
            "name_asc" | "aToZ" => Some(Self::NameAsc),
            "name_desc" | "zToA" => Some(Self::NameDesc),
            _ => None,
        }
    }

    /// Form value for this option.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
        }
    }

    /// Human-readable dropdown label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PriceAsc => "Price: Low to High",
            Self::PriceDesc => "Price: High to Low",
            Self::NameAsc => "Name: A-Z",
            Self::NameDesc => "Name: Z-A",
        }
    }

    /// Comparator implementing this order.
    #[must_use]
    pub fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::PriceAsc => a.price.cmp(&b.price),
            Self::PriceDesc => b.price.cmp(&a.price),
            Self::NameAsc => compare_names(&a.name, &b.name),
            Self::NameDesc => compare_names(&b.name, &a.name),
        }
    }
}

/// Case-insensitive name order, with the raw names breaking ties so the
/// order stays total ("apple" and "Apple" never compare equal).
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Reorder already-fetched products in place.
///
/// The sort is stable, so products that compare equal keep their fetched
/// order.
pub fn sort_products(products: &mut [Product], sort: ProductSort) {
    products.sort_by(|a, b| sort.compare(a, b));
}
