//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use rust_decimal::{Decimal, RoundingStrategy};

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats an amount as dollars with two decimals.
///
/// Usage in templates: `{{ product.price|money }}`
#[askama::filter_fn]
pub fn money(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_money(&value.to_string()))
}

/// `$x.xx` for anything that parses as a decimal, `$` + raw text otherwise.
pub(crate) fn format_money(raw: &str) -> String {
    raw.trim().parse::<Decimal>().map_or_else(
        |_| format!("${raw}"),
        |amount| {
            let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            format!("${rounded:.2}")
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money("35"), "$35.00");
        assert_eq!(format_money("4.5"), "$4.50");
        assert_eq!(format_money("19.995"), "$20.00");
        assert_eq!(format_money("n/a"), "$n/a");
    }
}
