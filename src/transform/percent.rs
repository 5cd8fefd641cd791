//! Percent change with a defined zero-base fallback.

use rust_decimal::Decimal;

/// `(new - old) / old * 100`, or `None` when `old` is zero.
pub fn percent_change(old: Decimal, new: Decimal) -> Option<Decimal> {
    if old.is_zero() {
        return None;
    }
    (new - old)
        .checked_div(old)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}

/// Render a change for display: `+1.23%`, `-4.50%` or `N/A`.
pub fn format_change(change: Option<Decimal>) -> String {
    match change {
        Some(value) if value.is_sign_negative() && !value.is_zero() => {
            format!("{:.2}%", value.round_dp(2))
        }
        Some(value) => format!("+{:.2}%", value.round_dp(2)),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(dec!(100), dec!(110)), Some(dec!(10)));
        assert_eq!(percent_change(dec!(100), dec!(90)), Some(dec!(-10)));
        assert_eq!(percent_change(dec!(100), dec!(100)), Some(Decimal::ZERO));
    }

    #[test]
    fn test_zero_base_has_no_change() {
        assert_eq!(percent_change(Decimal::ZERO, dec!(10)), None);
        assert_eq!(format_change(percent_change(Decimal::ZERO, dec!(10))), "N/A");
    }

    #[test]
    fn test_format_change() {
        assert_eq!(format_change(Some(dec!(10))), "+10.00%");
        assert_eq!(format_change(Some(dec!(-4.5))), "-4.50%");
        assert_eq!(format_change(Some(dec!(1.23456))), "+1.23%");
    }
}
