//! Monetary helpers.
//!
//! All amounts are [`Decimal`] values. Anything that leaves a calculator (a
//! result field or a trace value) goes through [`round_money`], and anything
//! rendered as text goes through [`format_money`].

use rust_decimal::{Decimal, RoundingStrategy};

/// One hundred, the divisor for percentage rates.
pub const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Zero with centavo scale, so it serializes as `"0.00"`.
pub const ZERO_MONEY: Decimal = Decimal::from_parts(0, 0, 0, false, 2);

/// Rounds an amount to centavos, midpoint away from zero.
///
/// The result always carries exactly two fractional digits, so whole
/// amounts serialize as `"160.00"` rather than `"160"`.
///
/// # Example
///
/// ```
/// use folha_engine::models::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("112.9212").unwrap()), Decimal::from_str("112.92").unwrap());
/// assert_eq!(round_money(Decimal::from_str("0.125").unwrap()), Decimal::from_str("0.13").unwrap());
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Formats an amount with exactly two fractional digits.
///
/// # Example
///
/// ```
/// use folha_engine::models::format_money;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_money(Decimal::from(160)), "160.00");
/// assert_eq!(format_money(Decimal::new(10590, 2)), "105.90");
/// ```
pub fn format_money(amount: Decimal) -> String {
    round_money(amount).to_string()
}

/// Formats a percentage rate with two fractional digits and a `%` suffix.
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", format_money(rate))
}

/// Applies a percentage rate to an amount, without rounding.
pub fn percent_of(amount: Decimal, rate: Decimal) -> Decimal {
    amount * rate / HUNDRED
}
