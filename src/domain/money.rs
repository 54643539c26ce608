use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Largest single charge accepted, in cents (R10,000).
pub const MAX_CHARGE_CENTS: i64 = 1_000_000;

/// [`MAX_CHARGE_CENTS`] in rand. No single money field may exceed it.
pub fn max_charge() -> Decimal {
    Decimal::new(MAX_CHARGE_CENTS, 2)
}

/// `Some(amount)` when it lies in `0..=max_charge()`.
pub fn bounded(amount: Decimal) -> Option<Decimal> {
    (Decimal::ZERO..=max_charge()).contains(&amount).then_some(amount)
}

/// Converts a rand amount to whole cents, rounding half away from zero.
///
/// `None` when the amount does not fit.
pub fn to_cents(amount: Decimal) -> Option<i64> {
    amount.checked_mul(Decimal::ONE_HUNDRED)?.round().to_i64()
}

/// Formats an amount the way receipts show it, e.g. `R349.00`.
pub fn format_rand(amount: Decimal) -> String {
    format!("R{:.2}", amount.round_dp(2))
}
