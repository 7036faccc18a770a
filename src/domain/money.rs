//! Conversions between decimal amounts and the integer cents stored in the
//! database.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fraction digits kept for every monetary amount.
pub const MONEY_SCALE: u32 = 2;

/// Convert stored cents into a decimal amount with two fraction digits.
pub fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, MONEY_SCALE)
}

/// Convert a decimal amount into cents, rounding half away from zero.
///
/// Returns `None` when the amount does not fit into an `i64`.
pub fn decimal_to_cents(amount: Decimal) -> Option<i64> {
    let rounded = amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.checked_mul(Decimal::ONE_HUNDRED)?.to_i64()
}

/// Smallest number of cents that is greater than or equal to `amount`.
pub fn lower_bound_cents(amount: Decimal) -> Option<i64> {
    amount.checked_mul(Decimal::ONE_HUNDRED)?.ceil().to_i64()
}

/// Largest number of cents that is less than or equal to `amount`.
pub fn upper_bound_cents(amount: Decimal) -> Option<i64> {
    amount.checked_mul(Decimal::ONE_HUNDRED)?.floor().to_i64()
}
