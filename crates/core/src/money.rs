//! Money

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Findable, Money, MoneyError, iso::Currency};

/// Decimal places every computed amount is rounded to.
pub const ROUNDING_DP: u32 = 2;

/// Zero in the given currency.
pub fn zero(currency: &'static Currency) -> Money<'static, Currency> {
    Money::from_minor(0, currency)
}

/// Round a decimal amount (major units) half away from zero and wrap it as money.
pub fn rounded(amount: Decimal, currency: &'static Currency) -> Money<'static, Currency> {
    Money::from_decimal(round_amount(amount), currency)
}

/// Round a decimal amount (major units) half away from zero.
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(ROUNDING_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Multiply a unit price by a quantity, checking for overflow in minor units.
pub fn times(
    price: &Money<'static, Currency>,
    quantity: u32,
) -> Option<Money<'static, Currency>> {
    price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .map(|minor| Money::from_minor(minor, price.currency()))
}

/// Look up an ISO currency by its alphabetic code.
///
/// # Errors
///
/// Returns [`MoneyError::InvalidCurrency`] for unknown codes.
pub fn find_currency(code: &str) -> Result<&'static Currency, MoneyError> {
    Currency::find(code).ok_or(MoneyError::InvalidCurrency)
}
