//! Totals

use rusty_money::{Money, MoneyError, iso::Currency};

use crate::money::zero;

/// The price breakdown persisted onto a cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    /// Sum of line totals
    pub subtotal: Money<'static, Currency>,

    /// Coupon discount
    pub discount: Money<'static, Currency>,

    /// Shipping charged
    pub shipping: Money<'static, Currency>,

    /// Tax charged
    pub tax: Money<'static, Currency>,

    /// `subtotal - discount + shipping + tax`
    pub grand_total: Money<'static, Currency>,
}

impl Totals {
    /// All-zero totals in the given currency.
    pub fn zero(currency: &'static Currency) -> Self {
        Self {
            subtotal: zero(currency),
            discount: zero(currency),
            shipping: zero(currency),
            tax: zero(currency),
            grand_total: zero(currency),
        }
    }

    /// Combine the components into a grand total.
    ///
    /// A discount larger than everything else yields a negative grand total;
    /// it is reported as-is rather than clamped.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] when the components are in different currencies.
    pub fn assemble(
        subtotal: Money<'static, Currency>,
        discount: Money<'static, Currency>,
        shipping: Money<'static, Currency>,
        tax: Money<'static, Currency>,
    ) -> Result<Self, MoneyError> {
        let grand_total = subtotal.sub(discount)?.add(shipping)?.add(tax)?;

        Ok(Self {
            subtotal,
            discount,
            shipping,
            tax,
            grand_total,
        })
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{EUR, USD};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn grand_total_subtracts_discount_and_adds_charges() -> TestResult {
        let totals = Totals::assemble(
            Money::from_minor(100_00, USD),
            Money::from_minor(10_00, USD),
            Money::from_minor(15_00, USD),
            Money::from_minor(8_25, USD),
        )?;

        assert_eq!(totals.grand_total, Money::from_minor(113_25, USD));

        Ok(())
    }

    #[test]
    fn negative_grand_total_is_not_clamped() -> TestResult {
        let totals = Totals::assemble(
            Money::from_minor(5_00, USD),
            Money::from_minor(20_00, USD),
            zero(USD),
            zero(USD),
        )?;

        assert_eq!(totals.grand_total, Money::from_minor(-15_00, USD));

        Ok(())
    }

    #[test]
    fn mixed_currencies_are_rejected() {
        let result = Totals::assemble(
            Money::from_minor(5_00, USD),
            zero(EUR),
            zero(USD),
            zero(USD),
        );

        assert!(result.is_err(), "expected a currency mismatch");
    }
}
