//! Coupon Fixtures

use jiff::Timestamp;
use serde::Deserialize;

use crate::{
    coupons::{Condition, Coupon, CouponUuid, DiscountType},
    fixtures::{Fixture, FixtureError, parse_decimal},
};

/// Wrapper for coupons in YAML
#[derive(Debug, Deserialize)]
pub struct CouponsFixture {
    /// Coupons
    pub coupons: Vec<CouponFixture>,
}

/// Coupon Fixture
#[derive(Debug, Deserialize)]
pub struct CouponFixture {
    /// Coupon code
    pub code: String,

    /// `percentage`, `fixed_cart` or `fixed_product`
    pub discount_type: String,

    /// Percentage points or fixed amount (e.g., "10")
    pub discount_amount: String,

    /// Total uses allowed
    pub usage_limit: Option<u32>,

    /// Uses allowed per customer
    pub usage_per_customer: Option<u32>,

    /// Uses so far
    #[serde(default)]
    pub times_used: u32,

    /// RFC 3339 start of the validity window
    pub valid_from: Option<String>,

    /// RFC 3339 end of the validity window
    pub valid_to: Option<String>,

    /// Smallest subtotal
    pub minimum_order_amount: Option<String>,

    /// Largest discount
    pub maximum_discount_amount: Option<String>,

    /// Whether shipping is waived
    #[serde(default)]
    pub free_shipping: bool,

    /// Whether the coupon can be used
    #[serde(default = "active")]
    pub is_active: bool,

    /// Condition tree
    pub conditions: Option<Condition>,
}

fn active() -> bool {
    true
}

fn parse_timestamp(value: Option<&str>) -> Result<Option<Timestamp>, FixtureError> {
    value
        .map(|raw| {
            raw.parse::<Timestamp>()
                .map_err(|_err| FixtureError::InvalidTimestamp(raw.to_string()))
        })
        .transpose()
}

impl Fixture {
    /// Load `fixtures/coupons/{name}.yml`.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the file cannot be read or a value is malformed.
    pub fn load_coupons(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CouponsFixture = self.read("coupons", name)?;

        for coupon in fixture.coupons {
            let discount_type = coupon
                .discount_type
                .parse::<DiscountType>()
                .map_err(|err| FixtureError::UnknownDiscountType(err.0))?;

            let discount_amount = parse_decimal(Some(&coupon.discount_amount))?
                .ok_or_else(|| FixtureError::InvalidDecimal(coupon.discount_amount.clone()))?;

            let loaded = Coupon {
                uuid: CouponUuid::new(),
                code: coupon.code.clone(),
                discount_type,
                discount_amount,
                usage_limit: coupon.usage_limit,
                usage_per_customer: coupon.usage_per_customer,
                times_used: coupon.times_used,
                valid_from: parse_timestamp(coupon.valid_from.as_deref())?,
                valid_to: parse_timestamp(coupon.valid_to.as_deref())?,
                minimum_order_amount: parse_decimal(coupon.minimum_order_amount.as_deref())?,
                maximum_discount_amount: parse_decimal(coupon.maximum_discount_amount.as_deref())?,
                free_shipping: coupon.free_shipping,
                is_active: coupon.is_active,
                conditions: coupon.conditions,
            };

            self.coupons.insert(coupon.code, loaded);
        }

        Ok(self)
    }
}
