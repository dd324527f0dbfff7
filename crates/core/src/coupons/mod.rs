//! Coupons
//!
//! Validation runs a fixed sequence of checks and stops at the first failure:
//! existence, activity window and global usage, minimum order, per-customer
//! usage, then conditions. A coupon that passes is priced against the cart
//! and the discount is capped by the coupon maximum and the cart subtotal.

use std::{fmt, str::FromStr};

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{cart::Cart, money::rounded, uuids::TypedUuid};

pub mod conditions;

pub use conditions::{Condition, ConditionEvaluator, TreeEvaluator};

/// Coupon UUID
pub type CouponUuid = TypedUuid<Coupon>;

/// Reasons a coupon cannot be applied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CouponRejection {
    /// No coupon with this code exists.
    #[error("coupon code {0} was not found")]
    NotFound(String),

    /// The coupon is inactive, outside its validity window or used up.
    #[error("coupon {0} is expired or inactive")]
    ExpiredOrInactive(String),

    /// The cart subtotal is below the coupon minimum.
    #[error("a minimum order of {minimum:.2} {currency} is required for this coupon")]
    MinimumOrderNotMet {
        /// Required subtotal in major units
        minimum: Decimal,

        /// Cart currency code
        currency: &'static str,
    },

    /// The customer has used the coupon as often as allowed.
    #[error("coupon {code} may only be used {limit} time(s) per customer")]
    PerCustomerLimitReached {
        /// Coupon code
        code: String,

        /// Uses allowed per customer
        limit: u32,
    },

    /// The cart does not satisfy the coupon's conditions.
    #[error("the cart does not meet the conditions for coupon {0}")]
    ConditionsNotMet(String),
}

/// Raised when a stored discount type is not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown discount type: {0}")]
pub struct UnknownDiscountType(pub String);

/// How a coupon's `discount_amount` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscountType {
    /// Percentage points off the subtotal
    Percentage,

    /// Fixed amount off the cart
    FixedCart,

    /// Fixed amount off every unit in the cart
    FixedProduct,
}

impl DiscountType {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::FixedCart => "fixed_cart",
            Self::FixedProduct => "fixed_product",
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountType {
    type Err = UnknownDiscountType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(Self::Percentage),
            "fixed_cart" => Ok(Self::FixedCart),
            "fixed_product" => Ok(Self::FixedProduct),
            other => Err(UnknownDiscountType(other.to_string())),
        }
    }
}

/// A discount code.
///
/// Amounts are decimal major units in the currency of the cart they are
/// applied to.
#[derive(Debug, Clone, PartialEq)]
pub struct Coupon {
    /// Coupon identifier
    pub uuid: CouponUuid,

    /// Code customers enter
    pub code: String,

    /// How `discount_amount` is applied
    pub discount_type: DiscountType,

    /// Percentage points or fixed amount
    pub discount_amount: Decimal,

    /// Total uses allowed
    pub usage_limit: Option<u32>,

    /// Uses allowed per customer
    pub usage_per_customer: Option<u32>,

    /// Uses so far
    pub times_used: u32,

    /// Start of the validity window
    pub valid_from: Option<Timestamp>,

    /// End of the validity window
    pub valid_to: Option<Timestamp>,

    /// Smallest subtotal the coupon applies to
    pub minimum_order_amount: Option<Decimal>,

    /// Largest discount the coupon grants
    pub maximum_discount_amount: Option<Decimal>,

    /// Whether the coupon waives shipping
    pub free_shipping: bool,

    /// Whether the coupon can be used
    pub is_active: bool,

    /// Cart conditions
    pub conditions: Option<Condition>,
}

impl Coupon {
    /// Create an active, unlimited coupon.
    pub fn new(code: &str, discount_type: DiscountType, discount_amount: Decimal) -> Self {
        Self {
            uuid: CouponUuid::new(),
            code: code.to_string(),
            discount_type,
            discount_amount,
            usage_limit: None,
            usage_per_customer: None,
            times_used: 0,
            valid_from: None,
            valid_to: None,
            minimum_order_amount: None,
            maximum_discount_amount: None,
            free_shipping: false,
            is_active: true,
            conditions: None,
        }
    }

    /// Whether the coupon is active, within its window and not used up at `now`.
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        self.is_active
            && self.valid_from.is_none_or(|from| from <= now)
            && self.valid_to.is_none_or(|to| now <= to)
            && self.usage_limit.is_none_or(|limit| self.times_used < limit)
    }

    /// Discount for `cart`, capped by the coupon maximum and the subtotal.
    pub fn discount_for(&self, cart: &Cart) -> Money<'static, Currency> {
        let subtotal = *cart.totals().subtotal.amount();

        let raw = match self.discount_type {
            DiscountType::Percentage => {
                Percentage::from(self.discount_amount / Decimal::ONE_HUNDRED) * subtotal
            }
            DiscountType::FixedCart => self.discount_amount,
            DiscountType::FixedProduct => {
                self.discount_amount * Decimal::from(cart.total_quantity())
            }
        };

        let capped = self
            .maximum_discount_amount
            .map_or(raw, |maximum| raw.min(maximum))
            .min(subtotal)
            .max(Decimal::ZERO);

        rounded(capped, cart.currency())
    }
}

/// Previous use of a coupon by the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerUsage {
    /// Anonymous shopper without order history.
    Guest,

    /// Orders placed by the customer with this coupon.
    Orders(u64),
}

/// A coupon that passed validation and what it is worth.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponValidation {
    /// The validated coupon
    pub coupon: Coupon,

    /// Discount for the cart
    pub discount: Money<'static, Currency>,

    /// Whether shipping is waived
    pub free_shipping: bool,
}

/// Validates coupons against carts.
#[derive(Debug, Clone, Default)]
pub struct CouponValidator<E = TreeEvaluator> {
    evaluator: E,
}

impl<E: ConditionEvaluator> CouponValidator<E> {
    /// Create a validator with a custom condition evaluator.
    pub fn new(evaluator: E) -> Self {
        Self { evaluator }
    }

    /// Validate `coupon` (looked up by `code`) for `cart` at `now`.
    ///
    /// # Errors
    ///
    /// Returns the first [`CouponRejection`] the coupon fails.
    pub fn validate(
        &self,
        code: &str,
        coupon: Option<&Coupon>,
        cart: &Cart,
        usage: CustomerUsage,
        now: Timestamp,
    ) -> Result<CouponValidation, CouponRejection> {
        let coupon = coupon.ok_or_else(|| CouponRejection::NotFound(code.to_string()))?;

        if !coupon.is_valid_at(now) {
            return Err(CouponRejection::ExpiredOrInactive(coupon.code.clone()));
        }

        if let Some(minimum) = coupon.minimum_order_amount
            && *cart.totals().subtotal.amount() < minimum
        {
            return Err(CouponRejection::MinimumOrderNotMet {
                minimum,
                currency: cart.currency().iso_alpha_code,
            });
        }

        if let (Some(limit), CustomerUsage::Orders(count)) = (coupon.usage_per_customer, usage)
            && count >= u64::from(limit)
        {
            return Err(CouponRejection::PerCustomerLimitReached {
                code: coupon.code.clone(),
                limit,
            });
        }

        if let Some(condition) = &coupon.conditions
            && !self.evaluator.evaluate(condition, cart)
        {
            return Err(CouponRejection::ConditionsNotMet(coupon.code.clone()));
        }

        Ok(CouponValidation {
            coupon: coupon.clone(),
            discount: coupon.discount_for(cart),
            free_shipping: coupon.free_shipping,
        })
    }
}
