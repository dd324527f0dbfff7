//! Fixtures
//!
//! YAML scenario data for tests: products, carts, shipping tables, tax rules
//! and coupons. Every entity is referred to by a short key in the YAML, and
//! keys are resolved to UUIDs as files are loaded, so files may be loaded in
//! any order.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError, CartUuid, CustomOptions},
    coupons::Coupon,
    money::find_currency,
    products::Product,
    shipping::{ShippingMethod, ShippingRate},
    tax::{TaxClass, TaxClassKind, TaxClassUuid, TaxRate, TaxRule, TaxRuleSet},
};

pub mod carts;
pub mod coupons;
pub mod products;
pub mod shipping;
pub mod tax;

/// Errors raised while loading fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The fixture file could not be read.
    #[error("failed to read fixture {}: {source}", path.display())]
    Io {
        /// File path
        path: PathBuf,

        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The fixture file is not valid YAML for its shape.
    #[error("failed to parse fixture: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A price string is malformed.
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// A decimal string is malformed.
    #[error("invalid decimal: {0}")]
    InvalidDecimal(String),

    /// A currency code is unknown.
    #[error("unknown currency: {0}")]
    UnknownCurrency(String),

    /// A discount type is unknown.
    #[error("unknown discount type: {0}")]
    UnknownDiscountType(String),

    /// A timestamp is malformed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A referenced product key was not loaded.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// A referenced shipping method key was not loaded.
    #[error("shipping method not found: {0}")]
    MethodNotFound(String),

    /// A referenced tax rate key was not loaded.
    #[error("tax rate not found: {0}")]
    RateNotFound(String),

    /// A referenced coupon code was not loaded.
    #[error("coupon not found: {0}")]
    CouponNotFound(String),

    /// Building a cart from fixture lines failed.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Loaded fixture data, addressed by YAML key.
#[derive(Debug)]
pub struct Fixture {
    base_path: PathBuf,
    currency: Option<&'static Currency>,
    products: FxHashMap<String, Product>,
    tax_classes: FxHashMap<String, TaxClass>,
    tax_rates: FxHashMap<String, TaxRate>,
    tax_rules: Vec<TaxRule>,
    methods: FxHashMap<String, ShippingMethod>,
    rates: Vec<ShippingRate>,
    coupons: FxHashMap<String, Coupon>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create an empty fixture reading from this crate's `fixtures/` directory.
    pub fn new() -> Self {
        Self::with_base_path(Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures"))
    }

    /// Create an empty fixture reading from `base_path`.
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            currency: None,
            products: FxHashMap::default(),
            tax_classes: FxHashMap::default(),
            tax_rates: FxHashMap::default(),
            tax_rules: Vec::new(),
            methods: FxHashMap::default(),
            rates: Vec::new(),
            coupons: FxHashMap::default(),
        }
    }

    /// Product by key.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::ProductNotFound`] for unknown keys.
    pub fn product(&self, key: &str) -> Result<&Product, FixtureError> {
        self.products
            .get(key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Shipping method by key.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::MethodNotFound`] for unknown keys.
    pub fn method(&self, key: &str) -> Result<&ShippingMethod, FixtureError> {
        self.methods
            .get(key)
            .ok_or_else(|| FixtureError::MethodNotFound(key.to_string()))
    }

    /// All loaded shipping methods.
    pub fn methods(&self) -> Vec<ShippingMethod> {
        self.methods.values().cloned().collect()
    }

    /// All loaded shipping rates.
    pub fn rates(&self) -> &[ShippingRate] {
        &self.rates
    }

    /// Tax class UUID by key, creating a product class for unseen keys.
    pub fn tax_class(&mut self, key: &str) -> TaxClassUuid {
        self.tax_class_of_kind(key, TaxClassKind::Product)
    }

    /// Tax class UUID by key, creating one of `kind` for unseen keys.
    pub fn tax_class_of_kind(&mut self, key: &str, kind: TaxClassKind) -> TaxClassUuid {
        self.tax_classes
            .entry(key.to_string())
            .or_insert_with(|| TaxClass {
                uuid: TaxClassUuid::new(),
                name: key.to_string(),
                kind,
            })
            .uuid
    }

    /// The loaded tax rules with their rates.
    pub fn tax_rules(&self) -> TaxRuleSet {
        TaxRuleSet::new(self.tax_rules.clone(), self.tax_rates.values().cloned())
    }

    /// Coupon by code.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::CouponNotFound`] for unknown codes.
    pub fn coupon(&self, code: &str) -> Result<&Coupon, FixtureError> {
        self.coupons
            .get(code)
            .ok_or_else(|| FixtureError::CouponNotFound(code.to_string()))
    }

    /// Build a cart from `(product key, quantity)` lines.
    ///
    /// The cart currency is the currency of the loaded product prices.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] for unknown products or rejected lines.
    pub fn cart(&self, lines: &[(&str, u32)]) -> Result<Cart, FixtureError> {
        let currency = self
            .currency
            .ok_or_else(|| FixtureError::UnknownCurrency("no products loaded".to_string()))?;

        let mut cart = Cart::new(CartUuid::new(), currency);

        for (key, quantity) in lines {
            cart.add_item(self.product(key)?, *quantity, CustomOptions::default())?;
        }

        Ok(cart)
    }

    fn read<T: DeserializeOwned>(&self, kind: &str, name: &str) -> Result<T, FixtureError> {
        let path = self.base_path.join(kind).join(format!("{name}.yml"));

        let contents = fs::read_to_string(&path).map_err(|source| FixtureError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(serde_norway::from_str(&contents)?)
    }
}

/// Parse a price string (e.g. `"12.50 USD"`) into a decimal amount and currency.
///
/// # Errors
///
/// Returns an error if the string is not `AMOUNT CURRENCY`, the amount is not
/// a decimal, or the currency code is unknown.
pub fn parse_price(s: &str) -> Result<(Decimal, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency =
        find_currency(code).map_err(|_err| FixtureError::UnknownCurrency(code.to_string()))?;

    Ok((amount, currency))
}

/// Convert a decimal amount to minor units.
///
/// # Errors
///
/// Returns [`FixtureError::InvalidPrice`] when the amount does not fit.
pub fn to_minor_units(amount: Decimal) -> Result<i64, FixtureError> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(amount.to_string()))
}

/// Parse an optional decimal string.
///
/// # Errors
///
/// Returns [`FixtureError::InvalidDecimal`] for malformed values.
pub fn parse_decimal(value: Option<&str>) -> Result<Option<Decimal>, FixtureError> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<Decimal>()
                .map_err(|_err| FixtureError::InvalidDecimal(raw.to_string()))
        })
        .transpose()
}
