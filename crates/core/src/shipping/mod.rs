//! Shipping
//!
//! Prices a cart against each active shipping method's bracketed rate table.
//! For every method the most specific matching rate wins; methods without a
//! matching rate are left out of the quote.

use std::cmp::Reverse;

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{address::Address, brackets::Bracket, cart::Cart, uuids::TypedUuid};

pub mod routes;

/// Shipping Method UUID
pub type ShippingMethodUuid = TypedUuid<ShippingMethod>;

/// Shipping Rate UUID
pub type ShippingRateUuid = TypedUuid<ShippingRate>;

/// Errors raised when choosing a shipping method.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShippingError {
    /// The method is not offered for this cart and address.
    #[error("shipping method {0} is not available for this cart and address")]
    MethodUnavailable(ShippingMethodUuid),

    /// A shipping address must be set before choosing a method.
    #[error("a shipping address is required")]
    AddressRequired,
}

/// Errors raised when a rate table is misconfigured.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateConfigError {
    /// Two rates of one method can match the same cart with no way to order them.
    #[error("shipping rates {first} and {second} of method {method} overlap with equal specificity and position")]
    AmbiguousRates {
        /// Method both rates belong to
        method: ShippingMethodUuid,

        /// Rate already in the table
        first: ShippingRateUuid,

        /// Conflicting rate
        second: ShippingRateUuid,
    },
}

/// A carrier service customers can choose.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingMethod {
    /// Method identifier
    pub uuid: ShippingMethodUuid,

    /// Short code, unique per tenant
    pub code: String,

    /// Display name
    pub name: String,

    /// Carrier name
    pub carrier: Option<String>,

    /// Whether the method is offered
    pub is_active: bool,

    /// Display order
    pub sort_order: i32,

    /// Display-only settings such as estimated delivery days
    pub config: FxHashMap<String, String>,
}

impl ShippingMethod {
    /// Create an active method with sort order zero.
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            uuid: ShippingMethodUuid::new(),
            code: code.to_string(),
            name: name.to_string(),
            carrier: None,
            is_active: true,
            sort_order: 0,
            config: FxHashMap::default(),
        }
    }
}

/// One row of a method's rate table.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingRate {
    /// Rate identifier
    pub uuid: ShippingRateUuid,

    /// Method this rate prices
    pub method_uuid: ShippingMethodUuid,

    /// Destination country code
    pub country_code: String,

    /// Destination state code, `None` for any
    pub state_code: Option<String>,

    /// Destination postal code, `None` for any
    pub zip_code: Option<String>,

    /// Cart weight bracket in kilograms
    pub weight: Bracket,

    /// Cart subtotal bracket in major units
    pub price: Bracket,

    /// Tie-break between equally specific rows, lowest first
    pub position: i32,

    /// Amount charged
    pub amount: Money<'static, Currency>,
}

impl ShippingRate {
    /// Create an unbracketed country-wide rate.
    pub fn new(
        method_uuid: ShippingMethodUuid,
        country_code: &str,
        amount: Money<'static, Currency>,
    ) -> Self {
        Self {
            uuid: ShippingRateUuid::new(),
            method_uuid,
            country_code: country_code.trim().to_ascii_uppercase(),
            state_code: None,
            zip_code: None,
            weight: Bracket::UNBOUNDED,
            price: Bracket::UNBOUNDED,
            position: 0,
            amount,
        }
    }

    /// Trim the destination codes and upper-case country and state. Blank
    /// state or zip codes become `None`.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.country_code = self.country_code.trim().to_ascii_uppercase();
        self.state_code = non_blank(self.state_code.as_deref()).map(str::to_ascii_uppercase);
        self.zip_code = non_blank(self.zip_code.as_deref()).map(str::to_string);
        self
    }

    /// Number of constraints beyond the country; more constrained rows win.
    pub fn specificity(&self) -> u8 {
        u8::from(non_blank(self.state_code.as_deref()).is_some())
            + u8::from(non_blank(self.zip_code.as_deref()).is_some())
            + self.weight.bounds_count()
            + self.price.bounds_count()
    }

    /// Whether the rate applies to a cart of this weight and subtotal shipped to `address`.
    pub fn matches(&self, address: &Address, cart: &CartMeasure) -> bool {
        self.amount.currency() == cart.currency
            && self.country_code.eq_ignore_ascii_case(address.country())
            && optional_eq(self.state_code.as_deref(), address.state(), true)
            && optional_eq(self.zip_code.as_deref(), address.postal_code(), false)
            && self.weight.contains(cart.weight)
            && self.price.contains(cart.price)
    }

    /// Whether some address, weight and price could match both rates.
    fn overlaps(&self, other: &Self) -> bool {
        self.country_code.eq_ignore_ascii_case(&other.country_code)
            && compatible(self.state_code.as_deref(), other.state_code.as_deref(), true)
            && compatible(self.zip_code.as_deref(), other.zip_code.as_deref(), false)
            && self.weight.overlaps(&other.weight)
            && self.price.overlaps(&other.price)
    }

    fn precedence(&self) -> (Reverse<u8>, i32, ShippingRateUuid) {
        (Reverse(self.specificity()), self.position, self.uuid)
    }
}

fn non_blank(code: Option<&str>) -> Option<&str> {
    code.map(str::trim).filter(|code| !code.is_empty())
}

fn codes_eq(left: &str, right: &str, ignore_case: bool) -> bool {
    let (left, right) = (left.trim(), right.trim());

    if ignore_case {
        left.eq_ignore_ascii_case(right)
    } else {
        left == right
    }
}

fn optional_eq(rule: Option<&str>, value: Option<&str>, ignore_case: bool) -> bool {
    match (non_blank(rule), value) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(rule), Some(value)) => codes_eq(rule, value, ignore_case),
    }
}

fn compatible(left: Option<&str>, right: Option<&str>, ignore_case: bool) -> bool {
    match (non_blank(left), non_blank(right)) {
        (Some(left), Some(right)) => codes_eq(left, right, ignore_case),
        _ => true,
    }
}

/// The cart figures rate brackets are compared against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartMeasure {
    /// Total weight in kilograms
    pub weight: Decimal,

    /// Subtotal in major units
    pub price: Decimal,

    /// Cart currency
    pub currency: &'static Currency,
}

impl From<&Cart> for CartMeasure {
    fn from(cart: &Cart) -> Self {
        Self {
            weight: cart.weight(),
            price: *cart.totals().subtotal.amount(),
            currency: cart.currency(),
        }
    }
}

/// A priced shipping choice.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingOption {
    /// Method identifier
    pub method_uuid: ShippingMethodUuid,

    /// Method code
    pub code: String,

    /// Method name
    pub name: String,

    /// Carrier name
    pub carrier: Option<String>,

    /// Quoted price
    pub price: Money<'static, Currency>,
}

impl ShippingOption {
    pub(crate) fn for_method(method: &ShippingMethod, price: Money<'static, Currency>) -> Self {
        Self {
            method_uuid: method.uuid,
            code: method.code.clone(),
            name: method.name.clone(),
            carrier: method.carrier.clone(),
            price,
        }
    }
}

/// Active methods in display order.
pub(crate) fn active_methods(methods: &[ShippingMethod]) -> Vec<&ShippingMethod> {
    let mut active: Vec<&ShippingMethod> =
        methods.iter().filter(|method| method.is_active).collect();

    active.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.code.cmp(&b.code))
    });

    active
}

/// Pick the winning rate among those that match.
pub fn best_rate<'a>(
    rates: impl IntoIterator<Item = &'a ShippingRate>,
    address: &Address,
    cart: &CartMeasure,
) -> Option<&'a ShippingRate> {
    rates
        .into_iter()
        .filter(|rate| rate.matches(address, cart))
        .min_by_key(|rate| rate.precedence())
}

/// Quote every active method for `cart` shipped to `address`.
///
/// Options follow method display order. Methods without a matching rate are
/// omitted.
pub fn quote(
    methods: &[ShippingMethod],
    rates: &[ShippingRate],
    cart: &Cart,
    address: &Address,
) -> Vec<ShippingOption> {
    let measure = CartMeasure::from(cart);

    active_methods(methods)
        .into_iter()
        .filter_map(|method| {
            let method_rates = rates.iter().filter(|rate| rate.method_uuid == method.uuid);

            best_rate(method_rates, address, &measure)
                .map(|rate| ShippingOption::for_method(method, rate.amount))
        })
        .collect()
}

/// Find the option for a chosen method.
///
/// # Errors
///
/// Returns [`ShippingError::MethodUnavailable`] when the method was not quoted.
pub fn select(
    options: &[ShippingOption],
    method: ShippingMethodUuid,
) -> Result<&ShippingOption, ShippingError> {
    options
        .iter()
        .find(|option| option.method_uuid == method)
        .ok_or(ShippingError::MethodUnavailable(method))
}

/// Check that no two rates of a method are ambiguous.
///
/// # Errors
///
/// Returns [`RateConfigError::AmbiguousRates`] for the first ambiguous pair.
pub fn validate_rates(rates: &[ShippingRate]) -> Result<(), RateConfigError> {
    for (idx, rate) in rates.iter().enumerate() {
        validate_rate(rates.get(..idx).unwrap_or_default(), rate)?;
    }

    Ok(())
}

/// Check a new rate against an existing table before it is stored.
///
/// # Errors
///
/// Returns [`RateConfigError::AmbiguousRates`] when `candidate` conflicts with a row.
pub fn validate_rate(
    existing: &[ShippingRate],
    candidate: &ShippingRate,
) -> Result<(), RateConfigError> {
    let conflict = existing.iter().find(|rate| {
        rate.uuid != candidate.uuid
            && rate.method_uuid == candidate.method_uuid
            && rate.position == candidate.position
            && rate.specificity() == candidate.specificity()
            && rate.overlaps(candidate)
    });

    match conflict {
        Some(rate) => Err(RateConfigError::AmbiguousRates {
            method: candidate.method_uuid,
            first: rate.uuid,
            second: candidate.uuid,
        }),
        None => Ok(()),
    }
}
