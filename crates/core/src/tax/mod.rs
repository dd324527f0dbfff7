//! Tax
//!
//! Cascading tax rules. Each cart line with a product tax class walks the
//! rules for that class in `(priority, position)` order. Every rule whose
//! rate applies to the destination adds a tax line, and a rule flagged
//! `stop_rules_processing` ends the walk for that line only.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    address::Address,
    cart::{Cart, CartItemUuid},
    money::{round_amount, rounded, zero},
    uuids::TypedUuid,
};

/// Tax Class UUID
pub type TaxClassUuid = TypedUuid<TaxClass>;

/// Tax Rate UUID
pub type TaxRateUuid = TypedUuid<TaxRate>;

/// Tax Rule UUID
pub type TaxRuleUuid = TypedUuid<TaxRule>;

/// Errors raised while calculating tax.
#[derive(Debug, Error)]
pub enum TaxError {
    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// What a tax class is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaxClassKind {
    /// Attached to products
    Product,

    /// Attached to customers
    Customer,
}

impl TaxClassKind {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Customer => "customer",
        }
    }
}

/// A named classification used to select tax rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxClass {
    /// Class identifier
    pub uuid: TaxClassUuid,

    /// Display name
    pub name: String,

    /// What the class is attached to
    pub kind: TaxClassKind,
}

/// How a tax rate constrains the destination postal code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZipMatch {
    /// Any postal code, or none.
    Any,

    /// This postal code exactly.
    Exact(String),

    /// Numeric postal codes within `from..=to`.
    Range {
        /// Lowest matching code
        from: u64,

        /// Highest matching code
        to: u64,
    },
}

impl ZipMatch {
    /// Whether `postal_code` satisfies the constraint.
    ///
    /// Range checks fail for missing or non-numeric codes.
    pub fn matches(&self, postal_code: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(zip) => postal_code.is_some_and(|code| code.trim() == zip),
            Self::Range { from, to } => postal_code
                .and_then(|code| code.trim().parse::<u64>().ok())
                .is_some_and(|code| (*from..=*to).contains(&code)),
        }
    }
}

/// A percentage charged in a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxRate {
    /// Rate identifier
    pub uuid: TaxRateUuid,

    /// Country code
    pub country: String,

    /// State code, `None` for the whole country
    pub state: Option<String>,

    /// Postal code constraint
    pub zip: ZipMatch,

    /// Rate in percentage points, `8.25` for 8.25%
    pub percentage: Decimal,

    /// Display title
    pub title: String,
}

impl TaxRate {
    /// Create a country-wide rate.
    pub fn new(country: &str, percentage: Decimal, title: &str) -> Self {
        Self {
            uuid: TaxRateUuid::new(),
            country: country.trim().to_ascii_uppercase(),
            state: None,
            zip: ZipMatch::Any,
            percentage,
            title: title.to_string(),
        }
    }

    /// Whether the rate applies to `address`.
    pub fn applies_to(&self, address: &Address) -> bool {
        self.country.eq_ignore_ascii_case(address.country())
            && self.state.as_deref().is_none_or(|state| {
                address
                    .state()
                    .is_some_and(|dest| dest.eq_ignore_ascii_case(state))
            })
            && self.zip.matches(address.postal_code())
    }

    /// Tax on `base` at this rate, unrounded.
    pub fn tax_on(&self, base: Decimal) -> Decimal {
        Percentage::from(self.percentage / Decimal::ONE_HUNDRED) * base
    }
}

/// Links a rate to a product tax class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxRule {
    /// Rule identifier
    pub uuid: TaxRuleUuid,

    /// Rate charged when the rule applies
    pub rate_uuid: TaxRateUuid,

    /// Product class the rule is for
    pub product_class: TaxClassUuid,

    /// Customer class the rule is limited to
    pub customer_class: Option<TaxClassUuid>,

    /// Evaluation order, lowest first
    pub priority: i32,

    /// Evaluation order within a priority, lowest first
    pub position: i32,

    /// Tax the whole cart subtotal instead of the line
    pub calculate_subtotal: bool,

    /// Stop evaluating further rules for the line once this one applies
    pub stop_rules_processing: bool,
}

impl TaxRule {
    /// Create a line-based rule at priority and position zero.
    pub fn new(product_class: TaxClassUuid, rate_uuid: TaxRateUuid) -> Self {
        Self {
            uuid: TaxRuleUuid::new(),
            rate_uuid,
            product_class,
            customer_class: None,
            priority: 0,
            position: 0,
            calculate_subtotal: false,
            stop_rules_processing: false,
        }
    }

    /// Rules bound to a customer class skip shoppers without that class.
    fn admits(&self, customer_class: Option<TaxClassUuid>) -> bool {
        match (self.customer_class, customer_class) {
            (None, _) => true,
            (Some(required), Some(actual)) => required == actual,
            (Some(_), None) => false,
        }
    }
}

/// Rules grouped by product class in evaluation order, with their rates.
#[derive(Debug, Clone, Default)]
pub struct TaxRuleSet {
    rules: FxHashMap<TaxClassUuid, Vec<TaxRule>>,
    rates: FxHashMap<TaxRateUuid, TaxRate>,
}

impl TaxRuleSet {
    /// Build a rule set. Rules are ordered by priority, position then UUID.
    pub fn new(
        rules: impl IntoIterator<Item = TaxRule>,
        rates: impl IntoIterator<Item = TaxRate>,
    ) -> Self {
        let mut grouped: FxHashMap<TaxClassUuid, Vec<TaxRule>> = FxHashMap::default();

        for rule in rules {
            grouped.entry(rule.product_class).or_default().push(rule);
        }

        for class_rules in grouped.values_mut() {
            class_rules.sort_by_key(|rule| (rule.priority, rule.position, rule.uuid));
        }

        Self {
            rules: grouped,
            rates: rates.into_iter().map(|rate| (rate.uuid, rate)).collect(),
        }
    }

    /// Rules for a product class in evaluation order.
    pub fn rules_for(&self, class: TaxClassUuid) -> &[TaxRule] {
        self.rules.get(&class).map_or(&[], Vec::as_slice)
    }

    /// Look up a rate.
    pub fn rate(&self, uuid: TaxRateUuid) -> Option<&TaxRate> {
        self.rates.get(&uuid)
    }

    /// Whether the set has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// One applied rule.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxLine {
    /// Rate title
    pub title: String,

    /// Rate in percentage points
    pub rate: Decimal,

    /// Tax charged, rounded for display
    pub amount: Money<'static, Currency>,
}

/// Result of a tax calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxBreakdown {
    /// Cart subtotal
    pub subtotal: Money<'static, Currency>,

    /// Total tax
    pub tax_amount: Money<'static, Currency>,

    /// Applied rules in evaluation order, duplicates included
    pub details: Vec<TaxLine>,

    /// Tax per cart line
    pub items: FxHashMap<CartItemUuid, Money<'static, Currency>>,

    /// `subtotal + tax_amount`
    pub total: Money<'static, Currency>,
}

impl TaxBreakdown {
    /// Zero tax on the cart subtotal.
    fn untaxed(subtotal: Money<'static, Currency>) -> Self {
        Self {
            subtotal,
            tax_amount: zero(subtotal.currency()),
            details: Vec::new(),
            items: FxHashMap::default(),
            total: subtotal,
        }
    }

    /// Detail lines summed by title, in order of first appearance.
    pub fn merged_details(&self) -> Vec<TaxLine> {
        let mut merged: Vec<TaxLine> = Vec::new();

        for line in &self.details {
            match merged.iter_mut().find(|seen| seen.title == line.title) {
                Some(seen) => {
                    let sum = seen.amount.amount() + line.amount.amount();

                    seen.amount = rounded(sum, seen.amount.currency());
                }
                None => merged.push(line.clone()),
            }
        }

        merged
    }
}

/// Calculate tax on `cart` shipped to `address`.
///
/// Without an address no tax is charged. Rules restricted to a customer class
/// only apply when `customer_class` is that class. The tax total
/// is rounded once from the unrounded sum of every applied rule.
///
/// # Errors
///
/// Returns a [`TaxError`] if money arithmetic fails.
pub fn calculate(
    cart: &Cart,
    address: Option<&Address>,
    rules: &TaxRuleSet,
    customer_class: Option<TaxClassUuid>,
) -> Result<TaxBreakdown, TaxError> {
    let subtotal = cart.subtotal()?;

    let Some(address) = address else {
        return Ok(TaxBreakdown::untaxed(subtotal));
    };

    let currency = cart.currency();
    let mut breakdown = TaxBreakdown::untaxed(subtotal);
    let mut tax = Decimal::ZERO;

    for item in cart.items() {
        let Some(class) = item.tax_class else {
            continue;
        };

        let mut item_tax = Decimal::ZERO;

        for rule in rules.rules_for(class) {
            if !rule.admits(customer_class) {
                continue;
            }

            let Some(rate) = rules.rate(rule.rate_uuid) else {
                continue;
            };

            if !rate.applies_to(address) {
                continue;
            }

            let base = if rule.calculate_subtotal {
                *subtotal.amount()
            } else {
                *item.row_total().amount()
            };

            let amount = rate.tax_on(base);

            item_tax += amount;

            breakdown.details.push(TaxLine {
                title: rate.title.clone(),
                rate: rate.percentage,
                amount: rounded(amount, currency),
            });

            if rule.stop_rules_processing {
                break;
            }
        }

        if !item_tax.is_zero() {
            breakdown.items.insert(item.uuid, rounded(item_tax, currency));
        }

        tax += item_tax;
    }

    let tax_amount = round_amount(tax);

    breakdown.tax_amount = Money::from_decimal(tax_amount, currency);
    breakdown.total = rounded(subtotal.amount() + tax_amount, currency);

    Ok(breakdown)
}
