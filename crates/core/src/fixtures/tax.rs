//! Tax Fixtures

use serde::Deserialize;

use crate::{
    fixtures::{Fixture, FixtureError, parse_decimal},
    tax::{TaxClassKind, TaxRate, TaxRateUuid, TaxRule, TaxRuleUuid, ZipMatch},
};

/// Wrapper for tax configuration in YAML
#[derive(Debug, Deserialize)]
pub struct TaxFixture {
    /// Rates, keyed for rules to refer to
    #[serde(default)]
    pub rates: Vec<RateFixture>,

    /// Rules
    #[serde(default)]
    pub rules: Vec<RuleFixture>,
}

/// Tax Rate Fixture
#[derive(Debug, Deserialize)]
pub struct RateFixture {
    /// Key rules refer to the rate by
    pub key: String,

    /// Display title
    pub title: String,

    /// Country code
    pub country: String,

    /// State code
    pub state: Option<String>,

    /// Exact postal code
    pub zip: Option<String>,

    /// Numeric postal code range as `[from, to]`
    pub zip_range: Option<(u64, u64)>,

    /// Rate in percentage points (e.g., "8.25")
    pub percentage: String,
}

/// Tax Rule Fixture
#[derive(Debug, Deserialize)]
pub struct RuleFixture {
    /// Product tax class key
    pub product_class: String,

    /// Customer tax class key
    pub customer_class: Option<String>,

    /// Rate key
    pub rate: String,

    /// Evaluation priority
    #[serde(default)]
    pub priority: i32,

    /// Evaluation position within the priority
    #[serde(default)]
    pub position: i32,

    /// Tax the cart subtotal instead of the line
    #[serde(default)]
    pub calculate_subtotal: bool,

    /// Stop further rules for the line
    #[serde(default)]
    pub stop_rules_processing: bool,
}

impl Fixture {
    /// Load `fixtures/tax/{name}.yml`.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the file cannot be read, a value is
    /// malformed, or a rule names an unknown rate.
    pub fn load_tax(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: TaxFixture = self.read("tax", name)?;

        for rate in fixture.rates {
            let percentage = parse_decimal(Some(&rate.percentage))?
                .ok_or_else(|| FixtureError::InvalidDecimal(rate.percentage.clone()))?;

            let zip = match (rate.zip, rate.zip_range) {
                (_, Some((from, to))) => ZipMatch::Range { from, to },
                (Some(zip), None) => ZipMatch::Exact(zip),
                (None, None) => ZipMatch::Any,
            };

            let loaded = TaxRate {
                uuid: TaxRateUuid::new(),
                country: rate.country.trim().to_ascii_uppercase(),
                state: rate.state.map(|state| state.trim().to_ascii_uppercase()),
                zip,
                percentage,
                title: rate.title,
            };

            self.tax_rates.insert(rate.key, loaded);
        }

        for rule in fixture.rules {
            let rate_uuid = self
                .tax_rates
                .get(&rule.rate)
                .map(|rate| rate.uuid)
                .ok_or_else(|| FixtureError::RateNotFound(rule.rate.clone()))?;

            let customer_class = rule
                .customer_class
                .as_deref()
                .map(|key| self.tax_class_of_kind(key, TaxClassKind::Customer));

            let product_class = self.tax_class(&rule.product_class);

            self.tax_rules.push(TaxRule {
                uuid: TaxRuleUuid::new(),
                rate_uuid,
                product_class,
                customer_class,
                priority: rule.priority,
                position: rule.position,
                calculate_subtotal: rule.calculate_subtotal,
                stop_rules_processing: rule.stop_rules_processing,
            });
        }

        Ok(self)
    }
}
