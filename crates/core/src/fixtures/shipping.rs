//! Shipping Fixtures

use rustc_hash::FxHashMap;
use rusty_money::Money;
use serde::Deserialize;

use crate::{
    brackets::Bracket,
    fixtures::{Fixture, FixtureError, parse_decimal, parse_price, to_minor_units},
    shipping::{ShippingMethod, ShippingMethodUuid, ShippingRate, ShippingRateUuid},
};

/// Wrapper for a shipping table in YAML
#[derive(Debug, Deserialize)]
pub struct ShippingFixture {
    /// Methods
    #[serde(default)]
    pub methods: Vec<MethodFixture>,

    /// Rates, referring to methods by key
    #[serde(default)]
    pub rates: Vec<RateFixture>,
}

/// Shipping Method Fixture
#[derive(Debug, Deserialize)]
pub struct MethodFixture {
    /// Key rates refer to the method by; also its code
    pub key: String,

    /// Display name
    pub name: String,

    /// Carrier name
    pub carrier: Option<String>,

    /// Display order
    #[serde(default)]
    pub sort_order: i32,

    /// Whether the method is offered
    #[serde(default = "active")]
    pub is_active: bool,

    /// Display-only settings
    #[serde(default)]
    pub config: FxHashMap<String, String>,
}

fn active() -> bool {
    true
}

/// Shipping Rate Fixture
#[derive(Debug, Deserialize)]
pub struct RateFixture {
    /// Method key
    pub method: String,

    /// Country code
    pub country: String,

    /// State code
    pub state: Option<String>,

    /// Postal code
    pub zip: Option<String>,

    /// Lower weight bound in kilograms
    pub weight_from: Option<String>,

    /// Upper weight bound in kilograms
    pub weight_to: Option<String>,

    /// Lower subtotal bound
    pub price_from: Option<String>,

    /// Upper subtotal bound
    pub price_to: Option<String>,

    /// Tie-break position
    #[serde(default)]
    pub position: i32,

    /// Amount charged (e.g., "15.00 USD")
    pub amount: String,
}

impl Fixture {
    /// Load `fixtures/shipping/{name}.yml`.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the file cannot be read, a value is
    /// malformed, or a rate names an unknown method.
    pub fn load_shipping(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ShippingFixture = self.read("shipping", name)?;

        for method in fixture.methods {
            let loaded = ShippingMethod {
                uuid: ShippingMethodUuid::new(),
                code: method.key.clone(),
                name: method.name,
                carrier: method.carrier,
                is_active: method.is_active,
                sort_order: method.sort_order,
                config: method.config,
            };

            self.methods.insert(method.key, loaded);
        }

        for rate in fixture.rates {
            let method_uuid = self.method(&rate.method)?.uuid;
            let (amount, currency) = parse_price(&rate.amount)?;

            self.rates.push(ShippingRate {
                uuid: ShippingRateUuid::new(),
                method_uuid,
                country_code: rate.country.trim().to_ascii_uppercase(),
                state_code: rate.state.map(|state| state.trim().to_ascii_uppercase()),
                zip_code: rate.zip,
                weight: Bracket::new(
                    parse_decimal(rate.weight_from.as_deref())?,
                    parse_decimal(rate.weight_to.as_deref())?,
                ),
                price: Bracket::new(
                    parse_decimal(rate.price_from.as_deref())?,
                    parse_decimal(rate.price_to.as_deref())?,
                ),
                position: rate.position,
                amount: Money::from_minor(to_minor_units(amount)?, currency),
            });
        }

        Ok(self)
    }
}
