//! Product Fixtures

use rusty_money::Money;
use serde::Deserialize;

use crate::{
    categories::CategorySet,
    fixtures::{Fixture, FixtureError, parse_decimal, parse_price, to_minor_units},
    products::{Product, ProductUuid},
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Products in file order
    pub products: Vec<ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Key other fixtures refer to the product by
    pub key: String,

    /// Product name, defaults to the key
    pub name: Option<String>,

    /// Product price (e.g., "12.50 USD")
    pub price: String,

    /// Weight in kilograms (e.g., "0.4")
    pub weight: Option<String>,

    /// Volume in cubic metres
    pub volume: Option<String>,

    /// Tax class key
    pub tax_class: Option<String>,

    /// Category names
    #[serde(default)]
    pub categories: Vec<String>,

    /// Whether the product is enabled
    #[serde(default = "enabled")]
    pub is_active: bool,

    /// Whether the product is in stock
    #[serde(default = "enabled")]
    pub in_stock: bool,
}

fn enabled() -> bool {
    true
}

impl Fixture {
    /// Load `fixtures/products/{name}.yml`.
    ///
    /// Every product must be priced in the same currency; carts built from
    /// the fixture use it.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the file cannot be read or a value is malformed.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ProductsFixture = self.read("products", name)?;

        for product in fixture.products {
            let (amount, currency) = parse_price(&product.price)?;

            if let Some(existing) = self.currency
                && existing != currency
            {
                return Err(FixtureError::InvalidPrice(format!(
                    "{} is priced in {}, expected {}",
                    product.key, currency.iso_alpha_code, existing.iso_alpha_code
                )));
            }

            self.currency = Some(currency);

            let tax_class = product.tax_class.as_deref().map(|key| self.tax_class(key));

            let loaded = Product {
                uuid: ProductUuid::new(),
                sku: product.key.to_ascii_uppercase(),
                name: product.name.unwrap_or_else(|| product.key.clone()),
                price: Money::from_minor(to_minor_units(amount)?, currency),
                weight: parse_decimal(product.weight.as_deref())?,
                volume: parse_decimal(product.volume.as_deref())?,
                tax_class,
                categories: CategorySet::new(product.categories),
                is_active: product.is_active,
                in_stock: product.in_stock,
            };

            self.products.insert(product.key, loaded);
        }

        Ok(self)
    }
}
