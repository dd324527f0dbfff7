//! Cart Fixtures

use serde::Deserialize;

use crate::{
    cart::Cart,
    fixtures::{Fixture, FixtureError},
};

/// Wrapper for cart lines in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Lines to add, in order
    pub items: Vec<CartLineFixture>,
}

/// Cart Line Fixture
#[derive(Debug, Deserialize)]
pub struct CartLineFixture {
    /// Product key
    pub product: String,

    /// Units to add
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

impl Fixture {
    /// Build a cart from `fixtures/carts/{name}.yml` using the loaded products.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the file cannot be read or a line is rejected.
    pub fn load_cart(&self, name: &str) -> Result<Cart, FixtureError> {
        let fixture: CartFixture = self.read("carts", name)?;

        let lines: Vec<(&str, u32)> = fixture
            .items
            .iter()
            .map(|line| (line.product.as_str(), line.quantity))
            .collect();

        self.cart(&lines)
    }
}
