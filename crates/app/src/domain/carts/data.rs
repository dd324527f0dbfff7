//! Cart Data

use cartwright::{cart::CustomOptions, products::ProductUuid};

/// Currency of carts created on a shopper's first visit.
pub const DEFAULT_CURRENCY: &str = "USD";

/// New Cart Item Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartItem {
    pub product: ProductUuid,
    pub quantity: u32,

    /// Free-form options such as engraving text
    pub options: CustomOptions,
}

impl NewCartItem {
    #[must_use]
    pub fn new(product: ProductUuid, quantity: u32) -> Self {
        Self {
            product,
            quantity,
            options: CustomOptions::default(),
        }
    }
}
