//! Products Data

use cartwright::{products::ProductUuid, tax::TaxClassUuid};
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

/// New Product Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub sku: String,
    pub name: String,
    pub price: Money<'static, Currency>,

    /// Kilograms
    pub weight: Option<Decimal>,

    /// Cubic metres
    pub volume: Option<Decimal>,

    pub tax_class: Option<TaxClassUuid>,
    pub categories: Vec<String>,
    pub is_active: bool,
    pub in_stock: bool,
}

impl NewProduct {
    /// An active, in-stock product with no shipping or tax attributes.
    #[must_use]
    pub fn new(sku: &str, name: &str, price: Money<'static, Currency>) -> Self {
        Self {
            uuid: ProductUuid::new(),
            sku: sku.to_string(),
            name: name.to_string(),
            price,
            weight: None,
            volume: None,
            tax_class: None,
            categories: Vec::new(),
            is_active: true,
            in_stock: true,
        }
    }
}
