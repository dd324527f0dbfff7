//! Product Records

use cartwright::{
    categories::CategorySet,
    products::{Product, ProductUuid},
    tax::TaxClassUuid,
};
use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

/// Product Record
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub sku: String,
    pub name: String,
    pub price: Money<'static, Currency>,
    pub weight: Option<Decimal>,
    pub volume: Option<Decimal>,
    pub tax_class: Option<TaxClassUuid>,
    pub categories: CategorySet,
    pub is_active: bool,
    pub in_stock: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl ProductRecord {
    /// The pricing engine's view of this product.
    #[must_use]
    pub fn to_product(&self) -> Product {
        Product {
            uuid: self.uuid,
            sku: self.sku.clone(),
            name: self.name.clone(),
            price: self.price,
            weight: self.weight,
            volume: self.volume,
            tax_class: self.tax_class,
            categories: self.categories.clone(),
            is_active: self.is_active && self.deleted_at.is_none(),
            in_stock: self.in_stock,
        }
    }
}
