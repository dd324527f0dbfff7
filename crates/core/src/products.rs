//! Products

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::{categories::CategorySet, tax::TaxClassUuid, uuids::TypedUuid};

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// The product data the pricing engine needs at add-to-cart and quote time.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product identifier
    pub uuid: ProductUuid,

    /// Stock keeping unit
    pub sku: String,

    /// Display name
    pub name: String,

    /// Unit price
    pub price: Money<'static, Currency>,

    /// Shipping weight in kilograms
    pub weight: Option<Decimal>,

    /// Shipping volume in cubic metres
    pub volume: Option<Decimal>,

    /// Product tax class used to select tax rules
    pub tax_class: Option<TaxClassUuid>,

    /// Categories consulted by coupon conditions
    pub categories: CategorySet,

    /// Whether the product is enabled for sale
    pub is_active: bool,

    /// Whether the product is in stock
    pub in_stock: bool,
}

impl Product {
    /// Create an active, in-stock product with no weight, tax class or categories.
    pub fn new(sku: &str, name: &str, price: Money<'static, Currency>) -> Self {
        Self {
            uuid: ProductUuid::new(),
            sku: sku.to_string(),
            name: name.to_string(),
            price,
            weight: None,
            volume: None,
            tax_class: None,
            categories: CategorySet::default(),
            is_active: true,
            in_stock: true,
        }
    }

    /// Whether the product may be added to a cart.
    pub fn is_purchasable(&self) -> bool {
        self.is_active && self.in_stock
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;

    use super::*;

    #[test]
    fn inactive_or_out_of_stock_products_are_not_purchasable() {
        let product = Product::new("TEE-1", "T-Shirt", Money::from_minor(20_00, USD));

        assert!(product.is_purchasable());

        let inactive = Product {
            is_active: false,
            ..product.clone()
        };

        let sold_out = Product {
            in_stock: false,
            ..product
        };

        assert!(!inactive.is_purchasable());
        assert!(!sold_out.is_purchasable());
    }
}
