//! Coupon Conditions
//!
//! A boolean tree over cart contents, stored as tagged JSON such as
//! `{"type": "category_in", "categories": ["sale"]}`.

use serde::{Deserialize, Serialize};

use crate::{cart::Cart, categories::CategorySet, products::ProductUuid};

/// Condition a cart must satisfy for a coupon to apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Every child must hold. Empty matches.
    AllOf {
        /// Child conditions
        conditions: Vec<Condition>,
    },

    /// At least one child must hold. Empty matches.
    AnyOf {
        /// Child conditions
        conditions: Vec<Condition>,
    },

    /// The child must not hold.
    Not {
        /// Negated condition
        condition: Box<Condition>,
    },

    /// Some line is one of these products.
    ProductIn {
        /// Qualifying products
        products: Vec<ProductUuid>,
    },

    /// Some line is in one of these categories.
    CategoryIn {
        /// Qualifying categories
        categories: CategorySet,
    },

    /// The cart holds at least this many units.
    MinQty {
        /// Minimum total quantity
        quantity: u64,
    },
}

/// Decides whether a cart satisfies a coupon's conditions.
pub trait ConditionEvaluator {
    /// Whether `cart` satisfies `condition`.
    fn evaluate(&self, condition: &Condition, cart: &Cart) -> bool;
}

/// Evaluates the condition tree against cart lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeEvaluator;

impl ConditionEvaluator for TreeEvaluator {
    fn evaluate(&self, condition: &Condition, cart: &Cart) -> bool {
        match condition {
            Condition::AllOf { conditions } => conditions
                .iter()
                .all(|condition| self.evaluate(condition, cart)),
            Condition::AnyOf { conditions } => {
                conditions.is_empty()
                    || conditions
                        .iter()
                        .any(|condition| self.evaluate(condition, cart))
            }
            Condition::Not { condition } => !self.evaluate(condition, cart),
            Condition::ProductIn { products } => cart
                .items()
                .iter()
                .any(|item| products.contains(&item.product_uuid)),
            Condition::CategoryIn { categories } => cart
                .items()
                .iter()
                .any(|item| item.categories.intersects(categories)),
            Condition::MinQty { quantity } => cart.total_quantity() >= *quantity,
        }
    }
}
