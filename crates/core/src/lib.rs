//! Cartwright
//!
//! Checkout pricing: the cart aggregate and its totals, a bracketed shipping
//! rate matcher, a cascading tax rule engine and a coupon validator. The crate
//! does no I/O; callers load configuration and persist the results.

pub mod address;
pub mod brackets;
pub mod cart;
pub mod categories;
pub mod coupons;
pub mod fixtures;
pub mod money;
pub mod prelude;
pub mod products;
pub mod shipping;
pub mod tax;
pub mod totals;
pub mod uuids;
