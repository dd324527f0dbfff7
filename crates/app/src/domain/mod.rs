//! Cartwright Domain Concerns

pub mod carts;
pub mod coupons;
pub mod customers;
pub mod products;
pub mod shipping;
pub mod tax;
pub mod tenants;
