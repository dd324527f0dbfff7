//! Shipping methods, rate tables and route tariffs

pub mod errors;
pub(crate) mod repositories;
pub mod service;

pub use errors::ShippingServiceError;
pub use service::*;
