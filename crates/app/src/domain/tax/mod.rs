//! Tax classes, rates and rules

pub mod errors;
pub(crate) mod repositories;
pub mod service;

pub use errors::TaxServiceError;
pub use service::*;
