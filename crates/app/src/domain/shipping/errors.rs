//! Shipping service errors.

use cartwright::{
    cart::CartError,
    shipping::{RateConfigError, ShippingError, ShippingMethodUuid},
};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShippingServiceError {
    #[error("shipping record already exists")]
    AlreadyExists,

    /// The cart or shipping method does not exist.
    #[error("not found")]
    NotFound,

    #[error("a shipping address is required")]
    AddressRequired,

    #[error("shipping method {0} is not available for this cart and address")]
    MethodUnavailable(ShippingMethodUuid),

    /// The new rate would tie with an existing one.
    #[error("rate conflicts with the method's rate table")]
    AmbiguousRates(#[source] RateConfigError),

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("cart totals could not be computed")]
    Pricing(#[source] CartError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for ShippingServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

impl From<ShippingError> for ShippingServiceError {
    fn from(error: ShippingError) -> Self {
        match error {
            ShippingError::MethodUnavailable(method) => Self::MethodUnavailable(method),
            ShippingError::AddressRequired => Self::AddressRequired,
        }
    }
}

impl From<RateConfigError> for ShippingServiceError {
    fn from(error: RateConfigError) -> Self {
        Self::AmbiguousRates(error)
    }
}

impl From<CartError> for ShippingServiceError {
    fn from(error: CartError) -> Self {
        Self::Pricing(error)
    }
}
