//! Tax service errors.

use cartwright::{cart::CartError, tax::TaxError};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaxServiceError {
    #[error("tax record already exists")]
    AlreadyExists,

    /// The cart or customer does not exist.
    #[error("not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("tax could not be calculated")]
    Calculation(#[from] TaxError),

    #[error("cart totals could not be computed")]
    Pricing(#[from] CartError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for TaxServiceError {
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
