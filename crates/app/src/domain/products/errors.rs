//! Products service errors.

use cartwright::products::ProductUuid;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductsServiceError {
    /// Another live product of the tenant uses this SKU.
    #[error("a product with SKU {0} already exists")]
    DuplicateSku(String),

    /// No live product with this id is visible to the tenant.
    #[error("product {0} not found")]
    NotFound(ProductUuid),

    #[error("tax class not found")]
    UnknownTaxClass,

    /// A negative price, weight or volume, or an empty required column.
    #[error("invalid product data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl ProductsServiceError {
    /// Map a failed insert of the product with `sku`.
    pub(crate) fn on_create(error: Error, sku: &str) -> Self {
        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::DuplicateSku(sku.to_string()),
            Some(ErrorKind::ForeignKeyViolation) => Self::UnknownTaxClass,
            Some(ErrorKind::NotNullViolation | ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }

    /// Map a failed lookup of `product`.
    pub(crate) fn on_lookup(error: Error, product: ProductUuid) -> Self {
        match error {
            Error::RowNotFound => Self::NotFound(product),
            error => Self::Sql(error),
        }
    }
}

impl From<Error> for ProductsServiceError {
    fn from(error: Error) -> Self {
        Self::Sql(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rows_name_the_product() {
        let product = ProductUuid::new();

        let error = ProductsServiceError::on_lookup(Error::RowNotFound, product);

        assert!(matches!(error, ProductsServiceError::NotFound(uuid) if uuid == product));
        assert_eq!(error.to_string(), format!("product {product} not found"));
    }

    #[test]
    fn failures_without_a_constraint_stay_storage_errors() {
        let create = ProductsServiceError::on_create(Error::PoolTimedOut, "MUG");
        let lookup = ProductsServiceError::on_lookup(Error::PoolTimedOut, ProductUuid::new());

        assert!(matches!(create, ProductsServiceError::Sql(Error::PoolTimedOut)));
        assert!(matches!(lookup, ProductsServiceError::Sql(Error::PoolTimedOut)));
    }
}
