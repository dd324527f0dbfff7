//! Carts service errors.

use cartwright::{
    cart::{CartError, CartItemUuid},
    products::ProductUuid,
};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("cart already exists")]
    AlreadyExists,

    /// The shopper has no open cart.
    #[error("cart not found")]
    NotFound,

    #[error("cart item {0} not found")]
    ItemNotFound(CartItemUuid),

    #[error("product not found")]
    ProductNotFound,

    #[error("product {0} is inactive or out of stock")]
    ProductUnavailable(ProductUuid),

    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("product is priced in {product}, cart is in {cart}")]
    CurrencyMismatch {
        product: &'static str,
        cart: &'static str,
    },

    /// The address does not exist or belongs to another customer.
    #[error("address not found")]
    AddressNotFound,

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

impl From<Error> for CartsServiceError {
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

impl From<CartError> for CartsServiceError {
    fn from(error: CartError) -> Self {
        match error {
            CartError::ProductUnavailable(product) => Self::ProductUnavailable(product),
            CartError::ItemNotFound(item) => Self::ItemNotFound(item),
            CartError::InvalidQuantity => Self::InvalidQuantity,
            CartError::CurrencyMismatch(product, cart) => Self::CurrencyMismatch { product, cart },
            CartError::DuplicateProduct(_) | CartError::Overflow | CartError::Money(_) => {
                Self::Pricing(error)
            }
        }
    }
}

/// Map a missing row to `missing` instead of the cart-level `NotFound`.
pub(crate) fn or_missing(error: Error, missing: CartsServiceError) -> CartsServiceError {
    if matches!(error, Error::RowNotFound) {
        missing
    } else {
        error.into()
    }
}
