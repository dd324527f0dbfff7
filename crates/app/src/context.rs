//! App Context

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::{
        carts::{CartsService, PgCartsService},
        coupons::{CouponsService, PgCouponsService},
        customers::{CustomersService, PgCustomersService, records::CustomerUuid},
        products::{PgProductsService, ProductsService},
        shipping::{PgShippingService, ShippingService},
        tax::{PgTaxService, TaxService},
        tenants::{PgTenantsService, TenantsService, records::TenantUuid},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub tenants: Arc<dyn TenantsService>,
    pub products: Arc<dyn ProductsService>,
    pub customers: Arc<dyn CustomersService>,
    pub carts: Arc<dyn CartsService>,
    pub shipping: Arc<dyn ShippingService>,
    pub tax: Arc<dyn TaxService>,
    pub coupons: Arc<dyn CouponsService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(url: &str) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        let db = Db::new(pool.clone());

        Ok(Self {
            tenants: Arc::new(PgTenantsService::new(pool)),
            products: Arc::new(PgProductsService::new(db.clone())),
            customers: Arc::new(PgCustomersService::new(db.clone())),
            carts: Arc::new(PgCartsService::new(db.clone())),
            shipping: Arc::new(PgShippingService::new(db.clone())),
            tax: Arc::new(PgTaxService::new(db.clone())),
            coupons: Arc::new(PgCouponsService::new(db)),
        })
    }
}

/// The shopper a request acts for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// A signed-in customer.
    Customer(CustomerUuid),

    /// An anonymous visitor, identified by their session token.
    Session(String),
}

impl Identity {
    /// Key the shopper's open cart is indexed under.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Customer(uuid) => format!("customer:{uuid}"),
            Self::Session(token) => format!("session:{token}"),
        }
    }

    /// The customer, for signed-in shoppers.
    #[must_use]
    pub fn customer(&self) -> Option<CustomerUuid> {
        match self {
            Self::Customer(uuid) => Some(*uuid),
            Self::Session(_) => None,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Customer(uuid) => write!(f, "customer {uuid}"),
            Self::Session(_) => f.write_str("guest session"),
        }
    }
}

/// Tenant and shopper every cart operation is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub tenant: TenantUuid,
    pub identity: Identity,
}

impl RequestContext {
    #[must_use]
    pub fn new(tenant: TenantUuid, identity: Identity) -> Self {
        Self { tenant, identity }
    }

    #[must_use]
    pub fn customer(tenant: TenantUuid, customer: CustomerUuid) -> Self {
        Self::new(tenant, Identity::Customer(customer))
    }

    #[must_use]
    pub fn guest(tenant: TenantUuid, session_token: &str) -> Self {
        Self::new(tenant, Identity::Session(session_token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_keys_do_not_collide_across_kinds() {
        let customer = CustomerUuid::new();

        let signed_in = Identity::Customer(customer);
        let guest = Identity::Session(customer.to_string());

        assert_ne!(signed_in.key(), guest.key());
        assert_eq!(signed_in.customer(), Some(customer));
        assert_eq!(guest.customer(), None);
    }

    #[test]
    fn guest_display_hides_the_session_token() {
        let guest = Identity::Session("secret-token".to_string());

        assert!(!guest.to_string().contains("secret-token"));
    }
}
