//! Customers service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        customers::{
            data::{NewAddress, NewCustomer},
            errors::CustomersServiceError,
            records::{AddressRecord, CustomerRecord, CustomerUuid},
            repositories::{PgAddressesRepository, PgCustomersRepository},
        },
        tenants::records::TenantUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgCustomersService {
    db: Db,
    customers: PgCustomersRepository,
    addresses: PgAddressesRepository,
}

impl PgCustomersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            customers: PgCustomersRepository::new(),
            addresses: PgAddressesRepository::new(),
        }
    }
}

#[async_trait]
impl CustomersService for PgCustomersService {
    #[tracing::instrument(
        name = "customers.service.create_customer",
        skip(self, customer),
        fields(tenant_uuid = %tenant, customer_uuid = %customer.uuid),
        err
    )]
    async fn create_customer(
        &self,
        tenant: TenantUuid,
        customer: NewCustomer,
    ) -> Result<CustomerRecord, CustomersServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let created = self.customers.create_customer(&mut tx, customer).await?;

        tx.commit().await?;

        info!(customer_uuid = %created.uuid, "created customer");

        Ok(created)
    }

    #[tracing::instrument(
        name = "customers.service.get_customer",
        skip(self),
        fields(tenant_uuid = %tenant, customer_uuid = %customer),
        err
    )]
    async fn get_customer(
        &self,
        tenant: TenantUuid,
        customer: CustomerUuid,
    ) -> Result<CustomerRecord, CustomersServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let customer = self.customers.get_customer(&mut tx, customer).await?;

        tx.commit().await?;

        Ok(customer)
    }

    #[tracing::instrument(
        name = "customers.service.create_address",
        skip(self, address),
        fields(
            tenant_uuid = %tenant,
            customer_uuid = %address.customer,
            address_uuid = %address.uuid
        ),
        err
    )]
    async fn create_address(
        &self,
        tenant: TenantUuid,
        address: NewAddress,
    ) -> Result<AddressRecord, CustomersServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let created = self.addresses.create_address(&mut tx, address).await?;

        tx.commit().await?;

        info!(address_uuid = %created.uuid, "created address");

        Ok(created)
    }

    #[tracing::instrument(
        name = "customers.service.list_addresses",
        skip(self),
        fields(tenant_uuid = %tenant, customer_uuid = %customer),
        err
    )]
    async fn list_addresses(
        &self,
        tenant: TenantUuid,
        customer: CustomerUuid,
    ) -> Result<Vec<AddressRecord>, CustomersServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let addresses = self.addresses.list_addresses(&mut tx, customer).await?;

        tx.commit().await?;

        Ok(addresses)
    }
}

#[automock]
#[async_trait]
pub trait CustomersService: Send + Sync {
    /// Register a customer.
    async fn create_customer(
        &self,
        tenant: TenantUuid,
        customer: NewCustomer,
    ) -> Result<CustomerRecord, CustomersServiceError>;

    /// Retrieve a customer.
    async fn get_customer(
        &self,
        tenant: TenantUuid,
        customer: CustomerUuid,
    ) -> Result<CustomerRecord, CustomersServiceError>;

    /// Add an address to a customer's address book.
    async fn create_address(
        &self,
        tenant: TenantUuid,
        address: NewAddress,
    ) -> Result<AddressRecord, CustomersServiceError>;

    /// A customer's addresses, oldest first.
    async fn list_addresses(
        &self,
        tenant: TenantUuid,
        customer: CustomerUuid,
    ) -> Result<Vec<AddressRecord>, CustomersServiceError>;
}
