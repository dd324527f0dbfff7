//! Addresses Repository

use cartwright::address::Address;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::customers::{
    data::NewAddress,
    records::{AddressRecord, AddressUuid, CustomerUuid},
};

const CREATE_ADDRESS_SQL: &str = include_str!("../sql/create_address.sql");
const GET_ADDRESS_SQL: &str = include_str!("../sql/get_address.sql");
const LIST_ADDRESSES_SQL: &str = include_str!("../sql/list_addresses.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgAddressesRepository;

impl PgAddressesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        address: NewAddress,
    ) -> Result<AddressRecord, sqlx::Error> {
        query_as::<Postgres, AddressRecord>(CREATE_ADDRESS_SQL)
            .bind(address.uuid.into_uuid())
            .bind(address.customer.into_uuid())
            .bind(address.address.country())
            .bind(address.address.state())
            .bind(address.address.city())
            .bind(address.address.postal_code())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        address: AddressUuid,
    ) -> Result<AddressRecord, sqlx::Error> {
        query_as::<Postgres, AddressRecord>(GET_ADDRESS_SQL)
            .bind(address.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// The address, when one is referenced.
    pub(crate) async fn find_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        address: Option<AddressUuid>,
    ) -> Result<Option<Address>, sqlx::Error> {
        match address {
            Some(uuid) => Ok(Some(self.get_address(tx, uuid).await?.address)),
            None => Ok(None),
        }
    }

    pub(crate) async fn list_addresses(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
    ) -> Result<Vec<AddressRecord>, sqlx::Error> {
        query_as::<Postgres, AddressRecord>(LIST_ADDRESSES_SQL)
            .bind(customer.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for AddressRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let country: String = row.try_get("country")?;

        let mut address = Address::new(&country);

        if let Some(state) = row.try_get::<Option<String>, _>("state")? {
            address = address.with_state(&state);
        }

        if let Some(city) = row.try_get::<Option<String>, _>("city")? {
            address = address.with_city(&city);
        }

        if let Some(postal_code) = row.try_get::<Option<String>, _>("postal_code")? {
            address = address.with_postal_code(&postal_code);
        }

        Ok(Self {
            uuid: AddressUuid::from_uuid(row.try_get("uuid")?),
            customer: CustomerUuid::from_uuid(row.try_get("customer_uuid")?),
            address,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
