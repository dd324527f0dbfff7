//! Shipping Methods Repository

use cartwright::shipping::{ShippingMethod, ShippingMethodUuid};
use rustc_hash::FxHashMap;
use sqlx::{
    FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar, types::Json,
};
use uuid::Uuid;

const CREATE_SHIPPING_METHOD_SQL: &str = include_str!("../sql/create_shipping_method.sql");
const LIST_SHIPPING_METHODS_SQL: &str = include_str!("../sql/list_shipping_methods.sql");
const LOCK_SHIPPING_METHOD_SQL: &str = include_str!("../sql/lock_shipping_method.sql");

struct MethodRow(ShippingMethod);

#[derive(Debug, Clone, Default)]
pub(crate) struct PgShippingMethodsRepository;

impl PgShippingMethodsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_method(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        method: &ShippingMethod,
    ) -> Result<ShippingMethod, sqlx::Error> {
        let MethodRow(created) = query_as::<Postgres, MethodRow>(CREATE_SHIPPING_METHOD_SQL)
            .bind(method.uuid.into_uuid())
            .bind(&method.code)
            .bind(&method.name)
            .bind(method.carrier.as_deref())
            .bind(method.is_active)
            .bind(method.sort_order)
            .bind(Json(&method.config))
            .fetch_one(&mut **tx)
            .await?;

        Ok(created)
    }

    /// Every method of the tenant, active or not, in display order.
    pub(crate) async fn list_methods(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<ShippingMethod>, sqlx::Error> {
        let rows = query_as::<Postgres, MethodRow>(LIST_SHIPPING_METHODS_SQL)
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().map(|MethodRow(method)| method).collect())
    }

    /// Serialise rate table changes for one method.
    pub(crate) async fn lock_method(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        method: ShippingMethodUuid,
    ) -> Result<(), sqlx::Error> {
        let _: Uuid = query_scalar(LOCK_SHIPPING_METHOD_SQL)
            .bind(method.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for MethodRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(ShippingMethod {
            uuid: ShippingMethodUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            name: row.try_get("name")?,
            carrier: row.try_get("carrier")?,
            is_active: row.try_get("is_active")?,
            sort_order: row.try_get("sort_order")?,
            config: row
                .try_get::<Json<FxHashMap<String, String>>, _>("config")?
                .0,
        }))
    }
}
