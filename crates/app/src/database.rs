//! Database connection management

use cartwright::money::find_currency;
use rusty_money::{Money, iso::Currency};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow, query};

use crate::domain::tenants::records::TenantUuid;

/// SQL used to set tenant context for row-level security.
pub const SET_TENANT_CONTEXT_SQL: &str = "SELECT set_config('app.current_tenant_uuid', $1, true)";

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Begin a transaction and set tenant context for RLS policies.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction or setting tenant context fails.
    pub async fn begin_tenant_transaction(
        &self,
        tenant: TenantUuid,
    ) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        query(SET_TENANT_CONTEXT_SQL)
            .bind(tenant.into_uuid().to_string())
            .execute(&mut *tx)
            .await?;

        Ok(tx)
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Read an ISO currency code column.
pub(crate) fn try_get_currency(row: &PgRow, col: &str) -> Result<&'static Currency, sqlx::Error> {
    let code: String = row.try_get(col)?;

    find_currency(code.trim()).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Read a minor-unit amount column as money.
pub(crate) fn try_get_money(
    row: &PgRow,
    col: &str,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, sqlx::Error> {
    let minor: i64 = row.try_get(col)?;

    Ok(Money::from_minor(minor, currency))
}

/// Read a nullable minor-unit amount column as money.
pub(crate) fn try_get_optional_money(
    row: &PgRow,
    col: &str,
    currency: &'static Currency,
) -> Result<Option<Money<'static, Currency>>, sqlx::Error> {
    let minor: Option<i64> = row.try_get(col)?;

    Ok(minor.map(|minor| Money::from_minor(minor, currency)))
}

/// Read a nullable non-negative integer column into a `u32`.
pub(crate) fn try_get_count(row: &PgRow, col: &str) -> Result<Option<u32>, sqlx::Error> {
    row.try_get::<Option<i32>, _>(col)?
        .map(|value| {
            u32::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
                index: col.to_string(),
                source: Box::new(e),
            })
        })
        .transpose()
}

/// Convert a count to the `INTEGER` column type.
pub(crate) fn count_to_i32(col: &str, value: u32) -> Result<i32, sqlx::Error> {
    i32::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}
