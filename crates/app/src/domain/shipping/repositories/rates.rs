//! Shipping Rates Repository

use cartwright::{
    brackets::Bracket,
    shipping::{ShippingMethodUuid, ShippingRate, ShippingRateUuid},
};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::database::{try_get_currency, try_get_money};

const CREATE_SHIPPING_RATE_SQL: &str = include_str!("../sql/create_shipping_rate.sql");
const LIST_METHOD_RATES_SQL: &str = include_str!("../sql/list_method_rates.sql");
const LIST_COUNTRY_RATES_SQL: &str = include_str!("../sql/list_country_rates.sql");

struct RateRow(ShippingRate);

#[derive(Debug, Clone, Default)]
pub(crate) struct PgShippingRatesRepository;

impl PgShippingRatesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_rate(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        rate: &ShippingRate,
    ) -> Result<ShippingRate, sqlx::Error> {
        let RateRow(created) = query_as::<Postgres, RateRow>(CREATE_SHIPPING_RATE_SQL)
            .bind(rate.uuid.into_uuid())
            .bind(rate.method_uuid.into_uuid())
            .bind(&rate.country_code)
            .bind(rate.state_code.as_deref())
            .bind(rate.zip_code.as_deref())
            .bind(rate.weight.from)
            .bind(rate.weight.to)
            .bind(rate.price.from)
            .bind(rate.price.to)
            .bind(rate.position)
            .bind(rate.amount.to_minor_units())
            .bind(rate.amount.currency().iso_alpha_code)
            .fetch_one(&mut **tx)
            .await?;

        Ok(created)
    }

    pub(crate) async fn list_method_rates(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        method: ShippingMethodUuid,
    ) -> Result<Vec<ShippingRate>, sqlx::Error> {
        let rows = query_as::<Postgres, RateRow>(LIST_METHOD_RATES_SQL)
            .bind(method.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().map(|RateRow(rate)| rate).collect())
    }

    /// Rates of every method that ship to `country`.
    pub(crate) async fn list_country_rates(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        country: &str,
    ) -> Result<Vec<ShippingRate>, sqlx::Error> {
        let rows = query_as::<Postgres, RateRow>(LIST_COUNTRY_RATES_SQL)
            .bind(country)
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().map(|RateRow(rate)| rate).collect())
    }
}

impl<'r> FromRow<'r, PgRow> for RateRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let currency = try_get_currency(row, "currency")?;

        Ok(Self(ShippingRate {
            uuid: ShippingRateUuid::from_uuid(row.try_get("uuid")?),
            method_uuid: ShippingMethodUuid::from_uuid(row.try_get("method_uuid")?),
            country_code: row.try_get::<String, _>("country_code")?.trim().to_string(),
            state_code: row.try_get("state_code")?,
            zip_code: row.try_get("zip_code")?,
            weight: Bracket::new(row.try_get("weight_from")?, row.try_get("weight_to")?),
            price: Bracket::new(row.try_get("price_from")?, row.try_get("price_to")?),
            position: row.try_get("position")?,
            amount: try_get_money(row, "amount", currency)?,
        }))
    }
}
