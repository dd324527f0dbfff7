//! Tax Rates Repository

use cartwright::tax::{TaxRate, TaxRateUuid, ZipMatch};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

const CREATE_TAX_RATE_SQL: &str = include_str!("../sql/create_tax_rate.sql");
const LIST_COUNTRY_TAX_RATES_SQL: &str = include_str!("../sql/list_country_tax_rates.sql");

struct RateRow(TaxRate);

#[derive(Debug, Clone, Default)]
pub(crate) struct PgTaxRatesRepository;

impl PgTaxRatesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_rate(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        rate: &TaxRate,
    ) -> Result<TaxRate, sqlx::Error> {
        let (zip_code, zip_from, zip_to) = zip_columns(&rate.zip)?;

        let RateRow(created) = query_as::<Postgres, RateRow>(CREATE_TAX_RATE_SQL)
            .bind(rate.uuid.into_uuid())
            .bind(&rate.country)
            .bind(rate.state.as_deref())
            .bind(zip_code)
            .bind(zip_from)
            .bind(zip_to)
            .bind(rate.percentage)
            .bind(&rate.title)
            .fetch_one(&mut **tx)
            .await?;

        Ok(created)
    }

    pub(crate) async fn list_country_rates(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        country: &str,
    ) -> Result<Vec<TaxRate>, sqlx::Error> {
        let rows = query_as::<Postgres, RateRow>(LIST_COUNTRY_TAX_RATES_SQL)
            .bind(country)
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().map(|RateRow(rate)| rate).collect())
    }
}

/// Split a zip matcher into its `zip_code`, `zip_from` and `zip_to` columns.
fn zip_columns(zip: &ZipMatch) -> Result<(Option<&str>, Option<i64>, Option<i64>), sqlx::Error> {
    match zip {
        ZipMatch::Any => Ok((None, None, None)),
        ZipMatch::Exact(code) => Ok((Some(code.as_str()), None, None)),
        ZipMatch::Range { from, to } => Ok((None, Some(zip_bound(*from)?), Some(zip_bound(*to)?))),
    }
}

fn zip_bound(value: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(value).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

fn zip_match(row: &PgRow) -> sqlx::Result<ZipMatch> {
    let code: Option<String> = row.try_get("zip_code")?;
    let from: Option<i64> = row.try_get("zip_from")?;
    let to: Option<i64> = row.try_get("zip_to")?;

    let decode = |index: &str, value: i64| {
        u64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
            index: index.to_string(),
            source: Box::new(e),
        })
    };

    match (code, from, to) {
        (Some(code), _, _) => Ok(ZipMatch::Exact(code)),
        (None, Some(from), Some(to)) => Ok(ZipMatch::Range {
            from: decode("zip_from", from)?,
            to: decode("zip_to", to)?,
        }),
        _ => Ok(ZipMatch::Any),
    }
}

impl<'r> FromRow<'r, PgRow> for RateRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(TaxRate {
            uuid: TaxRateUuid::from_uuid(row.try_get("uuid")?),
            country: row.try_get::<String, _>("country")?.trim().to_string(),
            state: row.try_get("state")?,
            zip: zip_match(row)?,
            percentage: row.try_get("percentage")?,
            title: row.try_get("title")?,
        }))
    }
}
