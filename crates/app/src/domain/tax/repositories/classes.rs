//! Tax Classes Repository

use cartwright::tax::{TaxClass, TaxClassKind, TaxClassUuid};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

const CREATE_TAX_CLASS_SQL: &str = include_str!("../sql/create_tax_class.sql");

struct ClassRow(TaxClass);

#[derive(Debug, Clone, Default)]
pub(crate) struct PgTaxClassesRepository;

impl PgTaxClassesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_class(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        class: &TaxClass,
    ) -> Result<TaxClass, sqlx::Error> {
        let ClassRow(created) = query_as::<Postgres, ClassRow>(CREATE_TAX_CLASS_SQL)
            .bind(class.uuid.into_uuid())
            .bind(&class.name)
            .bind(class.kind.as_str())
            .fetch_one(&mut **tx)
            .await?;

        Ok(created)
    }
}

impl<'r> FromRow<'r, PgRow> for ClassRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let kind = match row.try_get::<String, _>("kind")?.as_str() {
            "product" => TaxClassKind::Product,
            "customer" => TaxClassKind::Customer,
            other => {
                return Err(sqlx::Error::ColumnDecode {
                    index: "kind".to_string(),
                    source: format!("unknown tax class kind {other:?}").into(),
                });
            }
        };

        Ok(Self(TaxClass {
            uuid: TaxClassUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            kind,
        }))
    }
}
