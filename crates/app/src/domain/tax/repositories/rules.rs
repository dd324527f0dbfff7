//! Tax Rules Repository

use cartwright::tax::{TaxClassUuid, TaxRateUuid, TaxRule, TaxRuleUuid};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

const CREATE_TAX_RULE_SQL: &str = include_str!("../sql/create_tax_rule.sql");
const LIST_COUNTRY_TAX_RULES_SQL: &str = include_str!("../sql/list_country_tax_rules.sql");

struct RuleRow(TaxRule);

#[derive(Debug, Clone, Default)]
pub(crate) struct PgTaxRulesRepository;

impl PgTaxRulesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_rule(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        rule: &TaxRule,
    ) -> Result<TaxRule, sqlx::Error> {
        let RuleRow(created) = query_as::<Postgres, RuleRow>(CREATE_TAX_RULE_SQL)
            .bind(rule.uuid.into_uuid())
            .bind(rule.rate_uuid.into_uuid())
            .bind(rule.product_class.into_uuid())
            .bind(rule.customer_class.map(TaxClassUuid::into_uuid))
            .bind(rule.priority)
            .bind(rule.position)
            .bind(rule.calculate_subtotal)
            .bind(rule.stop_rules_processing)
            .fetch_one(&mut **tx)
            .await?;

        Ok(created)
    }

    /// Rules whose rate is in `country`.
    pub(crate) async fn list_country_rules(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        country: &str,
    ) -> Result<Vec<TaxRule>, sqlx::Error> {
        let rows = query_as::<Postgres, RuleRow>(LIST_COUNTRY_TAX_RULES_SQL)
            .bind(country)
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().map(|RuleRow(rule)| rule).collect())
    }
}

impl<'r> FromRow<'r, PgRow> for RuleRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(TaxRule {
            uuid: TaxRuleUuid::from_uuid(row.try_get("uuid")?),
            rate_uuid: TaxRateUuid::from_uuid(row.try_get("tax_rate_uuid")?),
            product_class: TaxClassUuid::from_uuid(row.try_get("product_tax_class_uuid")?),
            customer_class: row
                .try_get::<Option<Uuid>, _>("customer_tax_class_uuid")?
                .map(TaxClassUuid::from_uuid),
            priority: row.try_get("priority")?,
            position: row.try_get("position")?,
            calculate_subtotal: row.try_get("calculate_subtotal")?,
            stop_rules_processing: row.try_get("stop_rules_processing")?,
        }))
    }
}
