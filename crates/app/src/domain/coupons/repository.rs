//! Coupons Repository

use cartwright::coupons::{Condition, Coupon, CouponUuid, DiscountType};
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json};

use crate::database::{count_to_i32, try_get_count};

const CREATE_COUPON_SQL: &str = include_str!("sql/create_coupon.sql");
const FIND_COUPON_SQL: &str = include_str!("sql/find_coupon.sql");
const LOCK_COUPON_SQL: &str = include_str!("sql/lock_coupon.sql");
const CLAIM_COUPON_USE_SQL: &str = include_str!("sql/claim_coupon_use.sql");
const RELEASE_COUPON_USE_SQL: &str = include_str!("sql/release_coupon_use.sql");

struct CouponRow(Coupon);

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCouponsRepository;

impl PgCouponsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: &Coupon,
    ) -> Result<Coupon, sqlx::Error> {
        let CouponRow(created) = query_as::<Postgres, CouponRow>(CREATE_COUPON_SQL)
            .bind(coupon.uuid.into_uuid())
            .bind(&coupon.code)
            .bind(coupon.discount_type.as_str())
            .bind(coupon.discount_amount)
            .bind(
                coupon
                    .usage_limit
                    .map(|limit| count_to_i32("usage_limit", limit))
                    .transpose()?,
            )
            .bind(
                coupon
                    .usage_per_customer
                    .map(|limit| count_to_i32("usage_per_customer", limit))
                    .transpose()?,
            )
            .bind(count_to_i32("times_used", coupon.times_used)?)
            .bind(coupon.valid_from.map(SqlxTimestamp::from))
            .bind(coupon.valid_to.map(SqlxTimestamp::from))
            .bind(coupon.minimum_order_amount)
            .bind(coupon.maximum_discount_amount)
            .bind(coupon.free_shipping)
            .bind(coupon.is_active)
            .bind(coupon.conditions.as_ref().map(Json))
            .fetch_one(&mut **tx)
            .await?;

        Ok(created)
    }

    pub(crate) async fn find_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<Option<Coupon>, sqlx::Error> {
        let row = query_as::<Postgres, CouponRow>(FIND_COUPON_SQL)
            .bind(code)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(row.map(|CouponRow(coupon)| coupon))
    }

    /// Fetch the coupon and hold its row lock until the transaction ends.
    pub(crate) async fn lock_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<Option<Coupon>, sqlx::Error> {
        let row = query_as::<Postgres, CouponRow>(LOCK_COUPON_SQL)
            .bind(code)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(row.map(|CouponRow(coupon)| coupon))
    }

    /// Count one use unless the usage limit is reached. Returns whether a use was claimed.
    pub(crate) async fn claim_use(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(CLAIM_COUPON_USE_SQL)
            .bind(coupon.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    pub(crate) async fn release_use(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<(), sqlx::Error> {
        query(RELEASE_COUPON_USE_SQL)
            .bind(code)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for CouponRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let discount_type = row
            .try_get::<String, _>("discount_type")?
            .parse::<DiscountType>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "discount_type".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self(Coupon {
            uuid: CouponUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            discount_type,
            discount_amount: row.try_get("discount_amount")?,
            usage_limit: try_get_count(row, "usage_limit")?,
            usage_per_customer: try_get_count(row, "usage_per_customer")?,
            times_used: try_get_count(row, "times_used")?.unwrap_or_default(),
            valid_from: row
                .try_get::<Option<SqlxTimestamp>, _>("valid_from")?
                .map(SqlxTimestamp::to_jiff),
            valid_to: row
                .try_get::<Option<SqlxTimestamp>, _>("valid_to")?
                .map(SqlxTimestamp::to_jiff),
            minimum_order_amount: row.try_get("minimum_order_amount")?,
            maximum_discount_amount: row.try_get("maximum_discount_amount")?,
            free_shipping: row.try_get("free_shipping")?,
            is_active: row.try_get("is_active")?,
            conditions: row
                .try_get::<Option<Json<Condition>>, _>("conditions")?
                .map(|Json(condition)| condition),
        }))
    }
}
