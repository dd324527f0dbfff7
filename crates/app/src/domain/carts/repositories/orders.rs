//! Orders Repository

use cartwright::cart::CartUuid;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    database::{try_get_currency, try_get_money},
    domain::{
        carts::records::{CartRecord, OrderRecord, OrderUuid},
        customers::records::CustomerUuid,
    },
};

const CREATE_ORDER_SQL: &str = include_str!("../sql/create_order.sql");
const COUNT_COUPON_ORDERS_SQL: &str = include_str!("../sql/count_coupon_orders.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        record: &CartRecord,
    ) -> Result<OrderRecord, sqlx::Error> {
        let grand_total = record.totals().grand_total;

        query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(OrderUuid::new().into_uuid())
            .bind(record.uuid.into_uuid())
            .bind(record.identity.customer().map(CustomerUuid::into_uuid))
            .bind(record.cart.coupon().map(|coupon| coupon.code.as_str()))
            .bind(grand_total.currency().iso_alpha_code)
            .bind(grand_total.to_minor_units())
            .fetch_one(&mut **tx)
            .await
    }

    /// Orders the customer placed with `code`.
    pub(crate) async fn count_coupon_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
        code: &str,
    ) -> Result<u64, sqlx::Error> {
        let count: i64 = query_scalar(COUNT_COUPON_ORDERS_SQL)
            .bind(customer.into_uuid())
            .bind(code)
            .fetch_one(&mut **tx)
            .await?;

        u64::try_from(count).map_err(|e| sqlx::Error::ColumnDecode {
            index: "count".to_string(),
            source: Box::new(e),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let currency = try_get_currency(row, "currency")?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            cart_uuid: CartUuid::from_uuid(row.try_get("cart_uuid")?),
            customer: row
                .try_get::<Option<Uuid>, _>("customer_uuid")?
                .map(CustomerUuid::from_uuid),
            coupon_code: row.try_get("coupon_code")?,
            grand_total: try_get_money(row, "grand_total", currency)?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
