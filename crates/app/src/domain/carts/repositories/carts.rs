//! Carts Repository

use cartwright::{cart::CartUuid, shipping::ShippingMethodUuid};
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use rusty_money::iso::Currency;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    context::Identity,
    database::{try_get_currency, try_get_money, try_get_optional_money},
    domain::{
        carts::records::{CartHeader, CartRecord},
        customers::records::{AddressUuid, CustomerUuid},
    },
};

const ENSURE_CART_SQL: &str = include_str!("../sql/ensure_cart.sql");
const FIND_ACTIVE_CART_SQL: &str = include_str!("../sql/find_active_cart.sql");
const LOCK_ACTIVE_CART_SQL: &str = include_str!("../sql/lock_active_cart.sql");
const SAVE_CART_SQL: &str = include_str!("../sql/save_cart.sql");
const CONVERT_CART_SQL: &str = include_str!("../sql/convert_cart.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert an open cart for `identity` unless one exists. Returns whether a row was created.
    pub(crate) async fn ensure_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        identity: &Identity,
        currency: &'static Currency,
    ) -> Result<bool, sqlx::Error> {
        let (customer, session) = match identity {
            Identity::Customer(uuid) => (Some(uuid.into_uuid()), None),
            Identity::Session(token) => (None, Some(token.as_str())),
        };

        let rows_affected = query(ENSURE_CART_SQL)
            .bind(CartUuid::new().into_uuid())
            .bind(customer)
            .bind(session)
            .bind(identity.key())
            .bind(currency.iso_alpha_code)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    pub(crate) async fn find_active_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        identity: &Identity,
    ) -> Result<CartHeader, sqlx::Error> {
        query_as::<Postgres, CartHeader>(FIND_ACTIVE_CART_SQL)
            .bind(identity.key())
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch the open cart and hold its row lock until the transaction ends.
    pub(crate) async fn lock_active_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        identity: &Identity,
    ) -> Result<CartHeader, sqlx::Error> {
        query_as::<Postgres, CartHeader>(LOCK_ACTIVE_CART_SQL)
            .bind(identity.key())
            .fetch_one(&mut **tx)
            .await
    }

    /// Write totals, coupon, shipping and addresses back to the cart row.
    pub(crate) async fn save_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        record: &CartRecord,
    ) -> Result<Timestamp, sqlx::Error> {
        let cart = &record.cart;
        let totals = cart.totals();
        let shipping = cart.shipping();
        let coupon = cart.coupon();

        let updated_at: SqlxTimestamp = query_scalar(SAVE_CART_SQL)
            .bind(record.uuid.into_uuid())
            .bind(totals.subtotal.to_minor_units())
            .bind(totals.discount.to_minor_units())
            .bind(totals.tax.to_minor_units())
            .bind(totals.shipping.to_minor_units())
            .bind(totals.grand_total.to_minor_units())
            .bind(coupon.map(|coupon| coupon.code.as_str()))
            .bind(coupon.is_some_and(|coupon| coupon.free_shipping))
            .bind(shipping.map(|selection| selection.method_uuid.into_uuid()))
            .bind(shipping.map(|selection| selection.name.as_str()))
            .bind(shipping.map(|selection| selection.amount.to_minor_units()))
            .bind(record.shipping_address.map(AddressUuid::into_uuid))
            .bind(record.billing_address.map(AddressUuid::into_uuid))
            .fetch_one(&mut **tx)
            .await?;

        Ok(updated_at.to_jiff())
    }

    pub(crate) async fn convert_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CONVERT_CART_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for CartHeader {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let currency = try_get_currency(row, "currency")?;

        let customer: Option<Uuid> = row.try_get("customer_uuid")?;
        let session: Option<String> = row.try_get("session_token")?;

        let identity = match (customer, session) {
            (Some(uuid), _) => Identity::Customer(CustomerUuid::from_uuid(uuid)),
            (None, Some(token)) => Identity::Session(token),
            (None, None) => {
                return Err(sqlx::Error::ColumnDecode {
                    index: "customer_uuid".to_string(),
                    source: "cart has neither a customer nor a session".into(),
                });
            }
        };

        Ok(Self {
            uuid: CartUuid::from_uuid(row.try_get("uuid")?),
            identity,
            currency,
            discount_amount: try_get_money(row, "discount_amount", currency)?,
            tax_amount: try_get_money(row, "tax_amount", currency)?,
            coupon_code: row.try_get("coupon_code")?,
            free_shipping: row.try_get("free_shipping")?,
            shipping_method_uuid: row
                .try_get::<Option<Uuid>, _>("shipping_method_uuid")?
                .map(ShippingMethodUuid::from_uuid),
            shipping_method_name: row.try_get("shipping_method_name")?,
            shipping_quote: try_get_optional_money(row, "shipping_quote", currency)?,
            shipping_address: row
                .try_get::<Option<Uuid>, _>("shipping_address_uuid")?
                .map(AddressUuid::from_uuid),
            billing_address: row
                .try_get::<Option<Uuid>, _>("billing_address_uuid")?
                .map(AddressUuid::from_uuid),
            converted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("converted_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

