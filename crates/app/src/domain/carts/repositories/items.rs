//! Cart Items Repository

use cartwright::{
    cart::{CartItem, CartItemUuid, CartUuid, CustomOptions},
    categories::CategorySet,
    products::ProductUuid,
    tax::TaxClassUuid,
};
use rusty_money::{Money, iso::Currency};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json};
use uuid::Uuid;

use crate::database::{count_to_i32, try_get_currency, try_get_money, try_get_optional_money};

const LIST_CART_ITEMS_SQL: &str = include_str!("../sql/list_cart_items.sql");
const UPSERT_CART_ITEM_SQL: &str = include_str!("../sql/upsert_cart_item.sql");
const DELETE_CART_ITEM_SQL: &str = include_str!("../sql/delete_cart_item.sql");
const SET_ITEM_TAX_SQL: &str = include_str!("../sql/set_item_tax.sql");
const CLEAR_CART_TAX_SQL: &str = include_str!("../sql/clear_cart_tax.sql");

/// A cart line joined with the live product attributes pricing needs.
struct CartItemRow(CartItem);

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartItemsRepository;

impl PgCartItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_cart_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Vec<CartItem>, sqlx::Error> {
        let rows = query_as::<Postgres, CartItemRow>(LIST_CART_ITEMS_SQL)
            .bind(cart.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().map(|CartItemRow(item)| item).collect())
    }

    /// Insert the line, or overwrite quantity and options of the cart's line for the same product.
    pub(crate) async fn upsert_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        item: &CartItem,
    ) -> Result<(), sqlx::Error> {
        query(UPSERT_CART_ITEM_SQL)
            .bind(item.uuid.into_uuid())
            .bind(cart.into_uuid())
            .bind(item.product_uuid.into_uuid())
            .bind(&item.sku)
            .bind(&item.name)
            .bind(item.price.to_minor_units())
            .bind(count_to_i32("quantity", item.quantity())?)
            .bind(item.row_total().to_minor_units())
            .bind(Json(&item.options))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn delete_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        item: CartItemUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_ITEM_SQL)
            .bind(item.into_uuid())
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn set_item_tax(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: CartItemUuid,
        tax: Money<'static, Currency>,
    ) -> Result<(), sqlx::Error> {
        query(SET_ITEM_TAX_SQL)
            .bind(item.into_uuid())
            .bind(tax.to_minor_units())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Forget the per-line tax of every line in `cart`.
    pub(crate) async fn clear_cart_tax(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CLEAR_CART_TAX_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for CartItemRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let currency = try_get_currency(row, "currency")?;

        let quantity = u32::try_from(row.try_get::<i32, _>("quantity")?).map_err(|e| {
            sqlx::Error::ColumnDecode {
                index: "quantity".to_string(),
                source: Box::new(e),
            }
        })?;

        let sku: String = row.try_get("sku")?;
        let name: String = row.try_get("name")?;

        let mut item = CartItem::new(
            CartItemUuid::from_uuid(row.try_get("uuid")?),
            ProductUuid::from_uuid(row.try_get("product_uuid")?),
            &sku,
            &name,
            try_get_money(row, "price", currency)?,
            quantity,
        )
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        item.weight = row.try_get("weight")?;
        item.volume = row.try_get("volume")?;
        item.tax_class = row
            .try_get::<Option<Uuid>, _>("tax_class_uuid")?
            .map(TaxClassUuid::from_uuid);
        item.categories = CategorySet::new(row.try_get::<Vec<String>, _>("categories")?);
        item.tax_amount = try_get_optional_money(row, "tax_amount", currency)?;
        item.discount_amount = try_get_optional_money(row, "discount_amount", currency)?;
        item.options = row
            .try_get::<Json<CustomOptions>, _>("custom_options")?
            .0;

        Ok(Self(item))
    }
}
