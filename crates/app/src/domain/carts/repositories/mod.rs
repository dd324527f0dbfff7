pub(crate) mod carts;
pub(crate) mod items;
pub(crate) mod orders;

use sqlx::{Postgres, Transaction};

pub(crate) use carts::PgCartsRepository;
pub(crate) use items::PgCartItemsRepository;
pub(crate) use orders::PgOrdersRepository;

use crate::{
    context::Identity,
    domain::carts::records::{CartHeader, CartRecord},
};

/// Loads and saves whole cart aggregates. Shared by every service that prices a cart.
#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartStore {
    pub(crate) carts: PgCartsRepository,
    pub(crate) items: PgCartItemsRepository,
}

impl PgCartStore {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            carts: PgCartsRepository::new(),
            items: PgCartItemsRepository::new(),
        }
    }

    /// The shopper's open cart, read without locking.
    pub(crate) async fn find(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        identity: &Identity,
    ) -> Result<CartRecord, sqlx::Error> {
        let header = self.carts.find_active_cart(tx, identity).await?;

        self.assemble(tx, header).await
    }

    /// The shopper's open cart, locked for the rest of the transaction.
    pub(crate) async fn lock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        identity: &Identity,
    ) -> Result<CartRecord, sqlx::Error> {
        let header = self.carts.lock_active_cart(tx, identity).await?;

        self.assemble(tx, header).await
    }

    /// Persist the cart row. Lines are written by the mutation that changed them.
    pub(crate) async fn save(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        record: &mut CartRecord,
    ) -> Result<(), sqlx::Error> {
        record.updated_at = self.carts.save_cart(tx, record).await?;

        Ok(())
    }

    async fn assemble(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        header: CartHeader,
    ) -> Result<CartRecord, sqlx::Error> {
        let items = self.items.list_cart_items(tx, header.uuid).await?;

        CartRecord::assemble(header, items).map_err(|e| sqlx::Error::Decode(Box::new(e)))
    }
}
