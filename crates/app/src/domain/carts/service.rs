//! Carts service.

use async_trait::async_trait;
use cartwright::{
    address::AddressKind,
    cart::{CartItem, CartItemUuid},
    money,
};
use mockall::automock;
use rusty_money::iso::Currency;
use tracing::{debug, info};

use crate::{
    context::RequestContext,
    database::Db,
    domain::{
        carts::{
            data::{DEFAULT_CURRENCY, NewCartItem},
            errors::{CartsServiceError, or_missing},
            records::{CartRecord, OrderRecord},
            repositories::{PgCartStore, PgOrdersRepository},
        },
        customers::{records::AddressUuid, repositories::PgAddressesRepository},
        products::repository::PgProductsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    store: PgCartStore,
    orders: PgOrdersRepository,
    products: PgProductsRepository,
    addresses: PgAddressesRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            store: PgCartStore::new(),
            orders: PgOrdersRepository::new(),
            products: PgProductsRepository::new(),
            addresses: PgAddressesRepository::new(),
        }
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    #[tracing::instrument(
        name = "carts.service.get_or_create_cart",
        skip(self, ctx),
        fields(tenant_uuid = %ctx.tenant, identity = %ctx.identity),
        err
    )]
    async fn get_or_create_cart(
        &self,
        ctx: &RequestContext,
    ) -> Result<CartRecord, CartsServiceError> {
        let currency = default_currency()?;

        let mut tx = self.db.begin_tenant_transaction(ctx.tenant).await?;

        let created = self
            .store
            .carts
            .ensure_cart(&mut tx, &ctx.identity, currency)
            .await?;

        let record = self.store.find(&mut tx, &ctx.identity).await?;

        tx.commit().await?;

        if created {
            info!(cart_uuid = %record.uuid, "created cart");
        }

        Ok(record)
    }

    #[tracing::instrument(
        name = "carts.service.get_cart",
        skip(self, ctx),
        fields(tenant_uuid = %ctx.tenant, identity = %ctx.identity),
        err
    )]
    async fn get_cart(&self, ctx: &RequestContext) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(ctx.tenant).await?;

        let record = self.store.find(&mut tx, &ctx.identity).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self, ctx, item),
        fields(
            tenant_uuid = %ctx.tenant,
            identity = %ctx.identity,
            product_uuid = %item.product,
            quantity = item.quantity
        ),
        err
    )]
    async fn add_item(
        &self,
        ctx: &RequestContext,
        item: NewCartItem,
    ) -> Result<CartItem, CartsServiceError> {
        let currency = default_currency()?;

        let mut tx = self.db.begin_tenant_transaction(ctx.tenant).await?;

        self.store
            .carts
            .ensure_cart(&mut tx, &ctx.identity, currency)
            .await?;

        let mut record = self.store.lock(&mut tx, &ctx.identity).await?;

        let product = self
            .products
            .get_product(&mut tx, item.product)
            .await
            .map_err(|e| or_missing(e, CartsServiceError::ProductNotFound))?
            .to_product();

        let line = record
            .cart
            .add_item(&product, item.quantity, item.options)?
            .clone();

        self.store
            .items
            .upsert_cart_item(&mut tx, record.uuid, &line)
            .await?;

        self.store.items.clear_cart_tax(&mut tx, record.uuid).await?;

        self.store.save(&mut tx, &mut record).await?;

        tx.commit().await?;

        info!(
            cart_uuid = %record.uuid,
            cart_item_uuid = %line.uuid,
            quantity = line.quantity(),
            "added item to cart"
        );

        Ok(line)
    }

    #[tracing::instrument(
        name = "carts.service.update_item_quantity",
        skip(self, ctx),
        fields(tenant_uuid = %ctx.tenant, identity = %ctx.identity, cart_item_uuid = %item),
        err
    )]
    async fn update_item_quantity(
        &self,
        ctx: &RequestContext,
        item: CartItemUuid,
        quantity: u32,
    ) -> Result<Option<CartItem>, CartsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(ctx.tenant).await?;

        let mut record = self.store.lock(&mut tx, &ctx.identity).await?;

        let updated = record.cart.update_quantity(item, quantity)?.cloned();

        self.store.items.clear_cart_tax(&mut tx, record.uuid).await?;

        match &updated {
            Some(line) => {
                self.store
                    .items
                    .upsert_cart_item(&mut tx, record.uuid, line)
                    .await?;
            }
            None => {
                self.store
                    .items
                    .delete_cart_item(&mut tx, record.uuid, item)
                    .await?;
            }
        }

        self.store.save(&mut tx, &mut record).await?;

        tx.commit().await?;

        debug!(cart_uuid = %record.uuid, quantity, "updated item quantity");

        Ok(updated)
    }

    #[tracing::instrument(
        name = "carts.service.remove_item",
        skip(self, ctx),
        fields(tenant_uuid = %ctx.tenant, identity = %ctx.identity, cart_item_uuid = %item),
        err
    )]
    async fn remove_item(
        &self,
        ctx: &RequestContext,
        item: CartItemUuid,
    ) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(ctx.tenant).await?;

        let mut record = self.store.lock(&mut tx, &ctx.identity).await?;

        record.cart.remove_item(item)?;

        self.store
            .items
            .delete_cart_item(&mut tx, record.uuid, item)
            .await?;

        self.store.items.clear_cart_tax(&mut tx, record.uuid).await?;
        self.store.save(&mut tx, &mut record).await?;

        tx.commit().await?;

        info!(cart_uuid = %record.uuid, "removed item from cart");

        Ok(record)
    }

    #[tracing::instrument(
        name = "carts.service.set_address",
        skip(self, ctx),
        fields(
            tenant_uuid = %ctx.tenant,
            identity = %ctx.identity,
            address_uuid = %address,
            kind = kind.as_str()
        ),
        err
    )]
    async fn set_address(
        &self,
        ctx: &RequestContext,
        address: AddressUuid,
        kind: AddressKind,
    ) -> Result<CartRecord, CartsServiceError> {
        let customer = ctx
            .identity
            .customer()
            .ok_or(CartsServiceError::AddressNotFound)?;

        let mut tx = self.db.begin_tenant_transaction(ctx.tenant).await?;

        let mut record = self.store.lock(&mut tx, &ctx.identity).await?;

        let owned = self
            .addresses
            .get_address(&mut tx, address)
            .await
            .map_err(|e| or_missing(e, CartsServiceError::AddressNotFound))?;

        if owned.customer != customer {
            return Err(CartsServiceError::AddressNotFound);
        }

        match kind {
            AddressKind::Shipping => record.shipping_address = Some(address),
            AddressKind::Billing => record.billing_address = Some(address),
        }

        self.store.save(&mut tx, &mut record).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "carts.service.convert_cart",
        skip(self, ctx),
        fields(tenant_uuid = %ctx.tenant, identity = %ctx.identity),
        err
    )]
    async fn convert_cart(&self, ctx: &RequestContext) -> Result<OrderRecord, CartsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(ctx.tenant).await?;

        let record = self.store.lock(&mut tx, &ctx.identity).await?;

        let order = self.orders.create_order(&mut tx, &record).await?;

        if self.store.carts.convert_cart(&mut tx, record.uuid).await? == 0 {
            return Err(CartsServiceError::NotFound);
        }

        tx.commit().await?;

        info!(cart_uuid = %record.uuid, order_uuid = %order.uuid, "converted cart");

        Ok(order)
    }
}

fn default_currency() -> Result<&'static Currency, CartsServiceError> {
    money::find_currency(DEFAULT_CURRENCY).map_err(|_| CartsServiceError::InvalidData)
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// The shopper's open cart, created empty in the default currency on first use.
    async fn get_or_create_cart(
        &self,
        ctx: &RequestContext,
    ) -> Result<CartRecord, CartsServiceError>;

    /// The shopper's open cart.
    async fn get_cart(&self, ctx: &RequestContext) -> Result<CartRecord, CartsServiceError>;

    /// Add a product, merging quantities when the product is already in the cart.
    async fn add_item(
        &self,
        ctx: &RequestContext,
        item: NewCartItem,
    ) -> Result<CartItem, CartsServiceError>;

    /// Set a line's quantity. Zero removes the line and returns `None`.
    async fn update_item_quantity(
        &self,
        ctx: &RequestContext,
        item: CartItemUuid,
        quantity: u32,
    ) -> Result<Option<CartItem>, CartsServiceError>;

    /// Remove a line from the shopper's cart.
    async fn remove_item(
        &self,
        ctx: &RequestContext,
        item: CartItemUuid,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Attach one of the customer's addresses as the shipping or billing address.
    async fn set_address(
        &self,
        ctx: &RequestContext,
        address: AddressUuid,
        kind: AddressKind,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Place an order for the cart and close it.
    async fn convert_cart(&self, ctx: &RequestContext) -> Result<OrderRecord, CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use cartwright::address::Address;
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::{
        context::RequestContext,
        domain::{
            customers::{CustomersService, data::NewAddress},
            products::data::NewProduct,
        },
        test::TestContext,
    };

    use super::*;

    #[tokio::test]
    async fn get_or_create_cart_returns_the_same_open_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let shopper = RequestContext::guest(ctx.tenant_uuid, "session-1");

        let first = ctx.carts.get_or_create_cart(&shopper).await?;
        let second = ctx.carts.get_or_create_cart(&shopper).await?;

        assert_eq!(first.uuid, second.uuid);
        assert_eq!(first.cart.currency(), USD);
        assert!(first.cart.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn add_item_merges_lines_for_the_same_product() -> TestResult {
        let ctx = TestContext::new().await;
        let shopper = RequestContext::guest(ctx.tenant_uuid, "session-1");
        let product = ctx
            .create_product(NewProduct::new("MUG", "Mug", Money::from_minor(12_50, USD)))
            .await;

        let first = ctx
            .carts
            .add_item(&shopper, NewCartItem::new(product, 1))
            .await?;

        let second = ctx
            .carts
            .add_item(&shopper, NewCartItem::new(product, 2))
            .await?;

        assert_eq!(first.uuid, second.uuid);
        assert_eq!(second.quantity(), 3);

        let record = ctx.carts.get_cart(&shopper).await?;

        assert_eq!(record.cart.len(), 1);
        assert_eq!(record.totals().subtotal, Money::from_minor(37_50, USD));
        assert_eq!(record.totals().grand_total, Money::from_minor(37_50, USD));

        Ok(())
    }

    #[tokio::test]
    async fn add_item_rejects_out_of_stock_products() -> TestResult {
        let ctx = TestContext::new().await;
        let shopper = RequestContext::guest(ctx.tenant_uuid, "session-1");

        let mut product = NewProduct::new("GONE", "Sold Out", Money::from_minor(500, USD));
        product.in_stock = false;

        let product = ctx.create_product(product).await;

        let result = ctx
            .carts
            .add_item(&shopper, NewCartItem::new(product, 1))
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::ProductUnavailable(uuid)) if uuid == product),
            "expected ProductUnavailable, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_item_quantity_to_zero_removes_the_line() -> TestResult {
        let ctx = TestContext::new().await;
        let shopper = RequestContext::guest(ctx.tenant_uuid, "session-1");
        let product = ctx
            .create_product(NewProduct::new("PEN", "Pen", Money::from_minor(2_00, USD)))
            .await;

        let line = ctx
            .carts
            .add_item(&shopper, NewCartItem::new(product, 4))
            .await?;

        let removed = ctx
            .carts
            .update_item_quantity(&shopper, line.uuid, 0)
            .await?;

        assert!(removed.is_none());

        let record = ctx.carts.get_cart(&shopper).await?;

        assert!(record.cart.is_empty());
        assert_eq!(record.totals().subtotal, Money::from_minor(0, USD));

        Ok(())
    }

    #[tokio::test]
    async fn remove_item_from_another_cart_returns_item_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = RequestContext::guest(ctx.tenant_uuid, "session-owner");
        let other = RequestContext::guest(ctx.tenant_uuid, "session-other");
        let product = ctx
            .create_product(NewProduct::new("PEN", "Pen", Money::from_minor(2_00, USD)))
            .await;

        let line = ctx
            .carts
            .add_item(&owner, NewCartItem::new(product, 1))
            .await?;

        ctx.carts.get_or_create_cart(&other).await?;

        let result = ctx.carts.remove_item(&other, line.uuid).await;

        assert!(
            matches!(result, Err(CartsServiceError::ItemNotFound(uuid)) if uuid == line.uuid),
            "expected ItemNotFound, got {result:?}"
        );

        assert_eq!(ctx.carts.get_cart(&owner).await?.cart.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn set_address_rejects_another_customers_address() -> TestResult {
        let ctx = TestContext::new().await;
        let ada = ctx.create_customer("ada@example.com").await;
        let grace = ctx.create_customer("grace@example.com").await;

        let address = ctx
            .customers
            .create_address(
                ctx.tenant_uuid,
                NewAddress {
                    uuid: AddressUuid::new(),
                    customer: grace,
                    address: Address::new("US").with_state("NY"),
                },
            )
            .await?;

        let shopper = RequestContext::customer(ctx.tenant_uuid, ada);

        ctx.carts.get_or_create_cart(&shopper).await?;

        let result = ctx
            .carts
            .set_address(&shopper, address.uuid, AddressKind::Shipping)
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::AddressNotFound)),
            "expected AddressNotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn converted_cart_is_closed_and_replaced_on_next_visit() -> TestResult {
        let ctx = TestContext::new().await;
        let customer = ctx.create_customer("ada@example.com").await;
        let shopper = RequestContext::customer(ctx.tenant_uuid, customer);
        let product = ctx
            .create_product(NewProduct::new("MUG", "Mug", Money::from_minor(12_50, USD)))
            .await;

        ctx.carts
            .add_item(&shopper, NewCartItem::new(product, 2))
            .await?;

        let cart = ctx.carts.get_cart(&shopper).await?;
        let order = ctx.carts.convert_cart(&shopper).await?;

        assert_eq!(order.cart_uuid, cart.uuid);
        assert_eq!(order.customer, Some(customer));
        assert_eq!(order.grand_total, Money::from_minor(25_00, USD));

        let result = ctx.carts.get_cart(&shopper).await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound after conversion, got {result:?}"
        );

        let fresh = ctx.carts.get_or_create_cart(&shopper).await?;

        assert_ne!(fresh.uuid, cart.uuid);
        assert!(fresh.cart.is_empty());

        Ok(())
    }
}
