//! Shipping service.

use async_trait::async_trait;
use cartwright::{
    address::Address,
    cart::ShippingSelection,
    shipping::{
        self, ShippingMethod, ShippingMethodUuid, ShippingOption, ShippingRate,
        routes::{self, RouteTariff, ShippingRoute},
    },
};
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::{debug, info};

use crate::{
    context::RequestContext,
    database::Db,
    domain::{
        carts::{records::CartRecord, repositories::PgCartStore},
        customers::repositories::PgAddressesRepository,
        shipping::{
            errors::ShippingServiceError,
            repositories::{
                PgShippingMethodsRepository, PgShippingRatesRepository, PgShippingRoutesRepository,
            },
        },
        tenants::records::TenantUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgShippingService {
    db: Db,
    methods: PgShippingMethodsRepository,
    rates: PgShippingRatesRepository,
    routes: PgShippingRoutesRepository,
    carts: PgCartStore,
    addresses: PgAddressesRepository,
}

impl PgShippingService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            methods: PgShippingMethodsRepository::new(),
            rates: PgShippingRatesRepository::new(),
            routes: PgShippingRoutesRepository::new(),
            carts: PgCartStore::new(),
            addresses: PgAddressesRepository::new(),
        }
    }

    /// The cart's shipping address.
    async fn destination(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        record: &CartRecord,
    ) -> Result<Address, ShippingServiceError> {
        self.addresses
            .find_address(tx, record.shipping_address)
            .await?
            .ok_or(ShippingServiceError::AddressRequired)
    }

    async fn quote_record(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        record: &CartRecord,
    ) -> Result<Vec<ShippingOption>, ShippingServiceError> {
        let address = self.destination(tx, record).await?;

        let methods = self.methods.list_methods(tx).await?;
        let rates = self.rates.list_country_rates(tx, address.country()).await?;

        Ok(shipping::quote(&methods, &rates, &record.cart, &address))
    }
}

#[async_trait]
impl ShippingService for PgShippingService {
    #[tracing::instrument(
        name = "shipping.service.create_method",
        skip(self, method),
        fields(tenant_uuid = %tenant, method_uuid = %method.uuid, code = %method.code),
        err
    )]
    async fn create_method(
        &self,
        tenant: TenantUuid,
        method: ShippingMethod,
    ) -> Result<ShippingMethod, ShippingServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let created = self.methods.create_method(&mut tx, &method).await?;

        tx.commit().await?;

        info!(method_uuid = %created.uuid, "created shipping method");

        Ok(created)
    }

    #[tracing::instrument(
        name = "shipping.service.list_methods",
        skip(self),
        fields(tenant_uuid = %tenant),
        err
    )]
    async fn list_methods(
        &self,
        tenant: TenantUuid,
    ) -> Result<Vec<ShippingMethod>, ShippingServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let methods = self.methods.list_methods(&mut tx).await?;

        tx.commit().await?;

        Ok(methods)
    }

    #[tracing::instrument(
        name = "shipping.service.create_rate",
        skip(self, rate),
        fields(tenant_uuid = %tenant, method_uuid = %rate.method_uuid, rate_uuid = %rate.uuid),
        err
    )]
    async fn create_rate(
        &self,
        tenant: TenantUuid,
        rate: ShippingRate,
    ) -> Result<ShippingRate, ShippingServiceError> {
        let rate = rate.normalized();

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        self.methods.lock_method(&mut tx, rate.method_uuid).await?;

        let existing = self.rates.list_method_rates(&mut tx, rate.method_uuid).await?;

        shipping::validate_rate(&existing, &rate)?;

        let created = self.rates.create_rate(&mut tx, &rate).await?;

        tx.commit().await?;

        info!(rate_uuid = %created.uuid, "created shipping rate");

        Ok(created)
    }

    #[tracing::instrument(
        name = "shipping.service.create_route",
        skip(self, route),
        fields(tenant_uuid = %tenant, route_uuid = %route.uuid),
        err
    )]
    async fn create_route(
        &self,
        tenant: TenantUuid,
        route: ShippingRoute,
    ) -> Result<ShippingRoute, ShippingServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let created = self.routes.create_route(&mut tx, &route).await?;

        tx.commit().await?;

        info!(route_uuid = %created.uuid, "created shipping route");

        Ok(created)
    }

    #[tracing::instrument(
        name = "shipping.service.set_tariff",
        skip(self, tariff),
        fields(
            tenant_uuid = %tenant,
            method_uuid = %tariff.method_uuid,
            route_uuid = %tariff.route_uuid
        ),
        err
    )]
    async fn set_tariff(
        &self,
        tenant: TenantUuid,
        tariff: RouteTariff,
    ) -> Result<RouteTariff, ShippingServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let stored = self.routes.upsert_tariff(&mut tx, &tariff).await?;

        tx.commit().await?;

        Ok(stored)
    }

    #[tracing::instrument(
        name = "shipping.service.quote",
        skip(self, ctx),
        fields(tenant_uuid = %ctx.tenant, identity = %ctx.identity),
        err
    )]
    async fn quote(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<ShippingOption>, ShippingServiceError> {
        let mut tx = self.db.begin_tenant_transaction(ctx.tenant).await?;

        let record = self.carts.find(&mut tx, &ctx.identity).await?;
        let options = self.quote_record(&mut tx, &record).await?;

        tx.commit().await?;

        debug!(cart_uuid = %record.uuid, options = options.len(), "quoted shipping");

        Ok(options)
    }

    #[tracing::instrument(
        name = "shipping.service.quote_routes",
        skip(self, ctx),
        fields(tenant_uuid = %ctx.tenant, identity = %ctx.identity),
        err
    )]
    async fn quote_routes(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<ShippingOption>, ShippingServiceError> {
        let mut tx = self.db.begin_tenant_transaction(ctx.tenant).await?;

        let record = self.carts.find(&mut tx, &ctx.identity).await?;
        let address = self.destination(&mut tx, &record).await?;

        let methods = self.methods.list_methods(&mut tx).await?;
        let served = self
            .routes
            .list_destination_routes(&mut tx, address.country())
            .await?;
        let tariffs = self
            .routes
            .list_destination_tariffs(&mut tx, address.country())
            .await?;

        tx.commit().await?;

        Ok(routes::quote_routes(
            &methods,
            &served,
            &tariffs,
            &record.cart,
            &address,
        ))
    }

    #[tracing::instrument(
        name = "shipping.service.set_shipping_method",
        skip(self, ctx),
        fields(tenant_uuid = %ctx.tenant, identity = %ctx.identity, method_uuid = %method),
        err
    )]
    async fn set_shipping_method(
        &self,
        ctx: &RequestContext,
        method: ShippingMethodUuid,
    ) -> Result<CartRecord, ShippingServiceError> {
        let mut tx = self.db.begin_tenant_transaction(ctx.tenant).await?;

        let mut record = self.carts.lock(&mut tx, &ctx.identity).await?;
        let options = self.quote_record(&mut tx, &record).await?;

        let chosen = shipping::select(&options, method)?;

        record.cart.set_shipping(ShippingSelection {
            method_uuid: chosen.method_uuid,
            name: chosen.name.clone(),
            amount: chosen.price,
        })?;

        self.carts.save(&mut tx, &mut record).await?;

        tx.commit().await?;

        info!(
            cart_uuid = %record.uuid,
            shipping = %record.totals().shipping,
            "set shipping method"
        );

        Ok(record)
    }
}

#[automock]
#[async_trait]
pub trait ShippingService: Send + Sync {
    /// Add a shipping method to the tenant's catalog.
    async fn create_method(
        &self,
        tenant: TenantUuid,
        method: ShippingMethod,
    ) -> Result<ShippingMethod, ShippingServiceError>;

    /// All shipping methods in display order.
    async fn list_methods(
        &self,
        tenant: TenantUuid,
    ) -> Result<Vec<ShippingMethod>, ShippingServiceError>;

    /// Add a rate row, rejecting rows that tie with an existing one.
    async fn create_rate(
        &self,
        tenant: TenantUuid,
        rate: ShippingRate,
    ) -> Result<ShippingRate, ShippingServiceError>;

    /// Add a named corridor for route tariffs.
    async fn create_route(
        &self,
        tenant: TenantUuid,
        route: ShippingRoute,
    ) -> Result<ShippingRoute, ShippingServiceError>;

    /// Set a method's tariff on a route.
    async fn set_tariff(
        &self,
        tenant: TenantUuid,
        tariff: RouteTariff,
    ) -> Result<RouteTariff, ShippingServiceError>;

    /// Price the shopper's cart against every active method's rate table.
    async fn quote(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<ShippingOption>, ShippingServiceError>;

    /// Price the shopper's cart over route tariffs. Informational only.
    async fn quote_routes(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<ShippingOption>, ShippingServiceError>;

    /// Charge the cart for a quoted method.
    async fn set_shipping_method(
        &self,
        ctx: &RequestContext,
        method: ShippingMethodUuid,
    ) -> Result<CartRecord, ShippingServiceError>;
}
