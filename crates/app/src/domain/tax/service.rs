//! Tax service.

use async_trait::async_trait;
use cartwright::{
    money::zero,
    tax::{self, TaxBreakdown, TaxClass, TaxClassUuid, TaxRate, TaxRule, TaxRuleSet},
};
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::{debug, info};

use crate::{
    context::RequestContext,
    database::Db,
    domain::{
        carts::{records::CartRecord, repositories::PgCartStore},
        customers::repositories::{PgAddressesRepository, PgCustomersRepository},
        tax::{
            errors::TaxServiceError,
            repositories::{PgTaxClassesRepository, PgTaxRatesRepository, PgTaxRulesRepository},
        },
        tenants::records::TenantUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgTaxService {
    db: Db,
    classes: PgTaxClassesRepository,
    rates: PgTaxRatesRepository,
    rules: PgTaxRulesRepository,
    carts: PgCartStore,
    customers: PgCustomersRepository,
    addresses: PgAddressesRepository,
}

impl PgTaxService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            classes: PgTaxClassesRepository::new(),
            rates: PgTaxRatesRepository::new(),
            rules: PgTaxRulesRepository::new(),
            carts: PgCartStore::new(),
            customers: PgCustomersRepository::new(),
            addresses: PgAddressesRepository::new(),
        }
    }

    /// Tax on the cart shipped to its shipping address, if it has one.
    async fn breakdown(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ctx: &RequestContext,
        record: &CartRecord,
    ) -> Result<TaxBreakdown, TaxServiceError> {
        let Some(address) = self
            .addresses
            .find_address(tx, record.shipping_address)
            .await?
        else {
            return Ok(tax::calculate(&record.cart, None, &TaxRuleSet::default(), None)?);
        };

        let customer_class = self.customer_class(tx, ctx).await?;

        let rules = self.rules.list_country_rules(tx, address.country()).await?;
        let rates = self.rates.list_country_rates(tx, address.country()).await?;

        let rule_set = TaxRuleSet::new(rules, rates);

        Ok(tax::calculate(
            &record.cart,
            Some(&address),
            &rule_set,
            customer_class,
        )?)
    }

    async fn customer_class(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ctx: &RequestContext,
    ) -> Result<Option<TaxClassUuid>, TaxServiceError> {
        match ctx.identity.customer() {
            Some(customer) => Ok(self.customers.get_customer(tx, customer).await?.tax_class),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl TaxService for PgTaxService {
    #[tracing::instrument(
        name = "tax.service.create_class",
        skip(self, class),
        fields(tenant_uuid = %tenant, class_uuid = %class.uuid, kind = class.kind.as_str()),
        err
    )]
    async fn create_class(
        &self,
        tenant: TenantUuid,
        class: TaxClass,
    ) -> Result<TaxClass, TaxServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let created = self.classes.create_class(&mut tx, &class).await?;

        tx.commit().await?;

        info!(class_uuid = %created.uuid, "created tax class");

        Ok(created)
    }

    #[tracing::instrument(
        name = "tax.service.create_rate",
        skip(self, rate),
        fields(tenant_uuid = %tenant, rate_uuid = %rate.uuid, country = %rate.country),
        err
    )]
    async fn create_rate(
        &self,
        tenant: TenantUuid,
        rate: TaxRate,
    ) -> Result<TaxRate, TaxServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let created = self.rates.create_rate(&mut tx, &rate).await?;

        tx.commit().await?;

        info!(rate_uuid = %created.uuid, "created tax rate");

        Ok(created)
    }

    #[tracing::instrument(
        name = "tax.service.create_rule",
        skip(self, rule),
        fields(tenant_uuid = %tenant, rule_uuid = %rule.uuid, rate_uuid = %rule.rate_uuid),
        err
    )]
    async fn create_rule(
        &self,
        tenant: TenantUuid,
        rule: TaxRule,
    ) -> Result<TaxRule, TaxServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let created = self.rules.create_rule(&mut tx, &rule).await?;

        tx.commit().await?;

        info!(rule_uuid = %created.uuid, "created tax rule");

        Ok(created)
    }

    #[tracing::instrument(
        name = "tax.service.calculate",
        skip(self, ctx),
        fields(tenant_uuid = %ctx.tenant, identity = %ctx.identity),
        err
    )]
    async fn calculate(&self, ctx: &RequestContext) -> Result<TaxBreakdown, TaxServiceError> {
        let mut tx = self.db.begin_tenant_transaction(ctx.tenant).await?;

        let record = self.carts.find(&mut tx, &ctx.identity).await?;
        let breakdown = self.breakdown(&mut tx, ctx, &record).await?;

        tx.commit().await?;

        debug!(
            cart_uuid = %record.uuid,
            tax_amount = %breakdown.tax_amount,
            "calculated tax"
        );

        Ok(breakdown)
    }

    #[tracing::instrument(
        name = "tax.service.apply_tax",
        skip(self, ctx),
        fields(tenant_uuid = %ctx.tenant, identity = %ctx.identity),
        err
    )]
    async fn apply_tax(&self, ctx: &RequestContext) -> Result<CartRecord, TaxServiceError> {
        let mut tx = self.db.begin_tenant_transaction(ctx.tenant).await?;

        let mut record = self.carts.lock(&mut tx, &ctx.identity).await?;
        let breakdown = self.breakdown(&mut tx, ctx, &record).await?;

        for item in record.cart.items() {
            let item_tax = breakdown
                .items
                .get(&item.uuid)
                .copied()
                .unwrap_or_else(|| zero(record.cart.currency()));

            self.carts
                .items
                .set_item_tax(&mut tx, item.uuid, item_tax)
                .await?;
        }

        record.cart.set_tax(breakdown.tax_amount)?;

        self.carts.save(&mut tx, &mut record).await?;

        let applied = self.carts.find(&mut tx, &ctx.identity).await?;

        tx.commit().await?;

        info!(
            cart_uuid = %applied.uuid,
            tax_amount = %breakdown.tax_amount,
            "applied tax"
        );

        Ok(applied)
    }
}

#[automock]
#[async_trait]
pub trait TaxService: Send + Sync {
    /// Add a product or customer tax class.
    async fn create_class(
        &self,
        tenant: TenantUuid,
        class: TaxClass,
    ) -> Result<TaxClass, TaxServiceError>;

    /// Add a rate for a country, optionally narrowed to a state and zip match.
    async fn create_rate(
        &self,
        tenant: TenantUuid,
        rate: TaxRate,
    ) -> Result<TaxRate, TaxServiceError>;

    /// Link a rate to a product class, and optionally a customer class.
    async fn create_rule(
        &self,
        tenant: TenantUuid,
        rule: TaxRule,
    ) -> Result<TaxRule, TaxServiceError>;

    /// Tax on the shopper's cart for its shipping address. Nothing is stored.
    async fn calculate(&self, ctx: &RequestContext) -> Result<TaxBreakdown, TaxServiceError>;

    /// Calculate tax and store it on the cart and its lines.
    async fn apply_tax(&self, ctx: &RequestContext) -> Result<CartRecord, TaxServiceError>;
}
