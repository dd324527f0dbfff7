//! Coupons service.

use async_trait::async_trait;
use cartwright::{
    cart::{AppliedCoupon, Cart},
    coupons::{Coupon, CouponRejection, CouponValidation, CouponValidator, CustomerUsage},
};
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::{debug, info};

use crate::{
    context::RequestContext,
    database::Db,
    domain::{
        carts::{
            records::CartRecord,
            repositories::{PgCartStore, PgOrdersRepository},
        },
        coupons::{errors::CouponsServiceError, repository::PgCouponsRepository},
        tenants::records::TenantUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgCouponsService {
    db: Db,
    coupons: PgCouponsRepository,
    carts: PgCartStore,
    orders: PgOrdersRepository,
    validator: CouponValidator,
}

impl PgCouponsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            coupons: PgCouponsRepository::new(),
            carts: PgCartStore::new(),
            orders: PgOrdersRepository::new(),
            validator: CouponValidator::default(),
        }
    }

    /// How often the shopper has ordered with `code`. Guests have no history.
    async fn usage(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ctx: &RequestContext,
        code: &str,
    ) -> Result<CustomerUsage, CouponsServiceError> {
        match ctx.identity.customer() {
            Some(customer) => Ok(CustomerUsage::Orders(
                self.orders.count_coupon_orders(tx, customer, code).await?,
            )),
            None => Ok(CustomerUsage::Guest),
        }
    }
}

/// Whether `cart` already holds `code`. If so, its own counted use is taken
/// off `coupon` so the usage limit does not reject the cart that claimed it.
fn discount_own_use(cart: &Cart, code: &str, coupon: Option<&mut Coupon>) -> bool {
    let holds = cart.coupon().is_some_and(|applied| applied.code == code);

    if holds && let Some(coupon) = coupon {
        coupon.times_used = coupon.times_used.saturating_sub(1);
    }

    holds
}

#[async_trait]
impl CouponsService for PgCouponsService {
    #[tracing::instrument(
        name = "coupons.service.create_coupon",
        skip(self, coupon),
        fields(tenant_uuid = %tenant, coupon_uuid = %coupon.uuid, code = %coupon.code),
        err
    )]
    async fn create_coupon(
        &self,
        tenant: TenantUuid,
        coupon: Coupon,
    ) -> Result<Coupon, CouponsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let created = self.coupons.create_coupon(&mut tx, &coupon).await?;

        tx.commit().await?;

        info!(coupon_uuid = %created.uuid, "created coupon");

        Ok(created)
    }

    #[tracing::instrument(
        name = "coupons.service.validate",
        skip(self, ctx),
        fields(tenant_uuid = %ctx.tenant, identity = %ctx.identity, code = %code),
        err
    )]
    async fn validate(
        &self,
        ctx: &RequestContext,
        code: &str,
    ) -> Result<CouponValidation, CouponsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(ctx.tenant).await?;

        let record = self.carts.find(&mut tx, &ctx.identity).await?;
        let mut coupon = self.coupons.find_coupon(&mut tx, code).await?;
        let usage = self.usage(&mut tx, ctx, code).await?;

        tx.commit().await?;

        discount_own_use(&record.cart, code, coupon.as_mut());

        let validation = self.validator.validate(
            code,
            coupon.as_ref(),
            &record.cart,
            usage,
            Timestamp::now(),
        )?;

        debug!(discount = %validation.discount, "coupon is valid");

        Ok(validation)
    }

    #[tracing::instrument(
        name = "coupons.service.apply_coupon",
        skip(self, ctx),
        fields(tenant_uuid = %ctx.tenant, identity = %ctx.identity, code = %code),
        err
    )]
    async fn apply_coupon(
        &self,
        ctx: &RequestContext,
        code: &str,
    ) -> Result<CartRecord, CouponsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(ctx.tenant).await?;

        let mut record = self.carts.lock(&mut tx, &ctx.identity).await?;
        let mut coupon = self.coupons.lock_coupon(&mut tx, code).await?;
        let usage = self.usage(&mut tx, ctx, code).await?;

        let reapplying = discount_own_use(&record.cart, code, coupon.as_mut());

        let validation = self.validator.validate(
            code,
            coupon.as_ref(),
            &record.cart,
            usage,
            Timestamp::now(),
        )?;

        if !reapplying {
            if let Some(previous) = record.cart.remove_coupon()? {
                self.coupons.release_use(&mut tx, &previous.code).await?;
            }

            if !self.coupons.claim_use(&mut tx, validation.coupon.uuid).await? {
                return Err(CouponRejection::ExpiredOrInactive(validation.coupon.code).into());
            }
        }

        record.cart.apply_coupon(AppliedCoupon {
            code: validation.coupon.code.clone(),
            discount: validation.discount,
            free_shipping: validation.free_shipping,
        })?;

        self.carts.save(&mut tx, &mut record).await?;

        tx.commit().await?;

        info!(
            cart_uuid = %record.uuid,
            coupon_uuid = %validation.coupon.uuid,
            discount = %validation.discount,
            "applied coupon"
        );

        Ok(record)
    }

    #[tracing::instrument(
        name = "coupons.service.remove_coupon",
        skip(self, ctx),
        fields(tenant_uuid = %ctx.tenant, identity = %ctx.identity),
        err
    )]
    async fn remove_coupon(
        &self,
        ctx: &RequestContext,
    ) -> Result<CartRecord, CouponsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(ctx.tenant).await?;

        let mut record = self.carts.lock(&mut tx, &ctx.identity).await?;

        if let Some(removed) = record.cart.remove_coupon()? {
            self.coupons.release_use(&mut tx, &removed.code).await?;
            self.carts.save(&mut tx, &mut record).await?;

            info!(cart_uuid = %record.uuid, code = %removed.code, "removed coupon");
        }

        tx.commit().await?;

        Ok(record)
    }
}

#[automock]
#[async_trait]
pub trait CouponsService: Send + Sync {
    /// Store a new coupon for `tenant`. Codes are unique per tenant.
    async fn create_coupon(
        &self,
        tenant: TenantUuid,
        coupon: Coupon,
    ) -> Result<Coupon, CouponsServiceError>;

    /// Check a code against the shopper's cart without applying it.
    async fn validate(
        &self,
        ctx: &RequestContext,
        code: &str,
    ) -> Result<CouponValidation, CouponsServiceError>;

    /// Validate a code, store its discount on the cart and count one use.
    ///
    /// A different coupon already on the cart is replaced and its use released.
    async fn apply_coupon(
        &self,
        ctx: &RequestContext,
        code: &str,
    ) -> Result<CartRecord, CouponsServiceError>;

    /// Take the coupon off the cart and release its use.
    async fn remove_coupon(
        &self,
        ctx: &RequestContext,
    ) -> Result<CartRecord, CouponsServiceError>;
}

#[cfg(test)]
mod tests {
    use cartwright::{
        categories::CategorySet,
        coupons::{Condition, DiscountType},
        products::ProductUuid,
    };
    use jiff::SignedDuration;
    use rust_decimal::Decimal;
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::{
        domain::{
            carts::{CartsService, data::NewCartItem},
            products::data::NewProduct,
        },
        test::TestContext,
    };

    use super::*;

    /// A $12.50 mug in the kitchen category.
    async fn mug(ctx: &TestContext) -> ProductUuid {
        let mut mug = NewProduct::new("MUG", "Mug", Money::from_minor(12_50, USD));
        mug.categories = vec!["kitchen".to_string()];

        ctx.create_product(mug).await
    }

    async fn cart_with_mugs(
        ctx: &TestContext,
        shopper: &RequestContext,
        quantity: u32,
    ) -> TestResult {
        let mug = mug(ctx).await;

        ctx.carts
            .add_item(shopper, NewCartItem::new(mug, quantity))
            .await?;

        Ok(())
    }

    fn rejection(result: Result<CartRecord, CouponsServiceError>) -> Option<CouponRejection> {
        match result {
            Err(CouponsServiceError::Rejected(rejection)) => Some(rejection),
            _ => None,
        }
    }

    #[tokio::test]
    async fn apply_coupon_discounts_the_cart_and_counts_a_use() -> TestResult {
        let ctx = TestContext::new().await;
        let shopper = RequestContext::guest(ctx.tenant_uuid, "session-1");

        cart_with_mugs(&ctx, &shopper, 4).await?;

        let mut coupon = Coupon::new("SAVE10", DiscountType::Percentage, Decimal::TEN);
        coupon.usage_limit = Some(5);

        ctx.coupons.create_coupon(ctx.tenant_uuid, coupon).await?;

        let record = ctx.coupons.apply_coupon(&shopper, "SAVE10").await?;

        assert_eq!(record.totals().discount, Money::from_minor(5_00, USD));
        assert_eq!(record.totals().grand_total, Money::from_minor(45_00, USD));

        let onlooker = RequestContext::guest(ctx.tenant_uuid, "session-2");

        ctx.carts.get_or_create_cart(&onlooker).await?;

        let validation = ctx.coupons.validate(&onlooker, "SAVE10").await?;

        assert_eq!(validation.coupon.times_used, 1);

        Ok(())
    }

    #[tokio::test]
    async fn validate_does_not_count_the_carts_own_use_against_the_limit() -> TestResult {
        let ctx = TestContext::new().await;
        let shopper = RequestContext::guest(ctx.tenant_uuid, "session-1");
        let other = RequestContext::guest(ctx.tenant_uuid, "session-2");
        let mug = mug(&ctx).await;

        for cart in [&shopper, &other] {
            ctx.carts.add_item(cart, NewCartItem::new(mug, 2)).await?;
        }

        let mut coupon = Coupon::new("ONCE", DiscountType::FixedCart, Decimal::new(5, 0));
        coupon.usage_limit = Some(1);

        ctx.coupons.create_coupon(ctx.tenant_uuid, coupon).await?;
        ctx.coupons.apply_coupon(&shopper, "ONCE").await?;

        let holder = ctx.coupons.validate(&shopper, "ONCE").await?;

        assert_eq!(holder.discount, Money::from_minor(5_00, USD));

        let result = ctx.coupons.validate(&other, "ONCE").await;

        assert!(
            matches!(
                result,
                Err(CouponsServiceError::Rejected(CouponRejection::ExpiredOrInactive(_)))
            ),
            "expected the used-up coupon to be rejected, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn reapplying_the_same_coupon_does_not_count_another_use() -> TestResult {
        let ctx = TestContext::new().await;
        let shopper = RequestContext::guest(ctx.tenant_uuid, "session-1");
        let other = RequestContext::guest(ctx.tenant_uuid, "session-2");
        let mug = mug(&ctx).await;

        for cart in [&shopper, &other] {
            ctx.carts.add_item(cart, NewCartItem::new(mug, 2)).await?;
        }

        let mut coupon = Coupon::new("ONCE", DiscountType::FixedCart, Decimal::new(5, 0));
        coupon.usage_limit = Some(1);

        ctx.coupons.create_coupon(ctx.tenant_uuid, coupon).await?;

        ctx.coupons.apply_coupon(&shopper, "ONCE").await?;
        let record = ctx.coupons.apply_coupon(&shopper, "ONCE").await?;

        assert_eq!(record.totals().discount, Money::from_minor(5_00, USD));

        let result = ctx.coupons.apply_coupon(&other, "ONCE").await;

        assert_eq!(
            rejection(result),
            Some(CouponRejection::ExpiredOrInactive("ONCE".to_string()))
        );

        Ok(())
    }

    #[tokio::test]
    async fn remove_coupon_releases_the_use() -> TestResult {
        let ctx = TestContext::new().await;
        let shopper = RequestContext::guest(ctx.tenant_uuid, "session-1");

        cart_with_mugs(&ctx, &shopper, 2).await?;

        let mut coupon = Coupon::new("ONCE", DiscountType::FixedCart, Decimal::new(5, 0));
        coupon.usage_limit = Some(1);

        ctx.coupons.create_coupon(ctx.tenant_uuid, coupon).await?;
        ctx.coupons.apply_coupon(&shopper, "ONCE").await?;

        let record = ctx.coupons.remove_coupon(&shopper).await?;

        assert!(record.cart.coupon().is_none());
        assert_eq!(record.totals().grand_total, Money::from_minor(25_00, USD));

        let validation = ctx.coupons.validate(&shopper, "ONCE").await?;

        assert_eq!(validation.coupon.times_used, 0);

        Ok(())
    }

    #[tokio::test]
    async fn validate_reports_the_first_failed_check() -> TestResult {
        let ctx = TestContext::new().await;
        let shopper = RequestContext::guest(ctx.tenant_uuid, "session-1");

        cart_with_mugs(&ctx, &shopper, 1).await?;

        let mut expired = Coupon::new("OLD", DiscountType::Percentage, Decimal::TEN);
        expired.valid_to = Some(Timestamp::now() - SignedDuration::from_hours(24));

        let mut big_spender = Coupon::new("BIG", DiscountType::Percentage, Decimal::TEN);
        big_spender.minimum_order_amount = Some(Decimal::new(100, 0));

        let mut garden = Coupon::new("GARDEN", DiscountType::Percentage, Decimal::TEN);
        garden.conditions = Some(Condition::CategoryIn {
            categories: CategorySet::new(vec!["garden".to_string()]),
        });

        for coupon in [expired, big_spender, garden] {
            ctx.coupons.create_coupon(ctx.tenant_uuid, coupon).await?;
        }

        let missing = ctx.coupons.validate(&shopper, "NOPE").await;
        let old = ctx.coupons.validate(&shopper, "OLD").await;
        let big = ctx.coupons.validate(&shopper, "BIG").await;
        let conditional = ctx.coupons.validate(&shopper, "GARDEN").await;

        assert!(matches!(
            missing,
            Err(CouponsServiceError::Rejected(CouponRejection::NotFound(_)))
        ));
        assert!(matches!(
            old,
            Err(CouponsServiceError::Rejected(CouponRejection::ExpiredOrInactive(_)))
        ));
        assert!(matches!(
            big,
            Err(CouponsServiceError::Rejected(CouponRejection::MinimumOrderNotMet { .. }))
        ));
        assert!(matches!(
            conditional,
            Err(CouponsServiceError::Rejected(CouponRejection::ConditionsNotMet(_)))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn per_customer_limit_counts_previous_orders() -> TestResult {
        let ctx = TestContext::new().await;
        let customer = ctx.create_customer("ada@example.com").await;
        let shopper = RequestContext::customer(ctx.tenant_uuid, customer);

        let mut coupon = Coupon::new("WELCOME", DiscountType::FixedCart, Decimal::new(5, 0));
        coupon.usage_per_customer = Some(1);

        ctx.coupons.create_coupon(ctx.tenant_uuid, coupon).await?;

        cart_with_mugs(&ctx, &shopper, 2).await?;
        ctx.coupons.apply_coupon(&shopper, "WELCOME").await?;
        ctx.carts.convert_cart(&shopper).await?;

        ctx.carts.get_or_create_cart(&shopper).await?;

        let result = ctx.coupons.validate(&shopper, "WELCOME").await;

        assert!(
            matches!(
                result,
                Err(CouponsServiceError::Rejected(
                    CouponRejection::PerCustomerLimitReached { limit: 1, .. }
                ))
            ),
            "expected PerCustomerLimitReached, got {result:?}"
        );

        Ok(())
    }
}
