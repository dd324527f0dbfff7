use std::io;

use cartwright::coupons::CouponValidation;
use cartwright_app::{
    context::RequestContext,
    domain::coupons::{CouponsService, CouponsServiceError},
};
use clap::Args;

use crate::cli::{
    args::{DatabaseArgs, ShopperArgs},
    render,
};

#[derive(Debug, Args)]
pub(crate) struct ValidateCouponArgs {
    /// Coupon code as typed by the shopper
    #[arg(long)]
    code: String,

    #[command(flatten)]
    shopper: ShopperArgs,

    #[command(flatten)]
    database: DatabaseArgs,
}

pub(crate) async fn run(args: ValidateCouponArgs) -> Result<(), String> {
    let ctx = args.shopper.context()?;
    let app = args.database.connect().await?;

    execute(app.coupons.as_ref(), &ctx, &args.code, &mut io::stdout()).await
}

async fn execute(
    service: &dyn CouponsService,
    ctx: &RequestContext,
    code: &str,
    out: &mut impl io::Write,
) -> Result<(), String> {
    let validation = service.validate(ctx, code).await.map_err(|error| match error {
        CouponsServiceError::Rejected(rejection) => format!("coupon rejected: {rejection}"),
        other => format!("failed to validate coupon: {other}"),
    })?;

    write_validation(out, &validation).map_err(render::io_error)
}

fn write_validation(out: &mut impl io::Write, validation: &CouponValidation) -> io::Result<()> {
    render::write_summary(
        out,
        &[
            ("Coupon", validation.coupon.code.clone()),
            ("Discount", render::money(&validation.discount)),
            (
                "Free shipping",
                if validation.free_shipping { "yes" } else { "no" }.to_string(),
            ),
        ],
    )
}

#[cfg(test)]
mod tests {
    use cartwright::coupons::{Coupon, CouponRejection, DiscountType};
    use cartwright_app::domain::{coupons::MockCouponsService, tenants::records::TenantUuid};
    use rust_decimal::Decimal;
    use rusty_money::{Money, iso};
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn prints_the_discount() -> TestResult {
        let ctx = RequestContext::guest(TenantUuid::new(), "session-1");

        let validation = CouponValidation {
            coupon: Coupon::new("SAVE10", DiscountType::Percentage, Decimal::TEN),
            discount: Money::from_minor(250, iso::USD),
            free_shipping: false,
        };

        let mut service = MockCouponsService::new();

        service
            .expect_validate()
            .once()
            .withf(|_, code| code == "save10")
            .return_once(move |_, _| Ok(validation));

        let mut out = Vec::new();

        execute(&service, &ctx, "save10", &mut out).await?;

        assert_eq!(
            String::from_utf8(out)?,
            "Coupon         SAVE10\nDiscount       $2.50\nFree shipping  no\n"
        );

        Ok(())
    }

    #[tokio::test]
    async fn rejection_reason_is_reported() {
        let ctx = RequestContext::guest(TenantUuid::new(), "session-1");

        let mut service = MockCouponsService::new();

        service.expect_validate().once().return_once(|_, code| {
            Err(CouponRejection::NotFound(code.to_string()).into())
        });

        let result = execute(&service, &ctx, "NOPE", &mut Vec::new()).await;

        assert_eq!(
            result,
            Err("coupon rejected: coupon code NOPE was not found".to_string())
        );
    }
}
