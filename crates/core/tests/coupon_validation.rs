//! Integration tests for coupon validation and discount pricing.

use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use cartwright::{
    cart::{AppliedCoupon, ShippingSelection},
    coupons::{CouponRejection, CouponValidator, CustomerUsage, TreeEvaluator},
    fixtures::{Fixture, FixtureError},
    shipping::ShippingMethodUuid,
};

fn store() -> Result<Fixture, FixtureError> {
    let mut fixture = Fixture::new();

    fixture.load_products("store")?.load_coupons("launch")?;

    Ok(fixture)
}

fn validator() -> CouponValidator<TreeEvaluator> {
    CouponValidator::default()
}

#[test]
fn ten_percent_off_one_hundred_dollars() -> TestResult {
    let fixture = store()?;
    let mut cart = fixture.cart(&[("lamp", 1)])?;

    let validation = validator().validate(
        "TENOFF",
        Some(fixture.coupon("TENOFF")?),
        &cart,
        CustomerUsage::Guest,
        Timestamp::now(),
    )?;

    assert_eq!(validation.discount, Money::from_minor(10_00, USD));

    cart.apply_coupon(AppliedCoupon {
        code: validation.coupon.code.clone(),
        discount: validation.discount,
        free_shipping: validation.free_shipping,
    })?;

    cart.set_shipping(ShippingSelection {
        method_uuid: ShippingMethodUuid::new(),
        name: "Ground".to_string(),
        amount: Money::from_minor(15_00, USD),
    })?;

    cart.set_tax(Money::from_minor(7_43, USD))?;

    // 100 - 10 + 15 + 7.43
    assert_eq!(cart.totals().grand_total, Money::from_minor(112_43, USD));

    Ok(())
}

#[test]
fn forty_dollar_cart_misses_the_fifty_dollar_minimum() -> TestResult {
    let fixture = store()?;
    let cart = fixture.cart(&[("dumbbell", 2)])?;

    let result = validator().validate(
        "BIGSPEND",
        Some(fixture.coupon("BIGSPEND")?),
        &cart,
        CustomerUsage::Guest,
        Timestamp::now(),
    );

    let Err(rejection) = result else {
        return Err(format!("expected a rejection, got {result:?}").into());
    };

    assert_eq!(
        rejection,
        CouponRejection::MinimumOrderNotMet {
            minimum: Decimal::from(50),
            currency: "USD",
        }
    );
    assert!(
        rejection.to_string().contains("50.00 USD"),
        "message should name the minimum: {rejection}"
    );

    Ok(())
}

#[test]
fn exhausted_or_expired_coupons_are_rejected() -> TestResult {
    let fixture = store()?;
    let cart = fixture.cart(&[("lamp", 1)])?;

    for code in ["SOLDOUT", "EXPIRED"] {
        let result = validator().validate(
            code,
            Some(fixture.coupon(code)?),
            &cart,
            CustomerUsage::Guest,
            Timestamp::now(),
        );

        assert_eq!(
            result,
            Err(CouponRejection::ExpiredOrInactive(code.to_string())),
            "{code} should be expired or inactive"
        );
    }

    Ok(())
}

#[test]
fn discount_never_exceeds_cap_or_subtotal() -> TestResult {
    let fixture = store()?;

    let carts = [
        fixture.cart(&[("lamp", 1)])?,
        fixture.cart(&[("sticker", 5)])?,
        fixture.cart(&[("book", 3), ("sticker", 1)])?,
    ];

    for code in ["TENOFF", "CAPPED", "PERUNIT", "SHIPFREE"] {
        let coupon = fixture.coupon(code)?;

        for cart in &carts {
            let discount = coupon.discount_for(cart);

            assert!(
                discount.amount() <= cart.totals().subtotal.amount(),
                "{code} discount {discount} exceeds subtotal"
            );

            if let Some(maximum) = coupon.maximum_discount_amount {
                assert!(
                    *discount.amount() <= maximum,
                    "{code} discount {discount} exceeds maximum {maximum}"
                );
            }
        }
    }

    Ok(())
}

#[test]
fn per_unit_discount_is_clamped_to_the_subtotal() -> TestResult {
    let fixture = store()?;
    let cart = fixture.cart(&[("sticker", 5)])?;

    let discount = fixture.coupon("PERUNIT")?.discount_for(&cart);

    assert_eq!(discount, Money::from_minor(5_00, USD));

    Ok(())
}

#[test]
fn capped_percentage_discount() -> TestResult {
    let fixture = store()?;
    let cart = fixture.cart(&[("lamp", 1)])?;

    assert_eq!(
        fixture.coupon("CAPPED")?.discount_for(&cart),
        Money::from_minor(20_00, USD)
    );

    Ok(())
}

#[test]
fn conditions_and_customer_history_are_checked_in_order() -> TestResult {
    let fixture = store()?;
    let readers = fixture.coupon("READERS")?;

    let two_books = fixture.cart(&[("book", 2)])?;
    let one_book = fixture.cart(&[("book", 1)])?;

    let first_use = validator().validate(
        "READERS",
        Some(readers),
        &two_books,
        CustomerUsage::Orders(0),
        Timestamp::now(),
    )?;

    assert_eq!(first_use.discount, Money::from_minor(4_80, USD));

    let repeat = validator().validate(
        "READERS",
        Some(readers),
        &two_books,
        CustomerUsage::Orders(1),
        Timestamp::now(),
    );

    assert!(
        matches!(repeat, Err(CouponRejection::PerCustomerLimitReached { limit: 1, .. })),
        "expected PerCustomerLimitReached, got {repeat:?}"
    );

    let too_few = validator().validate(
        "READERS",
        Some(readers),
        &one_book,
        CustomerUsage::Guest,
        Timestamp::now(),
    );

    assert_eq!(
        too_few,
        Err(CouponRejection::ConditionsNotMet("READERS".to_string()))
    );

    Ok(())
}

#[test]
fn free_shipping_coupon_zeroes_the_shipping_charge() -> TestResult {
    let fixture = store()?;
    let mut cart = fixture.cart(&[("dumbbell", 1)])?;

    cart.set_shipping(ShippingSelection {
        method_uuid: ShippingMethodUuid::new(),
        name: "Ground".to_string(),
        amount: Money::from_minor(15_00, USD),
    })?;

    let validation = validator().validate(
        "SHIPFREE",
        Some(fixture.coupon("SHIPFREE")?),
        &cart,
        CustomerUsage::Guest,
        Timestamp::now(),
    )?;

    cart.apply_coupon(AppliedCoupon {
        code: validation.coupon.code,
        discount: validation.discount,
        free_shipping: validation.free_shipping,
    })?;

    assert_eq!(cart.totals().shipping, Money::from_minor(0, USD));
    assert_eq!(cart.totals().grand_total, Money::from_minor(20_00, USD));

    Ok(())
}

#[test]
fn unknown_code_is_not_found() -> TestResult {
    let fixture = store()?;
    let cart = fixture.cart(&[("lamp", 1)])?;

    let result = validator().validate(
        "MISSING",
        fixture.coupon("MISSING").ok(),
        &cart,
        CustomerUsage::Guest,
        Timestamp::now(),
    );

    assert_eq!(result, Err(CouponRejection::NotFound("MISSING".to_string())));

    Ok(())
}
