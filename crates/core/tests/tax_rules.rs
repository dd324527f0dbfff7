//! Integration tests for the cascading tax rule engine.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use cartwright::{
    address::Address,
    cart::{Cart, CartUuid, CustomOptions},
    fixtures::{Fixture, FixtureError},
    products::Product,
    tax::{TaxClassUuid, TaxRate, TaxRule, TaxRuleSet, calculate},
};

fn store() -> Result<Fixture, FixtureError> {
    let mut fixture = Fixture::new();

    fixture.load_products("store")?.load_tax("us_cascade")?;

    Ok(fixture)
}

fn san_francisco() -> Address {
    Address::new("US")
        .with_state("CA")
        .with_city("San Francisco")
        .with_postal_code("94107")
}

#[test]
fn no_address_means_no_tax() -> TestResult {
    let fixture = store()?;
    let cart = fixture.cart(&[("lamp", 1), ("book", 2)])?;

    let breakdown = calculate(&cart, None, &fixture.tax_rules(), None)?;

    assert_eq!(breakdown.tax_amount, Money::from_minor(0, USD));
    assert_eq!(breakdown.total, breakdown.subtotal);
    assert!(breakdown.details.is_empty());

    Ok(())
}

#[test]
fn stop_rules_processing_only_affects_its_own_item() -> TestResult {
    let fixture = store()?;
    let cart = fixture.cart(&[("lamp", 1), ("book", 2)])?;

    let breakdown = calculate(&cart, Some(&san_francisco()), &fixture.tax_rules(), None)?;

    let titles: Vec<&str> = breakdown
        .details
        .iter()
        .map(|line| line.title.as_str())
        .collect();

    // The lamp cascades through state and district rates; the book stops
    // after its reduced rate.
    assert_eq!(titles, ["CA State Tax", "SF District Tax", "CA Reduced Tax"]);
    assert_eq!(breakdown.tax_amount, Money::from_minor(8_49, USD));
    assert_eq!(breakdown.total, Money::from_minor(132_49, USD));

    Ok(())
}

#[test]
fn zip_ranges_outside_the_district_are_skipped() -> TestResult {
    let fixture = store()?;
    let cart = fixture.cart(&[("lamp", 1)])?;

    let los_angeles = Address::new("US").with_state("CA").with_postal_code("90001");
    let unparseable = Address::new("US").with_state("CA").with_postal_code("CA-94107");

    let rules = fixture.tax_rules();

    assert_eq!(
        calculate(&cart, Some(&los_angeles), &rules, None)?.tax_amount,
        Money::from_minor(6_00, USD)
    );
    assert_eq!(
        calculate(&cart, Some(&unparseable), &rules, None)?.tax_amount,
        Money::from_minor(6_00, USD)
    );

    Ok(())
}

#[test]
fn untaxed_products_contribute_nothing() -> TestResult {
    let fixture = store()?;
    let cart = fixture.cart(&[("gift_card", 2)])?;

    let breakdown = calculate(&cart, Some(&san_francisco()), &fixture.tax_rules(), None)?;

    assert_eq!(breakdown.tax_amount, Money::from_minor(0, USD));
    assert_eq!(breakdown.total, Money::from_minor(50_00, USD));

    Ok(())
}

#[test]
fn duplicate_titles_are_kept_and_can_be_merged() -> TestResult {
    let fixture = store()?;
    let cart = fixture.cart(&[("lamp", 1), ("dumbbell", 1)])?;

    let breakdown = calculate(&cart, Some(&san_francisco()), &fixture.tax_rules(), None)?;

    assert_eq!(breakdown.details.len(), 4);

    let merged: Vec<(String, Money<'_, _>)> = breakdown
        .merged_details()
        .into_iter()
        .map(|line| (line.title, line.amount))
        .collect();

    assert_eq!(
        merged,
        [
            ("CA State Tax".to_string(), Money::from_minor(7_20, USD)),
            ("SF District Tax".to_string(), Money::from_minor(2_70, USD)),
        ]
    );
    assert_eq!(breakdown.tax_amount, Money::from_minor(9_90, USD));

    Ok(())
}

#[test]
fn per_item_tax_is_reported() -> TestResult {
    let fixture = store()?;
    let cart = fixture.cart(&[("lamp", 1), ("book", 2)])?;

    let breakdown = calculate(&cart, Some(&san_francisco()), &fixture.tax_rules(), None)?;

    let lamp = cart
        .item_for_product(fixture.product("lamp")?.uuid)
        .ok_or("lamp line missing")?;

    assert_eq!(breakdown.items.get(&lamp.uuid), Some(&Money::from_minor(8_25, USD)));

    Ok(())
}

#[test]
fn subtotal_rules_tax_the_whole_cart() -> TestResult {
    let mut fixture = store()?;
    let cart = fixture.cart(&[("lamp", 1), ("book", 2)])?;

    let rate = TaxRate::new("US", Decimal::from(10), "Flat Levy");
    let mut rule = TaxRule::new(fixture.tax_class("reduced"), rate.uuid);

    rule.calculate_subtotal = true;

    let rules = TaxRuleSet::new([rule], [rate]);
    let breakdown = calculate(&cart, Some(&Address::new("US")), &rules, None)?;

    // 10% of the 124.00 subtotal, charged once for the book line.
    assert_eq!(breakdown.tax_amount, Money::from_minor(12_40, USD));

    Ok(())
}

#[test]
fn tax_total_is_rounded_once_from_the_unrounded_sum() -> TestResult {
    let class = TaxClassUuid::new();
    let rate = TaxRate::new("US", Decimal::new(5, 1), "Half Percent");
    let rules = TaxRuleSet::new([TaxRule::new(class, rate.uuid)], [rate]);

    let mut cart = Cart::new(CartUuid::new(), USD);

    for sku in ["PIN-RED", "PIN-BLUE"] {
        let mut pin = Product::new(sku, sku, Money::from_minor(1_00, USD));

        pin.tax_class = Some(class);

        cart.add_item(&pin, 1, CustomOptions::default())?;
    }

    let breakdown = calculate(&cart, Some(&Address::new("US")), &rules, None)?;

    // Each line taxes to 0.005 and displays as 0.01; the total is 0.010.
    assert!(
        breakdown
            .details
            .iter()
            .all(|line| line.amount == Money::from_minor(1, USD)),
        "expected each detail line to display 0.01"
    );
    assert_eq!(breakdown.tax_amount, Money::from_minor(1, USD));

    Ok(())
}

#[test]
fn customer_class_rules_skip_shoppers_without_that_class() -> TestResult {
    let product_class = TaxClassUuid::new();
    let wholesale = TaxClassUuid::new();

    let levy = TaxRate::new("US", Decimal::from(10), "Wholesale Levy");
    let sales = TaxRate::new("US", Decimal::from(5), "Sales Tax");

    let mut wholesale_only = TaxRule::new(product_class, levy.uuid);

    wholesale_only.customer_class = Some(wholesale);
    wholesale_only.stop_rules_processing = true;

    let mut everyone = TaxRule::new(product_class, sales.uuid);

    everyone.position = 1;

    let rules = TaxRuleSet::new([wholesale_only, everyone], [levy, sales]);

    let mut crate_of_pins = Product::new("PIN-BOX", "Pin box", Money::from_minor(100_00, USD));

    crate_of_pins.tax_class = Some(product_class);

    let mut cart = Cart::new(CartUuid::new(), USD);

    cart.add_item(&crate_of_pins, 1, CustomOptions::default())?;

    let us = Address::new("US");

    // Guests carry no customer class: the wholesale levy neither charges
    // them nor stops the general rule behind it.
    let guest = calculate(&cart, Some(&us), &rules, None)?;

    assert_eq!(guest.tax_amount, Money::from_minor(5_00, USD));
    assert_eq!(guest.details.len(), 1);

    let trade = calculate(&cart, Some(&us), &rules, Some(wholesale))?;

    assert_eq!(trade.tax_amount, Money::from_minor(10_00, USD));

    Ok(())
}
