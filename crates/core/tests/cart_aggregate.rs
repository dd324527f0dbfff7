//! Integration tests for the cart aggregate and its totals.

use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use cartwright::{
    cart::{AppliedCoupon, CartError, CustomOptions, ShippingSelection},
    fixtures::Fixture,
    shipping::ShippingMethodUuid,
};

fn store() -> Result<Fixture, cartwright::fixtures::FixtureError> {
    let mut fixture = Fixture::new();

    fixture.load_products("store")?;

    Ok(fixture)
}

#[test]
fn re_adding_a_product_keeps_one_line() -> TestResult {
    let fixture = store()?;
    let cart = fixture.load_cart("lamp_and_books")?;

    let lamp = fixture.product("lamp")?;
    let line = cart.item_for_product(lamp.uuid).ok_or("lamp line missing")?;

    assert_eq!(cart.len(), 2);
    assert_eq!(line.quantity(), 2);
    assert_eq!(line.row_total(), Money::from_minor(200_00, USD));
    assert_eq!(cart.totals().subtotal, Money::from_minor(224_00, USD));

    Ok(())
}

#[test]
fn row_totals_track_quantity_changes() -> TestResult {
    let fixture = store()?;
    let mut cart = fixture.cart(&[("book", 1), ("dumbbell", 2)])?;

    let book = fixture.product("book")?.uuid;
    let line = cart.item_for_product(book).ok_or("book line missing")?.uuid;

    cart.update_quantity(line, 5)?;
    cart.add_item(fixture.product("book")?, 2, CustomOptions::default())?;

    for item in cart.items() {
        assert_eq!(
            item.row_total().to_minor_units(),
            item.price.to_minor_units() * i64::from(item.quantity()),
            "row total for {} does not match price × quantity",
            item.sku
        );
    }

    assert_eq!(cart.totals().subtotal, Money::from_minor(124_00, USD));

    Ok(())
}

#[test]
fn inactive_and_out_of_stock_products_are_unavailable() -> TestResult {
    let fixture = store()?;
    let mut cart = fixture.cart(&[])?;

    for key in ["retired", "backorder"] {
        let product = fixture.product(key)?;
        let result = cart.add_item(product, 1, CustomOptions::default());

        assert!(
            matches!(result, Err(CartError::ProductUnavailable(uuid)) if uuid == product.uuid),
            "expected ProductUnavailable for {key}, got {result:?}"
        );
    }

    assert!(cart.is_empty());

    Ok(())
}

#[test]
fn grand_total_is_subtotal_minus_discount_plus_shipping_and_tax() -> TestResult {
    let fixture = store()?;
    let mut cart = fixture.cart(&[("lamp", 1)])?;

    cart.apply_coupon(AppliedCoupon {
        code: "TENOFF".to_string(),
        discount: Money::from_minor(10_00, USD),
        free_shipping: false,
    })?;

    cart.set_shipping(ShippingSelection {
        method_uuid: ShippingMethodUuid::new(),
        name: "Ground".to_string(),
        amount: Money::from_minor(15_00, USD),
    })?;

    cart.set_tax(Money::from_minor(8_25, USD))?;

    assert_eq!(cart.totals().grand_total, Money::from_minor(113_25, USD));

    // Removing and re-adding lines keeps discount and shipping; tax waits
    // to be computed again for the new lines.
    let lamp = fixture.product("lamp")?;
    let line = cart.item_for_product(lamp.uuid).ok_or("lamp line missing")?.uuid;

    cart.remove_item(line)?;
    cart.add_item(lamp, 1, CustomOptions::default())?;

    let totals = cart.totals();

    assert_eq!(totals.subtotal, Money::from_minor(100_00, USD));
    assert_eq!(totals.discount, Money::from_minor(10_00, USD));
    assert_eq!(totals.shipping, Money::from_minor(15_00, USD));
    assert_eq!(totals.tax, Money::from_minor(0, USD));
    assert_eq!(totals.grand_total, Money::from_minor(105_00, USD));

    cart.set_tax(Money::from_minor(8_25, USD))?;

    assert_eq!(cart.totals().grand_total, Money::from_minor(113_25, USD));

    Ok(())
}
