//! Cart
//!
//! The cart aggregate: line items, the chosen shipping method, an applied
//! coupon and the tax last computed for it. Every mutation re-runs the totals
//! assembler so [`Cart::totals`] always reflects the current state. Changing
//! the lines discards the recorded tax until it is computed again.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    categories::CategorySet,
    money::{times, zero},
    products::{Product, ProductUuid},
    shipping::ShippingMethodUuid,
    tax::TaxClassUuid,
    totals::Totals,
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<Cart>;

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItem>;

/// Free-form per-line options captured at add time (engraving text, size, ...).
pub type CustomOptions = FxHashMap<String, String>;

/// Errors raised by cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product is inactive or out of stock.
    #[error("product {0} is inactive or out of stock")]
    ProductUnavailable(ProductUuid),

    /// No line with this UUID exists in the cart.
    #[error("cart item {0} not found")]
    ItemNotFound(CartItemUuid),

    /// Two lines reference the same product.
    #[error("product {0} appears on more than one cart line")]
    DuplicateProduct(ProductUuid),

    /// Quantities must be at least one.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// A price is in a different currency than the cart (price currency, cart currency).
    #[error("price currency {0} does not match cart currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// A line total does not fit in minor units.
    #[error("line total overflowed")]
    Overflow,

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A cart line: a snapshot of the product at add time plus live shipping/tax attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    /// Line identifier
    pub uuid: CartItemUuid,

    /// Product this line was created from
    pub product_uuid: ProductUuid,

    /// SKU at add time
    pub sku: String,

    /// Product name at add time
    pub name: String,

    /// Unit price at add time
    pub price: Money<'static, Currency>,

    /// Product weight in kilograms
    pub weight: Option<Decimal>,

    /// Product volume in cubic metres
    pub volume: Option<Decimal>,

    /// Product tax class
    pub tax_class: Option<TaxClassUuid>,

    /// Product categories
    pub categories: CategorySet,

    /// Tax attributed to this line, when known
    pub tax_amount: Option<Money<'static, Currency>>,

    /// Discount attributed to this line, when known
    pub discount_amount: Option<Money<'static, Currency>>,

    /// Custom options payload
    pub options: CustomOptions,

    quantity: u32,
    row_total: Money<'static, Currency>,
}

impl CartItem {
    /// Create a line with the given snapshot values.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`] when `quantity` is zero.
    /// - [`CartError::Overflow`] when `price × quantity` does not fit.
    pub fn new(
        uuid: CartItemUuid,
        product_uuid: ProductUuid,
        sku: &str,
        name: &str,
        price: Money<'static, Currency>,
        quantity: u32,
    ) -> Result<Self, CartError> {
        let row_total = line_total(&price, quantity)?;

        Ok(Self {
            uuid,
            product_uuid,
            sku: sku.to_string(),
            name: name.to_string(),
            price,
            weight: None,
            volume: None,
            tax_class: None,
            categories: CategorySet::default(),
            tax_amount: None,
            discount_amount: None,
            options: CustomOptions::default(),
            quantity,
            row_total,
        })
    }

    /// Snapshot a product into a new line.
    ///
    /// # Errors
    ///
    /// See [`CartItem::new`].
    pub fn from_product(
        product: &Product,
        quantity: u32,
        options: CustomOptions,
    ) -> Result<Self, CartError> {
        let mut item = Self::new(
            CartItemUuid::new(),
            product.uuid,
            &product.sku,
            &product.name,
            product.price,
            quantity,
        )?;

        item.weight = product.weight;
        item.volume = product.volume;
        item.tax_class = product.tax_class;
        item.categories = product.categories.clone();
        item.options = options;

        Ok(item)
    }

    /// Units on this line.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `price × quantity`
    pub fn row_total(&self) -> Money<'static, Currency> {
        self.row_total
    }

    /// Weight of the whole line; products without a weight count as zero.
    pub fn line_weight(&self) -> Decimal {
        self.weight.unwrap_or_default() * Decimal::from(self.quantity)
    }

    /// Volume of the whole line; products without a volume count as zero.
    pub fn line_volume(&self) -> Decimal {
        self.volume.unwrap_or_default() * Decimal::from(self.quantity)
    }

    fn set_quantity(&mut self, quantity: u32) -> Result<(), CartError> {
        self.row_total = line_total(&self.price, quantity)?;
        self.quantity = quantity;

        Ok(())
    }
}

fn line_total(
    price: &Money<'static, Currency>,
    quantity: u32,
) -> Result<Money<'static, Currency>, CartError> {
    if quantity == 0 {
        return Err(CartError::InvalidQuantity);
    }

    times(price, quantity).ok_or(CartError::Overflow)
}

/// The shipping method chosen for a cart and the amount it was quoted at.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingSelection {
    /// Chosen method
    pub method_uuid: ShippingMethodUuid,

    /// Method name at selection time
    pub name: String,

    /// Quoted amount
    pub amount: Money<'static, Currency>,
}

/// A coupon applied to a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedCoupon {
    /// Coupon code
    pub code: String,

    /// Discount granted at apply time
    pub discount: Money<'static, Currency>,

    /// Whether the coupon waives shipping
    pub free_shipping: bool,
}

/// Cart aggregate
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    uuid: CartUuid,
    currency: &'static Currency,
    items: Vec<CartItem>,
    shipping: Option<ShippingSelection>,
    coupon: Option<AppliedCoupon>,
    tax: Money<'static, Currency>,
    totals: Totals,
}

impl Cart {
    /// Create an empty cart.
    pub fn new(uuid: CartUuid, currency: &'static Currency) -> Self {
        Self {
            uuid,
            currency,
            items: Vec::new(),
            shipping: None,
            coupon: None,
            tax: zero(currency),
            totals: Totals::zero(currency),
        }
    }

    /// Rebuild a cart from previously persisted lines.
    ///
    /// # Errors
    ///
    /// - [`CartError::CurrencyMismatch`] when a line is priced in another currency.
    /// - [`CartError::DuplicateProduct`] when two lines share a product.
    pub fn with_items(
        uuid: CartUuid,
        currency: &'static Currency,
        items: impl Into<Vec<CartItem>>,
    ) -> Result<Self, CartError> {
        let items = items.into();

        for (idx, item) in items.iter().enumerate() {
            ensure_currency(&item.price, currency)?;

            if items
                .iter()
                .skip(idx + 1)
                .any(|other| other.product_uuid == item.product_uuid)
            {
                return Err(CartError::DuplicateProduct(item.product_uuid));
            }
        }

        let mut cart = Self::new(uuid, currency);

        cart.items = items;
        cart.recalculate_totals()?;

        Ok(cart)
    }

    /// Add a product, merging into an existing line for the same product.
    ///
    /// # Errors
    ///
    /// - [`CartError::ProductUnavailable`] for inactive or out-of-stock products.
    /// - [`CartError::InvalidQuantity`] when `quantity` is zero.
    /// - [`CartError::CurrencyMismatch`] when the product is priced in another currency.
    /// - [`CartError::Overflow`] when the new line total does not fit.
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: u32,
        options: CustomOptions,
    ) -> Result<&CartItem, CartError> {
        if !product.is_purchasable() {
            return Err(CartError::ProductUnavailable(product.uuid));
        }

        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        ensure_currency(&product.price, self.currency)?;

        let idx = if let Some(idx) = self
            .items
            .iter()
            .position(|item| item.product_uuid == product.uuid)
        {
            let merged = self
                .items
                .get(idx)
                .map(CartItem::quantity)
                .and_then(|existing| existing.checked_add(quantity))
                .ok_or(CartError::Overflow)?;

            if let Some(item) = self.items.get_mut(idx) {
                item.set_quantity(merged)?;
            }

            idx
        } else {
            self.items
                .push(CartItem::from_product(product, quantity, options)?);

            self.items.len() - 1
        };

        self.clear_tax();
        self.recalculate_totals()?;

        self.items.get(idx).ok_or(CartError::Overflow)
    }

    /// Set a line's quantity; zero removes the line.
    ///
    /// Returns the updated line, or `None` when it was removed.
    ///
    /// # Errors
    ///
    /// - [`CartError::ItemNotFound`] when the line is not in this cart.
    /// - [`CartError::Overflow`] when the new line total does not fit.
    pub fn update_quantity(
        &mut self,
        item: CartItemUuid,
        quantity: u32,
    ) -> Result<Option<&CartItem>, CartError> {
        if quantity == 0 {
            self.remove_item(item)?;

            return Ok(None);
        }

        let idx = self.position(item)?;

        if let Some(line) = self.items.get_mut(idx) {
            line.set_quantity(quantity)?;
        }

        self.clear_tax();
        self.recalculate_totals()?;

        Ok(self.items.get(idx))
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] when the line is not in this cart.
    pub fn remove_item(&mut self, item: CartItemUuid) -> Result<CartItem, CartError> {
        let idx = self.position(item)?;
        let removed = self.items.remove(idx);

        self.clear_tax();
        self.recalculate_totals()?;

        Ok(removed)
    }

    /// Record the chosen shipping method.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] when the amount is in another currency.
    pub fn set_shipping(&mut self, selection: ShippingSelection) -> Result<&Totals, CartError> {
        ensure_currency(&selection.amount, self.currency)?;

        self.shipping = Some(selection);
        self.recalculate_totals()
    }

    /// Forget the chosen shipping method.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] when totals cannot be recomputed.
    pub fn clear_shipping(&mut self) -> Result<&Totals, CartError> {
        self.shipping = None;
        self.recalculate_totals()
    }

    /// Record an applied coupon and its discount.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] when the discount is in another currency.
    pub fn apply_coupon(&mut self, coupon: AppliedCoupon) -> Result<&Totals, CartError> {
        ensure_currency(&coupon.discount, self.currency)?;

        self.coupon = Some(coupon);
        self.recalculate_totals()
    }

    /// Remove the applied coupon, returning it.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] when totals cannot be recomputed.
    pub fn remove_coupon(&mut self) -> Result<Option<AppliedCoupon>, CartError> {
        let removed = self.coupon.take();

        self.recalculate_totals()?;

        Ok(removed)
    }

    /// Record the tax computed for this cart.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] when the amount is in another currency.
    pub fn set_tax(&mut self, tax: Money<'static, Currency>) -> Result<&Totals, CartError> {
        ensure_currency(&tax, self.currency)?;

        self.tax = tax;
        self.recalculate_totals()
    }

    /// Tax computed for the previous set of lines no longer applies.
    fn clear_tax(&mut self) {
        self.tax = zero(self.currency);

        for item in &mut self.items {
            item.tax_amount = None;
        }
    }

    /// Recompute the subtotal from the lines and re-assemble the grand total.
    ///
    /// Shipping, discount and tax are taken as last recorded; a free-shipping
    /// coupon charges zero shipping while keeping the quoted amount on the
    /// selection.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if money arithmetic fails.
    pub fn recalculate_totals(&mut self) -> Result<&Totals, CartError> {
        let subtotal = self.subtotal()?;

        self.totals = Totals::assemble(
            subtotal,
            self.discount(),
            self.shipping_charge(),
            self.tax,
        )?;

        Ok(&self.totals)
    }

    /// Sum of line totals.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if a line is in another currency.
    pub fn subtotal(&self) -> Result<Money<'static, Currency>, MoneyError> {
        self.items
            .iter()
            .try_fold(zero(self.currency), |acc, item| acc.add(item.row_total))
    }

    /// Total shipping weight in kilograms.
    pub fn weight(&self) -> Decimal {
        self.items.iter().map(CartItem::line_weight).sum()
    }

    /// Total shipping volume in cubic metres.
    pub fn volume(&self) -> Decimal {
        self.items.iter().map(CartItem::line_volume).sum()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Discount from the applied coupon, zero without one.
    pub fn discount(&self) -> Money<'static, Currency> {
        self.coupon
            .as_ref()
            .map_or_else(|| zero(self.currency), |coupon| coupon.discount)
    }

    /// Whether an applied coupon waives shipping.
    pub fn has_free_shipping(&self) -> bool {
        self.coupon.as_ref().is_some_and(|coupon| coupon.free_shipping)
    }

    /// Shipping actually charged.
    pub fn shipping_charge(&self) -> Money<'static, Currency> {
        match &self.shipping {
            Some(selection) if !self.has_free_shipping() => selection.amount,
            _ => zero(self.currency),
        }
    }

    /// Find a line by UUID.
    pub fn item(&self, item: CartItemUuid) -> Option<&CartItem> {
        self.items.iter().find(|line| line.uuid == item)
    }

    /// Find the line for a product.
    pub fn item_for_product(&self, product: ProductUuid) -> Option<&CartItem> {
        self.items.iter().find(|line| line.product_uuid == product)
    }

    /// Cart identifier.
    pub fn uuid(&self) -> CartUuid {
        self.uuid
    }

    /// Cart currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Cart lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Chosen shipping method.
    pub fn shipping(&self) -> Option<&ShippingSelection> {
        self.shipping.as_ref()
    }

    /// Applied coupon.
    pub fn coupon(&self) -> Option<&AppliedCoupon> {
        self.coupon.as_ref()
    }

    /// Tax last recorded.
    pub fn tax(&self) -> Money<'static, Currency> {
        self.tax
    }

    /// Totals as of the last mutation.
    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    fn position(&self, item: CartItemUuid) -> Result<usize, CartError> {
        self.items
            .iter()
            .position(|line| line.uuid == item)
            .ok_or(CartError::ItemNotFound(item))
    }
}

fn ensure_currency(
    price: &Money<'static, Currency>,
    currency: &'static Currency,
) -> Result<(), CartError> {
    let price_currency = price.currency();

    if price_currency == currency {
        Ok(())
    } else {
        Err(CartError::CurrencyMismatch(
            price_currency.iso_alpha_code,
            currency.iso_alpha_code,
        ))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    fn product(sku: &str, minor: i64) -> Product {
        Product::new(sku, sku, Money::from_minor(minor, USD))
    }

    #[test]
    fn new_cart_has_zero_totals() {
        let cart = Cart::new(CartUuid::new(), USD);

        assert!(cart.is_empty());
        assert_eq!(*cart.totals(), Totals::zero(USD));
    }

    #[test]
    fn add_item_snapshots_product_and_computes_row_total() -> TestResult {
        let mut cart = Cart::new(CartUuid::new(), USD);
        let mug = product("MUG", 12_50);

        let item = cart.add_item(&mug, 3, CustomOptions::default())?;

        assert_eq!(item.sku, "MUG");
        assert_eq!(item.quantity(), 3);
        assert_eq!(item.row_total(), Money::from_minor(37_50, USD));
        assert_eq!(cart.totals().subtotal, Money::from_minor(37_50, USD));
        assert_eq!(cart.totals().grand_total, Money::from_minor(37_50, USD));

        Ok(())
    }

    #[test]
    fn re_adding_a_product_merges_into_the_existing_line() -> TestResult {
        let mut cart = Cart::new(CartUuid::new(), USD);
        let mug = product("MUG", 12_50);

        let first = cart.add_item(&mug, 1, CustomOptions::default())?.uuid;
        let second = cart.add_item(&mug, 2, CustomOptions::default())?;

        assert_eq!(second.uuid, first);
        assert_eq!(second.quantity(), 3);
        assert_eq!(second.row_total(), Money::from_minor(37_50, USD));
        assert_eq!(cart.len(), 1);

        Ok(())
    }

    #[test]
    fn unavailable_products_are_rejected() {
        let mut cart = Cart::new(CartUuid::new(), USD);
        let mut mug = product("MUG", 12_50);

        mug.in_stock = false;

        let result = cart.add_item(&mug, 1, CustomOptions::default());

        assert!(
            matches!(result, Err(CartError::ProductUnavailable(uuid)) if uuid == mug.uuid),
            "expected ProductUnavailable, got {result:?}"
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut cart = Cart::new(CartUuid::new(), USD);

        let result = cart.add_item(&product("MUG", 1_00), 0, CustomOptions::default());

        assert!(matches!(result, Err(CartError::InvalidQuantity)));
    }

    #[test]
    fn foreign_currency_products_are_rejected() {
        let mut cart = Cart::new(CartUuid::new(), USD);
        let tea = Product::new("TEA", "Tea", Money::from_minor(4_00, GBP));

        let result = cart.add_item(&tea, 1, CustomOptions::default());

        assert!(
            matches!(result, Err(CartError::CurrencyMismatch("GBP", "USD"))),
            "expected CurrencyMismatch, got {result:?}"
        );
    }

    #[test]
    fn update_quantity_recomputes_row_total() -> TestResult {
        let mut cart = Cart::new(CartUuid::new(), USD);
        let uuid = cart
            .add_item(&product("MUG", 12_50), 1, CustomOptions::default())?
            .uuid;

        let updated = cart.update_quantity(uuid, 4)?;

        assert_eq!(
            updated.map(CartItem::row_total),
            Some(Money::from_minor(50_00, USD))
        );
        assert_eq!(cart.totals().subtotal, Money::from_minor(50_00, USD));

        Ok(())
    }

    #[test]
    fn update_quantity_to_zero_removes_the_line() -> TestResult {
        let mut cart = Cart::new(CartUuid::new(), USD);
        let uuid = cart
            .add_item(&product("MUG", 12_50), 1, CustomOptions::default())?
            .uuid;

        assert!(cart.update_quantity(uuid, 0)?.is_none());
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn remove_unknown_item_is_not_found() {
        let mut cart = Cart::new(CartUuid::new(), USD);
        let missing = CartItemUuid::new();

        let result = cart.remove_item(missing);

        assert!(matches!(result, Err(CartError::ItemNotFound(uuid)) if uuid == missing));
    }

    #[test]
    fn remove_item_recalculates_subtotal() -> TestResult {
        let mut cart = Cart::new(CartUuid::new(), USD);
        let mug = cart
            .add_item(&product("MUG", 12_50), 1, CustomOptions::default())?
            .uuid;

        cart.add_item(&product("PEN", 2_00), 2, CustomOptions::default())?;
        cart.remove_item(mug)?;

        assert_eq!(cart.totals().subtotal, Money::from_minor(4_00, USD));

        Ok(())
    }

    #[test]
    fn totals_combine_discount_shipping_and_tax() -> TestResult {
        let mut cart = Cart::new(CartUuid::new(), USD);

        cart.add_item(&product("LAMP", 100_00), 1, CustomOptions::default())?;

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

        let totals = cart.set_tax(Money::from_minor(7_20, USD))?;

        assert_eq!(totals.grand_total, Money::from_minor(112_20, USD));

        Ok(())
    }

    #[test]
    fn changing_the_lines_discards_recorded_tax() -> TestResult {
        let mut cart = Cart::new(CartUuid::new(), USD);
        let lamp = cart
            .add_item(&product("LAMP", 100_00), 1, CustomOptions::default())?
            .uuid;

        let mut taxed = cart.clone();

        for item in &mut taxed.items {
            item.tax_amount = Some(Money::from_minor(8_25, USD));
        }

        taxed.set_tax(Money::from_minor(8_25, USD))?;

        let mut added = taxed.clone();
        added.add_item(&product("PEN", 2_00), 1, CustomOptions::default())?;

        let mut updated = taxed.clone();
        updated.update_quantity(lamp, 2)?;

        let mut removed = taxed.clone();
        removed.remove_item(lamp)?;

        for cart in [&added, &updated, &removed] {
            assert_eq!(cart.tax(), zero(USD));
            assert_eq!(cart.totals().tax, zero(USD));
            assert!(cart.items().iter().all(|item| item.tax_amount.is_none()));
        }

        assert_eq!(added.totals().grand_total, Money::from_minor(102_00, USD));

        // Coupons and shipping keep the tax.
        taxed.clear_shipping()?;

        assert_eq!(taxed.tax(), Money::from_minor(8_25, USD));

        Ok(())
    }

    #[test]
    fn free_shipping_coupon_waives_the_quoted_amount() -> TestResult {
        let mut cart = Cart::new(CartUuid::new(), USD);

        cart.add_item(&product("LAMP", 40_00), 1, CustomOptions::default())?;
        cart.set_shipping(ShippingSelection {
            method_uuid: ShippingMethodUuid::new(),
            name: "Ground".to_string(),
            amount: Money::from_minor(15_00, USD),
        })?;

        cart.apply_coupon(AppliedCoupon {
            code: "SHIPFREE".to_string(),
            discount: zero(USD),
            free_shipping: true,
        })?;

        assert_eq!(cart.totals().shipping, zero(USD));
        assert_eq!(cart.totals().grand_total, Money::from_minor(40_00, USD));

        cart.remove_coupon()?;

        assert_eq!(cart.totals().shipping, Money::from_minor(15_00, USD));

        Ok(())
    }

    #[test]
    fn with_items_rejects_duplicate_products() -> TestResult {
        let mug = product("MUG", 1_00);
        let first = CartItem::from_product(&mug, 1, CustomOptions::default())?;
        let second = CartItem::from_product(&mug, 2, CustomOptions::default())?;

        let result = Cart::with_items(CartUuid::new(), USD, vec![first, second]);

        assert!(matches!(result, Err(CartError::DuplicateProduct(uuid)) if uuid == mug.uuid));

        Ok(())
    }

    #[test]
    fn weight_treats_missing_weights_as_zero() -> TestResult {
        let mut cart = Cart::new(CartUuid::new(), USD);
        let mut heavy = product("ANVIL", 50_00);

        heavy.weight = Some(Decimal::new(25, 1));

        cart.add_item(&heavy, 2, CustomOptions::default())?;
        cart.add_item(&product("CARD", 1_00), 5, CustomOptions::default())?;

        assert_eq!(cart.weight(), Decimal::new(5, 0));
        assert_eq!(cart.total_quantity(), 7);

        Ok(())
    }
}
