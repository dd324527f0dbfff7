//! Cart Records

use cartwright::{
    cart::{AppliedCoupon, Cart, CartError, CartItem, CartUuid, ShippingSelection},
    shipping::ShippingMethodUuid,
    totals::Totals,
    uuids::TypedUuid,
};
use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};

use crate::{
    context::Identity,
    domain::customers::records::{AddressUuid, CustomerUuid},
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// A persisted cart: the pricing aggregate plus who owns it and where it ships.
#[derive(Debug, Clone)]
pub struct CartRecord {
    pub uuid: CartUuid,
    pub identity: Identity,
    pub cart: Cart,
    pub shipping_address: Option<AddressUuid>,
    pub billing_address: Option<AddressUuid>,
    pub converted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartRecord {
    #[must_use]
    pub fn totals(&self) -> &Totals {
        self.cart.totals()
    }

    pub(crate) fn assemble(header: CartHeader, items: Vec<CartItem>) -> Result<Self, CartError> {
        let mut cart = Cart::with_items(header.uuid, header.currency, items)?;

        if let (Some(method_uuid), Some(name), Some(amount)) = (
            header.shipping_method_uuid,
            header.shipping_method_name,
            header.shipping_quote,
        ) {
            cart.set_shipping(ShippingSelection {
                method_uuid,
                name,
                amount,
            })?;
        }

        if let Some(code) = header.coupon_code {
            cart.apply_coupon(AppliedCoupon {
                code,
                discount: header.discount_amount,
                free_shipping: header.free_shipping,
            })?;
        }

        cart.set_tax(header.tax_amount)?;

        Ok(Self {
            uuid: header.uuid,
            identity: header.identity,
            cart,
            shipping_address: header.shipping_address,
            billing_address: header.billing_address,
            converted_at: header.converted_at,
            created_at: header.created_at,
            updated_at: header.updated_at,
        })
    }
}

/// The `carts` row without its lines.
#[derive(Debug, Clone)]
pub(crate) struct CartHeader {
    pub(crate) uuid: CartUuid,
    pub(crate) identity: Identity,
    pub(crate) currency: &'static Currency,
    pub(crate) discount_amount: Money<'static, Currency>,
    pub(crate) tax_amount: Money<'static, Currency>,
    pub(crate) coupon_code: Option<String>,
    pub(crate) free_shipping: bool,
    pub(crate) shipping_method_uuid: Option<ShippingMethodUuid>,
    pub(crate) shipping_method_name: Option<String>,
    pub(crate) shipping_quote: Option<Money<'static, Currency>>,
    pub(crate) shipping_address: Option<AddressUuid>,
    pub(crate) billing_address: Option<AddressUuid>,
    pub(crate) converted_at: Option<Timestamp>,
    pub(crate) created_at: Timestamp,
    pub(crate) updated_at: Timestamp,
}

/// Order written when a cart is checked out.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub cart_uuid: CartUuid,
    pub customer: Option<CustomerUuid>,
    pub coupon_code: Option<String>,
    pub grand_total: Money<'static, Currency>,
    pub created_at: Timestamp,
}
