//! Common imports for callers pricing carts.

pub use crate::{
    address::{Address, AddressKind},
    cart::{AppliedCoupon, Cart, CartError, CartItem, CartItemUuid, CartUuid, ShippingSelection},
    coupons::{Coupon, CouponRejection, CouponValidation, CouponValidator, CustomerUsage},
    products::{Product, ProductUuid},
    shipping::{ShippingError, ShippingMethod, ShippingOption, ShippingRate},
    tax::{TaxBreakdown, TaxRuleSet},
    totals::Totals,
};
