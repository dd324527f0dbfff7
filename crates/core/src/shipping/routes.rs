//! Route Tariffs
//!
//! Per-route unit pricing (per kilogram, per cubic metre plus fixed fees).
//! Quotes produced here are informational; the bracketed rate table in
//! [`super::quote`] is what a cart is charged.

use rust_decimal::Decimal;
use smallvec::SmallVec;

use crate::{
    address::Address,
    cart::Cart,
    money::rounded,
    shipping::{ShippingMethod, ShippingMethodUuid, ShippingOption, active_methods},
    uuids::TypedUuid,
};

/// Shipping Route UUID
pub type ShippingRouteUuid = TypedUuid<ShippingRoute>;

/// A logistics corridor between two places.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingRoute {
    /// Route identifier
    pub uuid: ShippingRouteUuid,

    /// Display name
    pub name: String,

    /// Origin country code
    pub origin_country: String,

    /// Origin city
    pub origin_city: Option<String>,

    /// Destination country code
    pub destination_country: String,

    /// Destination city, `None` for the whole country
    pub destination_city: Option<String>,

    /// Intermediate hubs, in order
    pub transit_points: SmallVec<[String; 2]>,

    /// Whether the route is in use
    pub is_active: bool,
}

impl ShippingRoute {
    /// Create an active country-to-country route.
    pub fn new(name: &str, origin_country: &str, destination_country: &str) -> Self {
        Self {
            uuid: ShippingRouteUuid::new(),
            name: name.to_string(),
            origin_country: origin_country.trim().to_ascii_uppercase(),
            origin_city: None,
            destination_country: destination_country.trim().to_ascii_uppercase(),
            destination_city: None,
            transit_points: SmallVec::new(),
            is_active: true,
        }
    }

    /// Whether the route delivers to `address`.
    pub fn serves(&self, address: &Address) -> bool {
        self.is_active
            && self.destination_country.eq_ignore_ascii_case(address.country())
            && self.destination_city.as_deref().is_none_or(|city| {
                address
                    .city()
                    .is_some_and(|dest| dest.trim().eq_ignore_ascii_case(city.trim()))
            })
    }
}

/// Unit prices for one method on one route, in the cart's major units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteTariff {
    /// Priced method
    pub method_uuid: ShippingMethodUuid,

    /// Priced route
    pub route_uuid: ShippingRouteUuid,

    /// Charge per kilogram
    pub per_kg: Decimal,

    /// Charge per cubic metre
    pub per_cbm: Decimal,

    /// Fixed charge
    pub flat: Decimal,

    /// Handling fee
    pub handling: Decimal,

    /// Customs fee
    pub customs: Decimal,
}

impl RouteTariff {
    /// Price a shipment of the given weight and volume.
    pub fn price(&self, weight: Decimal, volume: Decimal) -> Decimal {
        self.per_kg * weight + self.per_cbm * volume + self.flat + self.handling + self.customs
    }
}

/// Quote active methods over the routes that serve `destination`.
///
/// When several routes serve the destination for one method, the cheapest is
/// used. Methods with no serving route are omitted.
pub fn quote_routes(
    methods: &[ShippingMethod],
    routes: &[ShippingRoute],
    tariffs: &[RouteTariff],
    cart: &Cart,
    destination: &Address,
) -> Vec<ShippingOption> {
    let weight = cart.weight();
    let volume = cart.volume();

    active_methods(methods)
        .into_iter()
        .filter_map(|method| {
            tariffs
                .iter()
                .filter(|tariff| tariff.method_uuid == method.uuid)
                .filter(|tariff| {
                    routes
                        .iter()
                        .any(|route| route.uuid == tariff.route_uuid && route.serves(destination))
                })
                .map(|tariff| tariff.price(weight, volume))
                .min()
                .map(|price| ShippingOption::for_method(method, rounded(price, cart.currency())))
        })
        .collect()
}
