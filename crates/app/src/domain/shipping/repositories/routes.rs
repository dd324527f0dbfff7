//! Shipping Routes Repository

use cartwright::shipping::{
    ShippingMethodUuid,
    routes::{RouteTariff, ShippingRoute, ShippingRouteUuid},
};
use smallvec::SmallVec;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

const CREATE_SHIPPING_ROUTE_SQL: &str = include_str!("../sql/create_shipping_route.sql");
const LIST_DESTINATION_ROUTES_SQL: &str = include_str!("../sql/list_destination_routes.sql");
const UPSERT_ROUTE_TARIFF_SQL: &str = include_str!("../sql/upsert_route_tariff.sql");
const LIST_ROUTE_TARIFFS_SQL: &str = include_str!("../sql/list_route_tariffs.sql");

struct RouteRow(ShippingRoute);

struct TariffRow(RouteTariff);

#[derive(Debug, Clone, Default)]
pub(crate) struct PgShippingRoutesRepository;

impl PgShippingRoutesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_route(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        route: &ShippingRoute,
    ) -> Result<ShippingRoute, sqlx::Error> {
        let RouteRow(created) = query_as::<Postgres, RouteRow>(CREATE_SHIPPING_ROUTE_SQL)
            .bind(route.uuid.into_uuid())
            .bind(&route.name)
            .bind(&route.origin_country)
            .bind(route.origin_city.as_deref())
            .bind(&route.destination_country)
            .bind(route.destination_city.as_deref())
            .bind(route.transit_points.to_vec())
            .bind(route.is_active)
            .fetch_one(&mut **tx)
            .await?;

        Ok(created)
    }

    /// Active routes delivering into `country`.
    pub(crate) async fn list_destination_routes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        country: &str,
    ) -> Result<Vec<ShippingRoute>, sqlx::Error> {
        let rows = query_as::<Postgres, RouteRow>(LIST_DESTINATION_ROUTES_SQL)
            .bind(country)
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().map(|RouteRow(route)| route).collect())
    }

    /// Set the tariff for a method on a route, replacing any previous one.
    pub(crate) async fn upsert_tariff(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tariff: &RouteTariff,
    ) -> Result<RouteTariff, sqlx::Error> {
        let TariffRow(stored) = query_as::<Postgres, TariffRow>(UPSERT_ROUTE_TARIFF_SQL)
            .bind(tariff.method_uuid.into_uuid())
            .bind(tariff.route_uuid.into_uuid())
            .bind(tariff.per_kg)
            .bind(tariff.per_cbm)
            .bind(tariff.flat)
            .bind(tariff.handling)
            .bind(tariff.customs)
            .fetch_one(&mut **tx)
            .await?;

        Ok(stored)
    }

    /// Tariffs on routes delivering into `country`.
    pub(crate) async fn list_destination_tariffs(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        country: &str,
    ) -> Result<Vec<RouteTariff>, sqlx::Error> {
        let rows = query_as::<Postgres, TariffRow>(LIST_ROUTE_TARIFFS_SQL)
            .bind(country)
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().map(|TariffRow(tariff)| tariff).collect())
    }
}

impl<'r> FromRow<'r, PgRow> for RouteRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(ShippingRoute {
            uuid: ShippingRouteUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            origin_country: row.try_get::<String, _>("origin_country")?.trim().to_string(),
            origin_city: row.try_get("origin_city")?,
            destination_country: row
                .try_get::<String, _>("destination_country")?
                .trim()
                .to_string(),
            destination_city: row.try_get("destination_city")?,
            transit_points: SmallVec::from_vec(row.try_get::<Vec<String>, _>("transit_points")?),
            is_active: row.try_get("is_active")?,
        }))
    }
}

impl<'r> FromRow<'r, PgRow> for TariffRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(RouteTariff {
            method_uuid: ShippingMethodUuid::from_uuid(row.try_get("method_uuid")?),
            route_uuid: ShippingRouteUuid::from_uuid(row.try_get("route_uuid")?),
            per_kg: row.try_get("per_kg")?,
            per_cbm: row.try_get("per_cbm")?,
            flat: row.try_get("flat")?,
            handling: row.try_get("handling")?,
            customs: row.try_get("customs")?,
        }))
    }
}
