pub(crate) mod methods;
pub(crate) mod rates;
pub(crate) mod routes;

pub(crate) use methods::PgShippingMethodsRepository;
pub(crate) use rates::PgShippingRatesRepository;
pub(crate) use routes::PgShippingRoutesRepository;
