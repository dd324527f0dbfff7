pub(crate) mod addresses;
pub(crate) mod customers;

pub(crate) use addresses::PgAddressesRepository;
pub(crate) use customers::PgCustomersRepository;
