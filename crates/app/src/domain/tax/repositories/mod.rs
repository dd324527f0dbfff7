pub(crate) mod classes;
pub(crate) mod rates;
pub(crate) mod rules;

pub(crate) use classes::PgTaxClassesRepository;
pub(crate) use rates::PgTaxRatesRepository;
pub(crate) use rules::PgTaxRulesRepository;
