//! Customer Data

use cartwright::{address::Address, tax::TaxClassUuid};

use crate::domain::customers::records::{AddressUuid, CustomerUuid};

/// New Customer Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub uuid: CustomerUuid,
    pub email: String,

    /// Customer tax class used to narrow tax rules
    pub tax_class: Option<TaxClassUuid>,
}

/// New Address Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    pub uuid: AddressUuid,
    pub customer: CustomerUuid,
    pub address: Address,
}
