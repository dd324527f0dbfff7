//! Customer Records

use cartwright::{address::Address, tax::TaxClassUuid, uuids::TypedUuid};
use jiff::Timestamp;

/// Customer UUID
pub type CustomerUuid = TypedUuid<CustomerRecord>;

/// Address UUID
pub type AddressUuid = TypedUuid<AddressRecord>;

/// Customer Record
#[derive(Debug, Clone)]
pub struct CustomerRecord {
    pub uuid: CustomerUuid,
    pub email: String,
    pub tax_class: Option<TaxClassUuid>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Address Record
#[derive(Debug, Clone)]
pub struct AddressRecord {
    pub uuid: AddressUuid,
    pub customer: CustomerUuid,
    pub address: Address,
    pub created_at: Timestamp,
}
