//! Addresses

/// What an address is used for on a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    /// Destination used for shipping quotes and tax.
    Shipping,

    /// Invoice address.
    Billing,
}

impl AddressKind {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shipping => "shipping",
            Self::Billing => "billing",
        }
    }
}

/// A destination the pricing engine can match rates and taxes against.
///
/// Country and state codes are upper-cased and the postal code is trimmed on
/// construction, so matching can compare values directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    country: String,
    state: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
}

impl Address {
    /// Create an address in the given country.
    pub fn new(country: &str) -> Self {
        Self {
            country: country.trim().to_ascii_uppercase(),
            state: None,
            city: None,
            postal_code: None,
        }
    }

    /// Set the state or province code.
    #[must_use]
    pub fn with_state(mut self, state: &str) -> Self {
        self.state = non_empty(state).map(str::to_ascii_uppercase);
        self
    }

    /// Set the city.
    #[must_use]
    pub fn with_city(mut self, city: &str) -> Self {
        self.city = non_empty(city).map(ToString::to_string);
        self
    }

    /// Set the postal code.
    #[must_use]
    pub fn with_postal_code(mut self, postal_code: &str) -> Self {
        self.postal_code = non_empty(postal_code).map(ToString::to_string);
        self
    }

    /// ISO country code.
    pub fn country(&self) -> &str {
        &self.country
    }

    /// State or province code.
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// City name.
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    /// Postal code.
    pub fn postal_code(&self) -> Option<&str> {
        self.postal_code.as_deref()
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();

    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_codes() {
        let address = Address::new(" us ")
            .with_state("ca")
            .with_city("Oakland")
            .with_postal_code(" 94607 ");

        assert_eq!(address.country(), "US");
        assert_eq!(address.state(), Some("CA"));
        assert_eq!(address.city(), Some("Oakland"));
        assert_eq!(address.postal_code(), Some("94607"));
    }

    #[test]
    fn blank_parts_are_absent() {
        let address = Address::new("GB").with_state("  ").with_postal_code("");

        assert_eq!(address.state(), None);
        assert_eq!(address.postal_code(), None);
    }
}
