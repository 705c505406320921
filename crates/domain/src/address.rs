//! Party addresses and the defaults applied to new ones.

use serde::{Deserialize, Serialize};

use crate::id::{AddressId, PartyId};

/// A postal address of a party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub party_id: PartyId,
    pub street: Option<String>,
    pub city: Option<String>,
    /// ISO 3166-1 alpha-2 code.
    pub country_code: Option<String>,
    /// ISO 3166-2 code.
    pub subdivision_code: Option<String>,
}

impl Address {
    /// A blank address for `party_id`, without defaults applied.
    #[must_use]
    pub fn new(party_id: PartyId) -> Self {
        Self {
            id: AddressId::new(),
            party_id,
            street: None,
            city: None,
            country_code: None,
            subdivision_code: None,
        }
    }
}

/// Country and subdivision filled in when a new address leaves them blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressDefaults {
    pub country_code: String,
    pub subdivision_code: String,
}

impl Default for AddressDefaults {
    fn default() -> Self {
        Self {
            country_code: "EC".to_string(),
            subdivision_code: "EC-L".to_string(),
        }
    }
}

impl AddressDefaults {
    /// Fill blank country and subdivision. Values already set are kept.
    pub fn apply(&self, address: &mut Address) {
        if address.country_code.as_deref().is_none_or(str::is_empty) {
            address.country_code = Some(self.country_code.clone());
        }
        if address.subdivision_code.as_deref().is_none_or(str::is_empty) {
            address.subdivision_code = Some(self.subdivision_code.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_fill_ecuador_loja_by_default() {
        let mut address = Address::new(PartyId::new());
        AddressDefaults::default().apply(&mut address);
        assert_eq!(address.country_code.as_deref(), Some("EC"));
        assert_eq!(address.subdivision_code.as_deref(), Some("EC-L"));
    }

    #[test]
    fn should_keep_explicit_values() {
        let mut address = Address::new(PartyId::new());
        address.country_code = Some("PE".to_string());
        address.subdivision_code = Some("PE-LIM".to_string());

        AddressDefaults::default().apply(&mut address);

        assert_eq!(address.country_code.as_deref(), Some("PE"));
        assert_eq!(address.subdivision_code.as_deref(), Some("PE-LIM"));
    }

    #[test]
    fn should_use_configured_defaults() {
        let defaults = AddressDefaults {
            country_code: "EC".to_string(),
            subdivision_code: "EC-P".to_string(),
        };
        let mut address = Address::new(PartyId::new());
        address.subdivision_code = Some(String::new());

        defaults.apply(&mut address);

        assert_eq!(address.subdivision_code.as_deref(), Some("EC-P"));
    }
}
