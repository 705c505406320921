//! Address service: party addresses with configurable defaults.

use techserv_domain::address::{Address, AddressDefaults};
use techserv_domain::error::{NotFoundError, TechServError};
use techserv_domain::id::{AddressId, PartyId};

use crate::ports::AddressRepository;

/// Application service for addresses.
pub struct AddressService<R> {
    repo: R,
    defaults: AddressDefaults,
}

impl<R: AddressRepository> AddressService<R> {
    /// Create a new service applying `defaults` to new addresses.
    pub fn new(repo: R, defaults: AddressDefaults) -> Self {
        Self { repo, defaults }
    }

    /// Store a new address, filling a blank country or subdivision.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self, address), fields(party_id = %address.party_id))]
    pub async fn create_address(&self, mut address: Address) -> Result<Address, TechServError> {
        self.defaults.apply(&mut address);
        self.repo.create(address).await
    }

    /// Look up an address by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::NotFound`] when no address with `id` exists.
    pub async fn get_address(&self, id: AddressId) -> Result<Address, TechServError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Address",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Addresses of one party.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_addresses(&self, party_id: PartyId) -> Result<Vec<Address>, TechServError> {
        self.repo.find_by_party(party_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Memory;

    #[tokio::test]
    async fn should_apply_defaults_on_create() {
        let svc = AddressService::new(Memory::default(), AddressDefaults::default());
        let party = PartyId::new();

        let created = svc.create_address(Address::new(party)).await.unwrap();

        assert_eq!(created.country_code.as_deref(), Some("EC"));
        assert_eq!(created.subdivision_code.as_deref(), Some("EC-L"));
        assert_eq!(svc.list_addresses(party).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_apply_configured_defaults() {
        let defaults = AddressDefaults {
            country_code: "EC".to_string(),
            subdivision_code: "EC-G".to_string(),
        };
        let svc = AddressService::new(Memory::default(), defaults);

        let created = svc
            .create_address(Address::new(PartyId::new()))
            .await
            .unwrap();

        assert_eq!(created.subdivision_code.as_deref(), Some("EC-G"));
    }
}
