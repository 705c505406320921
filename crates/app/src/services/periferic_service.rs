//! Periferic service: use-cases for the peripheral lookup table.

use techserv_domain::error::{NotFoundError, TechServError};
use techserv_domain::id::PeriphericId;
use techserv_domain::periferic::Periferic;

use crate::ports::PeriphericRepository;

/// Application service for periferic CRUD operations.
pub struct PeriphericService<R> {
    repo: R,
}

impl<R: PeriphericRepository> PeriphericService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a new periferic after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, periferic), fields(name = %periferic.name))]
    pub async fn create_periferic(&self, periferic: Periferic) -> Result<Periferic, TechServError> {
        periferic.validate()?;
        self.repo.create(periferic).await
    }

    /// Look up a periferic by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::NotFound`] when no periferic with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_periferic(&self, id: PeriphericId) -> Result<Periferic, TechServError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Periferic",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all periferics.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_periferics(&self) -> Result<Vec<Periferic>, TechServError> {
        self.repo.get_all().await
    }

    /// Rename an existing periferic.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::NotFound`] when it does not exist, or
    /// [`TechServError::Validation`] if invariants fail.
    #[tracing::instrument(skip(self, periferic))]
    pub async fn update_periferic(&self, periferic: Periferic) -> Result<Periferic, TechServError> {
        periferic.validate()?;
        self.get_periferic(periferic.id).await?;
        self.repo.update(periferic).await
    }

    /// Delete a periferic by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_periferic(&self, id: PeriphericId) -> Result<(), TechServError> {
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Memory;
    use techserv_domain::error::ValidationError;

    fn make_service() -> PeriphericService<Memory> {
        PeriphericService::new(Memory::default())
    }

    #[tokio::test]
    async fn should_create_periferic_when_valid() {
        let svc = make_service();
        let created = svc
            .create_periferic(Periferic::new("Printer").unwrap())
            .await
            .unwrap();
        let fetched = svc.get_periferic(created.id).await.unwrap();
        assert_eq!(fetched.name, "Printer");
    }

    #[tokio::test]
    async fn should_reject_blank_name_on_update() {
        let svc = make_service();
        let mut periferic = svc
            .create_periferic(Periferic::new("Monitor").unwrap())
            .await
            .unwrap();
        periferic.name = " ".to_string();
        assert!(matches!(
            svc.update_periferic(periferic).await,
            Err(TechServError::Validation(ValidationError::EmptyName))
        ));
    }

    #[tokio::test]
    async fn should_return_not_found_when_updating_unknown_periferic() {
        let svc = make_service();
        let periferic = Periferic::new("Scanner").unwrap();
        assert!(matches!(
            svc.update_periferic(periferic).await,
            Err(TechServError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn should_delete_periferic() {
        let svc = make_service();
        let created = svc
            .create_periferic(Periferic::new("Mouse").unwrap())
            .await
            .unwrap();
        svc.delete_periferic(created.id).await.unwrap();
        assert!(svc.list_periferics().await.unwrap().is_empty());
    }
}
