//! History service: audit notes and the credential pair they may carry.

use techserv_domain::error::{NotFoundError, TechServError};
use techserv_domain::history_line::HistoryLine;
use techserv_domain::id::{HistoryLineId, ServiceId};
use techserv_domain::service::Service;
use techserv_domain::time::now;

use crate::ports::{HistoryLineRepository, ServiceRepository};
use crate::services::service_order_service::not_found;

/// Application service for history lines.
pub struct HistoryService<S, H> {
    services: S,
    history: H,
}

impl<S, H> HistoryService<S, H>
where
    S: ServiceRepository,
    H: HistoryLineRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(services: S, history: H) -> Self {
        Self { services, history }
    }

    /// Append a note to a service, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::Workflow`] once the service is delivered.
    #[tracing::instrument(skip(self, description))]
    pub async fn add_note(
        &self,
        service_id: ServiceId,
        description: String,
    ) -> Result<HistoryLine, TechServError> {
        let service = self.parent(service_id).await?;
        service.check_add_note()?;
        let line = HistoryLine::builder()
            .service_id(service_id)
            .description(description)
            .date(now())
            .build();
        self.history.create(line).await
    }

    /// Look up a note by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::NotFound`] when no note with `id` exists.
    pub async fn get_note(&self, id: HistoryLineId) -> Result<HistoryLine, TechServError> {
        self.history.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "HistoryLine",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Notes of one service, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_notes(&self, service_id: ServiceId) -> Result<Vec<HistoryLine>, TechServError> {
        self.history.find_by_service(service_id).await
    }

    /// Set the description of a note. Only an empty description may change.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::Workflow`] when the service is delivered or
    /// the description is already set.
    #[tracing::instrument(skip(self, description))]
    pub async fn update_note(
        &self,
        id: HistoryLineId,
        description: String,
    ) -> Result<HistoryLine, TechServError> {
        let stored = self.get_note(id).await?;
        let service = self.parent(stored.service_id).await?;
        let mut incoming = stored.clone();
        incoming.description = description;
        stored.check_edit(&service, &incoming)?;
        self.history.update(incoming).await
    }

    /// Remove a note.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::Workflow`] unless the service is pending.
    #[tracing::instrument(skip(self))]
    pub async fn delete_note(&self, id: HistoryLineId) -> Result<(), TechServError> {
        let stored = self.get_note(id).await?;
        let service = self.parent(stored.service_id).await?;
        stored.check_delete(&service)?;
        self.history.delete(id).await
    }

    /// Store a user and the hash of `password` on a note.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::Workflow`] when the service is delivered, or
    /// a validation or credential error from hashing.
    #[tracing::instrument(skip(self, password))]
    pub async fn set_credential(
        &self,
        id: HistoryLineId,
        user: &str,
        password: &str,
    ) -> Result<HistoryLine, TechServError> {
        let stored = self.get_note(id).await?;
        let service = self.parent(stored.service_id).await?;
        let mut incoming = stored.clone();
        incoming.set_credential(user, password)?;
        stored.check_edit(&service, &incoming)?;
        self.history.update(incoming).await
    }

    /// Whether `user` and `password` match the pair stored on a note.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::Credential`] when the note has no credential
    /// or its digest is malformed.
    #[tracing::instrument(skip(self, password))]
    pub async fn verify_credential(
        &self,
        id: HistoryLineId,
        user: &str,
        password: &str,
    ) -> Result<bool, TechServError> {
        let stored = self.get_note(id).await?;
        let verified = stored.verify_credential(user, password)?;
        if !verified {
            tracing::warn!(history_line_id = %id, "credential mismatch");
        }
        Ok(verified)
    }

    async fn parent(&self, id: ServiceId) -> Result<Service, TechServError> {
        self.services
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Memory;
    use techserv_domain::error::{CredentialError, WorkflowError};
    use techserv_domain::service::ServiceState;

    fn make_service() -> (HistoryService<Memory, Memory>, Memory) {
        let memory = Memory::default();
        (HistoryService::new(memory.clone(), memory.clone()), memory)
    }

    fn stored(memory: &Memory, state: ServiceState) -> Service {
        let service = Service::builder().state(state).build().unwrap();
        memory.insert_service(service.clone());
        service
    }

    fn set_state(memory: &Memory, id: ServiceId, state: ServiceState) {
        let mut service = memory.service(id);
        service.state = state;
        memory.insert_service(service);
    }

    #[tokio::test]
    async fn should_stamp_new_note_with_date() {
        let (svc, memory) = make_service();
        let service = stored(&memory, ServiceState::Ready);
        let note = svc
            .add_note(service.id, "waiting for part".to_string())
            .await
            .unwrap();
        assert!(note.date.is_some());
        assert_eq!(svc.list_notes(service.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_refuse_note_on_delivered_service() {
        let (svc, memory) = make_service();
        let service = stored(&memory, ServiceState::Delivered);
        assert!(matches!(
            svc.add_note(service.id, "late".to_string()).await,
            Err(TechServError::Workflow(WorkflowError::HistoryCreationBlocked { .. }))
        ));
    }

    #[tokio::test]
    async fn should_fill_empty_description_once() {
        let (svc, memory) = make_service();
        let service = stored(&memory, ServiceState::Review);
        let note = svc.add_note(service.id, String::new()).await.unwrap();

        let filled = svc
            .update_note(note.id, "called customer".to_string())
            .await
            .unwrap();
        assert_eq!(filled.description, "called customer");

        assert!(matches!(
            svc.update_note(note.id, "rewritten".to_string()).await,
            Err(TechServError::Workflow(WorkflowError::HistoryDescriptionLocked { .. }))
        ));
    }

    #[tokio::test]
    async fn should_lock_notes_once_delivered() {
        let (svc, memory) = make_service();
        let service = stored(&memory, ServiceState::Ready);
        let note = svc.add_note(service.id, String::new()).await.unwrap();
        set_state(&memory, service.id, ServiceState::Delivered);

        assert!(matches!(
            svc.update_note(note.id, "after delivery".to_string()).await,
            Err(TechServError::Workflow(WorkflowError::HistoryLocked { .. }))
        ));
    }

    #[tokio::test]
    async fn should_only_delete_notes_of_pending_service() {
        let (svc, memory) = make_service();
        let service = stored(&memory, ServiceState::Pending);
        let kept = svc.add_note(service.id, "a".to_string()).await.unwrap();
        let removed = svc.add_note(service.id, "b".to_string()).await.unwrap();

        svc.delete_note(removed.id).await.unwrap();
        set_state(&memory, service.id, ServiceState::Review);

        assert!(svc.delete_note(kept.id).await.is_err());
        assert_eq!(svc.list_notes(service.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_verify_credential_round_trip() {
        let (svc, memory) = make_service();
        let service = stored(&memory, ServiceState::Pending);
        let note = svc.add_note(service.id, "pickup".to_string()).await.unwrap();

        svc.set_credential(note.id, "frontdesk", "hunter2")
            .await
            .unwrap();

        assert!(svc.verify_credential(note.id, "frontdesk", "hunter2").await.unwrap());
        assert!(!svc.verify_credential(note.id, "frontdesk", "hunter3").await.unwrap());
    }

    #[tokio::test]
    async fn should_report_missing_credential() {
        let (svc, memory) = make_service();
        let service = stored(&memory, ServiceState::Pending);
        let note = svc.add_note(service.id, "pickup".to_string()).await.unwrap();
        assert!(matches!(
            svc.verify_credential(note.id, "frontdesk", "x").await,
            Err(TechServError::Credential(CredentialError::Missing { .. }))
        ));
    }
}
