//! Service order service: use-cases for repair order headers.

use rust_decimal::Decimal;
use techserv_domain::context::RequestContext;
use techserv_domain::error::{BatchRejection, NotFoundError, TechServError, ValidationError};
use techserv_domain::id::ServiceId;
use techserv_domain::service::view::ServiceView;
use techserv_domain::service::{Service, ServiceState};

use crate::ports::{ServiceLineRepository, ServiceRepository};

/// Application service for service CRUD, totals and form views.
pub struct ServiceOrderService<S, L> {
    services: S,
    lines: L,
}

impl<S, L> ServiceOrderService<S, L>
where
    S: ServiceRepository,
    L: ServiceLineRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(services: S, lines: L) -> Self {
        Self { services, lines }
    }

    /// Register a new repair order.
    ///
    /// The order always starts pending and unnumbered. A missing entry date
    /// defaults to the context date.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, ctx, service), fields(service_id = %service.id))]
    pub async fn create_service(
        &self,
        ctx: &RequestContext,
        mut service: Service,
    ) -> Result<Service, TechServError> {
        service.state = ServiceState::Pending;
        service.number_service = None;
        if service.entry_date.is_none() {
            service.entry_date = Some(ctx.date);
        }
        service.validate()?;
        let created = self.services.create(service).await?;
        tracing::info!(service_id = %created.id, "service created");
        Ok(created)
    }

    /// Look up a service by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::NotFound`] when no service with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_service(&self, id: ServiceId) -> Result<Service, TechServError> {
        self.services
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id).into())
    }

    /// List all services.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_services(&self) -> Result<Vec<Service>, TechServError> {
        self.services.get_all().await
    }

    /// Replace the editable fields of a service.
    ///
    /// # Errors
    ///
    /// - [`TechServError::NotFound`] when the service does not exist
    /// - [`TechServError::Workflow`] once the service is delivered, or when
    ///   its state changed after it was read
    /// - [`TechServError::Validation`] if the result breaks an invariant
    #[tracing::instrument(skip(self, incoming))]
    pub async fn update_service(
        &self,
        id: ServiceId,
        incoming: Service,
    ) -> Result<Service, TechServError> {
        let mut stored = self.get_service(id).await?;
        stored.check_modify()?;
        stored.apply_edits(incoming);
        stored.validate()?;
        self.services.update(stored).await
    }

    /// Delete a batch of services together with their lines and history.
    ///
    /// Nothing is deleted unless every service exists and is pending.
    ///
    /// # Errors
    ///
    /// Returns every offending service, see [`BatchRejection::check`].
    #[tracing::instrument(skip(self), fields(count = ids.len()))]
    pub async fn delete_services(&self, ids: &[ServiceId]) -> Result<(), TechServError> {
        if ids.is_empty() {
            return Err(ValidationError::EmptySelection.into());
        }
        let found = self.services.get_many(ids).await?;
        let mut violations = missing(ids, &found);
        violations.extend(
            found
                .iter()
                .filter_map(|service| service.check_delete().err())
                .map(TechServError::from),
        );
        BatchRejection::check(violations)?;

        self.services.delete_many(ids).await?;
        tracing::info!(count = ids.len(), "services deleted");
        Ok(())
    }

    /// Sum of the reference amounts of the service's lines.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::NotFound`] when the service does not exist.
    pub async fn total(&self, id: ServiceId) -> Result<Decimal, TechServError> {
        let service = self.get_service(id).await?;
        let lines = self.lines.find_by_service(id).await?;
        Ok(service.total(&lines))
    }

    /// Buttons and field rules for rendering the service form.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::NotFound`] when the service does not exist.
    pub async fn view(&self, id: ServiceId) -> Result<ServiceView, TechServError> {
        let service = self.get_service(id).await?;
        Ok(ServiceView::of(&service))
    }
}

pub(crate) fn not_found(id: ServiceId) -> NotFoundError {
    NotFoundError {
        entity: "Service",
        id: id.to_string(),
    }
}

/// A not-found violation for every id absent from `found`.
pub(crate) fn missing(ids: &[ServiceId], found: &[Service]) -> Vec<TechServError> {
    ids.iter()
        .filter(|id| !found.iter().any(|service| service.id == **id))
        .map(|id| not_found(*id).into())
        .collect()
}
