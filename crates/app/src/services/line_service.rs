//! Service line service: use-cases for itemized repair lines.

use techserv_domain::error::{NotFoundError, TechServError};
use techserv_domain::id::{ServiceId, ServiceLineId};
use techserv_domain::service::Service;
use techserv_domain::service_line::ServiceLine;

use crate::ports::{CatalogRepository, ServiceLineRepository, ServiceRepository};
use crate::services::service_order_service::not_found;

/// Application service for lines, guarded by the parent service's state.
pub struct ServiceLineService<S, L, C> {
    services: S,
    lines: L,
    catalog: C,
}

impl<S, L, C> ServiceLineService<S, L, C>
where
    S: ServiceRepository,
    L: ServiceLineRepository,
    C: CatalogRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(services: S, lines: L, catalog: C) -> Self {
        Self {
            services,
            lines,
            catalog,
        }
    }

    /// Attach a line to its service.
    ///
    /// A line with a product and no reference amount takes the product's
    /// cost price.
    ///
    /// # Errors
    ///
    /// - [`TechServError::NotFound`] when the service or product is unknown
    /// - [`TechServError::Workflow`] once the service is past review
    /// - [`TechServError::Validation`] if the line breaks an invariant
    #[tracing::instrument(skip(self, line), fields(service_id = %line.service_id))]
    pub async fn add_line(&self, mut line: ServiceLine) -> Result<ServiceLine, TechServError> {
        let service = self.parent(line.service_id).await?;
        service.check_add_line()?;
        if let Some(product_id) = line.product_id {
            let product = self.catalog.get_product(product_id).await?.ok_or_else(|| {
                NotFoundError {
                    entity: "Product",
                    id: product_id.to_string(),
                }
            })?;
            line.default_amount_from(&product);
        }
        line.validate()?;
        self.lines.create(line).await
    }

    /// Look up a line by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::NotFound`] when no line with `id` exists.
    pub async fn get_line(&self, id: ServiceLineId) -> Result<ServiceLine, TechServError> {
        self.lines.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "ServiceLine",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Lines of one service.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_lines(&self, service_id: ServiceId) -> Result<Vec<ServiceLine>, TechServError> {
        self.lines.find_by_service(service_id).await
    }

    /// Replace a line. It stays attached to its original service.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::Workflow`] once the service left pending.
    #[tracing::instrument(skip(self, incoming), fields(line_id = %incoming.id))]
    pub async fn update_line(&self, mut incoming: ServiceLine) -> Result<ServiceLine, TechServError> {
        let stored = self.get_line(incoming.id).await?;
        let service = self.parent(stored.service_id).await?;
        service.check_edit_line(&stored)?;
        incoming.service_id = stored.service_id;
        incoming.validate()?;
        self.lines.update(incoming).await
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::Workflow`] once the service left pending.
    #[tracing::instrument(skip(self))]
    pub async fn delete_line(&self, id: ServiceLineId) -> Result<(), TechServError> {
        let stored = self.get_line(id).await?;
        let service = self.parent(stored.service_id).await?;
        service.check_edit_line(&stored)?;
        self.lines.delete(id).await
    }

    async fn parent(&self, id: ServiceId) -> Result<Service, TechServError> {
        self.services
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id).into())
    }
}
