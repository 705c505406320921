//! Report service: renders the service sheet.

use techserv_domain::error::{BatchRejection, TechServError, ValidationError};
use techserv_domain::id::ServiceId;
use techserv_domain::report::{REPORT_TITLE, RenderedReport, ServiceReportData, title_for};

use crate::ports::{HistoryLineRepository, ReportRenderer, ServiceLineRepository, ServiceRepository};
use crate::services::service_order_service::missing;

/// Application service producing service reports.
pub struct ReportService<S, L, H, R> {
    services: S,
    lines: L,
    history: H,
    renderer: R,
}

impl<S, L, H, R> ReportService<S, L, H, R>
where
    S: ServiceRepository,
    L: ServiceLineRepository,
    H: HistoryLineRepository,
    R: ReportRenderer,
{
    /// Create a new service backed by the given ports.
    pub fn new(services: S, lines: L, history: H, renderer: R) -> Self {
        Self {
            services,
            lines,
            history,
            renderer,
        }
    }

    /// Render the report for the selected services.
    ///
    /// Only the first selected service is rendered. Selecting several
    /// turns on direct printing.
    ///
    /// # Errors
    ///
    /// - [`TechServError::Validation`] for an empty selection
    /// - [`TechServError::NotFound`] (or a batch of them) for unknown ids
    /// - any error raised by the renderer
    #[tracing::instrument(skip(self), fields(count = ids.len()))]
    pub async fn render(&self, ids: &[ServiceId]) -> Result<RenderedReport, TechServError> {
        let Some(first_id) = ids.first().copied() else {
            return Err(ValidationError::EmptySelection.into());
        };
        let mut selected = self.services.get_many(ids).await?;
        BatchRejection::check(missing(ids, &selected))?;
        selected.sort_by_key(|service| ids.iter().position(|id| *id == service.id));

        let (title, direct_print) = title_for(REPORT_TITLE, &selected);
        let Some(first) = selected.into_iter().find(|service| service.id == first_id) else {
            return Err(super::service_order_service::not_found(first_id).into());
        };
        let lines = self.lines.find_by_service(first_id).await?;
        let history = self.history.find_by_service(first_id).await?;
        let data = ServiceReportData::new(first, lines, history);
        let content = self.renderer.render(&data)?;

        Ok(RenderedReport {
            format: self.renderer.format().to_string(),
            content,
            direct_print,
            title,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Memory, PlainRenderer};
    use techserv_domain::service::Service;

    fn make_service() -> (ReportService<Memory, Memory, Memory, PlainRenderer>, Memory) {
        let memory = Memory::default();
        (
            ReportService::new(memory.clone(), memory.clone(), memory.clone(), PlainRenderer),
            memory,
        )
    }

    fn numbered(memory: &Memory, number: &str) -> Service {
        let service = Service::builder().number_service(number).build().unwrap();
        memory.insert_service(service.clone());
        service
    }

    #[tokio::test]
    async fn should_title_single_report_with_number() {
        let (svc, memory) = make_service();
        let service = numbered(&memory, "001-000005");

        let report = svc.render(&[service.id]).await.unwrap();

        assert_eq!(report.title, "Service - 001-000005");
        assert!(!report.direct_print);
        assert_eq!(report.format, "txt");
        assert_eq!(report.content, b"001-000005".to_vec());
    }

    #[tokio::test]
    async fn should_render_first_and_direct_print_when_several_selected() {
        let (svc, memory) = make_service();
        let first = numbered(&memory, "A");
        let second = numbered(&memory, "B");

        let report = svc.render(&[first.id, second.id]).await.unwrap();

        assert!(report.direct_print);
        assert_eq!(report.title, "Service");
        assert_eq!(report.content, b"A".to_vec());
    }

    #[tokio::test]
    async fn should_reject_empty_selection() {
        let (svc, _) = make_service();
        assert!(matches!(
            svc.render(&[]).await,
            Err(TechServError::Validation(ValidationError::EmptySelection))
        ));
    }
}
