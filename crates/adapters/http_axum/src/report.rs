//! JSON implementation of the [`ReportRenderer`] port.

use techserv_app::ports::ReportRenderer;
use techserv_domain::error::TechServError;
use techserv_domain::report::ServiceReportData;

/// Renders a service, its lines, notes and total as a pretty-printed JSON
/// document.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReportRenderer;

impl ReportRenderer for JsonReportRenderer {
    fn format(&self) -> &'static str {
        "json"
    }

    fn render(&self, data: &ServiceReportData) -> Result<Vec<u8>, TechServError> {
        serde_json::to_vec_pretty(data).map_err(|err| TechServError::Report(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use techserv_domain::credential::PasswordDigest;
    use techserv_domain::history_line::HistoryLine;
    use techserv_domain::service::Service;

    #[test]
    fn should_render_service_without_password_digest() {
        let service = Service::builder().number_service("MAR-0001").build().unwrap();
        let mut note = HistoryLine::builder()
            .service_id(service.id)
            .description("picked up")
            .build();
        note.user = Some("frontdesk".to_string());
        note.password = Some(PasswordDigest::from_phc("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"));
        let data = ServiceReportData::new(service, Vec::new(), vec![note]);

        let content = JsonReportRenderer.render(&data).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&content).unwrap();

        assert_eq!(json["service"]["number_service"], "MAR-0001");
        assert_eq!(json["history"][0]["user"], "frontdesk");
        assert!(json["history"][0].get("password").is_none());
        assert_eq!(json["total"], "0");
    }
}
