//! Service report: the data handed to a renderer and what comes back.
//!
//! Rendering itself sits behind the `ReportRenderer` port. The rules here
//! only decide the title and the direct-print flag from the selection.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::history_line::HistoryLine;
use crate::service::Service;
use crate::service_line::ServiceLine;

/// Default report title before the service number is appended.
pub const REPORT_TITLE: &str = "Service";

/// Everything a renderer needs for one service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceReportData {
    pub service: Service,
    pub lines: Vec<ServiceLine>,
    pub history: Vec<HistoryLine>,
    pub total: Decimal,
}

impl ServiceReportData {
    #[must_use]
    pub fn new(service: Service, lines: Vec<ServiceLine>, history: Vec<HistoryLine>) -> Self {
        let total = service.total(&lines);
        Self {
            service,
            lines,
            history,
            total,
        }
    }
}

/// Output of a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedReport {
    /// File extension of `content`, e.g. `json`.
    pub format: String,
    pub content: Vec<u8>,
    /// Send straight to the printer instead of previewing.
    pub direct_print: bool,
    pub title: String,
}

/// Title and direct-print flag for a report over `selected` services.
///
/// A single numbered service gets its number appended to `base`. Printing
/// several services at once goes straight to the printer.
#[must_use]
pub fn title_for(base: &str, selected: &[Service]) -> (String, bool) {
    match selected {
        [single] => match &single.number_service {
            Some(number) => (format!("{base} - {number}"), false),
            None => (base.to_string(), false),
        },
        _ => (base.to_string(), selected.len() > 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn should_append_number_for_single_numbered_service() {
        let service = Service::builder().number_service("001-000009").build().unwrap();
        assert_eq!(
            title_for(REPORT_TITLE, &[service]),
            ("Service - 001-000009".to_string(), false)
        );
    }

    #[test]
    fn should_keep_base_title_before_numbering() {
        let service = Service::builder().build().unwrap();
        assert_eq!(
            title_for(REPORT_TITLE, &[service]),
            ("Service".to_string(), false)
        );
    }

    #[test]
    fn should_direct_print_several_services() {
        let first = Service::builder().number_service("1").build().unwrap();
        let second = Service::builder().number_service("2").build().unwrap();
        assert_eq!(
            title_for(REPORT_TITLE, &[first, second]),
            ("Service".to_string(), true)
        );
    }

    #[test]
    fn should_total_lines_in_report_data() {
        let service = Service::builder().build().unwrap();
        let lines = vec![
            ServiceLine::builder()
                .service_id(service.id)
                .reference_amount(dec!(10))
                .build()
                .unwrap(),
            ServiceLine::builder()
                .service_id(service.id)
                .reference_amount(dec!(2.5))
                .build()
                .unwrap(),
        ];
        let data = ServiceReportData::new(service, lines, Vec::new());
        assert_eq!(data.total, dec!(12.5));
    }
}
