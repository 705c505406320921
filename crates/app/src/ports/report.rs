//! Report renderer port.

use techserv_domain::error::TechServError;
use techserv_domain::report::ServiceReportData;

/// Turns report data into a document.
pub trait ReportRenderer {
    /// File extension of the produced documents.
    fn format(&self) -> &'static str;

    /// Render one service.
    ///
    /// # Errors
    ///
    /// Returns an error when the document cannot be produced.
    fn render(&self, data: &ServiceReportData) -> Result<Vec<u8>, TechServError>;
}
