//! Flattened per-customer service history, one row per service line.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::service::ServiceState;
use crate::time::Date;

/// One line of a customer's repair history, joined with the names of the
/// records it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerServiceRow {
    pub entry_date: Option<Date>,
    pub delivery_date: Option<Date>,
    pub number_service: Option<String>,
    pub periferic: Option<String>,
    pub trademark: Option<String>,
    pub model: Option<String>,
    pub failure: Option<String>,
    pub reference_amount: Option<Decimal>,
    pub technician: Option<String>,
    pub state: ServiceState,
    pub accessories: Option<String>,
    /// Repair detail, taken from the service observations.
    pub repair_detail: Option<String>,
}
