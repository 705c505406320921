//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod membership;
pub mod query;
pub mod report;
pub mod storage;

pub use membership::GroupMembership;
pub use query::CustomerHistoryQuery;
pub use report::ReportRenderer;
pub use storage::{
    AddressRepository, CatalogRepository, FiscalYearRepository, HistoryLineRepository,
    PeriodRepository, PeriphericRepository, SequenceRepository, ServiceLineRepository,
    ServiceRepository, StateChange,
};
