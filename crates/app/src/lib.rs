//! # techserv-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - repositories for services, lines, history, periferics, fiscal years,
//!     periods, sequences, catalog records and addresses; the service
//!     repository draws numbers inside its transition transaction
//!   - `GroupMembership` — authorization group lookup
//!   - `ReportRenderer` — turns report data into a document
//!   - `CustomerHistoryQuery` — flattened per-customer history
//! - Define **driving/inbound ports** as use-case structs:
//!   - `ServiceOrderService`, `ServiceLineService`, `HistoryService`
//!   - `WorkflowService` — batch transitions, numbering, draft reset
//!   - `FiscalService` — fiscal years, periods, sequences and their guards
//!   - `PeriphericService`, `CatalogService`, `AddressService`
//!   - `ReportService`, `CustomerService`
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `techserv-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
