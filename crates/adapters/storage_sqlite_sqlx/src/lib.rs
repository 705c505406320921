//! # techserv-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `techserv-app::ports::storage`
//! - Draw service numbers inside the transaction that stores them
//!   ([`SqliteServiceRepository`])
//! - Answer group membership and per-customer history queries
//! - Manage `SQLite` connection pool lifecycle and embedded migrations
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `techserv-app` (for port traits) and `techserv-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod decode;

pub mod address_repo;
pub mod catalog_repo;
pub mod customer_query;
pub mod error;
pub mod fiscal_repo;
pub mod history_line_repo;
pub mod membership;
pub mod periferic_repo;
pub mod pool;
pub mod sequence_repo;
pub mod service_line_repo;
pub mod service_repo;

pub use address_repo::SqliteAddressRepository;
pub use catalog_repo::SqliteCatalogRepository;
pub use customer_query::SqliteCustomerHistoryQuery;
pub use fiscal_repo::{SqliteFiscalYearRepository, SqlitePeriodRepository};
pub use history_line_repo::SqliteHistoryLineRepository;
pub use membership::SqliteGroupMembership;
pub use periferic_repo::SqlitePeriphericRepository;
pub use pool::{Config, Database};
pub use sequence_repo::SqliteSequenceRepository;
pub use service_line_repo::SqliteServiceLineRepository;
pub use service_repo::SqliteServiceRepository;
