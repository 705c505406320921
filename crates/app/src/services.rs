//! Application services — use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod address_service;
pub mod catalog_service;
pub mod customer_service;
pub mod fiscal_service;
pub mod history_service;
pub mod line_service;
pub mod periferic_service;
pub mod report_service;
pub mod service_order_service;
pub mod workflow_service;
