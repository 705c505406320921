//! # techserv-domain
//!
//! Pure domain model for the techserv repair-service workshop.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, dates
//! - Define **Services** (repair orders) and their workflow state machine
//! - Define **Service lines** (itemized repairs and parts) and **history lines**
//!   (audit notes, with an optional credential pair)
//! - Define **Periferics**, **catalog records** and **addresses**
//! - Define **fiscal years**, **periods** and **strict sequences** used to
//!   number services
//! - Provide presentation predicates (which actions and fields are available
//!   for a given record snapshot)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod address;
pub mod catalog;
pub mod context;
pub mod credential;
pub mod customer;
pub mod fiscal;
pub mod history_line;
pub mod periferic;
pub mod report;
pub mod sequence;
pub mod service;
pub mod service_line;
