//! # techserv-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** over services, lines, history notes, the workflow
//!   actions, fiscal configuration, catalog records and reports
//! - Build the [`RequestContext`](techserv_domain::context::RequestContext)
//!   of each call from its headers
//! - Map application errors onto HTTP status codes
//! - Render service reports as JSON documents
//!
//! ## Dependency rule
//! Depends on `techserv-app` (for port traits and services) and
//! `techserv-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod context;
pub mod error;
pub mod report;
pub mod router;
pub mod state;
