//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod catalog;
#[allow(clippy::missing_errors_doc)]
pub mod customers;
#[allow(clippy::missing_errors_doc)]
pub mod fiscal;
#[allow(clippy::missing_errors_doc)]
pub mod history;
#[allow(clippy::missing_errors_doc)]
pub mod lines;
#[allow(clippy::missing_errors_doc)]
pub mod periferics;
#[allow(clippy::missing_errors_doc)]
pub mod services;
#[allow(clippy::missing_errors_doc)]
pub mod workflow;

use std::str::FromStr;

use axum::Router;
use axum::routing::{get, post, put};
use serde::Deserialize;

use techserv_domain::id::ServiceId;

use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// Request body of every action over a selection of services.
#[derive(Debug, Deserialize)]
pub struct Selection {
    pub ids: Vec<ServiceId>,
}

/// Parse an identifier taken from the path.
pub(crate) fn parse_id<T: FromStr>(raw: &str) -> Result<T, ApiError> {
    T::from_str(raw).map_err(|_| ApiError::invalid_id(raw))
}

/// Build the `/api` sub-router.
pub fn routes<B: Backend>() -> Router<AppState<B>> {
    Router::new()
        // Services
        .route(
            "/services",
            get(services::list::<B>)
                .post(services::create::<B>)
                .delete(services::delete_many::<B>),
        )
        .route("/services/report", post(services::report::<B>))
        .route(
            "/services/{id}",
            get(services::get::<B>)
                .put(services::update::<B>)
                .delete(services::delete::<B>),
        )
        .route("/services/{id}/total", get(services::total::<B>))
        .route("/services/{id}/view", get(services::view::<B>))
        // Lines
        .route(
            "/services/{id}/lines",
            get(lines::list::<B>).post(lines::create::<B>),
        )
        .route(
            "/lines/{id}",
            get(lines::get::<B>)
                .put(lines::update::<B>)
                .delete(lines::delete::<B>),
        )
        // History
        .route(
            "/services/{id}/history",
            get(history::list::<B>).post(history::create::<B>),
        )
        .route(
            "/history/{id}",
            get(history::get::<B>)
                .put(history::update::<B>)
                .delete(history::delete::<B>),
        )
        .route("/history/{id}/credential", put(history::set_credential::<B>))
        .route("/history/{id}/verify", post(history::verify_credential::<B>))
        // Workflow
        .route("/workflow/{action}", post(workflow::apply::<B>))
        // Customers
        .route(
            "/customers/{party_id}/services",
            get(customers::services_of::<B>),
        )
        // Periferics
        .route(
            "/periferics",
            get(periferics::list::<B>).post(periferics::create::<B>),
        )
        .route(
            "/periferics/{id}",
            get(periferics::get::<B>)
                .put(periferics::update::<B>)
                .delete(periferics::delete::<B>),
        )
        // Fiscal configuration
        .route(
            "/sequences",
            get(fiscal::list_sequences::<B>).post(fiscal::create_sequence::<B>),
        )
        .route(
            "/fiscal-years",
            get(fiscal::list_fiscal_years::<B>).post(fiscal::create_fiscal_year::<B>),
        )
        .route(
            "/fiscal-years/{id}",
            get(fiscal::get_fiscal_year::<B>).put(fiscal::update_fiscal_year::<B>),
        )
        .route(
            "/periods",
            get(fiscal::list_periods::<B>).post(fiscal::create_period::<B>),
        )
        .route(
            "/periods/{id}",
            get(fiscal::get_period::<B>).put(fiscal::update_period::<B>),
        )
        // Catalog
        .route("/companies", post(catalog::create_company::<B>))
        .route("/parties", post(catalog::create_party::<B>))
        .route("/parties/{id}/addresses", get(catalog::list_addresses::<B>))
        .route("/employees", post(catalog::create_employee::<B>))
        .route("/trademarks", post(catalog::create_trademark::<B>))
        .route(
            "/products",
            get(catalog::list_products::<B>).post(catalog::create_product::<B>),
        )
        .route("/addresses", post(catalog::create_address::<B>))
        .route("/addresses/{id}", get(catalog::get_address::<B>))
}
