//! Assembles the `SQLite` adapters into the HTTP application state.

use std::sync::Arc;

use techserv_adapter_http_axum::report::JsonReportRenderer;
use techserv_adapter_http_axum::state::{AppState, Backend};
use techserv_adapter_storage_sqlite_sqlx::{
    Database, SqliteAddressRepository, SqliteCatalogRepository, SqliteCustomerHistoryQuery,
    SqliteFiscalYearRepository, SqliteGroupMembership, SqliteHistoryLineRepository,
    SqlitePeriodRepository, SqlitePeriphericRepository, SqliteSequenceRepository,
    SqliteServiceLineRepository, SqliteServiceRepository,
};
use techserv_app::services::address_service::AddressService;
use techserv_app::services::catalog_service::CatalogService;
use techserv_app::services::customer_service::CustomerService;
use techserv_app::services::fiscal_service::FiscalService;
use techserv_app::services::history_service::HistoryService;
use techserv_app::services::line_service::ServiceLineService;
use techserv_app::services::periferic_service::PeriphericService;
use techserv_app::services::report_service::ReportService;
use techserv_app::services::service_order_service::ServiceOrderService;
use techserv_app::services::workflow_service::WorkflowService;
use techserv_domain::error::TechServError;

use crate::config::{Config, WorkflowConfig};

/// Every port served by the `SQLite` adapter.
pub struct SqliteBackend;

impl Backend for SqliteBackend {
    type Services = SqliteServiceRepository;
    type Lines = SqliteServiceLineRepository;
    type History = SqliteHistoryLineRepository;
    type Periferics = SqlitePeriphericRepository;
    type FiscalYears = SqliteFiscalYearRepository;
    type Periods = SqlitePeriodRepository;
    type Sequences = SqliteSequenceRepository;
    type Catalog = SqliteCatalogRepository;
    type Addresses = SqliteAddressRepository;
    type Membership = SqliteGroupMembership;
    type Customers = SqliteCustomerHistoryQuery;
    type Renderer = JsonReportRenderer;
}

/// Construct repositories and use-case services over `db`.
#[must_use]
pub fn app_state(db: &Database, config: &Config) -> AppState<SqliteBackend> {
    let pool = db.pool();
    let services = || SqliteServiceRepository::new(pool.clone());
    let lines = || SqliteServiceLineRepository::new(pool.clone());
    let history = || SqliteHistoryLineRepository::new(pool.clone());
    let periods = || SqlitePeriodRepository::new(pool.clone());
    let fiscal_years = || SqliteFiscalYearRepository::new(pool.clone());

    let workflow = WorkflowService::new(
        services(),
        periods(),
        fiscal_years(),
        SqliteGroupMembership::new(pool.clone()),
    )
    .with_draft_group(config.workflow.draft_group.clone());

    AppState {
        service_orders: Arc::new(ServiceOrderService::new(services(), lines())),
        lines: Arc::new(ServiceLineService::new(
            services(),
            lines(),
            SqliteCatalogRepository::new(pool.clone()),
        )),
        history: Arc::new(HistoryService::new(services(), history())),
        workflow: Arc::new(workflow),
        fiscal: Arc::new(FiscalService::new(
            fiscal_years(),
            periods(),
            SqliteSequenceRepository::new(pool.clone()),
            services(),
        )),
        periferics: Arc::new(PeriphericService::new(SqlitePeriphericRepository::new(
            pool.clone(),
        ))),
        addresses: Arc::new(AddressService::new(
            SqliteAddressRepository::new(pool.clone()),
            config.addresses.clone(),
        )),
        catalog: Arc::new(CatalogService::new(SqliteCatalogRepository::new(
            pool.clone(),
        ))),
        reports: Arc::new(ReportService::new(
            services(),
            lines(),
            history(),
            JsonReportRenderer,
        )),
        customers: Arc::new(CustomerService::new(SqliteCustomerHistoryQuery::new(
            pool.clone(),
        ))),
    }
}

/// Put the configured users in the draft group.
///
/// # Errors
///
/// Returns a storage error if a membership cannot be written.
pub async fn seed_draft_members(db: &Database, workflow: &WorkflowConfig) -> Result<(), TechServError> {
    let membership = SqliteGroupMembership::new(db.pool().clone());
    for user in &workflow.draft_members {
        membership.add_member(*user, &workflow.draft_group).await?;
    }
    Ok(())
}
