//! Shared application state for axum handlers.

use std::sync::Arc;

use techserv_app::ports::{
    AddressRepository, CatalogRepository, CustomerHistoryQuery, FiscalYearRepository,
    GroupMembership, HistoryLineRepository, PeriodRepository, PeriphericRepository, ReportRenderer,
    SequenceRepository, ServiceLineRepository, ServiceRepository,
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

/// The set of port implementations the API runs on.
///
/// Handlers are generic over a single `B: Backend` instead of one type
/// parameter per port.
pub trait Backend: Send + Sync + 'static {
    type Services: ServiceRepository + Send + Sync + 'static;
    type Lines: ServiceLineRepository + Send + Sync + 'static;
    type History: HistoryLineRepository + Send + Sync + 'static;
    type Periferics: PeriphericRepository + Send + Sync + 'static;
    type FiscalYears: FiscalYearRepository + Send + Sync + 'static;
    type Periods: PeriodRepository + Send + Sync + 'static;
    type Sequences: SequenceRepository + Send + Sync + 'static;
    type Catalog: CatalogRepository + Send + Sync + 'static;
    type Addresses: AddressRepository + Send + Sync + 'static;
    type Membership: GroupMembership + Send + Sync + 'static;
    type Customers: CustomerHistoryQuery + Send + Sync + 'static;
    type Renderer: ReportRenderer + Send + Sync + 'static;
}

pub type ServiceOrders<B> = ServiceOrderService<<B as Backend>::Services, <B as Backend>::Lines>;
pub type Lines<B> = ServiceLineService<
    <B as Backend>::Services,
    <B as Backend>::Lines,
    <B as Backend>::Catalog,
>;
pub type History<B> = HistoryService<<B as Backend>::Services, <B as Backend>::History>;
pub type Workflow<B> = WorkflowService<
    <B as Backend>::Services,
    <B as Backend>::Periods,
    <B as Backend>::FiscalYears,
    <B as Backend>::Membership,
>;
pub type Fiscal<B> = FiscalService<
    <B as Backend>::FiscalYears,
    <B as Backend>::Periods,
    <B as Backend>::Sequences,
    <B as Backend>::Services,
>;
pub type Reports<B> = ReportService<
    <B as Backend>::Services,
    <B as Backend>::Lines,
    <B as Backend>::History,
    <B as Backend>::Renderer,
>;

/// Application state shared across all axum handlers.
///
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone`, only the `Arc` wrappers are cloned.
pub struct AppState<B: Backend> {
    pub service_orders: Arc<ServiceOrders<B>>,
    pub lines: Arc<Lines<B>>,
    pub history: Arc<History<B>>,
    pub workflow: Arc<Workflow<B>>,
    pub fiscal: Arc<Fiscal<B>>,
    pub periferics: Arc<PeriphericService<B::Periferics>>,
    pub addresses: Arc<AddressService<B::Addresses>>,
    pub catalog: Arc<CatalogService<B::Catalog>>,
    pub reports: Arc<Reports<B>>,
    pub customers: Arc<CustomerService<B::Customers>>,
}

impl<B: Backend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            service_orders: Arc::clone(&self.service_orders),
            lines: Arc::clone(&self.lines),
            history: Arc::clone(&self.history),
            workflow: Arc::clone(&self.workflow),
            fiscal: Arc::clone(&self.fiscal),
            periferics: Arc::clone(&self.periferics),
            addresses: Arc::clone(&self.addresses),
            catalog: Arc::clone(&self.catalog),
            reports: Arc::clone(&self.reports),
            customers: Arc::clone(&self.customers),
        }
    }
}
