//! Storage port: repository traits for persistence.
//!
//! Methods taking several records write them atomically: either every
//! record is stored or none is.

use std::future::Future;

use techserv_domain::address::Address;
use techserv_domain::catalog::{Company, Employee, Party, Product, Trademark};
use techserv_domain::error::TechServError;
use techserv_domain::fiscal::{FiscalYear, Period};
use techserv_domain::history_line::HistoryLine;
use techserv_domain::id::{
    AddressId, CompanyId, FiscalYearId, HistoryLineId, PartyId, PeriodId, PeriphericId, ProductId,
    SequenceId, ServiceId, ServiceLineId,
};
use techserv_domain::periferic::Periferic;
use techserv_domain::sequence::StrictSequence;
use techserv_domain::service::{Service, ServiceKind, ServiceState};
use techserv_domain::service_line::ServiceLine;
use techserv_domain::time::Date;

/// One guarded state change, applied by
/// [`ServiceRepository::transition_many`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub id: ServiceId,
    /// State the stored service must still be in.
    pub from: ServiceState,
    pub to: ServiceState,
    /// Entry date stored when the service has none.
    pub entry_date: Option<Date>,
    /// Sequence to draw the service number from. The stored service must
    /// still be unnumbered.
    pub draw: Option<SequenceId>,
}

/// Repository for [`Service`] headers.
pub trait ServiceRepository {
    fn create(&self, service: Service) -> impl Future<Output = Result<Service, TechServError>> + Send;

    fn get_by_id(
        &self,
        id: ServiceId,
    ) -> impl Future<Output = Result<Option<Service>, TechServError>> + Send;

    /// Get the services whose id is in `ids`. Unknown ids are skipped.
    fn get_many(
        &self,
        ids: &[ServiceId],
    ) -> impl Future<Output = Result<Vec<Service>, TechServError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<Service>, TechServError>> + Send;

    /// Store the editable fields of `service`. State and number are left
    /// as stored.
    ///
    /// Fails with [`WorkflowError::StaleState`] when the stored service is
    /// no longer in `service.state`.
    ///
    /// [`WorkflowError::StaleState`]: techserv_domain::error::WorkflowError::StaleState
    fn update(&self, service: Service) -> impl Future<Output = Result<Service, TechServError>> + Send;

    /// Apply every change in one transaction, drawing service numbers inside
    /// it, and return the stored services.
    ///
    /// When a service left its `from` state, or got a number meanwhile for a
    /// change that draws one, nothing is written, no sequence value is
    /// consumed and [`WorkflowError::StaleState`] is returned.
    ///
    /// Fails with a sequence error when a drawn sequence does not exist.
    ///
    /// [`WorkflowError::StaleState`]: techserv_domain::error::WorkflowError::StaleState
    fn transition_many(
        &self,
        changes: Vec<StateChange>,
    ) -> impl Future<Output = Result<Vec<Service>, TechServError>> + Send;

    /// Delete services with their lines and history in one transaction.
    fn delete_many(&self, ids: &[ServiceId]) -> impl Future<Output = Result<(), TechServError>> + Send;

    /// Whether a numbered service of `kind` entered between `start` and
    /// `end`, both included.
    fn exists_numbered_between(
        &self,
        kind: ServiceKind,
        start: Date,
        end: Date,
    ) -> impl Future<Output = Result<bool, TechServError>> + Send;
}

/// Repository for [`ServiceLine`]s.
pub trait ServiceLineRepository {
    fn create(
        &self,
        line: ServiceLine,
    ) -> impl Future<Output = Result<ServiceLine, TechServError>> + Send;

    fn get_by_id(
        &self,
        id: ServiceLineId,
    ) -> impl Future<Output = Result<Option<ServiceLine>, TechServError>> + Send;

    fn find_by_service(
        &self,
        service_id: ServiceId,
    ) -> impl Future<Output = Result<Vec<ServiceLine>, TechServError>> + Send;

    fn update(
        &self,
        line: ServiceLine,
    ) -> impl Future<Output = Result<ServiceLine, TechServError>> + Send;

    fn delete(&self, id: ServiceLineId) -> impl Future<Output = Result<(), TechServError>> + Send;
}

/// Repository for [`HistoryLine`]s, credential digest included.
pub trait HistoryLineRepository {
    fn create(
        &self,
        line: HistoryLine,
    ) -> impl Future<Output = Result<HistoryLine, TechServError>> + Send;

    fn get_by_id(
        &self,
        id: HistoryLineId,
    ) -> impl Future<Output = Result<Option<HistoryLine>, TechServError>> + Send;

    /// Lines of one service, oldest first.
    fn find_by_service(
        &self,
        service_id: ServiceId,
    ) -> impl Future<Output = Result<Vec<HistoryLine>, TechServError>> + Send;

    fn update(
        &self,
        line: HistoryLine,
    ) -> impl Future<Output = Result<HistoryLine, TechServError>> + Send;

    fn delete(&self, id: HistoryLineId) -> impl Future<Output = Result<(), TechServError>> + Send;
}

/// Repository for [`Periferic`]s.
pub trait PeriphericRepository {
    fn create(
        &self,
        periferic: Periferic,
    ) -> impl Future<Output = Result<Periferic, TechServError>> + Send;

    fn get_by_id(
        &self,
        id: PeriphericId,
    ) -> impl Future<Output = Result<Option<Periferic>, TechServError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<Periferic>, TechServError>> + Send;

    fn update(
        &self,
        periferic: Periferic,
    ) -> impl Future<Output = Result<Periferic, TechServError>> + Send;

    fn delete(&self, id: PeriphericId) -> impl Future<Output = Result<(), TechServError>> + Send;
}

/// Repository for [`FiscalYear`]s.
pub trait FiscalYearRepository {
    fn create(
        &self,
        fiscal_year: FiscalYear,
    ) -> impl Future<Output = Result<FiscalYear, TechServError>> + Send;

    fn get_by_id(
        &self,
        id: FiscalYearId,
    ) -> impl Future<Output = Result<Option<FiscalYear>, TechServError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<FiscalYear>, TechServError>> + Send;

    fn update(
        &self,
        fiscal_year: FiscalYear,
    ) -> impl Future<Output = Result<FiscalYear, TechServError>> + Send;
}

/// Repository for [`Period`]s.
pub trait PeriodRepository {
    fn create(&self, period: Period) -> impl Future<Output = Result<Period, TechServError>> + Send;

    fn get_by_id(
        &self,
        id: PeriodId,
    ) -> impl Future<Output = Result<Option<Period>, TechServError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<Period>, TechServError>> + Send;

    fn update(&self, period: Period) -> impl Future<Output = Result<Period, TechServError>> + Send;

    /// The open standard period covering `date` in a fiscal year of
    /// `company`.
    fn find_open_standard(
        &self,
        company: CompanyId,
        date: Date,
    ) -> impl Future<Output = Result<Option<Period>, TechServError>> + Send;
}

/// Repository for [`StrictSequence`] definitions.
pub trait SequenceRepository {
    fn create(
        &self,
        sequence: StrictSequence,
    ) -> impl Future<Output = Result<StrictSequence, TechServError>> + Send;

    fn get_by_id(
        &self,
        id: SequenceId,
    ) -> impl Future<Output = Result<Option<StrictSequence>, TechServError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<StrictSequence>, TechServError>> + Send;
}

/// Repository for the catalog records services refer to.
pub trait CatalogRepository {
    fn create_company(
        &self,
        company: Company,
    ) -> impl Future<Output = Result<Company, TechServError>> + Send;

    fn create_party(&self, party: Party) -> impl Future<Output = Result<Party, TechServError>> + Send;

    fn create_employee(
        &self,
        employee: Employee,
    ) -> impl Future<Output = Result<Employee, TechServError>> + Send;

    fn create_trademark(
        &self,
        trademark: Trademark,
    ) -> impl Future<Output = Result<Trademark, TechServError>> + Send;

    fn create_product(
        &self,
        product: Product,
    ) -> impl Future<Output = Result<Product, TechServError>> + Send;

    fn get_product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<Product>, TechServError>> + Send;

    fn get_products(&self) -> impl Future<Output = Result<Vec<Product>, TechServError>> + Send;
}

/// Repository for party [`Address`]es.
pub trait AddressRepository {
    fn create(&self, address: Address) -> impl Future<Output = Result<Address, TechServError>> + Send;

    fn get_by_id(
        &self,
        id: AddressId,
    ) -> impl Future<Output = Result<Option<Address>, TechServError>> + Send;

    fn find_by_party(
        &self,
        party_id: PartyId,
    ) -> impl Future<Output = Result<Vec<Address>, TechServError>> + Send;
}
