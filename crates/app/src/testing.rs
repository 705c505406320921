//! In-memory port implementations shared by the use-case tests.
//!
//! Exported behind the `testing` feature so adapter tests can run the
//! handlers without a database.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use techserv_domain::address::Address;
use techserv_domain::catalog::{Company, Employee, Party, Product, Trademark};
use techserv_domain::customer::CustomerServiceRow;
use techserv_domain::error::{SequenceError, TechServError, WorkflowError};
use techserv_domain::fiscal::{FiscalYear, Period};
use techserv_domain::history_line::HistoryLine;
use techserv_domain::id::{
    AddressId, CompanyId, FiscalYearId, HistoryLineId, PartyId, PeriodId, PeriphericId, ProductId,
    SequenceId, ServiceId, ServiceLineId, UserId,
};
use techserv_domain::periferic::Periferic;
use techserv_domain::report::ServiceReportData;
use techserv_domain::sequence::StrictSequence;
use techserv_domain::service::{Service, ServiceKind};
use techserv_domain::service_line::ServiceLine;
use techserv_domain::time::Date;

use crate::ports::{
    AddressRepository, CatalogRepository, CustomerHistoryQuery, FiscalYearRepository,
    GroupMembership, HistoryLineRepository, PeriodRepository, PeriphericRepository,
    ReportRenderer, SequenceRepository, ServiceLineRepository, ServiceRepository, StateChange,
};

#[derive(Default)]
pub struct Data {
    pub services: HashMap<ServiceId, Service>,
    pub lines: HashMap<ServiceLineId, ServiceLine>,
    pub history: Vec<HistoryLine>,
    pub periferics: HashMap<PeriphericId, Periferic>,
    pub fiscal_years: HashMap<FiscalYearId, FiscalYear>,
    pub periods: HashMap<PeriodId, Period>,
    pub sequences: HashMap<SequenceId, StrictSequence>,
    pub products: HashMap<ProductId, Product>,
    pub parties: HashMap<PartyId, Party>,
    pub addresses: HashMap<AddressId, Address>,
    pub members: HashSet<(UserId, String)>,
    /// Number of `transition_many` writes, to assert that nothing was written.
    pub batch_writes: usize,
    /// Number of sequence values handed out.
    pub drawn: usize,
}

impl Data {
    fn draw(&mut self, sequence: SequenceId) -> Result<String, TechServError> {
        let stored = self
            .sequences
            .get_mut(&sequence)
            .ok_or_else(|| SequenceError::UnknownSequence {
                id: sequence.to_string(),
            })?;
        let number = stored.format(stored.number_next);
        stored.number_next += 1;
        self.drawn += 1;
        Ok(number)
    }
}

fn stale(id: ServiceId) -> TechServError {
    WorkflowError::StaleState {
        service: id.to_string(),
    }
    .into()
}

/// Every port backed by one shared in-memory store.
#[derive(Clone, Default)]
pub struct Memory(Arc<Mutex<Data>>);

impl Memory {
    pub fn data(&self) -> MutexGuard<'_, Data> {
        self.0.lock().unwrap()
    }

    pub fn insert_service(&self, service: Service) {
        self.data().services.insert(service.id, service);
    }

    pub fn service(&self, id: ServiceId) -> Service {
        self.data().services[&id].clone()
    }

    pub fn insert_line(&self, line: ServiceLine) {
        self.data().lines.insert(line.id, line);
    }

    pub fn insert_sequence(&self, sequence: StrictSequence) {
        self.data().sequences.insert(sequence.id, sequence);
    }

    pub fn insert_fiscal_year(&self, fiscal_year: FiscalYear) {
        self.data().fiscal_years.insert(fiscal_year.id, fiscal_year);
    }

    pub fn insert_period(&self, period: Period) {
        self.data().periods.insert(period.id, period);
    }

    pub fn add_member(&self, user: UserId, group: &str) {
        self.data().members.insert((user, group.to_string()));
    }
}

impl ServiceRepository for Memory {
    async fn create(&self, service: Service) -> Result<Service, TechServError> {
        self.insert_service(service.clone());
        Ok(service)
    }

    async fn get_by_id(&self, id: ServiceId) -> Result<Option<Service>, TechServError> {
        Ok(self.data().services.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[ServiceId]) -> Result<Vec<Service>, TechServError> {
        let data = self.data();
        Ok(ids
            .iter()
            .filter_map(|id| data.services.get(id).cloned())
            .collect())
    }

    async fn get_all(&self) -> Result<Vec<Service>, TechServError> {
        Ok(self.data().services.values().cloned().collect())
    }

    async fn update(&self, service: Service) -> Result<Service, TechServError> {
        let mut data = self.data();
        let stored = data
            .services
            .get_mut(&service.id)
            .filter(|stored| stored.state == service.state)
            .ok_or_else(|| stale(service.id))?;
        let number = stored.number_service.take();
        *stored = service;
        stored.number_service = number;
        Ok(stored.clone())
    }

    async fn transition_many(&self, changes: Vec<StateChange>) -> Result<Vec<Service>, TechServError> {
        let mut data = self.data();
        for change in &changes {
            let current = data.services.get(&change.id).is_some_and(|stored| {
                stored.state == change.from
                    && (change.draw.is_none() || stored.number_service.is_none())
            });
            if !current {
                return Err(stale(change.id));
            }
            if let Some(sequence) = change.draw {
                if !data.sequences.contains_key(&sequence) {
                    return Err(SequenceError::UnknownSequence {
                        id: sequence.to_string(),
                    }
                    .into());
                }
            }
        }

        data.batch_writes += 1;
        let mut stored = Vec::with_capacity(changes.len());
        for change in changes {
            let number = change.draw.map(|sequence| data.draw(sequence)).transpose()?;
            if let Some(service) = data.services.get_mut(&change.id) {
                service.state = change.to;
                if service.entry_date.is_none() {
                    service.entry_date = change.entry_date;
                }
                if let Some(number) = number {
                    service.assign_number(number);
                }
                stored.push(service.clone());
            }
        }
        Ok(stored)
    }

    async fn delete_many(&self, ids: &[ServiceId]) -> Result<(), TechServError> {
        let mut data = self.data();
        for id in ids {
            data.services.remove(id);
        }
        data.lines.retain(|_, line| !ids.contains(&line.service_id));
        data.history.retain(|line| !ids.contains(&line.service_id));
        Ok(())
    }

    async fn exists_numbered_between(
        &self,
        kind: ServiceKind,
        start: Date,
        end: Date,
    ) -> Result<bool, TechServError> {
        Ok(self.data().services.values().any(|service| {
            service.kind == kind
                && service.number_service.is_some()
                && service
                    .entry_date
                    .is_some_and(|date| start <= date && date <= end)
        }))
    }
}

impl ServiceLineRepository for Memory {
    async fn create(&self, line: ServiceLine) -> Result<ServiceLine, TechServError> {
        self.insert_line(line.clone());
        Ok(line)
    }

    async fn get_by_id(&self, id: ServiceLineId) -> Result<Option<ServiceLine>, TechServError> {
        Ok(self.data().lines.get(&id).cloned())
    }

    async fn find_by_service(&self, service_id: ServiceId) -> Result<Vec<ServiceLine>, TechServError> {
        Ok(self
            .data()
            .lines
            .values()
            .filter(|line| line.service_id == service_id)
            .cloned()
            .collect())
    }

    async fn update(&self, line: ServiceLine) -> Result<ServiceLine, TechServError> {
        self.insert_line(line.clone());
        Ok(line)
    }

    async fn delete(&self, id: ServiceLineId) -> Result<(), TechServError> {
        self.data().lines.remove(&id);
        Ok(())
    }
}

impl HistoryLineRepository for Memory {
    async fn create(&self, line: HistoryLine) -> Result<HistoryLine, TechServError> {
        self.data().history.push(line.clone());
        Ok(line)
    }

    async fn get_by_id(&self, id: HistoryLineId) -> Result<Option<HistoryLine>, TechServError> {
        Ok(self.data().history.iter().find(|line| line.id == id).cloned())
    }

    async fn find_by_service(&self, service_id: ServiceId) -> Result<Vec<HistoryLine>, TechServError> {
        Ok(self
            .data()
            .history
            .iter()
            .filter(|line| line.service_id == service_id)
            .cloned()
            .collect())
    }

    async fn update(&self, line: HistoryLine) -> Result<HistoryLine, TechServError> {
        let mut data = self.data();
        if let Some(stored) = data.history.iter_mut().find(|stored| stored.id == line.id) {
            *stored = line.clone();
        }
        Ok(line)
    }

    async fn delete(&self, id: HistoryLineId) -> Result<(), TechServError> {
        self.data().history.retain(|line| line.id != id);
        Ok(())
    }
}

impl PeriphericRepository for Memory {
    async fn create(&self, periferic: Periferic) -> Result<Periferic, TechServError> {
        self.data().periferics.insert(periferic.id, periferic.clone());
        Ok(periferic)
    }

    async fn get_by_id(&self, id: PeriphericId) -> Result<Option<Periferic>, TechServError> {
        Ok(self.data().periferics.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Periferic>, TechServError> {
        Ok(self.data().periferics.values().cloned().collect())
    }

    async fn update(&self, periferic: Periferic) -> Result<Periferic, TechServError> {
        self.data().periferics.insert(periferic.id, periferic.clone());
        Ok(periferic)
    }

    async fn delete(&self, id: PeriphericId) -> Result<(), TechServError> {
        self.data().periferics.remove(&id);
        Ok(())
    }
}

impl FiscalYearRepository for Memory {
    async fn create(&self, fiscal_year: FiscalYear) -> Result<FiscalYear, TechServError> {
        self.insert_fiscal_year(fiscal_year.clone());
        Ok(fiscal_year)
    }

    async fn get_by_id(&self, id: FiscalYearId) -> Result<Option<FiscalYear>, TechServError> {
        Ok(self.data().fiscal_years.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<FiscalYear>, TechServError> {
        Ok(self.data().fiscal_years.values().cloned().collect())
    }

    async fn update(&self, fiscal_year: FiscalYear) -> Result<FiscalYear, TechServError> {
        self.insert_fiscal_year(fiscal_year.clone());
        Ok(fiscal_year)
    }
}

impl PeriodRepository for Memory {
    async fn create(&self, period: Period) -> Result<Period, TechServError> {
        self.insert_period(period.clone());
        Ok(period)
    }

    async fn get_by_id(&self, id: PeriodId) -> Result<Option<Period>, TechServError> {
        Ok(self.data().periods.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Period>, TechServError> {
        Ok(self.data().periods.values().cloned().collect())
    }

    async fn update(&self, period: Period) -> Result<Period, TechServError> {
        self.insert_period(period.clone());
        Ok(period)
    }

    async fn find_open_standard(
        &self,
        company: CompanyId,
        date: Date,
    ) -> Result<Option<Period>, TechServError> {
        let data = self.data();
        Ok(data
            .periods
            .values()
            .find(|period| {
                period.is_open_standard()
                    && period.covers(date)
                    && data
                        .fiscal_years
                        .get(&period.fiscal_year_id)
                        .is_some_and(|year| year.company_id == company)
            })
            .cloned())
    }
}

impl SequenceRepository for Memory {
    async fn create(&self, sequence: StrictSequence) -> Result<StrictSequence, TechServError> {
        self.insert_sequence(sequence.clone());
        Ok(sequence)
    }

    async fn get_by_id(&self, id: SequenceId) -> Result<Option<StrictSequence>, TechServError> {
        Ok(self.data().sequences.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<StrictSequence>, TechServError> {
        Ok(self.data().sequences.values().cloned().collect())
    }
}

impl GroupMembership for Memory {
    async fn is_member(&self, user: UserId, group: &str) -> Result<bool, TechServError> {
        Ok(self.data().members.contains(&(user, group.to_string())))
    }
}

impl CatalogRepository for Memory {
    async fn create_company(&self, company: Company) -> Result<Company, TechServError> {
        Ok(company)
    }

    async fn create_party(&self, party: Party) -> Result<Party, TechServError> {
        self.data().parties.insert(party.id, party.clone());
        Ok(party)
    }

    async fn create_employee(&self, employee: Employee) -> Result<Employee, TechServError> {
        Ok(employee)
    }

    async fn create_trademark(&self, trademark: Trademark) -> Result<Trademark, TechServError> {
        Ok(trademark)
    }

    async fn create_product(&self, product: Product) -> Result<Product, TechServError> {
        self.data().products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, TechServError> {
        Ok(self.data().products.get(&id).cloned())
    }

    async fn get_products(&self) -> Result<Vec<Product>, TechServError> {
        Ok(self.data().products.values().cloned().collect())
    }
}

impl AddressRepository for Memory {
    async fn create(&self, address: Address) -> Result<Address, TechServError> {
        self.data().addresses.insert(address.id, address.clone());
        Ok(address)
    }

    async fn get_by_id(&self, id: AddressId) -> Result<Option<Address>, TechServError> {
        Ok(self.data().addresses.get(&id).cloned())
    }

    async fn find_by_party(&self, party_id: PartyId) -> Result<Vec<Address>, TechServError> {
        Ok(self
            .data()
            .addresses
            .values()
            .filter(|address| address.party_id == party_id)
            .cloned()
            .collect())
    }
}

impl CustomerHistoryQuery for Memory {
    async fn services_of(&self, party: PartyId) -> Result<Vec<CustomerServiceRow>, TechServError> {
        let data = self.data();
        let mut rows = Vec::new();
        for service in data
            .services
            .values()
            .filter(|service| service.party_id == Some(party))
        {
            for line in data.lines.values().filter(|line| line.service_id == service.id) {
                rows.push(CustomerServiceRow {
                    entry_date: service.entry_date,
                    delivery_date: service.delivery_date,
                    number_service: service.number_service.clone(),
                    periferic: line
                        .periferic_id
                        .and_then(|id| data.periferics.get(&id))
                        .map(|periferic| periferic.name.clone()),
                    trademark: None,
                    model: line.model.clone(),
                    failure: line.failure.clone(),
                    reference_amount: line.reference_amount,
                    technician: None,
                    state: service.state,
                    accessories: service.accessories.clone(),
                    repair_detail: service.observations.clone(),
                });
            }
        }
        Ok(rows)
    }
}

/// Renders the service number only, enough to check report plumbing.
pub struct PlainRenderer;

impl ReportRenderer for PlainRenderer {
    fn format(&self) -> &'static str {
        "txt"
    }

    fn render(&self, data: &ServiceReportData) -> Result<Vec<u8>, TechServError> {
        Ok(data.service.label().into_bytes())
    }
}
