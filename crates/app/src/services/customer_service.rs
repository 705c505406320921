//! Customer service: the per-customer repair history query.

use techserv_domain::customer::CustomerServiceRow;
use techserv_domain::error::TechServError;
use techserv_domain::id::PartyId;

use crate::ports::CustomerHistoryQuery;

/// Read-only application service over a customer's past services.
pub struct CustomerService<Q> {
    query: Q,
}

impl<Q: CustomerHistoryQuery> CustomerService<Q> {
    pub fn new(query: Q) -> Self {
        Self { query }
    }

    /// Flattened service lines of every service of `party`.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the query.
    #[tracing::instrument(skip(self))]
    pub async fn services_of(&self, party: PartyId) -> Result<Vec<CustomerServiceRow>, TechServError> {
        self.query.services_of(party).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Memory;
    use rust_decimal_macros::dec;
    use techserv_domain::periferic::Periferic;
    use techserv_domain::service::{Service, ServiceState};
    use techserv_domain::service_line::ServiceLine;

    #[tokio::test]
    async fn should_flatten_lines_of_customer_services() {
        let memory = Memory::default();
        let party = PartyId::new();
        let printer = Periferic::new("Printer").unwrap();
        memory.data().periferics.insert(printer.id, printer.clone());
        let service = Service::builder()
            .party_id(party)
            .state(ServiceState::Ready)
            .observations("cleaned heads")
            .build()
            .unwrap();
        memory.insert_service(service.clone());
        memory.insert_line(
            ServiceLine::builder()
                .service_id(service.id)
                .periferic_id(printer.id)
                .reference_amount(dec!(15))
                .build()
                .unwrap(),
        );
        memory.insert_service(Service::builder().party_id(PartyId::new()).build().unwrap());

        let rows = CustomerService::new(memory).services_of(party).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].periferic.as_deref(), Some("Printer"));
        assert_eq!(rows[0].repair_detail.as_deref(), Some("cleaned heads"));
        assert_eq!(rows[0].state, ServiceState::Ready);
    }
}
