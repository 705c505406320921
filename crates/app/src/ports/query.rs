//! Read-only queries spanning several tables.

use std::future::Future;

use techserv_domain::customer::CustomerServiceRow;
use techserv_domain::error::TechServError;
use techserv_domain::id::PartyId;

/// Per-customer repair history.
pub trait CustomerHistoryQuery {
    /// One row per service line of every service of `party`, newest entry
    /// first.
    fn services_of(
        &self,
        party: PartyId,
    ) -> impl Future<Output = Result<Vec<CustomerServiceRow>, TechServError>> + Send;
}
