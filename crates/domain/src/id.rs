//! Typed identifier newtypes backed by UUIDs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Access the inner UUID.
            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a [`Service`](crate::service::Service).
    ServiceId
);

define_id!(
    /// Unique identifier for a [`ServiceLine`](crate::service_line::ServiceLine).
    ServiceLineId
);

define_id!(
    /// Unique identifier for a [`HistoryLine`](crate::history_line::HistoryLine).
    HistoryLineId
);

define_id!(
    /// Unique identifier for a [`Periferic`](crate::periferic::Periferic).
    PeriphericId
);

define_id!(
    /// Unique identifier for a [`FiscalYear`](crate::fiscal::FiscalYear).
    FiscalYearId
);

define_id!(
    /// Unique identifier for a [`Period`](crate::fiscal::Period).
    PeriodId
);

define_id!(
    /// Unique identifier for a [`StrictSequence`](crate::sequence::StrictSequence).
    SequenceId
);

define_id!(
    /// Unique identifier for a [`Company`](crate::catalog::Company).
    CompanyId
);

define_id!(
    /// Unique identifier for a [`Party`](crate::catalog::Party) (customer).
    PartyId
);

define_id!(
    /// Unique identifier for an [`Employee`](crate::catalog::Employee) (technician).
    EmployeeId
);

define_id!(
    /// Unique identifier for a [`Product`](crate::catalog::Product).
    ProductId
);

define_id!(
    /// Unique identifier for a [`Trademark`](crate::catalog::Trademark).
    TrademarkId
);

define_id!(
    /// Unique identifier for an [`Address`](crate::address::Address).
    AddressId
);

define_id!(
    /// Unique identifier for a user acting through a [`RequestContext`](crate::context::RequestContext).
    UserId
);
