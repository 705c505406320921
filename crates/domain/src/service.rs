//! Service: a repair order tracked from intake to delivery.
//!
//! A service is created in [`ServiceState::Pending`], receives its
//! human-readable number when it enters review, and ends in
//! [`ServiceState::Delivered`]. Lines and history notes hang off it.

mod state;
pub mod view;

pub use state::{ServiceState, UnknownState};

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{TechServError, ValidationError, WorkflowError};
use crate::id::{CompanyId, EmployeeId, PartyId, ServiceId};
use crate::service_line::ServiceLine;
use crate::time::Date;

/// What kind of repair order this is. Each kind has its own sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// Device brought to the workshop.
    #[default]
    Service,
    /// Technician visits the customer.
    HomeService,
}

impl ServiceKind {
    pub const ALL: [Self; 2] = [Self::Service, Self::HomeService];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::HomeService => "home_service",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown service kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown service kind \"{0}\"")]
pub struct UnknownKind(pub String);

impl FromStr for ServiceKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "service" => Ok(Self::Service),
            "home_service" => Ok(Self::HomeService),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// Manufacturer warranty paperwork, only meaningful when `garanty` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarrantyDetails {
    pub invoice_date: Option<Date>,
    pub invoice_number: Option<String>,
    pub case_number: Option<String>,
    pub send_date: Option<Date>,
    /// Remission guide number.
    pub remission: Option<String>,
    pub transport: Option<String>,
}

/// A repair order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub company_id: CompanyId,
    pub party_id: Option<PartyId>,
    /// Set once, on the first move to review. Never changes afterwards.
    pub number_service: Option<String>,
    pub kind: ServiceKind,
    pub state: ServiceState,
    pub entry_date: Option<Date>,
    /// Estimated delivery date.
    pub delivery_date: Option<Date>,
    pub technical_id: Option<EmployeeId>,
    pub garanty: bool,
    #[serde(default)]
    pub warranty: WarrantyDetails,
    pub accessories: Option<String>,
    pub observations: Option<String>,
}

/// Result of checking a single service against a requested transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCheck {
    /// Already in the target state: nothing to write.
    Unchanged,
    /// The transition is declared and its guard holds.
    Apply,
}

impl Service {
    /// Create a builder for constructing a [`Service`].
    #[must_use]
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::Validation`] when both dates are set and the
    /// entry date is not strictly before the delivery date.
    pub fn validate(&self) -> Result<(), TechServError> {
        if let (Some(entry), Some(delivery)) = (self.entry_date, self.delivery_date) {
            if entry >= delivery {
                return Err(ValidationError::DatesOutOfOrder { entry, delivery }.into());
            }
        }
        Ok(())
    }

    /// Human-facing reference: the number once assigned, the id before.
    #[must_use]
    pub fn label(&self) -> String {
        self.number_service
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }

    /// Check whether this service may move to `to`.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::InvalidTransition`] when `(state, to)` is not declared
    /// - [`WorkflowError::WarrantyNotCovered`] when moving to warranty without
    ///   the garanty flag
    pub fn check_transition(&self, to: ServiceState) -> Result<TransitionCheck, WorkflowError> {
        if self.state == to {
            return Ok(TransitionCheck::Unchanged);
        }
        if !self.state.allows(to) {
            return Err(WorkflowError::InvalidTransition {
                service: self.label(),
                from: self.state,
                to,
            });
        }
        if to == ServiceState::Warranty && !self.garanty {
            return Err(WorkflowError::WarrantyNotCovered {
                service: self.label(),
            });
        }
        Ok(TransitionCheck::Apply)
    }

    /// Check whether the header may be written.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::ServiceDelivered`] once delivered.
    pub fn check_modify(&self) -> Result<(), WorkflowError> {
        if self.state.is_header_editable() {
            Ok(())
        } else {
            Err(WorkflowError::ServiceDelivered {
                service: self.label(),
            })
        }
    }

    /// Check whether the service may be deleted.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::ServiceDelivered`] once delivered and
    /// [`WorkflowError::ServiceNotPending`] for any other non-pending state.
    pub fn check_delete(&self) -> Result<(), WorkflowError> {
        self.check_modify()?;
        if self.state.is_deletable() {
            Ok(())
        } else {
            Err(WorkflowError::ServiceNotPending {
                service: self.label(),
            })
        }
    }

    /// Check whether a new line may be attached.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::LineCreationBlocked`] once past review.
    pub fn check_add_line(&self) -> Result<(), WorkflowError> {
        if self.state.accepts_new_lines() {
            Ok(())
        } else {
            Err(WorkflowError::LineCreationBlocked {
                service: self.label(),
            })
        }
    }

    /// Check whether a history note may be attached.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::HistoryCreationBlocked`] once delivered.
    pub fn check_add_note(&self) -> Result<(), WorkflowError> {
        if self.state.is_terminal() {
            Err(WorkflowError::HistoryCreationBlocked {
                service: self.label(),
            })
        } else {
            Ok(())
        }
    }

    /// Check whether an existing line may be edited or removed.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::LineLocked`] once past pending.
    pub fn check_edit_line(&self, line: &ServiceLine) -> Result<(), WorkflowError> {
        if self.state.are_lines_editable() {
            Ok(())
        } else {
            Err(WorkflowError::LineLocked {
                line: line.label(),
                service: self.label(),
            })
        }
    }

    /// Stamp the service number. Returns `false` when a number was already
    /// present, leaving it untouched.
    pub fn assign_number(&mut self, number: impl Into<String>) -> bool {
        if self.number_service.is_some() {
            return false;
        }
        self.number_service = Some(number.into());
        true
    }

    /// Sum of the reference amounts of this service's lines.
    ///
    /// Lines belonging to other services are ignored.
    #[must_use]
    pub fn total(&self, lines: &[ServiceLine]) -> Decimal {
        lines
            .iter()
            .filter(|line| line.service_id == self.id)
            .filter_map(|line| line.reference_amount)
            .sum()
    }

    /// Copy the user-editable fields of `incoming` onto this record.
    ///
    /// Identity, company, number and state are owned by the workflow and are
    /// left untouched.
    pub fn apply_edits(&mut self, incoming: Service) {
        self.party_id = incoming.party_id;
        self.kind = incoming.kind;
        self.entry_date = incoming.entry_date;
        self.delivery_date = incoming.delivery_date;
        self.technical_id = incoming.technical_id;
        self.garanty = incoming.garanty;
        self.warranty = incoming.warranty;
        self.accessories = incoming.accessories;
        self.observations = incoming.observations;
    }
}

/// Step-by-step builder for [`Service`].
#[derive(Debug, Default)]
pub struct ServiceBuilder {
    id: Option<ServiceId>,
    company_id: Option<CompanyId>,
    party_id: Option<PartyId>,
    number_service: Option<String>,
    kind: Option<ServiceKind>,
    state: Option<ServiceState>,
    entry_date: Option<Date>,
    delivery_date: Option<Date>,
    technical_id: Option<EmployeeId>,
    garanty: bool,
    warranty: WarrantyDetails,
    accessories: Option<String>,
    observations: Option<String>,
}

impl ServiceBuilder {
    #[must_use]
    pub fn id(mut self, id: ServiceId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn company_id(mut self, company_id: CompanyId) -> Self {
        self.company_id = Some(company_id);
        self
    }

    #[must_use]
    pub fn party_id(mut self, party_id: PartyId) -> Self {
        self.party_id = Some(party_id);
        self
    }

    #[must_use]
    pub fn number_service(mut self, number: impl Into<String>) -> Self {
        self.number_service = Some(number.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: ServiceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn state(mut self, state: ServiceState) -> Self {
        self.state = Some(state);
        self
    }

    #[must_use]
    pub fn entry_date(mut self, date: Date) -> Self {
        self.entry_date = Some(date);
        self
    }

    #[must_use]
    pub fn delivery_date(mut self, date: Date) -> Self {
        self.delivery_date = Some(date);
        self
    }

    #[must_use]
    pub fn technical_id(mut self, technical_id: EmployeeId) -> Self {
        self.technical_id = Some(technical_id);
        self
    }

    #[must_use]
    pub fn garanty(mut self, garanty: bool) -> Self {
        self.garanty = garanty;
        self
    }

    #[must_use]
    pub fn warranty(mut self, warranty: WarrantyDetails) -> Self {
        self.warranty = warranty;
        self
    }

    #[must_use]
    pub fn accessories(mut self, accessories: impl Into<String>) -> Self {
        self.accessories = Some(accessories.into());
        self
    }

    #[must_use]
    pub fn observations(mut self, observations: impl Into<String>) -> Self {
        self.observations = Some(observations.into());
        self
    }

    /// Consume the builder, validate, and return a [`Service`].
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::Validation`] if the dates are out of order.
    pub fn build(self) -> Result<Service, TechServError> {
        let service = Service {
            id: self.id.unwrap_or_default(),
            company_id: self.company_id.unwrap_or_default(),
            party_id: self.party_id,
            number_service: self.number_service,
            kind: self.kind.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            entry_date: self.entry_date,
            delivery_date: self.delivery_date,
            technical_id: self.technical_id,
            garanty: self.garanty,
            warranty: self.warranty,
            accessories: self.accessories,
            observations: self.observations,
        };
        service.validate()?;
        Ok(service)
    }
}
