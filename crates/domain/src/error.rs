//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`TechServError`] via `#[from]`. Every variant carries a user-facing
//! message; callers abort the current operation on the first `Err`.

use chrono::NaiveDate;

use crate::service::ServiceState;

/// Top-level error returned by domain logic, use-cases and ports.
#[derive(Debug, thiserror::Error)]
pub enum TechServError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Batch(#[from] BatchRejection),

    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("report could not be rendered: {0}")]
    Report(String),

    /// Persistence failure, boxed so the domain stays free of adapter types.
    #[error("storage error: {0}")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

/// Field-level invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("entry date {entry} must be before delivery date {delivery}")]
    DatesOutOfOrder {
        entry: NaiveDate,
        delivery: NaiveDate,
    },

    #[error("start date {start} must not be after end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("period \"{period}\" is outside of its fiscal year")]
    PeriodOutsideFiscalYear { period: String },

    #[error("reference amount must not be negative")]
    NegativeAmount,

    #[error("user name must not be empty")]
    EmptyUser,

    #[error("password must not be empty")]
    EmptyPassword,

    #[error("invalid identifier \"{0}\"")]
    InvalidIdentifier(String),

    #[error("no record selected")]
    EmptySelection,

    #[error("a company is required")]
    MissingCompany,

    #[error("padding {padding} is wider than the maximum of {max}")]
    PaddingTooLarge { padding: u32, max: u32 },
}

/// A record looked up by id does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A record was touched past the lifecycle stage that allows it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("service \"{service}\" cannot move from {from} to {to}")]
    InvalidTransition {
        service: String,
        from: ServiceState,
        to: ServiceState,
    },

    #[error("service \"{service}\" was changed meanwhile, reload it and try again")]
    StaleState { service: String },

    #[error("service \"{service}\" is not covered by garanty")]
    WarrantyNotCovered { service: String },

    #[error("you can not modify service \"{service}\" because it is delivered")]
    ServiceDelivered { service: String },

    #[error("you can not delete service \"{service}\" because it is no longer pending")]
    ServiceNotPending { service: String },

    #[error("you can not modify line \"{line}\" from service \"{service}\"")]
    LineLocked { line: String, service: String },

    #[error("you can not add a line to service \"{service}\"")]
    LineCreationBlocked { service: String },

    #[error("you can not modify line \"{line}\" from history \"{service}\"")]
    HistoryLocked { line: String, service: String },

    #[error("you can not add a history line to service \"{service}\" because it is delivered")]
    HistoryCreationBlocked { service: String },

    #[error("description of history line \"{line}\" is already set")]
    HistoryDescriptionLocked { line: String },
}

/// Every record of a batch that failed validation.
///
/// Batch operations check all records before writing anything, so a
/// rejection always means nothing was applied.
#[derive(Debug, thiserror::Error)]
#[error("{} record(s) rejected: {}", .violations.len(), summarize(.violations))]
pub struct BatchRejection {
    pub violations: Vec<TechServError>,
}

impl BatchRejection {
    /// Turn collected violations into a result.
    ///
    /// A single violation is returned as-is; several are wrapped in a
    /// [`BatchRejection`].
    ///
    /// # Errors
    ///
    /// Returns the violation(s) when `violations` is not empty.
    pub fn check(mut violations: Vec<TechServError>) -> Result<(), TechServError> {
        match violations.len() {
            0 => Ok(()),
            1 => Err(violations.remove(0)),
            _ => Err(Self { violations }.into()),
        }
    }
}

fn summarize(violations: &[TechServError]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Service numbering could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequenceError {
    #[error("no open period covers {date} for company {company}")]
    PeriodNotFound { company: String, date: NaiveDate },

    #[error("no service sequence configured for service \"{service}\" in period \"{period}\"")]
    NotConfigured { service: String, period: String },

    #[error("sequence {id} does not exist")]
    UnknownSequence { id: String },
}

/// Fiscal year / period configuration is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("\"{first}\" and \"{second}\" can not share the same service sequence")]
    DuplicateSequence { first: String, second: String },

    #[error("\"{record}\" can not use the same sequence for services and home services")]
    SharedAcrossKinds { record: String },

    #[error("the sequence of period \"{period}\" belongs to another company than fiscal year \"{fiscal_year}\"")]
    CompanyMismatch { period: String, fiscal_year: String },

    #[error("you can not change the service sequence of \"{record}\" because services are already numbered")]
    SequenceLocked { record: String },
}

/// The caller is not allowed to run an action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    #[error("user {user} is not a member of group \"{group}\"")]
    NotInGroup { user: String, group: String },

    #[error("this action requires an identified user")]
    AnonymousUser,
}

/// Password hashing or verification failed.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    Hashing(#[from] argon2::password_hash::Error),

    #[error("history line \"{line}\" has no credential")]
    Missing { line: String },
}
