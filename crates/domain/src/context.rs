//! Request context passed explicitly into every use case.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::{CompanyId, UserId};
use crate::time::{Date, today};

/// Who is calling, for which company, and as of which date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// `None` marks the in-process system caller.
    pub user: Option<UserId>,
    /// Default company for records created without one.
    pub company_id: Option<CompanyId>,
    /// Default entry date and as-of date for sequence numbering.
    pub date: Date,
}

impl RequestContext {
    /// Context of a named user, dated today.
    #[must_use]
    pub fn for_user(user: UserId) -> Self {
        Self {
            user: Some(user),
            company_id: None,
            date: today(),
        }
    }

    /// Context of the system caller, which bypasses group checks.
    #[must_use]
    pub fn system() -> Self {
        Self {
            user: None,
            company_id: None,
            date: today(),
        }
    }

    #[must_use]
    pub fn with_company(mut self, company_id: CompanyId) -> Self {
        self.company_id = Some(company_id);
        self
    }

    #[must_use]
    pub fn with_date(mut self, date: Date) -> Self {
        self.date = date;
        self
    }

    #[must_use]
    pub fn is_system(&self) -> bool {
        self.user.is_none()
    }

    /// `explicit` when given, else the context company.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingCompany`] when neither is set.
    pub fn company_or(&self, explicit: Option<CompanyId>) -> Result<CompanyId, ValidationError> {
        explicit
            .or(self.company_id)
            .ok_or(ValidationError::MissingCompany)
    }
}
