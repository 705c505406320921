//! History line: a timestamped audit note attached to a service.
//!
//! A line may also carry a user/password pair checked by
//! [`HistoryLine::verify_credential`].

use serde::{Deserialize, Serialize};

use crate::credential::PasswordDigest;
use crate::error::{CredentialError, TechServError, ValidationError, WorkflowError};
use crate::id::{HistoryLineId, ServiceId};
use crate::service::{Service, ServiceState};
use crate::time::Timestamp;

/// An audit note on a [`Service`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryLine {
    pub id: HistoryLineId,
    pub service_id: ServiceId,
    /// Write-once: editable only while empty.
    pub description: String,
    pub date: Option<Timestamp>,
    pub user: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<PasswordDigest>,
}

impl HistoryLine {
    /// Create a builder for constructing a [`HistoryLine`].
    #[must_use]
    pub fn builder() -> HistoryLineBuilder {
        HistoryLineBuilder::default()
    }

    #[must_use]
    pub fn label(&self) -> String {
        if self.description.is_empty() {
            self.id.to_string()
        } else {
            self.description.chars().take(40).collect()
        }
    }

    /// Check whether `incoming` may replace this line while its service is
    /// in the given state.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::HistoryLocked`] once the service is delivered
    /// - [`WorkflowError::HistoryDescriptionLocked`] when a non-empty
    ///   description would change
    pub fn check_edit(&self, service: &Service, incoming: &HistoryLine) -> Result<(), WorkflowError> {
        if service.state == ServiceState::Delivered {
            return Err(WorkflowError::HistoryLocked {
                line: self.label(),
                service: service.label(),
            });
        }
        if !self.description.is_empty() && self.description != incoming.description {
            return Err(WorkflowError::HistoryDescriptionLocked { line: self.label() });
        }
        Ok(())
    }

    /// Check whether this line may be removed.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::HistoryLocked`] unless the service is pending.
    pub fn check_delete(&self, service: &Service) -> Result<(), WorkflowError> {
        if service.state == ServiceState::Pending {
            Ok(())
        } else {
            Err(WorkflowError::HistoryLocked {
                line: self.label(),
                service: service.label(),
            })
        }
    }

    /// Store `user` with a freshly hashed `password`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty user or password, or a
    /// credential error if hashing fails.
    pub fn set_credential(&mut self, user: &str, password: &str) -> Result<(), TechServError> {
        if user.trim().is_empty() {
            return Err(ValidationError::EmptyUser.into());
        }
        self.password = Some(PasswordDigest::hash(password)?);
        self.user = Some(user.to_string());
        Ok(())
    }

    /// Whether `user` and `password` match the stored pair.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Missing`] when no credential is stored.
    pub fn verify_credential(&self, user: &str, password: &str) -> Result<bool, TechServError> {
        let (Some(stored_user), Some(digest)) = (&self.user, &self.password) else {
            return Err(CredentialError::Missing { line: self.label() }.into());
        };
        if stored_user != user {
            return Ok(false);
        }
        digest.verify(password)
    }
}

/// Step-by-step builder for [`HistoryLine`].
#[derive(Debug, Default)]
pub struct HistoryLineBuilder {
    id: Option<HistoryLineId>,
    service_id: Option<ServiceId>,
    description: Option<String>,
    date: Option<Timestamp>,
}

impl HistoryLineBuilder {
    #[must_use]
    pub fn id(mut self, id: HistoryLineId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn service_id(mut self, service_id: ServiceId) -> Self {
        self.service_id = Some(service_id);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn date(mut self, date: Timestamp) -> Self {
        self.date = Some(date);
        self
    }

    /// Consume the builder and return a [`HistoryLine`] without credential.
    #[must_use]
    pub fn build(self) -> HistoryLine {
        HistoryLine {
            id: self.id.unwrap_or_default(),
            service_id: self.service_id.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            date: self.date,
            user: None,
            password: None,
        }
    }
}
