//! Periferic: lookup table of device peripheral names (keyboard, printer, …).

use serde::{Deserialize, Serialize};

use crate::error::{TechServError, ValidationError};
use crate::id::PeriphericId;

/// A peripheral kind a service line can refer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Periferic {
    pub id: PeriphericId,
    pub name: String,
}

impl Periferic {
    /// Create a periferic with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::Validation`] when `name` is empty.
    pub fn new(name: impl Into<String>) -> Result<Self, TechServError> {
        let periferic = Self {
            id: PeriphericId::new(),
            name: name.into(),
        };
        periferic.validate()?;
        Ok(periferic)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::Validation`] when `name` is empty.
    pub fn validate(&self) -> Result<(), TechServError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_create_periferic_when_name_provided() {
        let periferic = Periferic::new("Printer").unwrap();
        assert_eq!(periferic.name, "Printer");
    }

    #[test]
    fn should_return_validation_error_when_name_is_empty() {
        assert!(matches!(
            Periferic::new(""),
            Err(TechServError::Validation(ValidationError::EmptyName))
        ));
    }
}
