//! Strict sequence: a gap-free counter used to stamp service numbers.
//!
//! Only the data shape lives here. Drawing the next value is done through
//! by the service repository, inside the transaction that stores the number.

use serde::{Deserialize, Serialize};

use crate::error::{TechServError, ValidationError};
use crate::id::{CompanyId, SequenceId};

/// Widest zero padding a sequence may ask for.
pub const MAX_PADDING: u32 = 32;

/// A numbered counter, optionally restricted to one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrictSequence {
    pub id: SequenceId,
    pub name: String,
    /// `None` means usable by every company.
    pub company_id: Option<CompanyId>,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub padding: u32,
    #[serde(default = "first_number")]
    pub number_next: i64,
}

fn first_number() -> i64 {
    1
}

impl StrictSequence {
    /// Create a builder for constructing a [`StrictSequence`].
    #[must_use]
    pub fn builder() -> StrictSequenceBuilder {
        StrictSequenceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::Validation`] when `name` is empty or
    /// `padding` exceeds [`MAX_PADDING`].
    pub fn validate(&self) -> Result<(), TechServError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.padding > MAX_PADDING {
            return Err(ValidationError::PaddingTooLarge {
                padding: self.padding,
                max: MAX_PADDING,
            }
            .into());
        }
        Ok(())
    }

    /// Render `number` with this sequence's prefix and zero padding.
    #[must_use]
    pub fn format(&self, number: i64) -> String {
        let width = self.padding.min(MAX_PADDING) as usize;
        format!("{}{number:0width$}", self.prefix)
    }

    /// Whether this sequence may be used by `company`.
    #[must_use]
    pub fn is_usable_by(&self, company: CompanyId) -> bool {
        self.company_id.is_none_or(|owner| owner == company)
    }
}

/// Step-by-step builder for [`StrictSequence`].
#[derive(Debug, Default)]
pub struct StrictSequenceBuilder {
    id: Option<SequenceId>,
    name: Option<String>,
    company_id: Option<CompanyId>,
    prefix: Option<String>,
    padding: Option<u32>,
    number_next: Option<i64>,
}

impl StrictSequenceBuilder {
    #[must_use]
    pub fn id(mut self, id: SequenceId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn company_id(mut self, company_id: CompanyId) -> Self {
        self.company_id = Some(company_id);
        self
    }

    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn padding(mut self, padding: u32) -> Self {
        self.padding = Some(padding);
        self
    }

    #[must_use]
    pub fn number_next(mut self, number_next: i64) -> Self {
        self.number_next = Some(number_next);
        self
    }

    /// Consume the builder, validate, and return a [`StrictSequence`].
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::Validation`] if `name` is missing or
    /// `padding` is too wide.
    pub fn build(self) -> Result<StrictSequence, TechServError> {
        let sequence = StrictSequence {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            company_id: self.company_id,
            prefix: self.prefix.unwrap_or_default(),
            padding: self.padding.unwrap_or_default(),
            number_next: self.number_next.unwrap_or_else(first_number),
        };
        sequence.validate()?;
        Ok(sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_pad_number_after_prefix() {
        let sequence = StrictSequence::builder()
            .name("Services 2026")
            .prefix("001-")
            .padding(6)
            .build()
            .unwrap();
        assert_eq!(sequence.format(42), "001-000042");
    }

    #[test]
    fn should_not_truncate_numbers_wider_than_padding() {
        let sequence = StrictSequence::builder()
            .name("Short")
            .padding(2)
            .build()
            .unwrap();
        assert_eq!(sequence.format(1234), "1234");
    }

    #[test]
    fn should_start_at_one() {
        let sequence = StrictSequence::builder().name("Fresh").build().unwrap();
        assert_eq!(sequence.number_next, 1);
    }

    #[test]
    fn should_be_usable_by_any_company_when_unbound() {
        let sequence = StrictSequence::builder().name("Shared").build().unwrap();
        assert!(sequence.is_usable_by(CompanyId::new()));

        let owner = CompanyId::new();
        let bound = StrictSequence::builder()
            .name("Bound")
            .company_id(owner)
            .build()
            .unwrap();
        assert!(bound.is_usable_by(owner));
        assert!(!bound.is_usable_by(CompanyId::new()));
    }

    #[test]
    fn should_reject_padding_wider_than_limit() {
        let result = StrictSequence::builder()
            .name("Huge")
            .padding(70_000)
            .build();
        assert!(matches!(
            result,
            Err(TechServError::Validation(ValidationError::PaddingTooLarge {
                padding: 70_000,
                max: MAX_PADDING,
            }))
        ));

        let widest = StrictSequence::builder()
            .name("Wide")
            .padding(MAX_PADDING)
            .build()
            .unwrap();
        assert_eq!(widest.format(7).len(), MAX_PADDING as usize);
    }

    #[test]
    fn should_reject_empty_name() {
        assert!(StrictSequence::builder().build().is_err());
    }
}
