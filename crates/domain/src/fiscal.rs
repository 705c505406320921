//! Fiscal years and periods, and the sequences they attach to services.
//!
//! A [`Period`] lies inside a [`FiscalYear`]. Either may carry one strict
//! sequence per [`ServiceKind`]; a period without its own sequence falls
//! back to its fiscal year's. The configuration guards here are pure: they
//! compare a candidate record against the others the caller loaded.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, TechServError, ValidationError};
use crate::id::{CompanyId, FiscalYearId, PeriodId, SequenceId};
use crate::sequence::StrictSequence;
use crate::service::ServiceKind;
use crate::time::{Date, within};

/// One optional sequence per service kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSequences {
    pub service: Option<SequenceId>,
    pub home_service: Option<SequenceId>,
}

impl ServiceSequences {
    #[must_use]
    pub fn get(&self, kind: ServiceKind) -> Option<SequenceId> {
        match kind {
            ServiceKind::Service => self.service,
            ServiceKind::HomeService => self.home_service,
        }
    }

    /// Kinds whose sequence is set here and differs in `next`.
    ///
    /// Clearing a sequence counts as a change; setting one for the first
    /// time does not.
    #[must_use]
    pub fn changed_kinds(&self, next: &ServiceSequences) -> Vec<ServiceKind> {
        ServiceKind::ALL
            .into_iter()
            .filter(|kind| {
                self.get(*kind)
                    .is_some_and(|current| next.get(*kind) != Some(current))
            })
            .collect()
    }

    /// Whether `sequence` is set here, for any kind.
    #[must_use]
    pub fn uses(&self, sequence: SequenceId) -> bool {
        self.configured().any(|(_, id)| id == sequence)
    }

    /// Whether `sequence` is set here for a kind other than `kind`.
    #[must_use]
    pub fn uses_for_other_kind(&self, kind: ServiceKind, sequence: SequenceId) -> bool {
        self.configured()
            .any(|(other, id)| other != kind && id == sequence)
    }

    /// Refuse one sequence numbering both kinds of `record`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::SharedAcrossKinds`].
    pub fn check_distinct(&self, record: &str) -> Result<(), ConfigurationError> {
        match (self.service, self.home_service) {
            (Some(service), Some(home_service)) if service == home_service => {
                Err(ConfigurationError::SharedAcrossKinds {
                    record: record.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// The sequences set here, with their kind.
    pub fn configured(&self) -> impl Iterator<Item = (ServiceKind, SequenceId)> + '_ {
        ServiceKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|id| (kind, id)))
    }
}

/// An accounting year owned by one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalYear {
    pub id: FiscalYearId,
    pub name: String,
    pub company_id: CompanyId,
    pub start_date: Date,
    pub end_date: Date,
    #[serde(default)]
    pub sequences: ServiceSequences,
}

impl FiscalYear {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::Validation`] when the name is empty or the
    /// dates are reversed.
    pub fn validate(&self) -> Result<(), TechServError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        check_range(self.start_date, self.end_date)
    }

    #[must_use]
    pub fn covers(&self, date: Date) -> bool {
        within(date, self.start_date, self.end_date)
    }

    /// Refuse a sequence already attached to another fiscal year or to a
    /// period of another fiscal year, whatever the kind. This year's own
    /// periods may repeat a sequence only for the same kind.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::SharedAcrossKinds`] when one sequence
    /// numbers both kinds, or [`ConfigurationError::DuplicateSequence`]
    /// naming both records.
    pub fn check_unique_sequences(
        &self,
        others: &[FiscalYear],
        periods: &[Period],
    ) -> Result<(), ConfigurationError> {
        self.sequences.check_distinct(&self.name)?;
        for (kind, sequence) in self.sequences.configured() {
            let clash = others
                .iter()
                .find(|other| other.id != self.id && other.sequences.uses(sequence))
                .map(|other| other.name.clone())
                .or_else(|| {
                    periods
                        .iter()
                        .find(|period| {
                            if period.fiscal_year_id == self.id {
                                period.sequences.uses_for_other_kind(kind, sequence)
                            } else {
                                period.sequences.uses(sequence)
                            }
                        })
                        .map(|period| period.name.clone())
                });
            if let Some(second) = clash {
                return Err(ConfigurationError::DuplicateSequence {
                    first: self.name.clone(),
                    second,
                });
            }
        }
        Ok(())
    }

    /// Refuse sequences bound to a company other than this year's.
    ///
    /// `sequences` holds the records referenced by this year; ids without a
    /// matching record are ignored here.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::CompanyMismatch`].
    pub fn check_sequence_company(&self, sequences: &[StrictSequence]) -> Result<(), ConfigurationError> {
        check_company(&self.sequences, sequences, self.company_id, &self.name, &self.name)
    }
}

/// Whether a period is a regular accounting slice or a closing adjustment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    #[default]
    Standard,
    Adjustment,
}

impl PeriodKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Adjustment => "adjustment",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodState {
    #[default]
    Open,
    Closed,
}

impl PeriodState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PeriodState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown period kind or state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown period value \"{0}\"")]
pub struct UnknownPeriodValue(pub String);

impl FromStr for PeriodKind {
    type Err = UnknownPeriodValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "adjustment" => Ok(Self::Adjustment),
            other => Err(UnknownPeriodValue(other.to_string())),
        }
    }
}

impl FromStr for PeriodState {
    type Err = UnknownPeriodValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(UnknownPeriodValue(other.to_string())),
        }
    }
}

/// A slice of a fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: PeriodId,
    pub name: String,
    pub fiscal_year_id: FiscalYearId,
    pub start_date: Date,
    pub end_date: Date,
    #[serde(default)]
    pub kind: PeriodKind,
    #[serde(default)]
    pub state: PeriodState,
    #[serde(default)]
    pub sequences: ServiceSequences,
}

impl Period {
    /// Check domain invariants against the owning fiscal year.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::Validation`] when the name is empty, the
    /// dates are reversed, or the period leaves its fiscal year.
    pub fn validate(&self, fiscal_year: &FiscalYear) -> Result<(), TechServError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        check_range(self.start_date, self.end_date)?;
        if !fiscal_year.covers(self.start_date) || !fiscal_year.covers(self.end_date) {
            return Err(ValidationError::PeriodOutsideFiscalYear {
                period: self.name.clone(),
            }
            .into());
        }
        Ok(())
    }

    #[must_use]
    pub fn covers(&self, date: Date) -> bool {
        within(date, self.start_date, self.end_date)
    }

    /// Only open standard periods hand out service numbers.
    #[must_use]
    pub fn is_open_standard(&self) -> bool {
        self.kind == PeriodKind::Standard && self.state == PeriodState::Open
    }

    /// The sequence numbering services of `kind` in this period, falling back
    /// to the fiscal year's.
    #[must_use]
    pub fn sequence_for(&self, kind: ServiceKind, fiscal_year: &FiscalYear) -> Option<SequenceId> {
        self.sequences
            .get(kind)
            .or_else(|| fiscal_year.sequences.get(kind))
    }

    /// Refuse a sequence already attached to another period, in any fiscal
    /// year and for any kind, or to a fiscal year other than this period's
    /// own. The own fiscal year may carry it for the same kind only.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::SharedAcrossKinds`] when one sequence
    /// numbers both kinds, or [`ConfigurationError::DuplicateSequence`]
    /// naming both records.
    pub fn check_unique_sequences(
        &self,
        periods: &[Period],
        fiscal_years: &[FiscalYear],
    ) -> Result<(), ConfigurationError> {
        self.sequences.check_distinct(&self.name)?;
        for (kind, sequence) in self.sequences.configured() {
            let clash = periods
                .iter()
                .find(|other| other.id != self.id && other.sequences.uses(sequence))
                .map(|other| other.name.clone())
                .or_else(|| {
                    fiscal_years
                        .iter()
                        .find(|year| {
                            if year.id == self.fiscal_year_id {
                                year.sequences.uses_for_other_kind(kind, sequence)
                            } else {
                                year.sequences.uses(sequence)
                            }
                        })
                        .map(|year| year.name.clone())
                });
            if let Some(second) = clash {
                return Err(ConfigurationError::DuplicateSequence {
                    first: self.name.clone(),
                    second,
                });
            }
        }
        Ok(())
    }

    /// Refuse sequences bound to a company other than the fiscal year's.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::CompanyMismatch`].
    pub fn check_sequence_company(
        &self,
        fiscal_year: &FiscalYear,
        sequences: &[StrictSequence],
    ) -> Result<(), ConfigurationError> {
        check_company(
            &self.sequences,
            sequences,
            fiscal_year.company_id,
            &self.name,
            &fiscal_year.name,
        )
    }
}

fn check_range(start: Date, end: Date) -> Result<(), TechServError> {
    if start > end {
        return Err(ValidationError::InvalidDateRange { start, end }.into());
    }
    Ok(())
}

fn check_company(
    configured: &ServiceSequences,
    sequences: &[StrictSequence],
    company: CompanyId,
    record: &str,
    fiscal_year: &str,
) -> Result<(), ConfigurationError> {
    for (_, id) in configured.configured() {
        let mismatch = sequences
            .iter()
            .any(|sequence| sequence.id == id && !sequence.is_usable_by(company));
        if mismatch {
            return Err(ConfigurationError::CompanyMismatch {
                period: record.to_string(),
                fiscal_year: fiscal_year.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> Date {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fiscal_year(name: &str, service: Option<SequenceId>) -> FiscalYear {
        FiscalYear {
            id: FiscalYearId::new(),
            name: name.to_string(),
            company_id: CompanyId::new(),
            start_date: date(2026, 1, 1),
            end_date: date(2026, 12, 31),
            sequences: ServiceSequences {
                service,
                home_service: None,
            },
        }
    }

    fn period(name: &str, year: &FiscalYear, service: Option<SequenceId>) -> Period {
        Period {
            id: PeriodId::new(),
            name: name.to_string(),
            fiscal_year_id: year.id,
            start_date: date(2026, 1, 1),
            end_date: date(2026, 1, 31),
            kind: PeriodKind::Standard,
            state: PeriodState::Open,
            sequences: ServiceSequences {
                service,
                home_service: None,
            },
        }
    }

    #[test]
    fn should_fall_back_to_fiscal_year_sequence() {
        let year_sequence = SequenceId::new();
        let year = fiscal_year("2026", Some(year_sequence));
        let january = period("2026-01", &year, None);

        assert_eq!(
            january.sequence_for(ServiceKind::Service, &year),
            Some(year_sequence)
        );
        assert_eq!(january.sequence_for(ServiceKind::HomeService, &year), None);
    }

    #[test]
    fn should_prefer_period_sequence() {
        let year = fiscal_year("2026", Some(SequenceId::new()));
        let own = SequenceId::new();
        let january = period("2026-01", &year, Some(own));
        assert_eq!(january.sequence_for(ServiceKind::Service, &year), Some(own));
    }

    #[test]
    fn should_reject_two_periods_sharing_a_sequence() {
        let year = fiscal_year("2026", None);
        let shared = SequenceId::new();
        let january = period("2026-01", &year, Some(shared));
        let february = period("2026-02", &year, Some(shared));

        let err = february
            .check_unique_sequences(std::slice::from_ref(&january), std::slice::from_ref(&year))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DuplicateSequence {
                first: "2026-02".to_string(),
                second: "2026-01".to_string(),
            }
        );
    }

    #[test]
    fn should_ignore_itself_when_checking_uniqueness() {
        let year = fiscal_year("2026", None);
        let january = period("2026-01", &year, Some(SequenceId::new()));
        assert!(
            january
                .check_unique_sequences(std::slice::from_ref(&january), &[])
                .is_ok()
        );
    }

    #[test]
    fn should_allow_period_to_reuse_own_fiscal_year_sequence() {
        let shared = SequenceId::new();
        let year = fiscal_year("2026", Some(shared));
        let january = period("2026-01", &year, Some(shared));
        assert!(
            january
                .check_unique_sequences(&[], std::slice::from_ref(&year))
                .is_ok()
        );
    }

    #[test]
    fn should_reject_period_reusing_another_fiscal_year_sequence() {
        let shared = SequenceId::new();
        let last_year = fiscal_year("2025", Some(shared));
        let year = fiscal_year("2026", None);
        let january = period("2026-01", &year, Some(shared));
        assert!(matches!(
            january.check_unique_sequences(&[], &[last_year, year.clone()]),
            Err(ConfigurationError::DuplicateSequence { .. })
        ));
    }

    #[test]
    fn should_reject_fiscal_years_sharing_a_sequence() {
        let shared = SequenceId::new();
        let first = fiscal_year("2025", Some(shared));
        let second = fiscal_year("2026", Some(shared));
        assert!(second.check_unique_sequences(&[first], &[]).is_err());
    }

    #[test]
    fn should_reject_period_reusing_sibling_sequence_for_other_kind() {
        let year = fiscal_year("2026", None);
        let shared = SequenceId::new();
        let january = period("2026-01", &year, Some(shared));
        let mut february = period("2026-02", &year, None);
        february.sequences.home_service = Some(shared);

        assert_eq!(
            february
                .check_unique_sequences(std::slice::from_ref(&january), std::slice::from_ref(&year)),
            Err(ConfigurationError::DuplicateSequence {
                first: "2026-02".to_string(),
                second: "2026-01".to_string(),
            })
        );
    }

    #[test]
    fn should_reject_period_reusing_own_year_sequence_for_other_kind() {
        let shared = SequenceId::new();
        let year = fiscal_year("2026", Some(shared));
        let mut january = period("2026-01", &year, None);
        january.sequences.home_service = Some(shared);

        assert!(matches!(
            january.check_unique_sequences(&[], std::slice::from_ref(&year)),
            Err(ConfigurationError::DuplicateSequence { .. })
        ));
    }

    #[test]
    fn should_reject_one_sequence_for_both_kinds() {
        let shared = SequenceId::new();
        let mut year = fiscal_year("2026", Some(shared));
        year.sequences.home_service = Some(shared);
        let mut january = period("2026-01", &fiscal_year("2025", None), Some(shared));
        january.sequences.home_service = Some(shared);

        assert_eq!(
            year.check_unique_sequences(&[], &[]),
            Err(ConfigurationError::SharedAcrossKinds {
                record: "2026".to_string(),
            })
        );
        assert_eq!(
            january.check_unique_sequences(&[], &[]),
            Err(ConfigurationError::SharedAcrossKinds {
                record: "2026-01".to_string(),
            })
        );
    }

    #[test]
    fn should_reject_fiscal_year_reusing_sequence_of_other_year_period() {
        let shared = SequenceId::new();
        let current = fiscal_year("2026", None);
        let march = period("2026-03", &current, Some(shared));
        let next = fiscal_year("2027", Some(shared));

        assert_eq!(
            next.check_unique_sequences(std::slice::from_ref(&current), std::slice::from_ref(&march)),
            Err(ConfigurationError::DuplicateSequence {
                first: "2027".to_string(),
                second: "2026-03".to_string(),
            })
        );
    }

    #[test]
    fn should_let_fiscal_year_share_sequence_with_own_period_of_same_kind() {
        let shared = SequenceId::new();
        let year = fiscal_year("2026", Some(shared));
        let january = period("2026-01", &year, Some(shared));

        assert!(
            year.check_unique_sequences(&[], std::slice::from_ref(&january))
                .is_ok()
        );

        let mut home = period("2026-02", &year, None);
        home.sequences.home_service = Some(shared);
        assert!(matches!(
            year.check_unique_sequences(&[], &[home]),
            Err(ConfigurationError::DuplicateSequence { .. })
        ));
    }

    #[test]
    fn should_reject_sequence_of_foreign_company() {
        let year = fiscal_year("2026", None);
        let foreign = StrictSequence::builder()
            .name("Other shop")
            .company_id(CompanyId::new())
            .build()
            .unwrap();
        let january = period("2026-01", &year, Some(foreign.id));

        assert!(matches!(
            january.check_sequence_company(&year, &[foreign]),
            Err(ConfigurationError::CompanyMismatch { .. })
        ));
    }

    #[test]
    fn should_accept_unbound_sequence() {
        let year = fiscal_year("2026", None);
        let shared = StrictSequence::builder().name("Shared").build().unwrap();
        let january = period("2026-01", &year, Some(shared.id));
        assert!(january.check_sequence_company(&year, &[shared]).is_ok());
    }

    #[test]
    fn should_report_replaced_and_cleared_sequences_as_changes() {
        let current = ServiceSequences {
            service: Some(SequenceId::new()),
            home_service: Some(SequenceId::new()),
        };
        let next = ServiceSequences {
            service: Some(SequenceId::new()),
            home_service: None,
        };
        assert_eq!(
            current.changed_kinds(&next),
            vec![ServiceKind::Service, ServiceKind::HomeService]
        );
        assert!(ServiceSequences::default().changed_kinds(&current).is_empty());
        assert!(current.changed_kinds(&current).is_empty());
    }

    #[test]
    fn should_reject_period_outside_fiscal_year() {
        let year = fiscal_year("2026", None);
        let mut stray = period("2027-01", &year, None);
        stray.start_date = date(2027, 1, 1);
        stray.end_date = date(2027, 1, 31);
        assert!(matches!(
            stray.validate(&year),
            Err(TechServError::Validation(ValidationError::PeriodOutsideFiscalYear { .. }))
        ));
    }

    #[test]
    fn should_only_number_in_open_standard_periods() {
        let year = fiscal_year("2026", None);
        let mut january = period("2026-01", &year, None);
        assert!(january.is_open_standard());
        january.state = PeriodState::Closed;
        assert!(!january.is_open_standard());
        january.state = PeriodState::Open;
        january.kind = PeriodKind::Adjustment;
        assert!(!january.is_open_standard());
    }
}
