//! Fiscal service: fiscal years, periods and the sequences bound to them.
//!
//! Every write goes through the same guards: sequences unique across
//! records, sequences owned by the fiscal year's company, and no sequence
//! swap once services inside the record's dates carry a number.

use techserv_domain::error::{ConfigurationError, NotFoundError, SequenceError, TechServError};
use techserv_domain::fiscal::{FiscalYear, Period, ServiceSequences};
use techserv_domain::id::{FiscalYearId, PeriodId};
use techserv_domain::sequence::StrictSequence;
use techserv_domain::time::Date;

use crate::ports::{FiscalYearRepository, PeriodRepository, SequenceRepository, ServiceRepository};

/// Application service for fiscal configuration.
pub struct FiscalService<F, P, Q, S> {
    fiscal_years: F,
    periods: P,
    sequences: Q,
    services: S,
}

impl<F, P, Q, S> FiscalService<F, P, Q, S>
where
    F: FiscalYearRepository,
    P: PeriodRepository,
    Q: SequenceRepository,
    S: ServiceRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(fiscal_years: F, periods: P, sequences: Q, services: S) -> Self {
        Self {
            fiscal_years,
            periods,
            sequences,
            services,
        }
    }

    /// Register a strict sequence.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::Validation`] if invariants fail.
    #[tracing::instrument(skip(self, sequence), fields(sequence_name = %sequence.name))]
    pub async fn create_sequence(
        &self,
        sequence: StrictSequence,
    ) -> Result<StrictSequence, TechServError> {
        sequence.validate()?;
        self.sequences.create(sequence).await
    }

    /// List all sequences.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_sequences(&self) -> Result<Vec<StrictSequence>, TechServError> {
        self.sequences.get_all().await
    }

    /// Register a fiscal year.
    ///
    /// # Errors
    ///
    /// Returns a validation, configuration or sequence error when a guard
    /// fails.
    #[tracing::instrument(skip(self, fiscal_year), fields(fiscal_year = %fiscal_year.name))]
    pub async fn create_fiscal_year(
        &self,
        fiscal_year: FiscalYear,
    ) -> Result<FiscalYear, TechServError> {
        self.check_fiscal_year(&fiscal_year).await?;
        self.fiscal_years.create(fiscal_year).await
    }

    /// Look up a fiscal year by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::NotFound`] when no fiscal year with `id` exists.
    pub async fn get_fiscal_year(&self, id: FiscalYearId) -> Result<FiscalYear, TechServError> {
        self.fiscal_years.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "FiscalYear",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all fiscal years.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_fiscal_years(&self) -> Result<Vec<FiscalYear>, TechServError> {
        self.fiscal_years.get_all().await
    }

    /// Replace a fiscal year.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::SequenceLocked`] when a sequence would
    /// change while numbered services exist in the year, or any error of
    /// [`Self::create_fiscal_year`].
    #[tracing::instrument(skip(self, fiscal_year), fields(fiscal_year = %fiscal_year.name))]
    pub async fn update_fiscal_year(
        &self,
        fiscal_year: FiscalYear,
    ) -> Result<FiscalYear, TechServError> {
        let stored = self.get_fiscal_year(fiscal_year.id).await?;
        self.check_fiscal_year(&fiscal_year).await?;
        self.check_sequence_lock(
            &stored.name,
            &stored.sequences,
            &fiscal_year.sequences,
            stored.start_date,
            stored.end_date,
        )
        .await?;
        self.fiscal_years.update(fiscal_year).await
    }

    /// Register a period inside its fiscal year.
    ///
    /// The period does not inherit the fiscal year's sequences; numbering
    /// falls back to them when the period has none.
    ///
    /// # Errors
    ///
    /// Returns a validation, configuration or sequence error when a guard
    /// fails.
    #[tracing::instrument(skip(self, period), fields(period = %period.name))]
    pub async fn create_period(&self, period: Period) -> Result<Period, TechServError> {
        self.check_period(&period).await?;
        self.periods.create(period).await
    }

    /// Look up a period by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::NotFound`] when no period with `id` exists.
    pub async fn get_period(&self, id: PeriodId) -> Result<Period, TechServError> {
        self.periods.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Period",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all periods.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_periods(&self) -> Result<Vec<Period>, TechServError> {
        self.periods.get_all().await
    }

    /// Replace a period. It stays in its original fiscal year.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::SequenceLocked`] when a sequence would
    /// change while numbered services exist in the period, or any error of
    /// [`Self::create_period`].
    #[tracing::instrument(skip(self, period), fields(period = %period.name))]
    pub async fn update_period(&self, mut period: Period) -> Result<Period, TechServError> {
        let stored = self.get_period(period.id).await?;
        period.fiscal_year_id = stored.fiscal_year_id;
        self.check_period(&period).await?;
        self.check_sequence_lock(
            &stored.name,
            &stored.sequences,
            &period.sequences,
            stored.start_date,
            stored.end_date,
        )
        .await?;
        self.periods.update(period).await
    }

    async fn check_fiscal_year(&self, fiscal_year: &FiscalYear) -> Result<(), TechServError> {
        fiscal_year.validate()?;
        let others = self.fiscal_years.get_all().await?;
        let periods = self.periods.get_all().await?;
        fiscal_year.check_unique_sequences(&others, &periods)?;
        let sequences = self.known_sequences(&fiscal_year.sequences).await?;
        fiscal_year.check_sequence_company(&sequences)?;
        Ok(())
    }

    async fn check_period(&self, period: &Period) -> Result<(), TechServError> {
        let fiscal_year = self.get_fiscal_year(period.fiscal_year_id).await?;
        period.validate(&fiscal_year)?;
        let periods = self.periods.get_all().await?;
        let fiscal_years = self.fiscal_years.get_all().await?;
        period.check_unique_sequences(&periods, &fiscal_years)?;
        let sequences = self.known_sequences(&period.sequences).await?;
        period.check_sequence_company(&fiscal_year, &sequences)?;
        Ok(())
    }

    /// Load every sequence referenced by `configured`.
    async fn known_sequences(
        &self,
        configured: &ServiceSequences,
    ) -> Result<Vec<StrictSequence>, TechServError> {
        let mut found = Vec::new();
        for (_, id) in configured.configured() {
            let sequence = self
                .sequences
                .get_by_id(id)
                .await?
                .ok_or_else(|| SequenceError::UnknownSequence { id: id.to_string() })?;
            found.push(sequence);
        }
        Ok(found)
    }

    async fn check_sequence_lock(
        &self,
        record: &str,
        current: &ServiceSequences,
        next: &ServiceSequences,
        start: Date,
        end: Date,
    ) -> Result<(), TechServError> {
        for kind in current.changed_kinds(next) {
            if self.services.exists_numbered_between(kind, start, end).await? {
                tracing::warn!(record, %kind, "refused sequence change on numbered range");
                return Err(ConfigurationError::SequenceLocked {
                    record: record.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}
