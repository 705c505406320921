//! `SQLite` implementations of [`FiscalYearRepository`] and
//! [`PeriodRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use techserv_app::ports::{FiscalYearRepository, PeriodRepository};
use techserv_domain::error::TechServError;
use techserv_domain::fiscal::{FiscalYear, Period, ServiceSequences};
use techserv_domain::id::{CompanyId, FiscalYearId, PeriodId};
use techserv_domain::time::Date;

use crate::decode::{id_text, parse, parse_opt};
use crate::error::StorageError;

fn sequences_from_row(row: &SqliteRow) -> Result<ServiceSequences, sqlx::Error> {
    Ok(ServiceSequences {
        service: parse_opt(row.try_get("service_sequence_id")?)?,
        home_service: parse_opt(row.try_get("home_service_sequence_id")?)?,
    })
}

/// Wrapper for converting database rows into domain [`FiscalYear`].
struct FiscalYearWrapper(FiscalYear);

impl<'r> FromRow<'r, SqliteRow> for FiscalYearWrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let company_id: String = row.try_get("company_id")?;
        let start_date: String = row.try_get("start_date")?;
        let end_date: String = row.try_get("end_date")?;

        Ok(Self(FiscalYear {
            id: parse(&id)?,
            name: row.try_get("name")?,
            company_id: parse(&company_id)?,
            start_date: parse(&start_date)?,
            end_date: parse(&end_date)?,
            sequences: sequences_from_row(row)?,
        }))
    }
}

/// Wrapper for converting database rows into domain [`Period`].
struct PeriodWrapper(Period);

impl<'r> FromRow<'r, SqliteRow> for PeriodWrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let fiscal_year_id: String = row.try_get("fiscal_year_id")?;
        let start_date: String = row.try_get("start_date")?;
        let end_date: String = row.try_get("end_date")?;
        let kind: String = row.try_get("kind")?;
        let state: String = row.try_get("state")?;

        Ok(Self(Period {
            id: parse(&id)?,
            name: row.try_get("name")?,
            fiscal_year_id: parse(&fiscal_year_id)?,
            start_date: parse(&start_date)?,
            end_date: parse(&end_date)?,
            kind: parse(&kind)?,
            state: parse(&state)?,
            sequences: sequences_from_row(row)?,
        }))
    }
}

const INSERT_FISCAL_YEAR: &str = r"
    INSERT INTO fiscal_years (
        name, company_id, start_date, end_date, service_sequence_id,
        home_service_sequence_id, id
    )
    VALUES (?, ?, ?, ?, ?, ?, ?)
";

const UPDATE_FISCAL_YEAR: &str = r"
    UPDATE fiscal_years SET
        name = ?, company_id = ?, start_date = ?, end_date = ?,
        service_sequence_id = ?, home_service_sequence_id = ?
    WHERE id = ?
";

const SELECT_FISCAL_YEAR_BY_ID: &str = "SELECT * FROM fiscal_years WHERE id = ?";
const SELECT_ALL_FISCAL_YEARS: &str = "SELECT * FROM fiscal_years ORDER BY start_date";

const INSERT_PERIOD: &str = r"
    INSERT INTO periods (
        name, fiscal_year_id, start_date, end_date, kind, state,
        service_sequence_id, home_service_sequence_id, id
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const UPDATE_PERIOD: &str = r"
    UPDATE periods SET
        name = ?, fiscal_year_id = ?, start_date = ?, end_date = ?, kind = ?, state = ?,
        service_sequence_id = ?, home_service_sequence_id = ?
    WHERE id = ?
";

const SELECT_PERIOD_BY_ID: &str = "SELECT * FROM periods WHERE id = ?";
const SELECT_ALL_PERIODS: &str = "SELECT * FROM periods ORDER BY start_date";

const SELECT_OPEN_STANDARD: &str = r"
    SELECT periods.* FROM periods
    JOIN fiscal_years ON fiscal_years.id = periods.fiscal_year_id
    WHERE fiscal_years.company_id = ?
      AND periods.kind = 'standard'
      AND periods.state = 'open'
      AND periods.start_date <= ?
      AND periods.end_date >= ?
    ORDER BY periods.start_date
    LIMIT 1
";

/// `SQLite`-backed fiscal year repository.
#[derive(Clone)]
pub struct SqliteFiscalYearRepository {
    pool: SqlitePool,
}

impl SqliteFiscalYearRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn write(&self, statement: &str, year: &FiscalYear) -> Result<(), StorageError> {
        sqlx::query(statement)
            .bind(&year.name)
            .bind(year.company_id.to_string())
            .bind(year.start_date.to_string())
            .bind(year.end_date.to_string())
            .bind(id_text(year.sequences.service))
            .bind(id_text(year.sequences.home_service))
            .bind(year.id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

impl FiscalYearRepository for SqliteFiscalYearRepository {
    async fn create(&self, fiscal_year: FiscalYear) -> Result<FiscalYear, TechServError> {
        self.write(INSERT_FISCAL_YEAR, &fiscal_year).await?;
        Ok(fiscal_year)
    }

    fn get_by_id(
        &self,
        id: FiscalYearId,
    ) -> impl Future<Output = Result<Option<FiscalYear>, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<FiscalYearWrapper> = sqlx::query_as(SELECT_FISCAL_YEAR_BY_ID)
                .bind(id.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<FiscalYear>, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<FiscalYearWrapper> = sqlx::query_as(SELECT_ALL_FISCAL_YEARS)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    async fn update(&self, fiscal_year: FiscalYear) -> Result<FiscalYear, TechServError> {
        self.write(UPDATE_FISCAL_YEAR, &fiscal_year).await?;
        Ok(fiscal_year)
    }
}

/// `SQLite`-backed period repository.
#[derive(Clone)]
pub struct SqlitePeriodRepository {
    pool: SqlitePool,
}

impl SqlitePeriodRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn write(&self, statement: &str, period: &Period) -> Result<(), StorageError> {
        sqlx::query(statement)
            .bind(&period.name)
            .bind(period.fiscal_year_id.to_string())
            .bind(period.start_date.to_string())
            .bind(period.end_date.to_string())
            .bind(period.kind.as_str())
            .bind(period.state.as_str())
            .bind(id_text(period.sequences.service))
            .bind(id_text(period.sequences.home_service))
            .bind(period.id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

impl PeriodRepository for SqlitePeriodRepository {
    async fn create(&self, period: Period) -> Result<Period, TechServError> {
        self.write(INSERT_PERIOD, &period).await?;
        Ok(period)
    }

    fn get_by_id(
        &self,
        id: PeriodId,
    ) -> impl Future<Output = Result<Option<Period>, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<PeriodWrapper> = sqlx::query_as(SELECT_PERIOD_BY_ID)
                .bind(id.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Period>, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<PeriodWrapper> = sqlx::query_as(SELECT_ALL_PERIODS)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    async fn update(&self, period: Period) -> Result<Period, TechServError> {
        self.write(UPDATE_PERIOD, &period).await?;
        Ok(period)
    }

    fn find_open_standard(
        &self,
        company: CompanyId,
        date: Date,
    ) -> impl Future<Output = Result<Option<Period>, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            let date = date.to_string();
            let row: Option<PeriodWrapper> = sqlx::query_as(SELECT_OPEN_STANDARD)
                .bind(company.to_string())
                .bind(&date)
                .bind(&date)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }
}
