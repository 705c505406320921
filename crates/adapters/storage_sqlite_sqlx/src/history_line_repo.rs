//! `SQLite` implementation of [`HistoryLineRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use techserv_app::ports::HistoryLineRepository;
use techserv_domain::credential::PasswordDigest;
use techserv_domain::error::TechServError;
use techserv_domain::history_line::HistoryLine;
use techserv_domain::id::{HistoryLineId, ServiceId};

use crate::decode::{parse, parse_timestamp, timestamp_text};
use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`HistoryLine`].
struct Wrapper(HistoryLine);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let service_id: String = row.try_get("service_id")?;
        let password: Option<String> = row.try_get("password")?;

        Ok(Self(HistoryLine {
            id: parse(&id)?,
            service_id: parse(&service_id)?,
            description: row.try_get("description")?,
            date: parse_timestamp(row.try_get("date")?)?,
            user: row.try_get("user")?,
            password: password.map(PasswordDigest::from_phc),
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO history_lines (id, service_id, description, date, user, password)
    VALUES (?, ?, ?, ?, ?, ?)
";

const UPDATE: &str = r"
    UPDATE history_lines SET description = ?, date = ?, user = ?, password = ?
    WHERE id = ?
";

const SELECT_BY_ID: &str = "SELECT * FROM history_lines WHERE id = ?";

const SELECT_BY_SERVICE: &str = r"
    SELECT * FROM history_lines
    WHERE service_id = ?
    ORDER BY date ASC, rowid ASC
";

const DELETE_BY_ID: &str = "DELETE FROM history_lines WHERE id = ?";

/// `SQLite`-backed history line repository. The credential is stored as its
/// PHC digest.
#[derive(Clone)]
pub struct SqliteHistoryLineRepository {
    pool: SqlitePool,
}

impl SqliteHistoryLineRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl HistoryLineRepository for SqliteHistoryLineRepository {
    fn create(
        &self,
        line: HistoryLine,
    ) -> impl Future<Output = Result<HistoryLine, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(line.id.to_string())
                .bind(line.service_id.to_string())
                .bind(&line.description)
                .bind(timestamp_text(line.date))
                .bind(&line.user)
                .bind(line.password.as_ref().map(PasswordDigest::as_str))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(line)
        }
    }

    fn get_by_id(
        &self,
        id: HistoryLineId,
    ) -> impl Future<Output = Result<Option<HistoryLine>, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn find_by_service(
        &self,
        service_id: ServiceId,
    ) -> impl Future<Output = Result<Vec<HistoryLine>, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_SERVICE)
                .bind(service_id.to_string())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(
        &self,
        line: HistoryLine,
    ) -> impl Future<Output = Result<HistoryLine, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPDATE)
                .bind(&line.description)
                .bind(timestamp_text(line.date))
                .bind(&line.user)
                .bind(line.password.as_ref().map(PasswordDigest::as_str))
                .bind(line.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(line)
        }
    }

    fn delete(&self, id: HistoryLineId) -> impl Future<Output = Result<(), TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(DELETE_BY_ID)
                .bind(id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}
