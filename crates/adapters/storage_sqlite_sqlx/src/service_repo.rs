//! `SQLite` implementation of [`ServiceRepository`].

use std::future::Future;

use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, QueryBuilder, Row, Sqlite, SqlitePool};

use techserv_app::ports::{ServiceRepository, StateChange};
use techserv_domain::error::{TechServError, WorkflowError};
use techserv_domain::id::ServiceId;
use techserv_domain::service::{Service, ServiceKind, WarrantyDetails};
use techserv_domain::time::Date;

use crate::decode::{date_text, id_text, parse, parse_opt};
use crate::error::StorageError;
use crate::sequence_repo::draw_next;

/// Wrapper for converting database rows into domain [`Service`].
pub(crate) struct Wrapper(pub(crate) Service);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let company_id: String = row.try_get("company_id")?;
        let kind: String = row.try_get("kind")?;
        let state: String = row.try_get("state")?;

        let warranty = WarrantyDetails {
            invoice_date: parse_opt(row.try_get("invoice_date")?)?,
            invoice_number: row.try_get("invoice_number")?,
            case_number: row.try_get("case_number")?,
            send_date: parse_opt(row.try_get("send_date")?)?,
            remission: row.try_get("remission")?,
            transport: row.try_get("transport")?,
        };

        Ok(Self(Service {
            id: parse(&id)?,
            company_id: parse(&company_id)?,
            party_id: parse_opt(row.try_get("party_id")?)?,
            number_service: row.try_get("number_service")?,
            kind: parse(&kind)?,
            state: parse(&state)?,
            entry_date: parse_opt(row.try_get("entry_date")?)?,
            delivery_date: parse_opt(row.try_get("delivery_date")?)?,
            technical_id: parse_opt(row.try_get("technical_id")?)?,
            garanty: row.try_get("garanty")?,
            warranty,
            accessories: row.try_get("accessories")?,
            observations: row.try_get("observations")?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO services (
        company_id, party_id, kind, entry_date, delivery_date,
        technical_id, garanty, invoice_date, invoice_number, case_number, send_date,
        remission, transport, accessories, observations, number_service, state, id
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

/// State and number belong to [`TRANSITION`]; the state read by the caller
/// guards the write.
const UPDATE: &str = r"
    UPDATE services SET
        company_id = ?, party_id = ?, kind = ?,
        entry_date = ?, delivery_date = ?, technical_id = ?, garanty = ?,
        invoice_date = ?, invoice_number = ?, case_number = ?, send_date = ?,
        remission = ?, transport = ?, accessories = ?, observations = ?
    WHERE id = ? AND state = ?
";

const TRANSITION: &str = r"
    UPDATE services SET
        state = ?,
        entry_date = COALESCE(entry_date, ?),
        number_service = COALESCE(number_service, ?)
    WHERE id = ? AND state = ?
";

const TRANSITION_UNNUMBERED: &str = r"
    UPDATE services SET
        state = ?,
        entry_date = COALESCE(entry_date, ?),
        number_service = COALESCE(number_service, ?)
    WHERE id = ? AND state = ? AND number_service IS NULL
";

const SELECT_BY_ID: &str = "SELECT * FROM services WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM services ORDER BY entry_date DESC, id";
const DELETE_LINES: &str = "DELETE FROM service_lines WHERE service_id = ?";
const DELETE_HISTORY: &str = "DELETE FROM history_lines WHERE service_id = ?";
const DELETE_BY_ID: &str = "DELETE FROM services WHERE id = ?";

const EXISTS_NUMBERED_BETWEEN: &str = r"
    SELECT EXISTS (
        SELECT 1 FROM services
        WHERE kind = ? AND number_service IS NOT NULL AND entry_date BETWEEN ? AND ?
    )
";

/// Bind the editable columns in the order shared by [`INSERT`] and
/// [`UPDATE`].
fn bind_service<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    service: &Service,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    query
        .bind(service.company_id.to_string())
        .bind(id_text(service.party_id))
        .bind(service.kind.as_str())
        .bind(date_text(service.entry_date))
        .bind(date_text(service.delivery_date))
        .bind(id_text(service.technical_id))
        .bind(service.garanty)
        .bind(date_text(service.warranty.invoice_date))
        .bind(service.warranty.invoice_number.clone())
        .bind(service.warranty.case_number.clone())
        .bind(date_text(service.warranty.send_date))
        .bind(service.warranty.remission.clone())
        .bind(service.warranty.transport.clone())
        .bind(service.accessories.clone())
        .bind(service.observations.clone())
}

fn stale(id: ServiceId) -> TechServError {
    WorkflowError::StaleState {
        service: id.to_string(),
    }
    .into()
}

/// `SQLite`-backed service repository.
#[derive(Clone)]
pub struct SqliteServiceRepository {
    pool: SqlitePool,
}

impl SqliteServiceRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ServiceRepository for SqliteServiceRepository {
    fn create(&self, service: Service) -> impl Future<Output = Result<Service, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            bind_service(sqlx::query(INSERT), &service)
                .bind(service.number_service.clone())
                .bind(service.state.as_str())
                .bind(service.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(service)
        }
    }

    fn get_by_id(
        &self,
        id: ServiceId,
    ) -> impl Future<Output = Result<Option<Service>, TechServError>> + Send {
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

    fn get_many(
        &self,
        ids: &[ServiceId],
    ) -> impl Future<Output = Result<Vec<Service>, TechServError>> + Send {
        let pool = self.pool.clone();
        let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
        async move {
            if ids.is_empty() {
                return Ok(Vec::new());
            }

            let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM services WHERE id IN (");
            let mut separated = builder.separated(", ");
            for id in ids {
                separated.push_bind(id);
            }
            separated.push_unseparated(")");

            let rows: Vec<Wrapper> = builder
                .build_query_as()
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Service>, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(&self, service: Service) -> impl Future<Output = Result<Service, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;
            let result = bind_service(sqlx::query(UPDATE), &service)
                .bind(service.id.to_string())
                .bind(service.state.as_str())
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            if result.rows_affected() != 1 {
                return Err(stale(service.id));
            }

            let stored: Wrapper = sqlx::query_as(SELECT_BY_ID)
                .bind(service.id.to_string())
                .fetch_one(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            tx.commit().await.map_err(StorageError::from)?;

            Ok(stored.0)
        }
    }

    fn transition_many(
        &self,
        changes: Vec<StateChange>,
    ) -> impl Future<Output = Result<Vec<Service>, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            // Returning early drops `tx`, which rolls back every draw and write.
            let mut tx = pool.begin().await.map_err(StorageError::from)?;
            for change in &changes {
                let (statement, number) = match change.draw {
                    Some(sequence) => (
                        TRANSITION_UNNUMBERED,
                        Some(draw_next(&mut *tx, sequence).await?),
                    ),
                    None => (TRANSITION, None),
                };
                let result = sqlx::query(statement)
                    .bind(change.to.as_str())
                    .bind(date_text(change.entry_date))
                    .bind(number)
                    .bind(change.id.to_string())
                    .bind(change.from.as_str())
                    .execute(&mut *tx)
                    .await
                    .map_err(StorageError::from)?;
                if result.rows_affected() != 1 {
                    tracing::warn!(service_id = %change.id, from = %change.from, "stale transition rolled back");
                    return Err(stale(change.id));
                }
            }

            let mut stored = Vec::with_capacity(changes.len());
            for change in &changes {
                let row: Wrapper = sqlx::query_as(SELECT_BY_ID)
                    .bind(change.id.to_string())
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(StorageError::from)?;
                stored.push(row.0);
            }
            tx.commit().await.map_err(StorageError::from)?;

            Ok(stored)
        }
    }

    fn delete_many(&self, ids: &[ServiceId]) -> impl Future<Output = Result<(), TechServError>> + Send {
        let pool = self.pool.clone();
        let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;
            for id in &ids {
                for statement in [DELETE_LINES, DELETE_HISTORY, DELETE_BY_ID] {
                    sqlx::query(statement)
                        .bind(id)
                        .execute(&mut *tx)
                        .await
                        .map_err(StorageError::from)?;
                }
            }
            tx.commit().await.map_err(StorageError::from)?;

            Ok(())
        }
    }

    fn exists_numbered_between(
        &self,
        kind: ServiceKind,
        start: Date,
        end: Date,
    ) -> impl Future<Output = Result<bool, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            let exists: bool = sqlx::query_scalar(EXISTS_NUMBERED_BETWEEN)
                .bind(kind.as_str())
                .bind(start.to_string())
                .bind(end.to_string())
                .fetch_one(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(exists)
        }
    }
}
