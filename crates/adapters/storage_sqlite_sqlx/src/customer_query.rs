//! `SQLite` implementation of [`CustomerHistoryQuery`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use techserv_app::ports::CustomerHistoryQuery;
use techserv_domain::customer::CustomerServiceRow;
use techserv_domain::error::TechServError;
use techserv_domain::id::PartyId;

use crate::decode::{parse, parse_opt};
use crate::error::StorageError;

struct Wrapper(CustomerServiceRow);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let state: String = row.try_get("state")?;

        Ok(Self(CustomerServiceRow {
            entry_date: parse_opt(row.try_get("entry_date")?)?,
            delivery_date: parse_opt(row.try_get("delivery_date")?)?,
            number_service: row.try_get("number_service")?,
            periferic: row.try_get("periferic")?,
            trademark: row.try_get("trademark")?,
            model: row.try_get("model")?,
            failure: row.try_get("failure")?,
            reference_amount: parse_opt(row.try_get("reference_amount")?)?,
            technician: row.try_get("technician")?,
            state: parse(&state)?,
            accessories: row.try_get("accessories")?,
            repair_detail: row.try_get("observations")?,
        }))
    }
}

/// The line technician wins over the one assigned to the whole service.
const SELECT_BY_PARTY: &str = r"
    SELECT
        services.entry_date,
        services.delivery_date,
        services.number_service,
        periferics.name AS periferic,
        trademarks.name AS trademark,
        service_lines.model,
        service_lines.failure,
        service_lines.reference_amount,
        employees.name AS technician,
        services.state,
        services.accessories,
        services.observations
    FROM service_lines
    JOIN services ON services.id = service_lines.service_id
    LEFT JOIN periferics ON periferics.id = service_lines.periferic_id
    LEFT JOIN trademarks ON trademarks.id = service_lines.trademark_id
    LEFT JOIN employees
        ON employees.id = COALESCE(service_lines.technical_id, services.technical_id)
    WHERE services.party_id = ?
    ORDER BY services.entry_date DESC, services.number_service DESC, service_lines.rowid
";

/// Flattened repair history of a customer.
#[derive(Clone)]
pub struct SqliteCustomerHistoryQuery {
    pool: SqlitePool,
}

impl SqliteCustomerHistoryQuery {
    /// Create a new query using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl CustomerHistoryQuery for SqliteCustomerHistoryQuery {
    fn services_of(
        &self,
        party: PartyId,
    ) -> impl Future<Output = Result<Vec<CustomerServiceRow>, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_PARTY)
                .bind(party.to_string())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }
}
