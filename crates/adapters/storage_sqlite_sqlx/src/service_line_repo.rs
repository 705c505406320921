//! `SQLite` implementation of [`ServiceLineRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use techserv_app::ports::ServiceLineRepository;
use techserv_domain::error::TechServError;
use techserv_domain::id::{ServiceId, ServiceLineId};
use techserv_domain::service_line::ServiceLine;

use crate::decode::{id_text, parse, parse_opt};
use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`ServiceLine`].
struct Wrapper(ServiceLine);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let service_id: String = row.try_get("service_id")?;

        Ok(Self(ServiceLine {
            id: parse(&id)?,
            service_id: parse(&service_id)?,
            product_id: parse_opt(row.try_get("product_id")?)?,
            periferic_id: parse_opt(row.try_get("periferic_id")?)?,
            trademark_id: parse_opt(row.try_get("trademark_id")?)?,
            model: row.try_get("model")?,
            series: row.try_get("series")?,
            failure: row.try_get("failure")?,
            reference_amount: parse_opt(row.try_get("reference_amount")?)?,
            technical_id: parse_opt(row.try_get("technical_id")?)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO service_lines (
        id, service_id, product_id, periferic_id, trademark_id, model, series,
        failure, reference_amount, technical_id
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const UPDATE: &str = r"
    UPDATE service_lines SET
        product_id = ?, periferic_id = ?, trademark_id = ?, model = ?, series = ?,
        failure = ?, reference_amount = ?, technical_id = ?
    WHERE id = ?
";

const SELECT_BY_ID: &str = "SELECT * FROM service_lines WHERE id = ?";
const SELECT_BY_SERVICE: &str = "SELECT * FROM service_lines WHERE service_id = ? ORDER BY rowid";
const DELETE_BY_ID: &str = "DELETE FROM service_lines WHERE id = ?";

/// `SQLite`-backed service line repository.
#[derive(Clone)]
pub struct SqliteServiceLineRepository {
    pool: SqlitePool,
}

impl SqliteServiceLineRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ServiceLineRepository for SqliteServiceLineRepository {
    fn create(
        &self,
        line: ServiceLine,
    ) -> impl Future<Output = Result<ServiceLine, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(line.id.to_string())
                .bind(line.service_id.to_string())
                .bind(id_text(line.product_id))
                .bind(id_text(line.periferic_id))
                .bind(id_text(line.trademark_id))
                .bind(&line.model)
                .bind(&line.series)
                .bind(&line.failure)
                .bind(line.reference_amount.map(|amount| amount.to_string()))
                .bind(id_text(line.technical_id))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(line)
        }
    }

    fn get_by_id(
        &self,
        id: ServiceLineId,
    ) -> impl Future<Output = Result<Option<ServiceLine>, TechServError>> + Send {
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
    ) -> impl Future<Output = Result<Vec<ServiceLine>, TechServError>> + Send {
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
        line: ServiceLine,
    ) -> impl Future<Output = Result<ServiceLine, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPDATE)
                .bind(id_text(line.product_id))
                .bind(id_text(line.periferic_id))
                .bind(id_text(line.trademark_id))
                .bind(&line.model)
                .bind(&line.series)
                .bind(&line.failure)
                .bind(line.reference_amount.map(|amount| amount.to_string()))
                .bind(id_text(line.technical_id))
                .bind(line.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(line)
        }
    }

    fn delete(&self, id: ServiceLineId) -> impl Future<Output = Result<(), TechServError>> + Send {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::memory_pool;
    use crate::service_repo::SqliteServiceRepository;
    use rust_decimal_macros::dec;
    use techserv_app::ports::ServiceRepository;
    use techserv_domain::service::Service;

    async fn setup() -> (SqliteServiceLineRepository, ServiceId) {
        let pool = memory_pool().await;
        let service = SqliteServiceRepository::new(pool.clone())
            .create(Service::builder().build().unwrap())
            .await
            .unwrap();
        (SqliteServiceLineRepository::new(pool), service.id)
    }

    fn test_line(service_id: ServiceId) -> ServiceLine {
        ServiceLine::builder()
            .service_id(service_id)
            .model("LaserJet 1020")
            .failure("paper jam")
            .reference_amount(dec!(12.50))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_create_and_retrieve_line() {
        let (repo, service_id) = setup().await;
        let line = test_line(service_id);

        repo.create(line.clone()).await.unwrap();

        let fetched = repo.get_by_id(line.id).await.unwrap().unwrap();
        assert_eq!(fetched, line);
        assert_eq!(fetched.reference_amount, Some(dec!(12.50)));
    }

    #[tokio::test]
    async fn should_refuse_line_of_unknown_service() {
        let (repo, _) = setup().await;
        assert!(repo.create(test_line(ServiceId::new())).await.is_err());
    }

    #[tokio::test]
    async fn should_find_lines_of_one_service() {
        let (repo, service_id) = setup().await;
        repo.create(test_line(service_id)).await.unwrap();
        repo.create(test_line(service_id)).await.unwrap();

        assert_eq!(repo.find_by_service(service_id).await.unwrap().len(), 2);
        assert!(
            repo.find_by_service(ServiceId::new())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn should_update_and_delete_line() {
        let (repo, service_id) = setup().await;
        let mut line = repo.create(test_line(service_id)).await.unwrap();

        line.failure = Some("fuser worn out".to_string());
        line.reference_amount = None;
        repo.update(line.clone()).await.unwrap();
        assert_eq!(repo.get_by_id(line.id).await.unwrap().unwrap(), line);

        repo.delete(line.id).await.unwrap();
        assert!(repo.get_by_id(line.id).await.unwrap().is_none());
    }
}
