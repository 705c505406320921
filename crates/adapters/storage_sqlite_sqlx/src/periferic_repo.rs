//! `SQLite` implementation of [`PeriphericRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use techserv_app::ports::PeriphericRepository;
use techserv_domain::error::TechServError;
use techserv_domain::id::PeriphericId;
use techserv_domain::periferic::Periferic;

use crate::decode::parse;
use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`Periferic`].
struct Wrapper(Periferic);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let name: String = row.try_get("name")?;

        Ok(Self(Periferic {
            id: parse(&id)?,
            name,
        }))
    }
}

const INSERT: &str = "INSERT INTO periferics (id, name) VALUES (?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM periferics WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM periferics ORDER BY name";
const UPDATE: &str = "UPDATE periferics SET name = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM periferics WHERE id = ?";

/// `SQLite`-backed periferic repository.
#[derive(Clone)]
pub struct SqlitePeriphericRepository {
    pool: SqlitePool,
}

impl SqlitePeriphericRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl PeriphericRepository for SqlitePeriphericRepository {
    fn create(
        &self,
        periferic: Periferic,
    ) -> impl Future<Output = Result<Periferic, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(periferic.id.to_string())
                .bind(&periferic.name)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(periferic)
        }
    }

    fn get_by_id(
        &self,
        id: PeriphericId,
    ) -> impl Future<Output = Result<Option<Periferic>, TechServError>> + Send {
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

    fn get_all(&self) -> impl Future<Output = Result<Vec<Periferic>, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(
        &self,
        periferic: Periferic,
    ) -> impl Future<Output = Result<Periferic, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPDATE)
                .bind(&periferic.name)
                .bind(periferic.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(periferic)
        }
    }

    fn delete(&self, id: PeriphericId) -> impl Future<Output = Result<(), TechServError>> + Send {
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

    async fn setup() -> SqlitePeriphericRepository {
        SqlitePeriphericRepository::new(memory_pool().await)
    }

    #[tokio::test]
    async fn should_list_periferics_by_name() {
        let repo = setup().await;
        repo.create(Periferic::new("Printer").unwrap()).await.unwrap();
        repo.create(Periferic::new("Keyboard").unwrap()).await.unwrap();

        let names: Vec<String> = repo
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Keyboard", "Printer"]);
    }

    #[tokio::test]
    async fn should_rename_periferic() {
        let repo = setup().await;
        let mut periferic = repo.create(Periferic::new("Mouse").unwrap()).await.unwrap();

        periferic.name = "Wireless mouse".to_string();
        repo.update(periferic.clone()).await.unwrap();

        assert_eq!(repo.get_by_id(periferic.id).await.unwrap().unwrap(), periferic);
    }

    #[tokio::test]
    async fn should_delete_periferic() {
        let repo = setup().await;
        let periferic = repo.create(Periferic::new("Scanner").unwrap()).await.unwrap();

        repo.delete(periferic.id).await.unwrap();

        assert!(repo.get_by_id(periferic.id).await.unwrap().is_none());
    }
}
