//! `SQLite` connection pool setup and migration runner.

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::StorageError;

/// Configuration for the `SQLite` storage adapter.
pub struct Config {
    /// `SQLite` connection URL (e.g. `sqlite:techserv.db` or `sqlite::memory:`).
    pub database_url: String,
}

impl Config {
    /// Build a [`Database`] from this configuration.
    ///
    /// Creates the connection pool, creates the database file if missing,
    /// and runs all pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the connection or migrations fail.
    pub async fn build(self) -> Result<Database, StorageError> {
        Database::initialize(&self.database_url).await
    }
}

/// Holds the `SQLite` connection pool and provides access to it.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database and run migrations.
    ///
    /// An in-memory database lives as long as its connection, so it gets a
    /// single connection that is never recycled.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the connection or migrations fail.
    async fn initialize(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePool::connect_with(options).await?
        };

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::debug!(database_url, "database ready");

        Ok(Self { pool })
    }

    /// Borrow the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .unwrap()
    .pool()
    .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_create_pool_and_run_migrations_when_using_memory_db() {
        let pool = memory_pool().await;

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        let names: Vec<&str> = tables.iter().map(|row| row.0.as_str()).collect();
        for table in [
            "services",
            "service_lines",
            "history_lines",
            "periferics",
            "fiscal_years",
            "periods",
            "sequences",
            "group_members",
        ] {
            assert!(names.contains(&table), "missing {table} table");
        }
    }

    #[tokio::test]
    async fn should_drop_legacy_periferic_code_column() {
        let pool = memory_pool().await;

        let columns: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM pragma_table_info('periferics')")
                .fetch_all(&pool)
                .await
                .unwrap();

        let names: Vec<&str> = columns.iter().map(|row| row.0.as_str()).collect();
        assert_eq!(names, vec!["id", "name"]);
    }

    #[tokio::test]
    async fn should_reject_entry_date_after_delivery_date() {
        let pool = memory_pool().await;

        let result = sqlx::query(
            "INSERT INTO services (id, company_id, entry_date, delivery_date) VALUES ('a', 'b', '2026-03-10', '2026-03-01')",
        )
        .execute(&pool)
        .await;

        assert!(result.is_err());
    }
}
