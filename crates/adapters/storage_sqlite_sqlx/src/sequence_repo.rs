//! `SQLite` implementation of [`SequenceRepository`], and the number draw
//! used by the service transitions.

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqliteConnection, SqlitePool};

use techserv_app::ports::SequenceRepository;
use techserv_domain::error::{SequenceError, TechServError};
use techserv_domain::id::SequenceId;
use techserv_domain::sequence::StrictSequence;

use crate::decode::{id_text, parse, parse_opt};
use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`StrictSequence`].
struct Wrapper(StrictSequence);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;

        Ok(Self(StrictSequence {
            id: parse(&id)?,
            name: row.try_get("name")?,
            company_id: parse_opt(row.try_get("company_id")?)?,
            prefix: row.try_get("prefix")?,
            padding: row.try_get("padding")?,
            number_next: row.try_get("number_next")?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO sequences (id, name, company_id, prefix, padding, number_next)
    VALUES (?, ?, ?, ?, ?, ?)
";

const SELECT_BY_ID: &str = "SELECT * FROM sequences WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM sequences ORDER BY name";

/// Consumes one value. The row comes back with `number_next` already
/// advanced, so the drawn number is the one before it.
const DRAW_NEXT: &str = r"
    UPDATE sequences SET number_next = number_next + 1
    WHERE id = ?
    RETURNING *
";

/// `SQLite`-backed sequence definitions.
#[derive(Clone)]
pub struct SqliteSequenceRepository {
    pool: SqlitePool,
}

impl SqliteSequenceRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl SequenceRepository for SqliteSequenceRepository {
    fn create(
        &self,
        sequence: StrictSequence,
    ) -> impl Future<Output = Result<StrictSequence, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(sequence.id.to_string())
                .bind(&sequence.name)
                .bind(id_text(sequence.company_id))
                .bind(&sequence.prefix)
                .bind(sequence.padding)
                .bind(sequence.number_next)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(sequence)
        }
    }

    fn get_by_id(
        &self,
        id: SequenceId,
    ) -> impl Future<Output = Result<Option<StrictSequence>, TechServError>> + Send {
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

    fn get_all(&self) -> impl Future<Output = Result<Vec<StrictSequence>, TechServError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }
}

/// Draw the next formatted number of `sequence` on `conn`.
///
/// A single `UPDATE … RETURNING` reads and increments, so concurrent callers
/// never share a value. Run it inside the transaction that stores the
/// number: a rollback gives the value back.
pub(crate) async fn draw_next(
    conn: &mut SqliteConnection,
    sequence: SequenceId,
) -> Result<String, TechServError> {
    let row: Option<Wrapper> = sqlx::query_as(DRAW_NEXT)
        .bind(sequence.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(StorageError::from)?;

    let Some(Wrapper(advanced)) = row else {
        return Err(SequenceError::UnknownSequence {
            id: sequence.to_string(),
        }
        .into());
    };

    let number = advanced.format(advanced.number_next - 1);
    tracing::debug!(sequence_id = %sequence, %number, "sequence value drawn");
    Ok(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::memory_pool;
    use techserv_domain::id::CompanyId;

    fn march() -> StrictSequence {
        StrictSequence::builder()
            .name("Services March")
            .company_id(CompanyId::new())
            .prefix("MAR-")
            .padding(4)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_create_and_retrieve_sequence() {
        let repo = SqliteSequenceRepository::new(memory_pool().await);
        let sequence = repo.create(march()).await.unwrap();

        let fetched = repo.get_by_id(sequence.id).await.unwrap().unwrap();
        assert_eq!(fetched, sequence);
        assert_eq!(repo.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_draw_consecutive_numbers() {
        let pool = memory_pool().await;
        let sequence = SqliteSequenceRepository::new(pool.clone())
            .create(march())
            .await
            .unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let first = draw_next(&mut conn, sequence.id).await.unwrap();
        let second = draw_next(&mut conn, sequence.id).await.unwrap();

        assert_eq!(first, "MAR-0001");
        assert_eq!(second, "MAR-0002");
    }

    #[tokio::test]
    async fn should_give_value_back_when_transaction_rolls_back() {
        let pool = memory_pool().await;
        let repo = SqliteSequenceRepository::new(pool.clone());
        let sequence = repo.create(march()).await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        draw_next(&mut tx, sequence.id).await.unwrap();
        tx.rollback().await.unwrap();

        let stored = repo.get_by_id(sequence.id).await.unwrap().unwrap();
        assert_eq!(stored.number_next, 1);

        let mut tx = pool.begin().await.unwrap();
        draw_next(&mut tx, sequence.id).await.unwrap();
        tx.commit().await.unwrap();

        let stored = repo.get_by_id(sequence.id).await.unwrap().unwrap();
        assert_eq!(stored.number_next, 2);
    }

    #[tokio::test]
    async fn should_fail_for_unknown_sequence() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        assert!(matches!(
            draw_next(&mut conn, SequenceId::new()).await,
            Err(TechServError::Sequence(SequenceError::UnknownSequence { .. }))
        ));
    }
}
