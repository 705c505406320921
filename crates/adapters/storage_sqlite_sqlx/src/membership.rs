//! `SQLite` implementation of [`GroupMembership`].

use std::future::Future;

use sqlx::SqlitePool;

use techserv_app::ports::GroupMembership;
use techserv_domain::error::TechServError;
use techserv_domain::id::UserId;

use crate::error::StorageError;

const IS_MEMBER: &str = r"
    SELECT EXISTS (SELECT 1 FROM group_members WHERE user_id = ? AND group_name = ?)
";

const INSERT: &str = "INSERT OR IGNORE INTO group_members (user_id, group_name) VALUES (?, ?)";

/// Group membership stored as `(user, group)` pairs.
#[derive(Clone)]
pub struct SqliteGroupMembership {
    pool: SqlitePool,
}

impl SqliteGroupMembership {
    /// Create a new lookup using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Put `user` in `group`. Adding an existing member is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the insert fails.
    pub async fn add_member(&self, user: UserId, group: &str) -> Result<(), TechServError> {
        sqlx::query(INSERT)
            .bind(user.to_string())
            .bind(group)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        tracing::info!(user_id = %user, group, "group member added");
        Ok(())
    }
}

impl GroupMembership for SqliteGroupMembership {
    fn is_member(
        &self,
        user: UserId,
        group: &str,
    ) -> impl Future<Output = Result<bool, TechServError>> + Send {
        let pool = self.pool.clone();
        let group = group.to_string();
        async move {
            let member: bool = sqlx::query_scalar(IS_MEMBER)
                .bind(user.to_string())
                .bind(group)
                .fetch_one(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(member)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::memory_pool;

    #[tokio::test]
    async fn should_answer_membership_per_group() {
        let membership = SqliteGroupMembership::new(memory_pool().await);
        let user = UserId::new();

        membership.add_member(user, "service_draft").await.unwrap();
        membership.add_member(user, "service_draft").await.unwrap();

        assert!(membership.is_member(user, "service_draft").await.unwrap());
        assert!(!membership.is_member(user, "account_admin").await.unwrap());
        assert!(!membership.is_member(UserId::new(), "service_draft").await.unwrap());
    }
}
