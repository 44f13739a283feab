//! Engagement (like) repository implementation.
//!
//! The `issue_likes` table has a composite primary key on
//! `(issue_id, user_id)`, so inserts are naturally idempotent under
//! `ON CONFLICT DO NOTHING` and counts are always set cardinality.

use sqlx::PgPool;
use uuid::Uuid;

use civicwatch_core::error::{AppError, ErrorKind};
use civicwatch_core::result::AppResult;

/// Repository for like toggles and cardinality queries.
#[derive(Debug, Clone)]
pub struct EngagementRepository {
    pool: PgPool,
}

impl EngagementRepository {
    /// Create a new engagement repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a like. Returns `true` if a row was inserted, `false` if
    /// the user already liked the issue.
    pub async fn insert_like(&self, issue_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO issue_likes (issue_id, user_id) VALUES ($1, $2) \
             ON CONFLICT (issue_id, user_id) DO NOTHING",
        )
        .bind(issue_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert like", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a like. Returns `true` if a row was deleted, `false` if
    /// the user had no like to remove.
    pub async fn delete_like(&self, issue_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM issue_likes WHERE issue_id = $1 AND user_id = $2")
            .bind(issue_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete like", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Check whether a user currently likes an issue.
    pub async fn is_liked(&self, issue_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM issue_likes WHERE issue_id = $1 AND user_id = $2)",
        )
        .bind(issue_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check like", e))?;
        Ok(exists)
    }

    /// Authoritative like count for an issue.
    pub async fn count_for_issue(&self, issue_id: Uuid) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM issue_likes WHERE issue_id = $1")
            .bind(issue_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count likes", e))?;
        Ok(count as u64)
    }

    /// Like counts for a batch of issues. Issues without likes are
    /// absent from the result.
    pub async fn counts_for_issues(&self, issue_ids: &[Uuid]) -> AppResult<Vec<(Uuid, i64)>> {
        sqlx::query_as(
            "SELECT issue_id, COUNT(*) FROM issue_likes \
             WHERE issue_id = ANY($1) GROUP BY issue_id",
        )
        .bind(issue_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to batch-count likes", e))
    }

    /// Of the given issues, return the IDs the user currently likes.
    pub async fn liked_subset(&self, user_id: Uuid, issue_ids: &[Uuid]) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar(
            "SELECT issue_id FROM issue_likes WHERE user_id = $1 AND issue_id = ANY($2)",
        )
        .bind(user_id)
        .bind(issue_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load liked subset", e))
    }
}
