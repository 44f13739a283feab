//! Comment repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use civicwatch_core::error::{AppError, ErrorKind};
use civicwatch_core::result::AppResult;
use civicwatch_core::types::pagination::{PageRequest, PageResponse};
use civicwatch_entity::comment::model::{Comment, CreateComment};

/// Repository for comment thread operations.
#[derive(Debug, Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    /// Create a new comment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a comment by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Comment>> {
        sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find comment", e))
    }

    /// List an issue's thread in append order (oldest first), paginated.
    pub async fn find_by_issue(
        &self,
        issue_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Comment>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE issue_id = $1")
            .bind(issue_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count comments", e)
            })?;

        let comments = sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE issue_id = $1 \
             ORDER BY created_at ASC, id ASC LIMIT $2 OFFSET $3",
        )
        .bind(issue_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list comments", e))?;

        Ok(PageResponse::new(
            comments,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Authoritative comment count for an issue.
    pub async fn count_for_issue(&self, issue_id: Uuid) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE issue_id = $1")
            .bind(issue_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count comments", e)
            })?;
        Ok(count as u64)
    }

    /// Comment counts for a batch of issues. Issues without comments are
    /// absent from the result.
    pub async fn counts_for_issues(&self, issue_ids: &[Uuid]) -> AppResult<Vec<(Uuid, i64)>> {
        sqlx::query_as(
            "SELECT issue_id, COUNT(*) FROM comments \
             WHERE issue_id = ANY($1) GROUP BY issue_id",
        )
        .bind(issue_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to batch-count comments", e))
    }

    /// Append a comment to an issue's thread.
    pub async fn create(&self, data: &CreateComment) -> AppResult<Comment> {
        sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (issue_id, author_id, author_full_name, author_avatar_url, body) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING *",
        )
        .bind(data.issue_id)
        .bind(data.author_id)
        .bind(&data.author_full_name)
        .bind(&data.author_avatar_url)
        .bind(&data.body)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("comments_issue_id_fkey") =>
            {
                AppError::not_found(format!("Issue {} not found", data.issue_id))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create comment", e),
        })
    }

    /// Replace a comment's body.
    pub async fn update_body(&self, comment_id: Uuid, body: &str) -> AppResult<Comment> {
        sqlx::query_as::<_, Comment>(
            "UPDATE comments SET body = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(comment_id)
        .bind(body)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update comment", e))?
        .ok_or_else(|| AppError::not_found(format!("Comment {comment_id} not found")))
    }

    /// Delete a comment by ID.
    pub async fn delete(&self, comment_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete comment", e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Refresh the denormalized author snapshot on all of a user's comments.
    pub async fn refresh_author_snapshot(
        &self,
        author_id: Uuid,
        full_name: &str,
        avatar_url: Option<&str>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE comments SET author_full_name = $2, author_avatar_url = $3 \
             WHERE author_id = $1",
        )
        .bind(author_id)
        .bind(full_name)
        .bind(avatar_url)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to refresh author snapshot", e)
        })?;
        Ok(result.rows_affected())
    }
}
