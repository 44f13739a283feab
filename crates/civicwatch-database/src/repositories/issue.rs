//! Issue repository implementation.
//!
//! Includes the proximity query used for duplicate detection. Distance
//! is computed with the haversine formula directly in SQL, so no
//! geospatial extension is required.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use civicwatch_core::error::{AppError, ErrorKind};
use civicwatch_core::result::AppResult;
use civicwatch_core::types::geo::GeoPoint;
use civicwatch_core::types::pagination::{PageRequest, PageResponse};
use civicwatch_entity::issue::model::CreateIssue;
use civicwatch_entity::issue::{Issue, IssueStatus};

/// An issue row annotated with its distance from a query point.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct NearbyIssue {
    /// The issue itself.
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub issue: Issue,
    /// Great-circle distance from the query point, in meters.
    pub distance_meters: f64,
}

/// An issue row annotated with its like cardinality.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct RankedIssue {
    /// The issue itself.
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub issue: Issue,
    /// Number of distinct users who like this issue.
    pub like_count: i64,
}

/// Optional filters for issue listing.
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    /// Restrict to a lifecycle status.
    pub status: Option<IssueStatus>,
    /// Restrict to a category.
    pub category: Option<String>,
    /// Restrict to a department.
    pub department_id: Option<Uuid>,
}

/// Repository for issue CRUD and query operations.
#[derive(Debug, Clone)]
pub struct IssueRepository {
    pool: PgPool,
}

impl IssueRepository {
    /// Create a new issue repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an issue by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Issue>> {
        sqlx::query_as::<_, Issue>("SELECT * FROM issues WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find issue by id", e)
            })
    }

    /// List issues with optional filters, newest first.
    pub async fn find_all(
        &self,
        filter: &IssueFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Issue>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM issues \
             WHERE ($1::issue_status IS NULL OR status = $1) \
               AND ($2::text IS NULL OR category = $2) \
               AND ($3::uuid IS NULL OR department_id = $3)",
        )
        .bind(filter.status)
        .bind(&filter.category)
        .bind(filter.department_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count issues", e))?;

        let issues = sqlx::query_as::<_, Issue>(
            "SELECT * FROM issues \
             WHERE ($1::issue_status IS NULL OR status = $1) \
               AND ($2::text IS NULL OR category = $2) \
               AND ($3::uuid IS NULL OR department_id = $3) \
             ORDER BY created_at DESC LIMIT $4 OFFSET $5",
        )
        .bind(filter.status)
        .bind(&filter.category)
        .bind(filter.department_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list issues", e))?;

        Ok(PageResponse::new(
            issues,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// List issues reported by a specific user, newest first.
    pub async fn find_by_reporter(
        &self,
        reporter_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Issue>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM issues WHERE reporter_id = $1")
            .bind(reporter_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count issues by reporter", e)
            })?;

        let issues = sqlx::query_as::<_, Issue>(
            "SELECT * FROM issues WHERE reporter_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(reporter_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list issues by reporter", e)
        })?;

        Ok(PageResponse::new(
            issues,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// List all issues that carry a location, for map rendering.
    pub async fn find_all_located(&self) -> AppResult<Vec<Issue>> {
        sqlx::query_as::<_, Issue>(
            "SELECT * FROM issues \
             WHERE latitude IS NOT NULL AND longitude IS NOT NULL \
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list located issues", e))
    }

    /// Find open issues within `radius_meters` of a point, nearest first.
    ///
    /// Issues without a location never match, and resolved or rejected
    /// issues are not duplicate candidates. `exclude_issue_id` lets the
    /// caller omit the issue being reported from its own results.
    pub async fn find_nearby(
        &self,
        point: &GeoPoint,
        radius_meters: f64,
        limit: u32,
        exclude_issue_id: Option<Uuid>,
    ) -> AppResult<Vec<NearbyIssue>> {
        sqlx::query_as::<_, NearbyIssue>(
            "SELECT * FROM ( \
                 SELECT i.*, \
                        2.0 * 6371000.0 * asin(sqrt( \
                            power(sin(radians(i.latitude - $1) / 2.0), 2) + \
                            cos(radians($1)) * cos(radians(i.latitude)) * \
                            power(sin(radians(i.longitude - $2) / 2.0), 2) \
                        )) AS distance_meters \
                 FROM issues i \
                 WHERE i.latitude IS NOT NULL AND i.longitude IS NOT NULL \
                   AND i.status NOT IN ('resolved', 'rejected') \
                   AND ($4::uuid IS NULL OR i.id <> $4) \
             ) nearby \
             WHERE distance_meters <= $3 \
             ORDER BY distance_meters ASC, created_at ASC \
             LIMIT $5",
        )
        .bind(point.latitude)
        .bind(point.longitude)
        .bind(radius_meters)
        .bind(exclude_issue_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find nearby issues", e))
    }

    /// Top issues by like cardinality reported since `since`.
    pub async fn find_trending(
        &self,
        since: DateTime<Utc>,
        limit: u32,
    ) -> AppResult<Vec<RankedIssue>> {
        sqlx::query_as::<_, RankedIssue>(
            "SELECT i.*, COUNT(l.user_id) AS like_count \
             FROM issues i \
             LEFT JOIN issue_likes l ON l.issue_id = i.id \
             WHERE i.created_at >= $1 \
             GROUP BY i.id \
             ORDER BY COUNT(l.user_id) DESC, i.created_at DESC \
             LIMIT $2",
        )
        .bind(since)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find trending issues", e))
    }

    /// Create a new issue.
    pub async fn create(&self, data: &CreateIssue) -> AppResult<Issue> {
        sqlx::query_as::<_, Issue>(
            "INSERT INTO issues (reporter_id, reporter_full_name, reporter_avatar_url, \
                                 title, description, category, latitude, longitude, \
                                 address, photo_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING *",
        )
        .bind(data.reporter_id)
        .bind(&data.reporter_full_name)
        .bind(&data.reporter_avatar_url)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.category)
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(&data.address)
        .bind(&data.photo_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create issue", e))
    }

    /// Update an issue's lifecycle status.
    pub async fn update_status(&self, issue_id: Uuid, status: IssueStatus) -> AppResult<Issue> {
        sqlx::query_as::<_, Issue>(
            "UPDATE issues SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(issue_id)
        .bind(&status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update issue status", e))?
        .ok_or_else(|| AppError::not_found(format!("Issue {issue_id} not found")))
    }

    /// Assign or clear an issue's department. `None` clears the assignment.
    pub async fn assign_department(
        &self,
        issue_id: Uuid,
        department_id: Option<Uuid>,
    ) -> AppResult<Issue> {
        sqlx::query_as::<_, Issue>(
            "UPDATE issues SET department_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(issue_id)
        .bind(department_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to assign department", e))?
        .ok_or_else(|| AppError::not_found(format!("Issue {issue_id} not found")))
    }

    /// Refresh the denormalized reporter snapshot on all of a user's issues.
    pub async fn refresh_reporter_snapshot(
        &self,
        reporter_id: Uuid,
        full_name: &str,
        avatar_url: Option<&str>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE issues SET reporter_full_name = $2, reporter_avatar_url = $3 \
             WHERE reporter_id = $1",
        )
        .bind(reporter_id)
        .bind(full_name)
        .bind(avatar_url)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to refresh reporter snapshot", e)
        })?;
        Ok(result.rows_affected())
    }

    /// Delete an issue by ID.
    pub async fn delete(&self, issue_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM issues WHERE id = $1")
            .bind(issue_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete issue", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Count issues grouped by lifecycle status.
    pub async fn count_by_status(&self) -> AppResult<Vec<(IssueStatus, i64)>> {
        sqlx::query_as::<_, (IssueStatus, i64)>(
            "SELECT status, COUNT(*) FROM issues GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count issues by status", e)
        })
    }

    /// Count issues grouped by category. Empty categories group together.
    pub async fn count_by_category(&self) -> AppResult<Vec<(String, i64)>> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT category, COUNT(*) FROM issues GROUP BY category ORDER BY COUNT(*) DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count issues by category", e)
        })
    }

    /// Count issues grouped by assigned department. Unassigned issues are
    /// reported under a `NULL` department ID.
    pub async fn count_by_department(&self) -> AppResult<Vec<(Option<Uuid>, i64)>> {
        sqlx::query_as::<_, (Option<Uuid>, i64)>(
            "SELECT department_id, COUNT(*) FROM issues GROUP BY department_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count issues by department", e)
        })
    }

    /// Count total issues.
    pub async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM issues")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count issues", e))?;
        Ok(count as u64)
    }
}
