//! Analytics service.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use civicwatch_core::result::AppResult;
use civicwatch_database::repositories::issue::{IssueRepository, RankedIssue};
use civicwatch_database::repositories::user::UserRepository;
use civicwatch_entity::issue::IssueStatus;

use crate::context::RequestContext;

/// Trending looks back this many days.
const TRENDING_WINDOW_DAYS: i64 = 7;
/// Trending returns at most this many issues.
const TRENDING_LIMIT: u32 = 3;

/// Issue count for one lifecycle status.
#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    /// The status.
    pub status: IssueStatus,
    /// Issues currently in that status.
    pub count: i64,
}

/// Issue count for one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    /// The category label. Empty when the issue was filed uncategorized.
    pub category: String,
    /// Issues in that category.
    pub count: i64,
}

/// Issue count for one department assignment.
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentCount {
    /// The department, or `None` for unassigned issues.
    pub department_id: Option<Uuid>,
    /// Issues assigned to that department.
    pub count: i64,
}

/// Admin dashboard aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct AdminSummary {
    /// Total issues ever reported.
    pub total_issues: u64,
    /// Total registered users.
    pub total_users: u64,
    /// Issues per lifecycle status.
    pub by_status: Vec<StatusCount>,
    /// Issues per category, most common first.
    pub by_category: Vec<CategoryCount>,
    /// Issues per department assignment.
    pub by_department: Vec<DepartmentCount>,
}

/// Service for trending and dashboard aggregates.
#[derive(Debug, Clone)]
pub struct AnalyticsService {
    issue_repo: Arc<IssueRepository>,
    user_repo: Arc<UserRepository>,
}

impl AnalyticsService {
    /// Creates a new analytics service.
    pub fn new(issue_repo: Arc<IssueRepository>, user_repo: Arc<UserRepository>) -> Self {
        Self {
            issue_repo,
            user_repo,
        }
    }

    /// Top issues of the last week by like cardinality.
    pub async fn trending(&self) -> AppResult<Vec<RankedIssue>> {
        let since = Utc::now() - Duration::days(TRENDING_WINDOW_DAYS);
        self.issue_repo.find_trending(since, TRENDING_LIMIT).await
    }

    /// Dashboard aggregates. Admin-only.
    pub async fn summary(&self, ctx: &RequestContext) -> AppResult<AdminSummary> {
        ctx.require_admin()?;

        let total_issues = self.issue_repo.count().await?;
        let total_users = self.user_repo.count().await?;

        let by_status = self
            .issue_repo
            .count_by_status()
            .await?
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect();
        let by_category = self
            .issue_repo
            .count_by_category()
            .await?
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect();
        let by_department = self
            .issue_repo
            .count_by_department()
            .await?
            .into_iter()
            .map(|(department_id, count)| DepartmentCount {
                department_id,
                count,
            })
            .collect();

        Ok(AdminSummary {
            total_issues,
            total_users,
            by_status,
            by_category,
            by_department,
        })
    }
}
