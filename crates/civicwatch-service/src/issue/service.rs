//! Issue lifecycle service.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use civicwatch_core::error::AppError;
use civicwatch_core::events::{DomainEvent, EventBus, EventPayload, IssueEvent};
use civicwatch_core::result::AppResult;
use civicwatch_core::types::geo::GeoPoint;
use civicwatch_core::types::pagination::{PageRequest, PageResponse};
use civicwatch_database::repositories::comment::CommentRepository;
use civicwatch_database::repositories::department::DepartmentRepository;
use civicwatch_database::repositories::engagement::EngagementRepository;
use civicwatch_database::repositories::issue::{
    IssueFilter, IssueRepository, NearbyIssue,
};
use civicwatch_database::repositories::user::UserRepository;
use civicwatch_entity::issue::model::CreateIssue;
use civicwatch_entity::issue::{Issue, IssueStatus};
use civicwatch_entity::notification::model::CreateNotification;

use crate::context::RequestContext;
use crate::notification::NotificationService;
use crate::suggest::SuggestGateway;

use super::proximity::ProximityService;

/// Longest accepted issue title, in characters.
const MAX_TITLE_CHARS: usize = 200;

/// Payload for submitting a new issue.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIssueRequest {
    /// Short issue title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Caller-chosen category; when absent the classifier suggestion is
    /// applied, and an empty category is acceptable.
    pub category: Option<String>,
    /// Pinned latitude (must be paired with longitude).
    pub latitude: Option<f64>,
    /// Pinned longitude (must be paired with latitude).
    pub longitude: Option<f64>,
    /// Human-readable address.
    pub address: Option<String>,
    /// Previously uploaded photo URL.
    pub photo_url: Option<String>,
}

/// Result of a submission: the stored issue plus the advisory duplicate
/// candidates found near its pinned point.
#[derive(Debug, Clone, Serialize)]
pub struct IssueSubmission {
    /// The stored issue.
    pub issue: Issue,
    /// Open issues near the pinned point, nearest first. Advisory only.
    pub duplicate_candidates: Vec<NearbyIssue>,
}

/// An issue decorated with engagement aggregates for feed and detail views.
#[derive(Debug, Clone, Serialize)]
pub struct IssueWithStats {
    /// The issue itself.
    #[serde(flatten)]
    pub issue: Issue,
    /// Distinct users liking the issue.
    pub like_count: i64,
    /// Comments on the issue.
    pub comment_count: i64,
    /// Whether the viewing user likes the issue. Always false for
    /// anonymous views.
    pub liked_by_me: bool,
}

/// Service for issue submission, listing, and lifecycle transitions.
#[derive(Debug, Clone)]
pub struct IssueService {
    issue_repo: Arc<IssueRepository>,
    engagement_repo: Arc<EngagementRepository>,
    comment_repo: Arc<CommentRepository>,
    user_repo: Arc<UserRepository>,
    department_repo: Arc<DepartmentRepository>,
    proximity: Arc<ProximityService>,
    suggest: Arc<SuggestGateway>,
    notifications: Arc<NotificationService>,
    events: EventBus,
}

impl IssueService {
    /// Creates a new issue service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        issue_repo: Arc<IssueRepository>,
        engagement_repo: Arc<EngagementRepository>,
        comment_repo: Arc<CommentRepository>,
        user_repo: Arc<UserRepository>,
        department_repo: Arc<DepartmentRepository>,
        proximity: Arc<ProximityService>,
        suggest: Arc<SuggestGateway>,
        notifications: Arc<NotificationService>,
        events: EventBus,
    ) -> Self {
        Self {
            issue_repo,
            engagement_repo,
            comment_repo,
            user_repo,
            department_repo,
            proximity,
            suggest,
            notifications,
            events,
        }
    }

    /// Submit a new issue.
    ///
    /// Runs the advisory duplicate check against the pinned point and
    /// returns the candidates alongside the stored issue; the check
    /// never blocks submission. When the caller provided no category,
    /// the classifier suggestion is applied if one is available.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        request: CreateIssueRequest,
    ) -> AppResult<IssueSubmission> {
        let (title, description) = validate_text(&request.title, &request.description)?;
        let location = location_from(request.latitude, request.longitude)?;

        let reporter = self
            .user_repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::authentication("User no longer exists"))?;

        let category = match request.category.map(|c| c.trim().to_string()) {
            Some(c) if !c.is_empty() => c,
            _ => self.suggest.suggest(&description).await.unwrap_or_default(),
        };

        let duplicate_candidates = self.proximity.duplicate_candidates(location).await;

        let issue = self
            .issue_repo
            .create(&CreateIssue {
                reporter_id: reporter.id,
                reporter_full_name: reporter.full_name.clone(),
                reporter_avatar_url: reporter.avatar_url.clone(),
                title,
                description,
                category,
                latitude: location.map(|p| p.latitude),
                longitude: location.map(|p| p.longitude),
                address: request.address,
                photo_url: request.photo_url,
            })
            .await?;

        info!(
            issue_id = %issue.id,
            reporter_id = %reporter.id,
            nearby = duplicate_candidates.len(),
            "Issue created"
        );

        self.events.publish(DomainEvent::new(
            Some(ctx.user_id),
            EventPayload::Issue(IssueEvent::Created {
                issue_id: issue.id,
                issue: serde_json::to_value(&issue)?,
            }),
        ));

        Ok(IssueSubmission {
            issue,
            duplicate_candidates,
        })
    }

    /// One issue with its engagement aggregates.
    pub async fn detail(&self, issue_id: Uuid, viewer: Option<Uuid>) -> AppResult<IssueWithStats> {
        let issue = self
            .issue_repo
            .find_by_id(issue_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Issue {issue_id} not found")))?;

        let like_count = self.engagement_repo.count_for_issue(issue_id).await? as i64;
        let comment_count = self.comment_repo.count_for_issue(issue_id).await? as i64;
        let liked_by_me = match viewer {
            Some(uid) => self.engagement_repo.is_liked(issue_id, uid).await?,
            None => false,
        };

        Ok(IssueWithStats {
            issue,
            like_count,
            comment_count,
            liked_by_me,
        })
    }

    /// Paginated feed, newest first, decorated with per-issue aggregates.
    pub async fn feed(
        &self,
        filter: &IssueFilter,
        page: &PageRequest,
        viewer: Option<Uuid>,
    ) -> AppResult<PageResponse<IssueWithStats>> {
        let issues = self.issue_repo.find_all(filter, page).await?;
        self.decorate_page(issues, viewer).await
    }

    /// The caller's own issues, newest first.
    pub async fn mine(
        &self,
        ctx: &RequestContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<IssueWithStats>> {
        let issues = self.issue_repo.find_by_reporter(ctx.user_id, page).await?;
        self.decorate_page(issues, Some(ctx.user_id)).await
    }

    /// All located issues, for map rendering.
    pub async fn map_points(&self) -> AppResult<Vec<Issue>> {
        self.issue_repo.find_all_located().await
    }

    /// Open issues near a point, nearest first.
    pub async fn nearby(&self, latitude: f64, longitude: f64) -> AppResult<Vec<NearbyIssue>> {
        self.proximity.find_nearby(latitude, longitude, None).await
    }

    /// Move an issue through its lifecycle. Officials and admins only.
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        issue_id: Uuid,
        status: IssueStatus,
    ) -> AppResult<Issue> {
        ctx.require_staff()?;

        let existing = self
            .issue_repo
            .find_by_id(issue_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Issue {issue_id} not found")))?;

        if existing.status == status {
            return Ok(existing);
        }

        let issue = self.issue_repo.update_status(issue_id, status).await?;

        info!(
            issue_id = %issue_id,
            from = %existing.status,
            to = %status,
            actor = %ctx.user_id,
            "Issue status updated"
        );

        self.events.publish(DomainEvent::new(
            Some(ctx.user_id),
            EventPayload::Issue(IssueEvent::Updated {
                issue_id,
                issue: serde_json::to_value(&issue)?,
            }),
        ));

        let result = self
            .notifications
            .notify(CreateNotification {
                user_id: issue.reporter_id,
                event_type: "issue_status_changed".to_string(),
                title: "Issue status updated".to_string(),
                message: format!(
                    "Your issue \"{}\" is now {}",
                    issue.title,
                    status_label(status)
                ),
                issue_id: Some(issue_id),
                actor_id: Some(ctx.user_id),
            })
            .await;
        if let Err(e) = result {
            warn!(issue_id = %issue_id, error = %e, "Status notification failed");
        }

        Ok(issue)
    }

    /// Assign or clear an issue's department. Officials and admins only;
    /// refused once the issue is resolved or rejected.
    pub async fn assign_department(
        &self,
        ctx: &RequestContext,
        issue_id: Uuid,
        department_id: Option<Uuid>,
    ) -> AppResult<Issue> {
        ctx.require_staff()?;

        let existing = self
            .issue_repo
            .find_by_id(issue_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Issue {issue_id} not found")))?;

        if existing.status.is_terminal() {
            return Err(AppError::conflict(
                "Cannot reassign a resolved or rejected issue",
            ));
        }

        if let Some(dept_id) = department_id
            && self.department_repo.find_by_id(dept_id).await?.is_none()
        {
            return Err(AppError::not_found(format!(
                "Department {dept_id} not found"
            )));
        }

        let issue = self
            .issue_repo
            .assign_department(issue_id, department_id)
            .await?;

        info!(
            issue_id = %issue_id,
            department_id = ?department_id,
            actor = %ctx.user_id,
            "Issue department assignment updated"
        );

        self.events.publish(DomainEvent::new(
            Some(ctx.user_id),
            EventPayload::Issue(IssueEvent::Updated {
                issue_id,
                issue: serde_json::to_value(&issue)?,
            }),
        ));

        Ok(issue)
    }

    /// Delete an issue. Reporter-only; admin flows never hard-delete.
    pub async fn delete(&self, ctx: &RequestContext, issue_id: Uuid) -> AppResult<()> {
        let existing = self
            .issue_repo
            .find_by_id(issue_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Issue {issue_id} not found")))?;

        if existing.reporter_id != ctx.user_id {
            return Err(AppError::authorization(
                "Only the reporter can delete an issue",
            ));
        }

        self.issue_repo.delete(issue_id).await?;

        info!(issue_id = %issue_id, reporter_id = %ctx.user_id, "Issue deleted");

        self.events.publish(DomainEvent::new(
            Some(ctx.user_id),
            EventPayload::Issue(IssueEvent::Deleted { issue_id }),
        ));

        Ok(())
    }

    /// Decorate a page of issues with batch-loaded aggregates.
    async fn decorate_page(
        &self,
        page: PageResponse<Issue>,
        viewer: Option<Uuid>,
    ) -> AppResult<PageResponse<IssueWithStats>> {
        let decorated = self.decorate(page.items, viewer).await?;
        Ok(PageResponse::new(
            decorated,
            page.page,
            page.page_size,
            page.total_items,
        ))
    }

    async fn decorate(
        &self,
        issues: Vec<Issue>,
        viewer: Option<Uuid>,
    ) -> AppResult<Vec<IssueWithStats>> {
        if issues.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = issues.iter().map(|i| i.id).collect();

        let like_counts: HashMap<Uuid, i64> = self
            .engagement_repo
            .counts_for_issues(&ids)
            .await?
            .into_iter()
            .collect();
        let comment_counts: HashMap<Uuid, i64> = self
            .comment_repo
            .counts_for_issues(&ids)
            .await?
            .into_iter()
            .collect();
        let liked: HashSet<Uuid> = match viewer {
            Some(uid) => self
                .engagement_repo
                .liked_subset(uid, &ids)
                .await?
                .into_iter()
                .collect(),
            None => HashSet::new(),
        };

        Ok(issues
            .into_iter()
            .map(|issue| IssueWithStats {
                like_count: like_counts.get(&issue.id).copied().unwrap_or(0),
                comment_count: comment_counts.get(&issue.id).copied().unwrap_or(0),
                liked_by_me: liked.contains(&issue.id),
                issue,
            })
            .collect())
    }
}

/// Trim and bound-check the title and description.
fn validate_text(title: &str, description: &str) -> AppResult<(String, String)> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::validation("Title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::validation(format!(
            "Title exceeds {MAX_TITLE_CHARS} characters"
        )));
    }
    let description = description.trim();
    if description.is_empty() {
        return Err(AppError::validation("Description must not be empty"));
    }
    Ok((title.to_string(), description.to_string()))
}

/// Resolve the optional location pair. One coordinate without the other
/// is a validation error; the service never fills in a default point.
fn location_from(latitude: Option<f64>, longitude: Option<f64>) -> AppResult<Option<GeoPoint>> {
    match (latitude, longitude) {
        (Some(lat), Some(lng)) => Ok(Some(GeoPoint::new(lat, lng)?)),
        (None, None) => Ok(None),
        _ => Err(AppError::validation(
            "Latitude and longitude must be provided together",
        )),
    }
}

/// Human-readable status label for notification text.
fn status_label(status: IssueStatus) -> &'static str {
    match status {
        IssueStatus::Pending => "Pending",
        IssueStatus::InProgress => "In Progress",
        IssueStatus::Resolved => "Resolved",
        IssueStatus::Rejected => "Rejected",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_text() {
        let (t, d) = validate_text("  Pothole  ", " Deep pothole on Main St ").unwrap();
        assert_eq!(t, "Pothole");
        assert_eq!(d, "Deep pothole on Main St");

        assert!(validate_text("", "desc").is_err());
        assert!(validate_text("title", "   ").is_err());
        assert!(validate_text(&"t".repeat(MAX_TITLE_CHARS + 1), "desc").is_err());
    }

    #[test]
    fn test_location_pair_guard() {
        assert!(location_from(None, None).unwrap().is_none());
        assert!(location_from(Some(19.0), Some(72.8)).unwrap().is_some());

        assert!(location_from(Some(19.0), None).is_err());
        assert!(location_from(None, Some(72.8)).is_err());
        assert!(location_from(Some(91.0), Some(0.0)).is_err());
    }

    #[test]
    fn test_status_label() {
        assert_eq!(status_label(IssueStatus::InProgress), "In Progress");
        assert_eq!(status_label(IssueStatus::Resolved), "Resolved");
    }
}
