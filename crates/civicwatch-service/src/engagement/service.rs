//! Like toggle service.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use civicwatch_core::error::AppError;
use civicwatch_core::events::{DomainEvent, EngagementEvent, EventBus, EventPayload};
use civicwatch_core::result::AppResult;
use civicwatch_database::repositories::engagement::EngagementRepository;
use civicwatch_database::repositories::issue::IssueRepository;
use civicwatch_entity::notification::model::CreateNotification;

use crate::context::RequestContext;
use crate::notification::NotificationService;

/// Outcome of a toggle or state query.
///
/// `like_count` is always the authoritative set cardinality, recomputed
/// after the mutation, never an increment applied client-side.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EngagementState {
    /// Whether the caller currently likes the issue.
    pub liked: bool,
    /// Distinct users liking the issue.
    pub like_count: u64,
}

/// Service for the idempotent like toggle and its read paths.
#[derive(Debug, Clone)]
pub struct EngagementService {
    engagement_repo: Arc<EngagementRepository>,
    issue_repo: Arc<IssueRepository>,
    notifications: Arc<NotificationService>,
    events: EventBus,
}

impl EngagementService {
    /// Creates a new engagement service.
    pub fn new(
        engagement_repo: Arc<EngagementRepository>,
        issue_repo: Arc<IssueRepository>,
        notifications: Arc<NotificationService>,
        events: EventBus,
    ) -> Self {
        Self {
            engagement_repo,
            issue_repo,
            notifications,
            events,
        }
    }

    /// Toggle the caller's like on an issue.
    ///
    /// Delete-first: if a row existed the caller is unliking, otherwise
    /// insert (`ON CONFLICT DO NOTHING`). Both halves are no-ops when a
    /// concurrent request already reached the caller's intended end
    /// state, so a retry or a constraint race never surfaces an error.
    pub async fn toggle(&self, ctx: &RequestContext, issue_id: Uuid) -> AppResult<EngagementState> {
        let issue = self
            .issue_repo
            .find_by_id(issue_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Issue {issue_id} not found")))?;

        let removed = self.engagement_repo.delete_like(issue_id, ctx.user_id).await?;
        let liked = if removed {
            false
        } else {
            self.engagement_repo.insert_like(issue_id, ctx.user_id).await?;
            true
        };

        let like_count = self.engagement_repo.count_for_issue(issue_id).await?;

        info!(
            issue_id = %issue_id,
            user_id = %ctx.user_id,
            liked,
            like_count,
            "Like toggled"
        );

        self.events.publish(DomainEvent::new(
            Some(ctx.user_id),
            EventPayload::Engagement(EngagementEvent::Toggled {
                issue_id,
                user_id: ctx.user_id,
                liked,
                like_count,
            }),
        ));

        if liked && issue.reporter_id != ctx.user_id {
            let result = self
                .notifications
                .notify(CreateNotification {
                    user_id: issue.reporter_id,
                    event_type: "issue_liked".to_string(),
                    title: "Your issue received a like".to_string(),
                    message: format!("Someone liked \"{}\"", issue.title),
                    issue_id: Some(issue_id),
                    actor_id: Some(ctx.user_id),
                })
                .await;
            if let Err(e) = result {
                warn!(issue_id = %issue_id, error = %e, "Like notification failed");
            }
        }

        Ok(EngagementState { liked, like_count })
    }

    /// Like state and count for one issue as seen by `user_id`.
    ///
    /// `None` user (anonymous feed views) always reads as not liked.
    pub async fn state_for(
        &self,
        issue_id: Uuid,
        user_id: Option<Uuid>,
    ) -> AppResult<EngagementState> {
        let like_count = self.engagement_repo.count_for_issue(issue_id).await?;
        let liked = match user_id {
            Some(uid) => self.engagement_repo.is_liked(issue_id, uid).await?,
            None => false,
        };
        Ok(EngagementState { liked, like_count })
    }

    /// Authoritative like count for an issue.
    pub async fn count(&self, issue_id: Uuid) -> AppResult<u64> {
        self.engagement_repo.count_for_issue(issue_id).await
    }
}
