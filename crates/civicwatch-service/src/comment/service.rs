//! Comment thread service.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use civicwatch_core::error::AppError;
use civicwatch_core::events::{CommentEvent, DomainEvent, EventBus, EventPayload};
use civicwatch_core::result::AppResult;
use civicwatch_core::types::pagination::{PageRequest, PageResponse};
use civicwatch_database::repositories::comment::CommentRepository;
use civicwatch_database::repositories::issue::IssueRepository;
use civicwatch_database::repositories::user::UserRepository;
use civicwatch_entity::comment::model::{Comment, CreateComment};
use civicwatch_entity::notification::model::CreateNotification;

use crate::context::RequestContext;
use crate::notification::NotificationService;

/// Longest accepted comment body, in characters.
const MAX_BODY_CHARS: usize = 2000;

/// Service for append-ordered comment threads.
#[derive(Debug, Clone)]
pub struct CommentService {
    comment_repo: Arc<CommentRepository>,
    issue_repo: Arc<IssueRepository>,
    user_repo: Arc<UserRepository>,
    notifications: Arc<NotificationService>,
    events: EventBus,
}

impl CommentService {
    /// Creates a new comment service.
    pub fn new(
        comment_repo: Arc<CommentRepository>,
        issue_repo: Arc<IssueRepository>,
        user_repo: Arc<UserRepository>,
        notifications: Arc<NotificationService>,
        events: EventBus,
    ) -> Self {
        Self {
            comment_repo,
            issue_repo,
            user_repo,
            notifications,
            events,
        }
    }

    /// Append a comment to an issue's thread.
    ///
    /// The author's display name and avatar are snapshotted into the
    /// row, so thread rendering needs no join and later profile edits
    /// are applied by an explicit refresh, never implicitly.
    pub async fn post(
        &self,
        ctx: &RequestContext,
        issue_id: Uuid,
        body: &str,
    ) -> AppResult<Comment> {
        let body = validate_body(body)?;

        let issue = self
            .issue_repo
            .find_by_id(issue_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Issue {issue_id} not found")))?;

        let author = self
            .user_repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::authentication("User no longer exists"))?;

        let comment = self
            .comment_repo
            .create(&CreateComment {
                issue_id,
                author_id: author.id,
                author_full_name: author.full_name.clone(),
                author_avatar_url: author.avatar_url.clone(),
                body,
            })
            .await?;

        let comment_count = self.comment_repo.count_for_issue(issue_id).await?;

        info!(issue_id = %issue_id, comment_id = %comment.id, "Comment posted");

        self.events.publish(DomainEvent::new(
            Some(ctx.user_id),
            EventPayload::Comment(CommentEvent::Posted {
                issue_id,
                comment: serde_json::to_value(&comment)?,
                comment_count,
            }),
        ));

        if issue.reporter_id != ctx.user_id {
            let result = self
                .notifications
                .notify(CreateNotification {
                    user_id: issue.reporter_id,
                    event_type: "comment_posted".to_string(),
                    title: "New comment on your issue".to_string(),
                    message: format!("{} commented on \"{}\"", author.full_name, issue.title),
                    issue_id: Some(issue_id),
                    actor_id: Some(ctx.user_id),
                })
                .await;
            if let Err(e) = result {
                warn!(issue_id = %issue_id, error = %e, "Comment notification failed");
            }
        }

        Ok(comment)
    }

    /// Replace a comment's body. Author-only; admins may delete other
    /// users' comments but never edit them.
    pub async fn edit(
        &self,
        ctx: &RequestContext,
        comment_id: Uuid,
        new_body: &str,
    ) -> AppResult<Comment> {
        let new_body = validate_body(new_body)?;

        let existing = self
            .comment_repo
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Comment {comment_id} not found")))?;

        if existing.author_id != ctx.user_id {
            return Err(AppError::authorization("Only the author can edit a comment"));
        }

        let updated = self.comment_repo.update_body(comment_id, &new_body).await?;

        self.events.publish(DomainEvent::new(
            Some(ctx.user_id),
            EventPayload::Comment(CommentEvent::Updated {
                issue_id: updated.issue_id,
                comment: serde_json::to_value(&updated)?,
            }),
        ));

        Ok(updated)
    }

    /// Remove a comment. Author or admin; deleting an id that is already
    /// gone reports success, so client retries converge.
    pub async fn delete(&self, ctx: &RequestContext, comment_id: Uuid) -> AppResult<()> {
        let Some(existing) = self.comment_repo.find_by_id(comment_id).await? else {
            return Ok(());
        };

        if existing.author_id != ctx.user_id && !ctx.is_admin() {
            return Err(AppError::authorization(
                "Only the author or an administrator can delete a comment",
            ));
        }

        self.comment_repo.delete(comment_id).await?;
        let comment_count = self.comment_repo.count_for_issue(existing.issue_id).await?;

        info!(
            issue_id = %existing.issue_id,
            comment_id = %comment_id,
            "Comment deleted"
        );

        self.events.publish(DomainEvent::new(
            Some(ctx.user_id),
            EventPayload::Comment(CommentEvent::Deleted {
                issue_id: existing.issue_id,
                comment_id,
                comment_count,
            }),
        ));

        Ok(())
    }

    /// List an issue's thread oldest-first, paginated.
    pub async fn list(
        &self,
        issue_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Comment>> {
        if self.issue_repo.find_by_id(issue_id).await?.is_none() {
            return Err(AppError::not_found(format!("Issue {issue_id} not found")));
        }
        self.comment_repo.find_by_issue(issue_id, page).await
    }
}

/// Trim and bound-check a comment body.
fn validate_body(body: &str) -> AppResult<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Comment body must not be empty"));
    }
    if trimmed.chars().count() > MAX_BODY_CHARS {
        return Err(AppError::validation(format!(
            "Comment body exceeds {MAX_BODY_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_body() {
        assert_eq!(validate_body("  fix it  ").unwrap(), "fix it");
        assert!(validate_body("   ").is_err());
        assert!(validate_body(&"x".repeat(MAX_BODY_CHARS + 1)).is_err());
    }
}
