//! Notification service.
//!
//! Creation is the write path used by the other services; everything a
//! notification triggers downstream (realtime fan-out to the
//! `user:{id}` channel) hangs off the published domain event.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use civicwatch_core::events::{DomainEvent, EventBus, EventPayload, NotificationEvent};
use civicwatch_core::result::AppResult;
use civicwatch_core::types::pagination::{PageRequest, PageResponse};
use civicwatch_database::repositories::notification::NotificationRepository;
use civicwatch_entity::notification::model::{CreateNotification, Notification};

use crate::context::RequestContext;

/// Service for creating and reading user notifications.
#[derive(Debug, Clone)]
pub struct NotificationService {
    notification_repo: Arc<NotificationRepository>,
    events: EventBus,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(notification_repo: Arc<NotificationRepository>, events: EventBus) -> Self {
        Self {
            notification_repo,
            events,
        }
    }

    /// Create a notification and announce it on the event bus.
    pub async fn notify(&self, data: CreateNotification) -> AppResult<Notification> {
        let notification = self.notification_repo.create(&data).await?;

        self.events.publish(DomainEvent::new(
            data.actor_id,
            EventPayload::Notification(NotificationEvent::Created {
                notification_id: notification.id,
                user_id: notification.user_id,
                notification: serde_json::to_value(&notification)?,
            }),
        ));

        Ok(notification)
    }

    /// List the caller's notifications, newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        self.notification_repo.find_by_user(ctx.user_id, page).await
    }

    /// Number of unread notifications for the caller.
    pub async fn unread_count(&self, ctx: &RequestContext) -> AppResult<i64> {
        self.notification_repo.count_unread(ctx.user_id).await
    }

    /// Mark a single notification as read. Scoped to the caller, so one
    /// user can never consume another's notification.
    pub async fn mark_read(&self, ctx: &RequestContext, notification_id: Uuid) -> AppResult<()> {
        self.notification_repo
            .mark_read(notification_id, ctx.user_id)
            .await
    }

    /// Mark every unread notification for the caller as read.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> AppResult<i64> {
        let marked = self.notification_repo.mark_all_read(ctx.user_id).await?;
        if marked > 0 {
            info!(user_id = %ctx.user_id, marked, "Marked all notifications read");
        }
        Ok(marked)
    }
}
