//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::{error, info};

use civicwatch_core::config::WorkerConfig;
use civicwatch_core::error::AppError;
use civicwatch_core::result::AppResult;
use civicwatch_database::repositories::notification::NotificationRepository;
use civicwatch_database::repositories::session::SessionRepository;

use crate::jobs::{NotificationCleanup, SessionCleanup};

/// Cron-based scheduler for periodic background tasks.
pub struct WorkerScheduler {
    scheduler: JobScheduler,
}

impl std::fmt::Debug for WorkerScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerScheduler").finish()
    }
}

impl WorkerScheduler {
    /// Registers all maintenance tasks and starts the scheduler.
    pub async fn start(
        config: WorkerConfig,
        notification_repo: Arc<NotificationRepository>,
        session_repo: Arc<SessionRepository>,
    ) -> AppResult<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        let worker = Self { scheduler };
        worker
            .register_notification_cleanup(
                &config.notification_cleanup_cron,
                NotificationCleanup::new(notification_repo, config.notification_retention_days),
            )
            .await?;
        worker
            .register_session_cleanup(
                &config.session_cleanup_cron,
                SessionCleanup::new(session_repo),
            )
            .await?;

        worker
            .scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        info!("Worker scheduler started");
        Ok(worker)
    }

    /// Stops the scheduler. Jobs already mid-run finish on their own.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.scheduler.shutdown().await {
            error!(error = %e, "Worker scheduler shutdown failed");
        } else {
            info!("Worker scheduler shut down");
        }
    }

    async fn register_notification_cleanup(
        &self,
        cron: &str,
        job: NotificationCleanup,
    ) -> AppResult<()> {
        let cron_job = CronJob::new_async(cron, move |_uuid, _lock| {
            let job = job.clone();
            Box::pin(async move {
                job.run().await;
            })
        })
        .map_err(|e| {
            AppError::internal(format!("Failed to create notification_cleanup schedule: {e}"))
        })?;

        self.scheduler.add(cron_job).await.map_err(|e| {
            AppError::internal(format!("Failed to add notification_cleanup schedule: {e}"))
        })?;

        info!(cron, "Registered: notification_cleanup");
        Ok(())
    }

    async fn register_session_cleanup(&self, cron: &str, job: SessionCleanup) -> AppResult<()> {
        let cron_job = CronJob::new_async(cron, move |_uuid, _lock| {
            let job = job.clone();
            Box::pin(async move {
                job.run().await;
            })
        })
        .map_err(|e| {
            AppError::internal(format!("Failed to create session_cleanup schedule: {e}"))
        })?;

        self.scheduler.add(cron_job).await.map_err(|e| {
            AppError::internal(format!("Failed to add session_cleanup schedule: {e}"))
        })?;

        info!(cron, "Registered: session_cleanup");
        Ok(())
    }
}
