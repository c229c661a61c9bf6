use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::EventRepository;

/// Deletes events that have been inactive for longer than the retention window.
pub struct Pruner {
    repo: Arc<dyn EventRepository>,
    retention_days: i64,
}

impl Pruner {
    pub fn new(repo: Arc<dyn EventRepository>, retention_days: i64) -> Self {
        Self {
            repo,
            retention_days,
        }
    }

    pub async fn prune(&self) -> AppResult<u64> {
        let cutoff = Duration::try_days(self.retention_days)
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "retention window of {} days is out of range",
                    self.retention_days
                ))
            })?;
        let deleted = self.repo.prune_inactive(cutoff).await?;

        tracing::info!(
            deleted,
            retention_days = self.retention_days,
            "Pruned inactive events"
        );

        Ok(deleted)
    }
}
