use std::sync::Arc;

use super::error::RunError;
use crate::domain::digest::{DigestComposer, FeedChanges};
use crate::domain::events::{display_order, FeedEvent};
use crate::domain::feed::Paginator;
use crate::domain::reconciliation::{Pruner, Reconciler};
use crate::infrastructure::config::FeedConfig;
use crate::infrastructure::notifier::{Notification, Notifier};
use crate::infrastructure::repositories::EventRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedReport {
    pub feed_name: String,
    pub current: usize,
    pub new_titles: Vec<String>,
    pub removed_titles: Vec<String>,
}

impl FeedReport {
    pub fn has_changes(&self) -> bool {
        !self.new_titles.is_empty() || !self.removed_titles.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFeed {
    pub feed_name: String,
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    FirstRun,
    Changes,
    None,
}

/// Summary of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// `None` when pruning failed.
    pub pruned: Option<u64>,
    pub feeds: Vec<FeedReport>,
    pub failed_feeds: Vec<FailedFeed>,
    pub notification: NotificationKind,
}

pub struct RunOrchestrator {
    feeds: Vec<FeedConfig>,
    repo: Arc<dyn EventRepository>,
    paginator: Paginator,
    reconciler: Reconciler,
    pruner: Pruner,
    composer: DigestComposer,
    notifier: Arc<dyn Notifier>,
}

impl RunOrchestrator {
    pub fn new(
        feeds: Vec<FeedConfig>,
        repo: Arc<dyn EventRepository>,
        paginator: Paginator,
        pruner: Pruner,
        composer: DigestComposer,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            feeds,
            reconciler: Reconciler::new(repo.clone()),
            repo,
            paginator,
            pruner,
            composer,
            notifier,
        }
    }

    pub async fn run(&self) -> Result<RunReport, RunError> {
        self.repo
            .ping()
            .await
            .map_err(|e| RunError::StorageUnavailable(e.to_string()))?;

        let pruned = match self.pruner.prune().await {
            Ok(deleted) => Some(deleted),
            Err(e) => {
                tracing::error!(error = %e, "Pruning failed, continuing with reconciliation");
                None
            }
        };

        // Nothing active before any feed is reconciled.
        let first_run = self
            .repo
            .find_active(None)
            .await
            .map_err(|e| RunError::StorageUnavailable(e.to_string()))?
            .is_empty();

        let mut feeds = Vec::new();
        let mut failed_feeds = Vec::new();
        let mut listing: Vec<FeedEvent> = Vec::new();

        for feed in self.feeds.iter().filter(|f| f.enabled) {
            tracing::info!(feed = %feed.name, url = %feed.url, "Processing feed");

            let items = self.paginator.fetch_all(&feed.url).await;

            match self.reconciler.reconcile(&feed.name, &items).await {
                Ok(outcome) => {
                    feeds.push(FeedReport {
                        feed_name: feed.name.clone(),
                        current: outcome.events.len(),
                        new_titles: outcome.new_titles,
                        removed_titles: outcome.removed_titles,
                    });
                    listing.extend(outcome.events.into_iter().map(|event| FeedEvent {
                        feed_name: feed.name.clone(),
                        event,
                    }));
                }
                Err(e) => {
                    tracing::error!(feed = %feed.name, error = %e, "Feed reconciliation failed");
                    failed_feeds.push(FailedFeed {
                        feed_name: feed.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        listing.sort_by(|a, b| {
            display_order(
                (a.event.first_occurrence(), &a.feed_name, &a.event.title),
                (b.event.first_occurrence(), &b.feed_name, &b.event.title),
            )
        });

        let any_new = feeds.iter().any(|f| !f.new_titles.is_empty());

        let notification = if first_run && any_new {
            self.notifier
                .send(&Notification::Digest(self.composer.first_run(&listing)))
                .await?;
            NotificationKind::FirstRun
        } else if feeds.iter().any(FeedReport::has_changes) {
            let changes: Vec<FeedChanges> = feeds
                .iter()
                .filter(|f| f.has_changes())
                .map(|f| FeedChanges {
                    feed_name: f.feed_name.clone(),
                    new_titles: f.new_titles.clone(),
                    removed_titles: f.removed_titles.clone(),
                })
                .collect();

            self.notifier
                .send(&Notification::Digest(self.composer.changes(&changes, &listing)))
                .await?;
            NotificationKind::Changes
        } else {
            tracing::info!("No changes detected, not sending a notification");
            NotificationKind::None
        };

        let report = RunReport {
            pruned,
            feeds,
            failed_feeds,
            notification,
        };

        tracing::info!(
            feeds = report.feeds.len(),
            failed = report.failed_feeds.len(),
            notification = ?report.notification,
            "Run complete"
        );

        Ok(report)
    }
}
