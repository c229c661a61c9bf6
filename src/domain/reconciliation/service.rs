use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;

use super::error::ReconcileError;
use crate::domain::events::{EventRecord, FeedItem};
use crate::infrastructure::repositories::EventRepository;

/// Partition of one feed pass against the stored active set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileOutcome {
    /// Titles absent from the baseline, in feed order, each reported once.
    pub new_titles: Vec<String>,
    /// Baseline titles that did not reappear, sorted.
    pub removed_titles: Vec<String>,
    /// Every identifiable item of the pass, last occurrence of a title wins.
    pub events: Vec<EventRecord>,
}

impl ReconcileOutcome {
    pub fn has_changes(&self) -> bool {
        !self.new_titles.is_empty() || !self.removed_titles.is_empty()
    }
}

pub struct Reconciler {
    repo: Arc<dyn EventRepository>,
}

impl Reconciler {
    pub fn new(repo: Arc<dyn EventRepository>) -> Self {
        Self { repo }
    }

    /// Reconcile the current items of `feed_name` with stored state in one
    /// transaction. On error nothing of this pass is persisted.
    pub async fn reconcile(
        &self,
        feed_name: &str,
        items: &[FeedItem],
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let storage = |e| ReconcileError::storage(feed_name, e);
        let seen_at = Utc::now();

        let mut tx = self.repo.begin_pass(feed_name).await.map_err(storage)?;
        let baseline = tx.active_titles().await.map_err(storage)?;

        let mut outcome = ReconcileOutcome::default();
        let mut processed: HashSet<String> = HashSet::new();

        for item in items {
            let Some(record) = EventRecord::from_item(item) else {
                tracing::warn!(
                    feed = %feed_name,
                    title = item.title.as_deref().unwrap_or(""),
                    "Skipping feed item without title or link"
                );
                continue;
            };

            tx.upsert(&record, seen_at).await.map_err(storage)?;

            if processed.insert(record.title.clone()) {
                if !baseline.contains(&record.title) {
                    outcome.new_titles.push(record.title.clone());
                }
                outcome.events.push(record);
            } else {
                tracing::warn!(
                    feed = %feed_name,
                    title = %record.title,
                    "Duplicate title in feed, keeping the later item"
                );
                if let Some(slot) = outcome.events.iter_mut().find(|e| e.title == record.title) {
                    *slot = record;
                }
            }
        }

        let mut removed: Vec<String> = baseline.difference(&processed).cloned().collect();
        removed.sort();

        tx.deactivate(&removed).await.map_err(storage)?;
        tx.commit().await.map_err(storage)?;

        outcome.removed_titles = removed;

        tracing::info!(
            feed = %feed_name,
            items = items.len(),
            current = outcome.events.len(),
            new = outcome.new_titles.len(),
            removed = outcome.removed_titles.len(),
            "Reconciled feed"
        );

        Ok(outcome)
    }
}
