use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::event_repository::{EventRepository, KeyMode, ReconciliationTx};
use crate::domain::events::{display_order, EventRecord, PersistedEvent};
use crate::error::{AppError, AppResult};

#[derive(Default)]
struct Faults {
    unavailable: AtomicBool,
    prune_fails: AtomicBool,
    failing_title: parking_lot::Mutex<Option<String>>,
}

/// Test double with the same pass semantics as the Postgres store.
#[derive(Clone, Default)]
pub struct InMemoryEventRepository {
    rows: Arc<Mutex<Vec<PersistedEvent>>>,
    faults: Arc<Faults>,
    key_mode: KeyMode,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_mode(key_mode: KeyMode) -> Self {
        Self {
            key_mode,
            ..Self::default()
        }
    }

    pub async fn insert(&self, event: PersistedEvent) {
        self.rows.lock().await.push(event);
    }

    pub async fn all(&self) -> Vec<PersistedEvent> {
        self.rows.lock().await.clone()
    }

    pub async fn get(&self, feed_name: &str, title: &str) -> Option<PersistedEvent> {
        self.rows
            .lock()
            .await
            .iter()
            .find(|e| e.feed_name == feed_name && e.title == title)
            .cloned()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.faults.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn fail_prune(&self, fails: bool) {
        self.faults.prune_fails.store(fails, Ordering::SeqCst);
    }

    /// Make every upsert of `title` fail.
    pub fn fail_upsert_of(&self, title: &str) {
        *self.faults.failing_title.lock() = Some(title.to_string());
    }

    fn check_available(&self) -> AppResult<()> {
        if self.faults.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Internal("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn ping(&self) -> AppResult<()> {
        self.check_available()
    }

    async fn begin_pass(&self, feed_name: &str) -> AppResult<Box<dyn ReconciliationTx>> {
        self.check_available()?;
        let staged = self.rows.lock().await.clone();

        Ok(Box::new(InMemoryTx {
            target: self.rows.clone(),
            staged,
            feed_name: feed_name.to_string(),
            key_mode: self.key_mode,
            faults: self.faults.clone(),
        }))
    }

    async fn prune_inactive(&self, older_than: DateTime<Utc>) -> AppResult<u64> {
        self.check_available()?;
        if self.faults.prune_fails.load(Ordering::SeqCst) {
            return Err(AppError::Internal("prune failed".to_string()));
        }

        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|e| e.is_active || e.last_seen >= older_than);
        Ok((before - rows.len()) as u64)
    }

    async fn find_active(&self, feed_name: Option<&str>) -> AppResult<Vec<PersistedEvent>> {
        self.check_available()?;

        let mut active: Vec<PersistedEvent> = self
            .rows
            .lock()
            .await
            .iter()
            .filter(|e| e.is_active && feed_name.map_or(true, |f| e.feed_name == f))
            .cloned()
            .collect();

        active.sort_by(|a, b| {
            display_order(
                (a.first_occurrence(), &a.feed_name, &a.title),
                (b.first_occurrence(), &b.feed_name, &b.title),
            )
        });
        Ok(active)
    }
}

struct InMemoryTx {
    target: Arc<Mutex<Vec<PersistedEvent>>>,
    staged: Vec<PersistedEvent>,
    feed_name: String,
    key_mode: KeyMode,
    faults: Arc<Faults>,
}

impl InMemoryTx {
    fn in_scope(&self, event: &PersistedEvent) -> bool {
        match self.key_mode {
            KeyMode::PerFeed => event.feed_name == self.feed_name,
            KeyMode::TitleOnly => true,
        }
    }
}

#[async_trait]
impl ReconciliationTx for InMemoryTx {
    async fn active_titles(&mut self) -> AppResult<HashSet<String>> {
        Ok(self
            .staged
            .iter()
            .filter(|e| e.is_active && self.in_scope(e))
            .map(|e| e.title.clone())
            .collect())
    }

    async fn upsert(&mut self, record: &EventRecord, seen_at: DateTime<Utc>) -> AppResult<()> {
        if self.faults.failing_title.lock().as_deref() == Some(record.title.as_str()) {
            return Err(AppError::Internal(format!("upsert of '{}' failed", record.title)));
        }

        let key_mode = self.key_mode;
        let feed_name = self.feed_name.clone();
        let target = self
            .staged
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                e.title == record.title
                    && (key_mode == KeyMode::TitleOnly || e.feed_name == feed_name)
            })
            .max_by_key(|(_, e)| (e.feed_name == feed_name, e.is_active, e.last_seen))
            .map(|(index, _)| index);

        if key_mode == KeyMode::TitleOnly {
            if let Some(target) = target {
                for (index, event) in self.staged.iter_mut().enumerate() {
                    if index != target && event.title == record.title {
                        event.is_active = false;
                    }
                }
            }
        }

        match target.map(|index| &mut self.staged[index]) {
            Some(event) => {
                event.feed_name = feed_name;
                event.link = record.link.clone();
                event.description = record.description.clone();
                event.content = record.content.clone();
                event.metadata = record.metadata.clone();
                event.occurrences = record.occurrences.clone();
                event.last_seen = seen_at;
                event.is_active = true;
            }
            None => self.staged.push(PersistedEvent {
                id: Uuid::new_v4(),
                title: record.title.clone(),
                feed_name,
                link: record.link.clone(),
                description: record.description.clone(),
                content: record.content.clone(),
                metadata: record.metadata.clone(),
                occurrences: record.occurrences.clone(),
                first_seen: seen_at,
                last_seen: seen_at,
                is_active: true,
            }),
        }

        Ok(())
    }

    async fn deactivate(&mut self, titles: &[String]) -> AppResult<u64> {
        let mut count = 0;
        let key_mode = self.key_mode;
        let feed_name = self.feed_name.clone();

        for event in self.staged.iter_mut() {
            let in_scope = key_mode == KeyMode::TitleOnly || event.feed_name == feed_name;
            if in_scope && event.is_active && titles.contains(&event.title) {
                event.is_active = false;
                count += 1;
            }
        }

        Ok(count)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        *self.target.lock().await = self.staged;
        Ok(())
    }
}
