use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::events::{EventRecord, PersistedEvent};
use crate::error::AppResult;

/// What identifies an event across passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyMode {
    /// `(title, feed_name)`; passes over different feeds never touch each other.
    #[default]
    PerFeed,
    /// The title alone, over every active row. Only meaningful with a single feed.
    TitleOnly,
}

impl FromStr for KeyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "per_feed" | "per-feed" => Ok(Self::PerFeed),
            "title_only" | "title-only" => Ok(Self::TitleOnly),
            other => Err(format!("unknown key mode '{}'", other)),
        }
    }
}

impl fmt::Display for KeyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerFeed => f.write_str("per_feed"),
            Self::TitleOnly => f.write_str("title_only"),
        }
    }
}

/// Durable store of observed events.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Verify the store is reachable.
    async fn ping(&self) -> AppResult<()>;

    /// Open the transaction in which one feed is reconciled.
    async fn begin_pass(&self, feed_name: &str) -> AppResult<Box<dyn ReconciliationTx>>;

    /// Delete inactive events last seen before `older_than`.
    async fn prune_inactive(&self, older_than: DateTime<Utc>) -> AppResult<u64>;

    /// Active events, optionally restricted to one feed, in display order.
    async fn find_active(&self, feed_name: Option<&str>) -> AppResult<Vec<PersistedEvent>>;
}

/// One feed's reconciliation pass.
///
/// Nothing is visible to other readers until [`ReconciliationTx::commit`];
/// dropping the handle without committing discards every change.
#[async_trait]
pub trait ReconciliationTx: Send {
    async fn active_titles(&mut self) -> AppResult<HashSet<String>>;

    async fn upsert(&mut self, record: &EventRecord, seen_at: DateTime<Utc>) -> AppResult<()>;

    async fn deactivate(&mut self, titles: &[String]) -> AppResult<u64>;

    async fn commit(self: Box<Self>) -> AppResult<()>;
}
