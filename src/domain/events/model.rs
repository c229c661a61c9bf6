use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::occurrences::extract_occurrences;

/// One `name`/`value` pair from the vendor (`tpl:`) namespace of a feed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorAttribute {
    pub name: String,
    pub value: String,
}

impl VendorAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An entry of a parsed feed page, before reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub attributes: Vec<VendorAttribute>,
}

/// A concrete start date-time of an event, plus the time of day it ends.
///
/// The end time is only used to format a display range; ordering is by `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOccurrence {
    pub start: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
}

/// A feed item that can be identified, ready to be upserted.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub title: String,
    pub link: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub metadata: JsonValue,
    pub occurrences: Vec<EventOccurrence>,
}

impl EventRecord {
    /// Build a record from a feed item.
    ///
    /// Returns `None` when the title or link is missing or blank, since such an
    /// item cannot be identified across passes.
    pub fn from_item(item: &FeedItem) -> Option<Self> {
        let title = non_blank(item.title.as_deref())?;
        let link = non_blank(item.link.as_deref())?;

        Some(Self {
            title,
            link,
            description: item.description.clone(),
            content: item.content.clone(),
            metadata: serde_json::to_value(&item.attributes).unwrap_or(JsonValue::Null),
            occurrences: extract_occurrences(&item.attributes),
        })
    }

    pub fn first_occurrence(&self) -> Option<&EventOccurrence> {
        self.occurrences.first()
    }
}

/// A durable row of the `events` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedEvent {
    pub id: Uuid,
    pub title: String,
    pub feed_name: String,
    pub link: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub metadata: JsonValue,
    pub occurrences: Vec<EventOccurrence>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub is_active: bool,
}

impl PersistedEvent {
    pub fn first_occurrence(&self) -> Option<&EventOccurrence> {
        self.occurrences.first()
    }
}

/// An event record tagged with the feed it was observed in.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEvent {
    pub feed_name: String,
    pub event: EventRecord,
}

/// Display order shared by the digest listing and the calendar:
/// earliest occurrence first (undated last), then feed name, then title.
pub fn display_order(
    a: (Option<&EventOccurrence>, &str, &str),
    b: (Option<&EventOccurrence>, &str, &str),
) -> std::cmp::Ordering {
    let start_a = a.0.map(|o| o.start);
    let start_b = b.0.map(|o| o.start);

    let by_start = match (start_a, start_b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    };

    by_start.then_with(|| a.1.cmp(b.1)).then_with(|| a.2.cmp(b.2))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
