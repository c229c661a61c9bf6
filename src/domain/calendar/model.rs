use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::events::{EventOccurrence, PersistedEvent};

/// An active event as exposed by the JSON API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventView {
    pub title: String,
    pub link: String,
    pub feed_name: String,
    pub description: Option<String>,
    pub occurrences: Vec<EventOccurrence>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl From<PersistedEvent> for EventView {
    fn from(event: PersistedEvent) -> Self {
        Self {
            title: event.title,
            link: event.link,
            feed_name: event.feed_name,
            description: event.description,
            occurrences: event.occurrences,
            first_seen: event.first_seen,
            last_seen: event.last_seen,
        }
    }
}

/// One occurrence of an event placed on a calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEntry {
    pub occurrence: EventOccurrence,
    pub event: EventView,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub entries: Vec<CalendarEntry>,
}

/// Active events laid out by day, undated events last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Calendar {
    pub days: Vec<CalendarDay>,
    pub undated: Vec<EventView>,
}

impl Calendar {
    pub fn from_events(events: Vec<EventView>) -> Self {
        let mut entries: Vec<CalendarEntry> = Vec::new();
        let mut undated = Vec::new();

        for event in events {
            if event.occurrences.is_empty() {
                undated.push(event);
                continue;
            }
            for occurrence in &event.occurrences {
                entries.push(CalendarEntry {
                    occurrence: *occurrence,
                    event: event.clone(),
                });
            }
        }

        entries.sort_by(|a, b| {
            a.occurrence
                .start
                .cmp(&b.occurrence.start)
                .then_with(|| a.event.feed_name.cmp(&b.event.feed_name))
                .then_with(|| a.event.title.cmp(&b.event.title))
        });

        let mut days: Vec<CalendarDay> = Vec::new();
        for entry in entries {
            let date = entry.occurrence.start.date();
            match days.last_mut() {
                Some(day) if day.date == date => day.entries.push(entry),
                _ => days.push(CalendarDay {
                    date,
                    entries: vec![entry],
                }),
            }
        }

        Self { days, undated }
    }
}
