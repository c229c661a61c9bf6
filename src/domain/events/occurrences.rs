use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::model::{EventOccurrence, VendorAttribute};

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%A, %B %d, %Y",
    "%a, %b %d, %Y",
    "%a %b %d %Y",
];

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

const TIME_FORMATS: &[&str] = &["%I:%M %p", "%H:%M:%S", "%H:%M"];

/// Role a vendor attribute plays in an event's schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleRole {
    Date,
    StartTime,
    EndTime,
}

impl ScheduleRole {
    /// Classify an attribute name. Case, `_`, `-` and spaces are ignored.
    pub fn from_attribute_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "eventdate" | "eventdates" | "date" | "dates" | "startdate" => Some(Self::Date),
            "eventstarttime" | "eventstarttimes" | "starttime" | "eventtime" => {
                Some(Self::StartTime)
            }
            "eventendtime" | "eventendtimes" | "endtime" => Some(Self::EndTime),
            _ => None,
        }
    }
}

/// Schedule values of one item, bucketed by role in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleAttributes {
    pub dates: Vec<String>,
    pub start_times: Vec<String>,
    pub end_times: Vec<String>,
}

impl ScheduleAttributes {
    pub fn from_attributes(attributes: &[VendorAttribute]) -> Self {
        let mut schedule = Self::default();

        for attribute in attributes {
            let value = attribute.value.trim();
            if value.is_empty() {
                continue;
            }

            match ScheduleRole::from_attribute_name(&attribute.name) {
                Some(ScheduleRole::Date) => schedule.dates.push(value.to_string()),
                Some(ScheduleRole::StartTime) => schedule.start_times.push(value.to_string()),
                Some(ScheduleRole::EndTime) => schedule.end_times.push(value.to_string()),
                None => {}
            }
        }

        schedule
    }

    fn start_time_for(&self, index: usize) -> Option<&str> {
        self.start_times
            .get(index)
            .or_else(|| self.start_times.first())
            .map(String::as_str)
    }

    fn end_time_for(&self, index: usize) -> Option<&str> {
        self.end_times
            .get(index)
            .or_else(|| self.end_times.first())
            .map(String::as_str)
    }
}

/// Extract the sorted occurrences of an item from its vendor attributes.
///
/// A date that cannot be parsed is skipped with a warning; the other dates of
/// the same item are kept.
pub fn extract_occurrences(attributes: &[VendorAttribute]) -> Vec<EventOccurrence> {
    let schedule = ScheduleAttributes::from_attributes(attributes);

    let mut occurrences: Vec<EventOccurrence> = schedule
        .dates
        .iter()
        .enumerate()
        .filter_map(|(index, date)| {
            let start_time = schedule.start_time_for(index);

            let start = match combine(date, start_time) {
                Some(start) => start,
                None => {
                    tracing::warn!(
                        date = %date,
                        start_time = start_time.unwrap_or(""),
                        "Skipping unparseable event date"
                    );
                    return None;
                }
            };

            let end_time = schedule.end_time_for(index).and_then(|raw| {
                let parsed = parse_time(raw);
                if parsed.is_none() {
                    tracing::warn!(end_time = %raw, "Ignoring unparseable event end time");
                }
                parsed
            });

            Some(EventOccurrence { start, end_time })
        })
        .collect();

    occurrences.sort_by_key(|occurrence| occurrence.start);
    occurrences
}

/// A start time attribute wins over a time embedded in the date value; with
/// neither, the occurrence starts at midnight.
fn combine(date: &str, start_time: Option<&str>) -> Option<NaiveDateTime> {
    let (date, embedded_time) = parse_date_time(date)?;
    let time = match start_time {
        Some(raw) => parse_time(raw)?,
        None => match embedded_time {
            Some(time) => time,
            None => NaiveTime::from_hms_opt(0, 0, 0)?,
        },
    };
    Some(date.and_time(time))
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_date_time(raw).map(|(date, _)| date)
}

/// Parse a date value, keeping the time of day when the value carries one.
pub fn parse_date_time(raw: &str) -> Option<(NaiveDate, Option<NaiveTime>)> {
    let raw = raw.trim();

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .map(|date| (date, None))
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|date_time| (date_time.date(), Some(date_time.time())))
        })
}

pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let normalized = normalize_meridiem(raw.trim());

    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(&normalized, format).ok())
}

/// Rewrite `10am`, `10:30 p.m.` and similar into `10:00 AM` / `10:30 PM`.
fn normalize_meridiem(raw: &str) -> String {
    let pattern =
        regex::Regex::new(r"(?i)^(\d{1,2})(?::(\d{2}))?\s*([ap])\.?\s*m\.?$").unwrap();

    match pattern.captures(raw) {
        Some(captures) => {
            let hour = &captures[1];
            let minute = captures.get(2).map_or("00", |m| m.as_str());
            let meridiem = if captures[3].eq_ignore_ascii_case("a") {
                "AM"
            } else {
                "PM"
            };
            format!("{}:{} {}", hour, minute, meridiem)
        }
        None => raw.to_string(),
    }
}
