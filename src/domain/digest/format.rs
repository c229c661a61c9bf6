use chrono::NaiveTime;
use html2text::from_read;

use crate::domain::events::EventOccurrence;

const EXCERPT_CHARS: usize = 280;

/// `Tue, Oct 21, 2025 · 10:30 AM – 11:30 AM`. A midnight start without an end
/// time is treated as a date-only occurrence.
pub fn format_occurrence(occurrence: &EventOccurrence) -> String {
    let date = occurrence.start.format("%a, %b %-d, %Y").to_string();
    let start = occurrence.start.time();

    if NaiveTime::from_hms_opt(0, 0, 0) == Some(start) && occurrence.end_time.is_none() {
        return date;
    }

    match occurrence.end_time {
        Some(end) => format!("{} · {} – {}", date, format_time(start), format_time(end)),
        None => format!("{} · {}", date, format_time(start)),
    }
}

pub fn format_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Plain-text rendition of an HTML description, whitespace collapsed and
/// shortened to a digest-sized excerpt.
pub fn plain_excerpt(html: &str) -> String {
    let plain_text = from_read(html.as_bytes(), usize::MAX);

    let whitespace_pattern = regex::Regex::new(r"\s+").unwrap();
    let normalized = whitespace_pattern.replace_all(&plain_text, " ");
    let normalized = normalized.trim();

    if normalized.chars().count() <= EXCERPT_CHARS {
        return normalized.to_string();
    }

    let cut: String = normalized.chars().take(EXCERPT_CHARS).collect();
    format!("{}…", cut.trim_end())
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
