use std::fmt::Write;
use std::str::FromStr;

use super::format::{escape_html, format_occurrence, plain_excerpt};
use crate::domain::events::FeedEvent;

const PLAIN_SUBJECT: &str = "TPL Event Updates";
const SUBJECT_LEAD: &str = "TPL Events";

/// A rendered email, ready for the notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubjectStyle {
    /// Counts in the subject line.
    #[default]
    Summary,
    /// A fixed subject line.
    Plain,
}

impl FromStr for SubjectStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "summary" => Ok(Self::Summary),
            "plain" => Ok(Self::Plain),
            other => Err(format!("unknown subject style '{}'", other)),
        }
    }
}

/// New and removed titles of one feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedChanges {
    pub feed_name: String,
    pub new_titles: Vec<String>,
    pub removed_titles: Vec<String>,
}

pub struct DigestComposer {
    style: SubjectStyle,
    prefix: Option<String>,
}

impl DigestComposer {
    pub fn new(style: SubjectStyle, prefix: Option<String>) -> Self {
        Self { style, prefix }
    }

    /// Digest for the first run over a store: the listing only.
    pub fn first_run(&self, listing: &[FeedEvent]) -> Digest {
        let count = listing.len();
        let noun = if count == 1 { "event" } else { "events" };
        let subject = self.subject(format!("{}: now tracking {} {}", SUBJECT_LEAD, count, noun));

        let mut body = String::new();
        open_document(&mut body);
        let _ = write!(body, "<h1>Now tracking {} {}</h1>", count, noun);
        write_listing(&mut body, listing);
        close_document(&mut body);

        Digest {
            subject,
            html_body: body,
        }
    }

    /// Digest for a run with changes: new and removed groups per feed, then
    /// the listing.
    pub fn changes(&self, changes: &[FeedChanges], listing: &[FeedEvent]) -> Digest {
        let new_count: usize = changes.iter().map(|c| c.new_titles.len()).sum();
        let removed_count: usize = changes.iter().map(|c| c.removed_titles.len()).sum();

        let mut counts = Vec::new();
        if new_count > 0 {
            counts.push(format!("{} new", new_count));
        }
        if removed_count > 0 {
            counts.push(format!("{} removed", removed_count));
        }
        let subject = self.subject(format!("{}: {}", SUBJECT_LEAD, counts.join(", ")));

        let mut body = String::new();
        open_document(&mut body);

        if new_count > 0 {
            body.push_str("<h2>New Events</h2>");
            for feed in changes.iter().filter(|c| !c.new_titles.is_empty()) {
                let _ = write!(body, "<h3>{}</h3>", escape_html(&feed.feed_name));
                for title in &feed.new_titles {
                    match listing
                        .iter()
                        .find(|e| e.feed_name == feed.feed_name && &e.event.title == title)
                    {
                        Some(event) => write_event(&mut body, event),
                        None => write_title(&mut body, title),
                    }
                }
            }
        }

        if removed_count > 0 {
            body.push_str("<h2>Removed Events</h2>");
            for feed in changes.iter().filter(|c| !c.removed_titles.is_empty()) {
                let _ = write!(body, "<h3>{}</h3>", escape_html(&feed.feed_name));
                for title in &feed.removed_titles {
                    write_title(&mut body, title);
                }
            }
        }

        body.push_str("<h2>All Current Events</h2>");
        write_listing(&mut body, listing);
        close_document(&mut body);

        Digest {
            subject,
            html_body: body,
        }
    }

    fn subject(&self, summary: String) -> String {
        let subject = match self.style {
            SubjectStyle::Summary => summary,
            SubjectStyle::Plain => PLAIN_SUBJECT.to_string(),
        };

        match self.prefix.as_deref().map(str::trim) {
            Some(prefix) if !prefix.is_empty() => format!("{} {}", prefix, subject),
            _ => subject,
        }
    }
}

fn open_document(body: &mut String) {
    body.push_str(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head>\
         <body style=\"font-family: sans-serif;\">",
    );
}

fn close_document(body: &mut String) {
    body.push_str("</body></html>");
}

fn write_listing(body: &mut String, listing: &[FeedEvent]) {
    if listing.is_empty() {
        body.push_str("<p>No current events.</p>");
        return;
    }
    for event in listing {
        write_event(body, event);
    }
}

fn write_title(body: &mut String, title: &str) {
    let _ = write!(body, "<div class=\"event\"><p><strong>{}</strong></p></div>", escape_html(title));
}

fn write_event(body: &mut String, event: &FeedEvent) {
    let record = &event.event;

    let _ = write!(
        body,
        "<div class=\"event\"><p><a href=\"{}\"><strong>{}</strong></a><br><small>{}</small></p>",
        escape_html(&record.link),
        escape_html(&record.title),
        escape_html(&event.feed_name)
    );

    if !record.occurrences.is_empty() {
        body.push_str("<p>📅 ");
        let dates: Vec<String> = record
            .occurrences
            .iter()
            .map(|o| escape_html(&format_occurrence(o)))
            .collect();
        body.push_str(&dates.join("<br>"));
        body.push_str("</p>");
    }

    if let Some(description) = record.description.as_deref() {
        let excerpt = plain_excerpt(description);
        if !excerpt.is_empty() {
            let _ = write!(body, "<p>{}</p>", escape_html(&excerpt));
        }
    }

    body.push_str("</div>");
}
