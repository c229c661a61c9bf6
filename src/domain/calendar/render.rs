use std::fmt::Write;

use super::model::{Calendar, CalendarEntry, EventView};
use crate::domain::digest::format::{escape_html, format_time, plain_excerpt};

const STYLE: &str = "body{font-family:sans-serif;max-width:52rem;margin:2rem auto;padding:0 1rem;color:#222}\
h2{border-bottom:1px solid #ccc;padding-bottom:.25rem;margin-top:2rem}\
.event{margin:.75rem 0}.when{color:#555;font-variant-numeric:tabular-nums}\
.feed{color:#777;font-size:.85rem}";

pub fn render_calendar(calendar: &Calendar) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>TPL Events</title><style>{}</style></head><body><h1>TPL Events</h1>",
        STYLE
    );

    if calendar.days.is_empty() && calendar.undated.is_empty() {
        html.push_str("<p>No upcoming events.</p>");
    }

    for day in &calendar.days {
        let _ = write!(
            html,
            "<section><h2>{}</h2>",
            day.date.format("%A, %B %-d, %Y")
        );
        for entry in &day.entries {
            write_entry(&mut html, entry);
        }
        html.push_str("</section>");
    }

    if !calendar.undated.is_empty() {
        html.push_str("<section><h2>Date to be announced</h2>");
        for event in &calendar.undated {
            write_event(&mut html, None, event);
        }
        html.push_str("</section>");
    }

    html.push_str("</body></html>");
    html
}

fn write_entry(html: &mut String, entry: &CalendarEntry) {
    let start = entry.occurrence.start.time();
    let when = match entry.occurrence.end_time {
        Some(end) => format!("{} – {}", format_time(start), format_time(end)),
        None if chrono::NaiveTime::from_hms_opt(0, 0, 0) == Some(start) => "All day".to_string(),
        None => format_time(start),
    };
    write_event(html, Some(&when), &entry.event);
}

fn write_event(html: &mut String, when: Option<&str>, event: &EventView) {
    html.push_str("<div class=\"event\">");
    if let Some(when) = when {
        let _ = write!(html, "<span class=\"when\">{}</span> ", escape_html(when));
    }
    let _ = write!(
        html,
        "<a href=\"{}\">{}</a> <span class=\"feed\">{}</span>",
        escape_html(&event.link),
        escape_html(&event.title),
        escape_html(&event.feed_name)
    );
    if let Some(description) = event.description.as_deref() {
        let excerpt = plain_excerpt(description);
        if !excerpt.is_empty() {
            let _ = write!(html, "<p>{}</p>", escape_html(&excerpt));
        }
    }
    html.push_str("</div>");
}
