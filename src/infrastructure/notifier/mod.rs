pub mod smtp;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::str::FromStr;

use crate::domain::digest::format::escape_html;
use crate::domain::digest::Digest;

pub use smtp::SmtpNotifier;

/// What a run asks to be delivered. At most one per run.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Digest(Digest),
    Failure(ErrorReport),
}

/// Details of a run that failed as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub message: String,
    pub occurred_at: DateTime<Utc>,
    pub environment: String,
    pub http_status: Option<String>,
    pub url: Option<String>,
    pub public_ip: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("invalid email address: {0}")]
    Address(String),
    #[error("could not build email: {0}")]
    Message(String),
    #[error("SMTP delivery failed: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmtpTls {
    #[default]
    StartTls,
    Tls,
    None,
}

impl FromStr for SmtpTls {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "starttls" => Ok(Self::StartTls),
            "tls" | "ssl" => Ok(Self::Tls),
            "none" | "plain" => Ok(Self::None),
            other => Err(format!("unknown SMTP TLS mode '{}'", other)),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

impl Notification {
    /// Subject line and HTML body of the email.
    pub fn render(&self) -> (String, String) {
        match self {
            Notification::Digest(digest) => (digest.subject.clone(), digest.html_body.clone()),
            Notification::Failure(report) => (
                format!("TPL Event Monitor Error ({})", report.environment),
                render_error_report(report),
            ),
        }
    }
}

fn render_error_report(report: &ErrorReport) -> String {
    let mut body = String::from(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head>\
         <body style=\"font-family: sans-serif;\"><h1>TPL Event Monitor run failed</h1><table>",
    );

    let occurred_at = report.occurred_at.format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let rows = [
        ("Error", Some(report.message.as_str())),
        ("Time", Some(occurred_at.as_str())),
        ("Environment", Some(report.environment.as_str())),
        ("HTTP status", report.http_status.as_deref()),
        ("URL", report.url.as_deref()),
        ("Public IP", report.public_ip.as_deref()),
    ];

    for (label, value) in rows {
        if let Some(value) = value {
            let _ = write!(
                body,
                "<tr><th align=\"left\">{}</th><td>{}</td></tr>",
                label,
                escape_html(value)
            );
        }
    }

    body.push_str("</table></body></html>");
    body
}
