use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

const USER_AGENT: &str = concat!("tpl-event-monitor/", env!("CARGO_PKG_VERSION"));

/// A failed feed request, with the HTTP status when the server answered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (url: {url})")]
pub struct FetchError {
    pub message: String,
    pub url: String,
    pub status: Option<u16>,
    pub status_text: Option<String>,
}

impl FetchError {
    pub fn network(url: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            url: url.to_string(),
            status: None,
            status_text: None,
        }
    }

    pub fn http(url: &str, status: StatusCode) -> Self {
        let status_text = status.canonical_reason().map(str::to_string);
        Self {
            message: format!(
                "HTTP {} {}",
                status.as_u16(),
                status_text.as_deref().unwrap_or("Unknown")
            ),
            url: url.to_string(),
            status: Some(status.as_u16()),
            status_text,
        }
    }
}

/// Retrieves the raw bytes of one feed page.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .gzip(true)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        tracing::debug!(url = %url, "Fetching feed page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::network(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "Feed request failed");
            return Err(FetchError::http(url, status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::network(url, e.to_string()))?;

        tracing::debug!(url = %url, bytes = body.len(), "Fetched feed page");

        Ok(body.to_vec())
    }
}
