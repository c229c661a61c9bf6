use std::sync::Arc;
use url::Url;

use super::parser::parse_feed;
use crate::domain::events::FeedItem;
use crate::infrastructure::fetcher::FeedFetcher;

/// Number of items the library returns per feed page.
pub const PAGE_SIZE: usize = 10;

/// Highest offset ever requested for a single feed.
pub const MAX_OFFSET: usize = 1000;

const OFFSET_PARAM: &str = "start";

/// Walks a paginated feed and concatenates its pages.
pub struct Paginator {
    fetcher: Arc<dyn FeedFetcher>,
    page_size: usize,
    max_offset: usize,
}

impl Paginator {
    pub fn new(fetcher: Arc<dyn FeedFetcher>) -> Self {
        Self {
            fetcher,
            page_size: PAGE_SIZE,
            max_offset: MAX_OFFSET,
        }
    }

    /// Fetch every page of the feed at `base_url`.
    ///
    /// Never fails: a fetch or parse failure ends pagination and the items
    /// accumulated so far are returned.
    pub async fn fetch_all(&self, base_url: &str) -> Vec<FeedItem> {
        let mut items = Vec::new();
        let mut offset = 0;

        loop {
            let url = match page_url(base_url, offset) {
                Ok(url) => url,
                Err(e) => {
                    tracing::error!(url = %base_url, error = %e, "Invalid feed URL");
                    break;
                }
            };

            let body = match self.fetcher.fetch(&url).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(
                        url = %url,
                        offset,
                        status = ?e.status,
                        error = %e,
                        kept = items.len(),
                        "Feed fetch failed, keeping items fetched so far"
                    );
                    break;
                }
            };

            if body.iter().all(u8::is_ascii_whitespace) {
                tracing::debug!(url = %url, offset, "Empty feed page, stopping");
                break;
            }

            let page = match parse_feed(&body) {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(url = %url, offset, error = %e, "Unparseable feed page, stopping");
                    break;
                }
            };

            let page_len = page.len();
            if page_len == 0 {
                break;
            }

            items.extend(page);

            if page_len < self.page_size {
                break;
            }

            offset += self.page_size;
            if offset > self.max_offset {
                tracing::warn!(
                    url = %base_url,
                    offset,
                    max_offset = self.max_offset,
                    "Feed pagination exceeded safety ceiling, stopping"
                );
                break;
            }
        }

        tracing::info!(url = %base_url, items = items.len(), "Fetched feed");
        items
    }
}

/// The URL of the page starting at `offset`.
pub fn page_url(base_url: &str, offset: usize) -> Result<String, url::ParseError> {
    let mut url = Url::parse(base_url)?;

    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != OFFSET_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair(OFFSET_PARAM, &offset.to_string());

    Ok(url.to_string())
}
