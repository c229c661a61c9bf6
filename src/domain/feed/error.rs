#[derive(Debug, thiserror::Error)]
pub enum FeedParseError {
    #[error("malformed feed: {0}")]
    Malformed(String),
}
