use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("storage error while reconciling feed '{feed}': {message}")]
    Storage { feed: String, message: String },
}

impl ReconcileError {
    pub fn storage(feed: &str, err: AppError) -> Self {
        Self::Storage {
            feed: feed.to_string(),
            message: err.to_string(),
        }
    }
}
