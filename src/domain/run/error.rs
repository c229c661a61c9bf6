use crate::infrastructure::notifier::NotifyError;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("notification failed: {0}")]
    Notification(#[from] NotifyError),
}
