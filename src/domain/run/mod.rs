pub mod error;
pub mod service;

pub use error::RunError;
pub use service::{FailedFeed, FeedReport, NotificationKind, RunOrchestrator, RunReport};
