pub mod composer;
pub mod format;

pub use composer::{Digest, DigestComposer, FeedChanges, SubjectStyle};
