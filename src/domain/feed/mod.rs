pub mod error;
pub mod paginator;
pub mod parser;

pub use error::FeedParseError;
pub use paginator::{Paginator, MAX_OFFSET, PAGE_SIZE};
pub use parser::parse_feed;
