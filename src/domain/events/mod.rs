pub mod model;
pub mod occurrences;

pub use model::{
    display_order, EventOccurrence, EventRecord, FeedEvent, FeedItem, PersistedEvent,
    VendorAttribute,
};
pub use occurrences::{extract_occurrences, ScheduleAttributes, ScheduleRole};
