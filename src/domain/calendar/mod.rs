pub mod model;
pub mod render;
pub mod service;

pub use model::{Calendar, CalendarDay, CalendarEntry, EventView};
pub use service::CalendarService;
