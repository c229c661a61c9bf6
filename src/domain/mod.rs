pub mod calendar;
pub mod digest;
pub mod events;
pub mod feed;
pub mod reconciliation;
pub mod run;
