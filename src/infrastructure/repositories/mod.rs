pub mod event_repository;
#[cfg(test)]
pub mod memory_event_repository;
pub mod pg_event_repository;

pub use event_repository::{EventRepository, KeyMode, ReconciliationTx};
#[cfg(test)]
pub use memory_event_repository::InMemoryEventRepository;
pub use pg_event_repository::PgEventRepository;
