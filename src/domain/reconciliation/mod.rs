pub mod error;
pub mod pruner;
pub mod service;

pub use error::ReconcileError;
pub use pruner::Pruner;
pub use service::{ReconcileOutcome, Reconciler};
