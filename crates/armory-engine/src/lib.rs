//! Custody lifecycle engine: the sole writer of asset, assignment, handover,
//! and maintenance records.

mod engine;

pub use armory_types::LifecycleError;
pub use engine::{EngineConfig, LifecycleEngine};
