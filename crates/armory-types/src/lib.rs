//! Core types and traits for the armory custody service.
//!
//! Record shapes and status vocabularies match the department inventory
//! screens they were lifted from; everything that mutates them lives behind
//! the `LifecycleEngine` in `armory-engine`.

mod dto;
mod event;
mod identity;
mod record;
mod traits;

pub use dto::*;
pub use event::*;
pub use identity::*;
pub use record::*;
pub use traits::*;
