//! Asset store trait re-exports and the in-memory implementation.

mod memory;

pub use armory_types::{AssetStore, RecordKind, StoreError};
pub use memory::InMemoryAssetStore;
