//! An in-memory Data store with pluggable eviction policies, for use as
//! a forwarder-side or application-side content cache.

pub mod error;
pub mod policy;
pub mod store;

pub use error::StoreError;
pub use policy::{EntryId, EvictionPolicy, Fifo, Lfu, Lru, Persistent};
pub use store::InMemoryStorage;
