//! Error type for content-store operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store is at capacity ({0}) and its eviction policy could not free a slot")]
    AtCapacity(usize),

    #[error("data packet is not signed/encoded; cannot compute its full name")]
    Unsigned(#[from] ndn_core::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
