//! TLV wire codec and packet model for Named Data Networking.
//!
//! This crate provides the representation every other crate in the
//! workspace builds on: [`block::Block`], the recursive TLV element type
//! that [`name::Name`], [`packet::Interest`], and [`packet::Data`] are
//! encoded onto and parsed from, plus the per-packet side-channel tags
//! consumed by a Face implementation.

pub mod block;
pub mod buffer;
pub mod control;
pub mod encoder;
pub mod error;
pub mod estimator;
pub mod metrics;
pub mod name;
pub mod packet;
pub mod tag;
pub mod tlv;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub use block::Block;
pub use name::{Name, NameComponent};
pub use packet::{Data, Interest, MetaInfo, Selectors, SignatureInfo};
pub use tag::{CachePolicy, PitToken, Tag, TagHost};
pub use tlv::{ContentType, SignatureType};
