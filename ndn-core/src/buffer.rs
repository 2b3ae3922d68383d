//! The shared, immutable byte buffer backing a materialized [`crate::block::Block`].
//!
//! Per the design notes, sharing is modeled with a reference-counted byte
//! buffer rather than raw shared pointers into a single allocation: once
//! an [`Encoder`](crate::encoder::Encoder) freezes its working buffer into
//! a `Buffer`, every `Block` built from a sub-range of it clones cheaply
//! (an `Arc`/refcount bump, not a copy) and the bytes themselves are never
//! mutated again. Re-encoding a Block always produces a new `Buffer`.

/// A cheaply-clonable, immutable run of bytes.
///
/// `bytes::Bytes` already provides exactly the semantics the spec asks
/// for: atomic refcounting, O(1) `clone()`, and O(1) sub-range `slice()`
/// without copying. We use it directly instead of hand-rolling `Rc<[u8]>`
/// + offset pairs, since every sub-`Block` view is naturally expressed as
/// a `Bytes::slice(..)` of its parent's wire.
pub type Buffer = bytes::Bytes;
