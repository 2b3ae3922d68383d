//! Error types for the TLV codec and packet model.

use thiserror::Error;

/// All possible errors that can occur while encoding, decoding, or
/// manipulating NDN packets.
#[derive(Error, Debug)]
pub enum Error {
    /// The input ended before a complete TLV element could be read.
    ///
    /// Streaming decoders should treat this as "need more bytes", not as
    /// a malformed packet.
    #[error("truncated input: {0}")]
    TruncatedInput(String),

    /// A declared length does not fit in, or does not exactly consume,
    /// the available input.
    #[error("bad length: {0}")]
    BadLength(String),

    /// Sub-elements did not pack exactly into a parent's value octets, or
    /// were emitted out of the order mandated for their packet type.
    #[error("bad structure: {0}")]
    BadStructure(String),

    /// An element of unknown type was encountered where the NDN TLV
    /// criticality rule (type < 32, or odd type) marks it critical.
    #[error("critical unknown element: type {0}")]
    CriticalUnknownElement(u64),

    /// A TLV type did not match what the caller expected.
    #[error("unexpected TLV type: expected {expected}, got {actual}")]
    UnexpectedType { expected: u32, actual: u32 },

    /// A required TLV element was missing.
    #[error("missing element: {0}")]
    MissingElement(&'static str),

    /// `full_name()` was requested on a Data that has never been encoded.
    #[error("data has not been signed/encoded; full name is undefined")]
    NotSigned,

    /// A signature type did not match what a verifier expected.
    #[error("signature type mismatch: expected {expected}, got {actual}")]
    SignatureTypeMismatch { expected: u8, actual: u8 },

    /// Generic TLV-level error not covered by a more specific variant.
    #[error("TLV error: {0}")]
    Tlv(String),
}

pub type Result<T> = std::result::Result<T, Error>;
