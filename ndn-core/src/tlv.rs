//! NDN-TLV primitives: VarNumber and NonNegativeInteger encoding, and the
//! well-known TLV type/signature/content-type constants.
//!
//! <http://named-data.net/doc/ndn-tlv/>

use crate::error::Error;
use bytes::{Buf, BufMut, BytesMut};

/// Practical limit of network layer packet size. If a packet is longer
/// than this, the library and application MAY drop it.
pub const MAX_NDN_PACKET_SIZE: usize = 8800;

/// Top-level and sub-element TLV type numbers.
pub mod types {
    pub const INTEREST: u32 = 5;
    pub const DATA: u32 = 6;
    pub const NAME: u32 = 7;
    pub const IMPLICIT_SHA256_DIGEST_COMPONENT: u32 = 1;
    pub const GENERIC_NAME_COMPONENT: u32 = 8;
    pub const SELECTORS: u32 = 9;
    pub const NONCE: u32 = 10;
    pub const INTEREST_LIFETIME: u32 = 12;
    pub const MIN_SUFFIX_COMPONENTS: u32 = 13;
    pub const MAX_SUFFIX_COMPONENTS: u32 = 14;
    pub const PUBLISHER_PUBLIC_KEY_LOCATOR: u32 = 15;
    pub const EXCLUDE: u32 = 16;
    pub const CHILD_SELECTOR: u32 = 17;
    pub const MUST_BE_FRESH: u32 = 18;
    pub const ANY: u32 = 19;
    pub const META_INFO: u32 = 20;
    pub const CONTENT: u32 = 21;
    pub const SIGNATURE_INFO: u32 = 22;
    pub const SIGNATURE_VALUE: u32 = 23;
    pub const CONTENT_TYPE: u32 = 24;
    pub const FRESHNESS_PERIOD: u32 = 25;
    pub const FINAL_BLOCK_ID: u32 = 26;
    pub const SIGNATURE_TYPE: u32 = 27;
    pub const KEY_LOCATOR: u32 = 28;
    pub const KEY_DIGEST: u32 = 29;

    /// Marker types for the "naming convention rev2" numbered name
    /// components (`Name::append_version`/`append_segment`/
    /// `append_sequence_number`): a `NonNegativeInteger` value wrapped in
    /// a component whose `tlv_type` itself says what the number means,
    /// rather than an unmarked `GenericNameComponent`.
    pub const SEGMENT_NAME_COMPONENT: u32 = 50;
    pub const BYTE_OFFSET_NAME_COMPONENT: u32 = 52;
    pub const VERSION_NAME_COMPONENT: u32 = 54;
    pub const TIMESTAMP_NAME_COMPONENT: u32 = 56;
    pub const SEQUENCE_NUM_NAME_COMPONENT: u32 = 58;

    /// A TLV type is "critical" (an unrecognized element of this type
    /// must cause decode to fail) if it is less than 32 or odd.
    pub fn is_critical(tlv_type: u32) -> bool {
        tlv_type < 32 || tlv_type % 2 == 1
    }
}

/// `SignatureInfo`'s `SignatureType` field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureType {
    DigestSha256 = 0,
    Sha256WithRsa = 1,
    Sha256WithEcdsa = 3,
}

impl SignatureType {
    pub fn from_u64(value: u64) -> Result<Self, Error> {
        match value {
            0 => Ok(SignatureType::DigestSha256),
            1 => Ok(SignatureType::Sha256WithRsa),
            3 => Ok(SignatureType::Sha256WithEcdsa),
            other => Err(Error::Tlv(format!("unknown signature type {other}"))),
        }
    }
}

/// `MetaInfo`'s `ContentType` field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Blob = 0,
    Link = 1,
    Key = 2,
    Nack = 3,
}

impl ContentType {
    pub fn from_u64(value: u64) -> Result<Self, Error> {
        match value {
            0 => Ok(ContentType::Blob),
            1 => Ok(ContentType::Link),
            2 => Ok(ContentType::Key),
            3 => Ok(ContentType::Nack),
            other => Err(Error::Tlv(format!("unknown content type {other}"))),
        }
    }
}

/// Number of bytes required to encode `number` as a VarNumber.
pub fn size_of_var_number(number: u64) -> usize {
    if number < 0xFD {
        1
    } else if number <= u16::MAX as u64 {
        3
    } else if number <= u32::MAX as u64 {
        5
    } else {
        9
    }
}

/// Appends `number` to `buf` in NDN-TLV VarNumber encoding.
pub fn encode_var_number(buf: &mut BytesMut, number: u64) -> usize {
    if number < 0xFD {
        buf.put_u8(number as u8);
        1
    } else if number <= u16::MAX as u64 {
        buf.put_u8(0xFD);
        buf.put_u16(number as u16);
        3
    } else if number <= u32::MAX as u64 {
        buf.put_u8(0xFE);
        buf.put_u32(number as u32);
        5
    } else {
        buf.put_u8(0xFF);
        buf.put_u64(number);
        9
    }
}

/// Reads a VarNumber from `buf`, advancing it past the bytes consumed.
///
/// Never panics on short input: returns `Error::TruncatedInput` so a
/// streaming decoder can retry after buffering more bytes.
pub fn decode_var_number(buf: &mut impl Buf) -> Result<u64, Error> {
    if !buf.has_remaining() {
        return Err(Error::TruncatedInput("empty buffer reading VarNumber".into()));
    }
    let first = buf.get_u8();
    match first {
        0x00..=0xFC => Ok(first as u64),
        0xFD => {
            if buf.remaining() < 2 {
                return Err(Error::TruncatedInput("VarNumber u16 body truncated".into()));
            }
            Ok(buf.get_u16() as u64)
        }
        0xFE => {
            if buf.remaining() < 4 {
                return Err(Error::TruncatedInput("VarNumber u32 body truncated".into()));
            }
            Ok(buf.get_u32() as u64)
        }
        0xFF => {
            if buf.remaining() < 8 {
                return Err(Error::TruncatedInput("VarNumber u64 body truncated".into()));
            }
            Ok(buf.get_u64())
        }
    }
}

/// Reads a VarNumber and rejects values that do not fit in a u32, as
/// required for TLV *type* fields.
pub fn decode_type(buf: &mut impl Buf) -> Result<u32, Error> {
    let value = decode_var_number(buf)?;
    u32::try_from(value).map_err(|_| Error::BadLength(format!("TLV type {value} exceeds u32")))
}

/// Number of bytes required to encode `value` as a NonNegativeInteger.
pub fn size_of_non_negative_integer(value: u64) -> usize {
    if value <= u8::MAX as u64 {
        1
    } else if value <= u16::MAX as u64 {
        2
    } else if value <= u32::MAX as u64 {
        4
    } else {
        8
    }
}

/// Appends `value` to `buf` as the smallest NonNegativeInteger (1, 2, 4,
/// or 8 octets) that can hold it.
pub fn encode_non_negative_integer(buf: &mut BytesMut, value: u64) -> usize {
    if value <= u8::MAX as u64 {
        buf.put_u8(value as u8);
        1
    } else if value <= u16::MAX as u64 {
        buf.put_u16(value as u16);
        2
    } else if value <= u32::MAX as u64 {
        buf.put_u32(value as u32);
        4
    } else {
        buf.put_u64(value);
        8
    }
}

/// Reads a NonNegativeInteger of exactly `len` octets. `len` must be 1,
/// 2, 4, or 8; any other value is a decode error, per the NDN-TLV spec.
pub fn decode_non_negative_integer(buf: &mut impl Buf, len: usize) -> Result<u64, Error> {
    if buf.remaining() < len {
        return Err(Error::TruncatedInput(format!(
            "NonNegativeInteger needs {len} bytes, {} available",
            buf.remaining()
        )));
    }
    match len {
        1 => Ok(buf.get_u8() as u64),
        2 => Ok(buf.get_u16() as u64),
        4 => Ok(buf.get_u32() as u64),
        8 => Ok(buf.get_u64()),
        other => Err(Error::BadLength(format!(
            "NonNegativeInteger length must be 1, 2, 4, or 8, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn var_number_round_trip_boundaries() {
        for &n in &[0u64, 1, 252, 253, 65535, 65536, u32::MAX as u64, u32::MAX as u64 + 1, u64::MAX] {
            let mut buf = BytesMut::new();
            let written = encode_var_number(&mut buf, n);
            assert_eq!(written, size_of_var_number(n));
            assert_eq!(buf.len(), written);
            let mut bytes: Bytes = buf.freeze();
            let decoded = decode_var_number(&mut bytes).unwrap();
            assert_eq!(decoded, n);
        }
    }

    #[test]
    fn var_number_known_encodings() {
        let mut buf = BytesMut::new();
        encode_var_number(&mut buf, 253);
        assert_eq!(&buf[..], &[0xFD, 0x00, 0xFD]);

        let mut buf = BytesMut::new();
        encode_var_number(&mut buf, 65536);
        assert_eq!(&buf[..], &[0xFE, 0x00, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn var_number_truncated_input_is_an_error_not_a_panic() {
        let mut bytes = Bytes::from_static(&[0xFD, 0x01]);
        assert!(matches!(decode_var_number(&mut bytes), Err(Error::TruncatedInput(_))));
    }

    #[test]
    fn non_negative_integer_rejects_bad_lengths() {
        let mut bytes = Bytes::from_static(&[1, 2, 3]);
        assert!(matches!(
            decode_non_negative_integer(&mut bytes, 3),
            Err(Error::BadLength(_))
        ));
    }

    #[test]
    fn non_negative_integer_smallest_fit() {
        assert_eq!(size_of_non_negative_integer(0), 1);
        assert_eq!(size_of_non_negative_integer(256), 2);
        assert_eq!(size_of_non_negative_integer(70_000), 4);
        assert_eq!(size_of_non_negative_integer(u64::MAX), 8);
    }

    #[test]
    fn criticality_rule() {
        assert!(types::is_critical(1));
        assert!(types::is_critical(31));
        assert!(types::is_critical(21)); // Content: odd
        assert!(types::is_critical(20)); // MetaInfo: even but < 32
        assert!(!types::is_critical(32)); // even and >= 32: non-critical
    }
}
