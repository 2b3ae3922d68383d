//! `Block`: a recursive, lazily-parsed NDN-TLV element.
//!
//! A `Block` can be in one of three states:
//!
//! - freshly constructed with [`Block::new`], holding only a `tlv_type`
//!   and whatever children are `push_back`-ed onto it;
//! - holding a leaf value directly ([`Block::from_value`]), e.g. a
//!   `Nonce` or `Content` octet string with no further TLV structure;
//! - decoded from the wire via [`Block::decode_from`], sharing a
//!   [`crate::buffer::Buffer`] with every other `Block` decoded from the
//!   same input. Sub-elements of a wire-backed `Block` are not parsed
//!   until [`Block::parse`] is called, so walking past an element whose
//!   contents the caller never inspects (e.g. skipping an unrecognized
//!   non-critical TLV) costs nothing beyond the outer VarNumber reads.
//!
//! Mutating a `Block` (`push_back`, `erase`) invalidates any cached wire
//! bytes; the next [`Block::encode`] rebuilds them from the logical
//! content, following the `Estimator`-then-`Encoder` two-pass pattern.

use bytes::{Buf, Bytes, BytesMut};

use crate::buffer::Buffer;
use crate::encoder::Encoder;
use crate::error::{Error, Result};
use crate::estimator::Estimator;
use crate::tlv;

/// Recursion limit for [`Block::parse`], guarding against maliciously
/// deep TLV nesting driving the decoder into a stack overflow.
pub const MAX_PARSE_DEPTH: usize = 32;

#[derive(Clone)]
struct Wire {
    buffer: Buffer,
    begin: usize,
    end: usize,
    value_begin: usize,
    value_end: usize,
}

#[derive(Clone)]
pub struct Block {
    tlv_type: u32,
    wire: Option<Wire>,
    raw_value: Option<Bytes>,
    sub_elements: Vec<Block>,
    elements_parsed: bool,
}

impl Block {
    /// An empty element of type `tlv_type` with no value and no children.
    pub fn new(tlv_type: u32) -> Self {
        Self {
            tlv_type,
            wire: None,
            raw_value: None,
            sub_elements: Vec::new(),
            elements_parsed: true,
        }
    }

    /// A leaf element holding `value` directly, with no TLV sub-structure.
    pub fn from_value(tlv_type: u32, value: impl Into<Bytes>) -> Self {
        Self {
            tlv_type,
            wire: None,
            raw_value: Some(value.into()),
            sub_elements: Vec::new(),
            elements_parsed: true,
        }
    }

    pub fn tlv_type(&self) -> u32 {
        self.tlv_type
    }

    /// Whether this block has materialized wire bytes (i.e. [`Block::encode`]
    /// has run since the last mutation).
    pub fn has_wire(&self) -> bool {
        self.wire.is_some()
    }

    /// Decodes exactly one top-level TLV element from the front of
    /// `input`, sharing `input`'s storage rather than copying the value
    /// octets. Sub-elements are not parsed; call [`Block::parse`] for that.
    pub fn decode_from(input: &Buffer) -> Result<Block> {
        let mut cursor = input.clone();
        let start_remaining = cursor.remaining();
        let tlv_type = tlv::decode_type(&mut cursor)?;
        let length = tlv::decode_var_number(&mut cursor)? as usize;
        if cursor.remaining() < length {
            return Err(Error::TruncatedInput(format!(
                "TLV type {tlv_type} declares length {length}, only {} available",
                cursor.remaining()
            )));
        }
        let consumed_header = start_remaining - cursor.remaining();
        let begin = input.len() - start_remaining;
        let value_begin = begin + consumed_header;
        let value_end = value_begin + length;
        Ok(Block {
            tlv_type,
            wire: Some(Wire { buffer: input.clone(), begin, end: value_end, value_begin, value_end }),
            raw_value: None,
            sub_elements: Vec::new(),
            elements_parsed: false,
        })
    }

    /// Decodes exactly one TLV element and reports how many bytes of
    /// `input` it consumed, so a caller can decode a sequence of sibling
    /// elements (e.g. a `Name`'s components) out of one buffer.
    pub fn decode_one(input: &Buffer) -> Result<(Block, usize)> {
        let block = Self::decode_from(input)?;
        let consumed = block.wire.as_ref().unwrap().end;
        Ok((block, consumed))
    }

    /// Populates `sub_elements` by walking this block's value octets as a
    /// sequence of TLV elements, recursively. A no-op if already parsed.
    /// Fails closed: an unrecognized critical sub-element, or one whose
    /// nesting exceeds [`MAX_PARSE_DEPTH`], is a decode error.
    pub fn parse(&mut self) -> Result<()> {
        self.parse_at_depth(0)
    }

    fn parse_at_depth(&mut self, depth: usize) -> Result<()> {
        if self.elements_parsed {
            return Ok(());
        }
        if depth >= MAX_PARSE_DEPTH {
            return Err(Error::BadStructure(format!(
                "TLV nesting exceeds maximum depth of {MAX_PARSE_DEPTH}"
            )));
        }
        let Some(wire) = &self.wire else {
            self.elements_parsed = true;
            return Ok(());
        };
        let value = wire.buffer.slice(wire.value_begin..wire.value_end);
        let mut offset = 0usize;
        let mut children = Vec::new();
        while offset < value.len() {
            let remaining = value.slice(offset..);
            let (mut child, consumed) = Block::decode_one(&remaining)?;
            child.parse_at_depth(depth + 1)?;
            offset += consumed;
            children.push(child);
        }
        self.sub_elements = children;
        self.elements_parsed = true;
        Ok(())
    }

    /// The element's value octets, recursively materializing them from
    /// `sub_elements` if this block was built in memory rather than
    /// decoded from the wire.
    pub fn value(&self) -> Bytes {
        if let Some(wire) = &self.wire {
            return wire.buffer.slice(wire.value_begin..wire.value_end);
        }
        if let Some(raw) = &self.raw_value {
            return raw.clone();
        }
        let mut out = BytesMut::with_capacity(self.value_len());
        for child in &self.sub_elements {
            out.extend_from_slice(&child.to_bytes());
        }
        out.freeze()
    }

    fn value_len(&self) -> usize {
        if let Some(wire) = &self.wire {
            return wire.value_end - wire.value_begin;
        }
        if let Some(raw) = &self.raw_value {
            return raw.len();
        }
        self.sub_elements.iter().map(|c| c.encoded_len()).sum()
    }

    /// Total encoded size (type + length + value), without mutating or
    /// allocating the wire form.
    pub fn encoded_len(&self) -> usize {
        if let Some(wire) = &self.wire {
            return wire.end - wire.begin;
        }
        let vlen = self.value_len();
        tlv::size_of_var_number(self.tlv_type as u64) + tlv::size_of_var_number(vlen as u64) + vlen
    }

    /// The full TLV octets (type + length + value) for this element,
    /// without caching them onto `self`.
    pub fn to_bytes(&self) -> Bytes {
        if let Some(wire) = &self.wire {
            return wire.buffer.slice(wire.begin..wire.end);
        }
        let mut estimator = Estimator::new();
        self.write(&mut estimator);
        let mut encoder = Encoder::with_capacity(estimator.len());
        self.write(&mut encoder);
        encoder.into_bytes()
    }

    /// Writes this element (recursively) using either an [`Estimator`] or
    /// an [`Encoder`] — both expose the same `prepend_*` surface, so the
    /// same routine sizes and then builds the wire form.
    fn write(&self, sink: &mut impl TlvSink) {
        if let Some(wire) = &self.wire {
            sink.prepend_byte_array(&wire.buffer[wire.begin..wire.end]);
            return;
        }
        if let Some(raw) = &self.raw_value {
            sink.prepend_byte_array(raw);
        } else {
            for child in self.sub_elements.iter().rev() {
                child.write(sink);
            }
        }
        let vlen = self.value_len();
        sink.prepend_var_number(vlen as u64);
        sink.prepend_var_number(self.tlv_type as u64);
    }

    /// Materializes and caches this element's wire form so that later
    /// calls to [`Block::to_bytes`]/[`Block::value`] are O(1) clones
    /// rather than re-encodes. Idempotent.
    pub fn encode(&mut self) -> Result<()> {
        if self.wire.is_some() {
            return Ok(());
        }
        let bytes = self.to_bytes();
        let len = bytes.len();
        let header_len = len - self.value_len();
        let buffer: Buffer = bytes;
        self.wire = Some(Wire {
            buffer,
            begin: 0,
            end: len,
            value_begin: header_len,
            value_end: len,
        });
        Ok(())
    }

    /// Appends `child`, invalidating any cached wire bytes.
    pub fn push_back(&mut self, child: Block) {
        self.ensure_elements_materialized();
        self.sub_elements.push(child);
        self.wire = None;
        self.raw_value = None;
    }

    /// Removes and returns the sub-element at `index`.
    pub fn erase(&mut self, index: usize) -> Block {
        self.ensure_elements_materialized();
        let removed = self.sub_elements.remove(index);
        self.wire = None;
        self.raw_value = None;
        removed
    }

    /// Parses sub-elements (if not already parsed) and discards the
    /// result's error, treating an unparseable wire-backed block as
    /// having no children. Callers that need decode errors surfaced
    /// should call [`Block::parse`] explicitly first.
    fn ensure_elements_materialized(&mut self) {
        if !self.elements_parsed {
            let _ = self.parse();
        }
    }

    /// The first direct sub-element of the given type, if any.
    pub fn find(&self, tlv_type: u32) -> Option<&Block> {
        self.sub_elements.iter().find(|b| b.tlv_type == tlv_type)
    }

    /// Like [`Block::find`], but an absent element is a
    /// [`Error::MissingElement`].
    pub fn get(&self, tlv_type: u32, name: &'static str) -> Result<&Block> {
        self.find(tlv_type).ok_or(Error::MissingElement(name))
    }

    pub fn elements(&self) -> &[Block] {
        &self.sub_elements
    }
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Block")
            .field("tlv_type", &self.tlv_type)
            .field("len", &self.value_len())
            .field("elements_parsed", &self.elements_parsed)
            .finish()
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.tlv_type == other.tlv_type && self.value() == other.value()
    }
}

impl Eq for Block {}

/// Shared surface between [`Estimator`] and [`Encoder`] so `Block::write`
/// can run as a size-only dry pass or a real byte-writing pass.
trait TlvSink {
    fn prepend_byte_array(&mut self, bytes: &[u8]) -> usize;
    fn prepend_var_number(&mut self, number: u64) -> usize;
}

impl TlvSink for Estimator {
    fn prepend_byte_array(&mut self, bytes: &[u8]) -> usize {
        Estimator::prepend_byte_array(self, bytes)
    }
    fn prepend_var_number(&mut self, number: u64) -> usize {
        Estimator::prepend_var_number(self, number)
    }
}

impl TlvSink for Encoder {
    fn prepend_byte_array(&mut self, bytes: &[u8]) -> usize {
        Encoder::prepend_byte_array(self, bytes)
    }
    fn prepend_var_number(&mut self, number: u64) -> usize {
        Encoder::prepend_var_number(self, number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_and_encode_round_trips_through_decode() {
        let mut outer = Block::new(7); // Name
        outer.push_back(Block::from_value(8, Bytes::from_static(b"hello")));
        outer.push_back(Block::from_value(8, Bytes::from_static(b"world")));
        let bytes: Buffer = outer.to_bytes();

        let mut decoded = Block::decode_from(&bytes).unwrap();
        assert_eq!(decoded.tlv_type(), 7);
        decoded.parse().unwrap();
        assert_eq!(decoded.elements().len(), 2);
        assert_eq!(decoded.elements()[0].value(), Bytes::from_static(b"hello"));
        assert_eq!(decoded.elements()[1].value(), Bytes::from_static(b"world"));
    }

    #[test]
    fn lazy_parse_does_not_touch_value_until_asked() {
        let mut outer = Block::new(7);
        outer.push_back(Block::from_value(8, Bytes::from_static(b"x")));
        let bytes = outer.to_bytes();

        let decoded = Block::decode_from(&bytes).unwrap();
        assert!(!decoded.elements_parsed);
        assert_eq!(decoded.elements().len(), 0); // unparsed: no children visible yet
    }

    #[test]
    fn mutation_invalidates_cached_wire() {
        let mut block = Block::new(7);
        block.push_back(Block::from_value(8, Bytes::from_static(b"a")));
        block.encode().unwrap();
        assert!(block.has_wire());
        block.push_back(Block::from_value(8, Bytes::from_static(b"b")));
        assert!(!block.has_wire());
        assert_eq!(block.elements().len(), 2);
    }

    #[test]
    fn equality_compares_logical_value_not_identity() {
        let a = Block::from_value(21, Bytes::from_static(b"payload"));
        let mut b = Block::new(21);
        // same logical bytes, built a different way
        let direct = Block::from_value(21, Bytes::from_static(b"payload"));
        b = direct;
        assert_eq!(a, b);
    }

    #[test]
    fn excessively_deep_nesting_is_rejected() {
        // build MAX_PARSE_DEPTH + 1 levels of nesting: type 7 wrapping type 7 ...
        let mut innermost = Block::from_value(8, Bytes::from_static(b"leaf"));
        for _ in 0..MAX_PARSE_DEPTH + 1 {
            let mut wrapper = Block::new(7);
            wrapper.push_back(innermost);
            innermost = wrapper;
        }
        let bytes = innermost.to_bytes();
        let mut decoded = Block::decode_from(&bytes).unwrap();
        assert!(decoded.parse().is_err());
    }

    #[test]
    fn truncated_length_is_an_error() {
        let bytes = Bytes::from_static(&[8, 5, b'h', b'i']); // declares 5, has 2
        assert!(Block::decode_from(&bytes).is_err());
    }
}
