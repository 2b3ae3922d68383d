//! A prepend-oriented byte buffer used to build TLV elements inside out.
//!
//! NDN blocks nest value-first: a `Data`'s outermost TLV wraps a `Name`,
//! `MetaInfo`, `Content`, and signature elements that must each be fully
//! encoded before the outer type/length can be known. Rather than build
//! children into separate buffers and concatenate them, `Encoder` writes
//! backwards from a buffer's end: write the innermost values first, then
//! prepend each enclosing type and length as they become known. This
//! mirrors ndn-cxx's `Encoder`, whose `prependByteArray`/`prependBlock`
//! pair let a `Block`'s `encode()` build outside the `Estimator`/`Encoder`
//! pair without double-allocating or reversing bytes at the end.
//!
//! Callers pair `Encoder` with [`crate::estimator::Estimator`]: run the
//! same recursive write routine once against an `Estimator` to learn the
//! exact size, allocate an `Encoder` of that size, then run it again for
//! real. The buffer never has to reallocate on the second pass.

use bytes::Bytes;

use crate::tlv;

const INITIAL_CAPACITY: usize = 64;

/// A growable buffer that accepts writes at both ends.
///
/// Internally this is a single allocation with a `[begin, end)` window of
/// live bytes; `prepend_*` moves `begin` left, `append_*` moves `end`
/// right. When either side runs out of headroom the backing allocation
/// doubles and the live bytes are recentered, so a sequence of prepends
/// following a reasonable capacity hint amortizes to O(1) each.
pub struct Encoder {
    buffer: Vec<u8>,
    begin: usize,
    end: usize,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Creates an encoder sized for `capacity` bytes of eventual content,
    /// e.g. the value returned by a prior [`crate::estimator::Estimator`]
    /// pass. Writes still succeed past `capacity`; this just avoids the
    /// first few reallocations.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let buffer = vec![0u8; capacity];
        Self { begin: capacity, end: capacity, buffer }
    }

    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    fn ensure_front(&mut self, n: usize) {
        while self.begin < n {
            self.grow();
        }
    }

    fn ensure_back(&mut self, n: usize) {
        while self.buffer.len() - self.end < n {
            self.grow();
        }
    }

    fn grow(&mut self) {
        let old_capacity = self.buffer.len();
        let new_capacity = (old_capacity * 2).max(INITIAL_CAPACITY);
        let mut new_buffer = vec![0u8; new_capacity];
        let used = self.len();
        let new_begin = (new_capacity - used) / 2;
        new_buffer[new_begin..new_begin + used].copy_from_slice(&self.buffer[self.begin..self.end]);
        self.buffer = new_buffer;
        self.end = new_begin + used;
        self.begin = new_begin;
    }

    /// Prepends a single byte, returning the number of bytes written (1).
    pub fn prepend_byte(&mut self, value: u8) -> usize {
        self.ensure_front(1);
        self.begin -= 1;
        self.buffer[self.begin] = value;
        1
    }

    /// Appends a single byte, returning the number of bytes written (1).
    pub fn append_byte(&mut self, value: u8) -> usize {
        self.ensure_back(1);
        self.buffer[self.end] = value;
        self.end += 1;
        1
    }

    /// Prepends `bytes` as a contiguous run, preserving their order.
    pub fn prepend_byte_array(&mut self, bytes: &[u8]) -> usize {
        self.ensure_front(bytes.len());
        self.begin -= bytes.len();
        self.buffer[self.begin..self.begin + bytes.len()].copy_from_slice(bytes);
        bytes.len()
    }

    /// Appends `bytes` as a contiguous run.
    pub fn append_byte_array(&mut self, bytes: &[u8]) -> usize {
        self.ensure_back(bytes.len());
        self.buffer[self.end..self.end + bytes.len()].copy_from_slice(bytes);
        self.end += bytes.len();
        bytes.len()
    }

    /// Prepends `number` in NDN-TLV VarNumber encoding.
    pub fn prepend_var_number(&mut self, number: u64) -> usize {
        let mut scratch = bytes::BytesMut::with_capacity(9);
        tlv::encode_var_number(&mut scratch, number);
        self.prepend_byte_array(&scratch)
    }

    /// Appends `number` in NDN-TLV VarNumber encoding.
    pub fn append_var_number(&mut self, number: u64) -> usize {
        let mut scratch = bytes::BytesMut::with_capacity(9);
        tlv::encode_var_number(&mut scratch, number);
        self.append_byte_array(&scratch)
    }

    /// Prepends `value` as the smallest NonNegativeInteger that holds it.
    pub fn prepend_non_negative_integer(&mut self, value: u64) -> usize {
        let mut scratch = bytes::BytesMut::with_capacity(8);
        tlv::encode_non_negative_integer(&mut scratch, value);
        self.prepend_byte_array(&scratch)
    }

    /// Appends `value` as the smallest NonNegativeInteger that holds it.
    pub fn append_non_negative_integer(&mut self, value: u64) -> usize {
        let mut scratch = bytes::BytesMut::with_capacity(8);
        tlv::encode_non_negative_integer(&mut scratch, value);
        self.append_byte_array(&scratch)
    }

    /// Consumes the encoder, returning its live bytes as a zero-copy
    /// [`Bytes`]. The backing allocation is reused, not copied: `Bytes`
    /// takes ownership of the `Vec<u8>` and `slice` just narrows the
    /// view.
    pub fn into_bytes(self) -> Bytes {
        let full = Bytes::from(self.buffer);
        full.slice(self.begin..self.end)
    }

    /// Borrows the live bytes without consuming the encoder.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer[self.begin..self.end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepend_builds_forward_order() {
        let mut enc = Encoder::new();
        enc.prepend_byte(3);
        enc.prepend_byte(2);
        enc.prepend_byte(1);
        assert_eq!(enc.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn mixed_prepend_append() {
        let mut enc = Encoder::new();
        enc.append_byte(2);
        enc.append_byte(3);
        enc.prepend_byte(1);
        enc.append_byte(4);
        assert_eq!(enc.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn grows_past_initial_capacity_without_corruption() {
        let mut enc = Encoder::new();
        for i in 0..500u32 {
            enc.prepend_byte_array(&i.to_be_bytes());
        }
        let bytes = enc.into_bytes();
        assert_eq!(bytes.len(), 2000);
        // first prepended ends up last: i=499 prepended last, so it is
        // the very first 4 bytes of the final buffer.
        assert_eq!(&bytes[0..4], &499u32.to_be_bytes());
        assert_eq!(&bytes[bytes.len() - 4..], &0u32.to_be_bytes());
    }

    #[test]
    fn type_length_value_round_trip() {
        let mut enc = Encoder::new();
        let value = b"hello";
        enc.prepend_byte_array(value);
        enc.prepend_var_number(value.len() as u64);
        enc.prepend_var_number(8); // GenericNameComponent
        let bytes = enc.into_bytes();
        assert_eq!(&bytes[..], &[8, 5, b'h', b'e', b'l', b'l', b'o']);
    }
}
