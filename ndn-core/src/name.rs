//! `Name`: an ordered sequence of TLV-typed, canonically-ordered components.

use std::cmp::Ordering;
use std::fmt;

use bytes::Bytes;
use sha2::{Digest, Sha256};

use crate::block::Block;
use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::tlv::{self, types};

/// One component of a [`Name`].
///
/// Ordering between two components is defined by the NDN canonical
/// order: first by `tlv_type`, then by length, then lexicographically by
/// value octets. This makes `Name` a total order suitable for the
/// `Exclude` selector and for a content store's name-prefix index.
#[derive(Clone, Eq)]
pub struct NameComponent {
    tlv_type: u32,
    value: Bytes,
}

impl NameComponent {
    pub fn new(tlv_type: u32, value: impl Into<Bytes>) -> Self {
        Self { tlv_type, value: value.into() }
    }

    pub fn generic(value: impl Into<Bytes>) -> Self {
        Self::new(types::GENERIC_NAME_COMPONENT, value)
    }

    pub fn implicit_sha256_digest(digest: [u8; 32]) -> Self {
        Self::new(types::IMPLICIT_SHA256_DIGEST_COMPONENT, Bytes::copy_from_slice(&digest))
    }

    /// A component encoding `number` as a big-endian NonNegativeInteger,
    /// e.g. for version/segment/sequence-number marked names.
    pub fn from_number(tlv_type: u32, number: u64) -> Self {
        let mut buf = bytes::BytesMut::new();
        tlv::encode_non_negative_integer(&mut buf, number);
        Self::new(tlv_type, buf.freeze())
    }

    pub fn tlv_type(&self) -> u32 {
        self.tlv_type
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Interprets this component's value as a big-endian NonNegativeInteger.
    pub fn to_number(&self) -> Result<u64> {
        let mut cursor: &[u8] = &self.value;
        tlv::decode_non_negative_integer(&mut cursor, self.value.len())
    }

    pub fn is_generic(&self) -> bool {
        self.tlv_type == types::GENERIC_NAME_COMPONENT
    }

    pub fn is_implicit_sha256_digest(&self) -> bool {
        self.tlv_type == types::IMPLICIT_SHA256_DIGEST_COMPONENT
    }

    fn to_block(&self) -> Block {
        Block::from_value(self.tlv_type, self.value.clone())
    }

    fn from_block(block: &Block) -> Self {
        Self { tlv_type: block.tlv_type(), value: block.value() }
    }

    /// Percent-encodes the value the way NDN URIs render component bytes:
    /// alphanumerics and `-._~` pass through unescaped, everything else
    /// becomes `%XX`.
    fn write_uri(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tlv_type != types::GENERIC_NAME_COMPONENT {
            write!(f, "{}=", self.tlv_type)?;
        }
        for &byte in self.value.iter() {
            match byte {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                    write!(f, "{}", byte as char)?;
                }
                _ => write!(f, "%{byte:02X}")?,
            }
        }
        Ok(())
    }
}

impl PartialEq for NameComponent {
    fn eq(&self, other: &Self) -> bool {
        self.tlv_type == other.tlv_type && self.value == other.value
    }
}

impl Ord for NameComponent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tlv_type
            .cmp(&other.tlv_type)
            .then_with(|| self.value.len().cmp(&other.value.len()))
            .then_with(|| self.value.cmp(&other.value))
    }
}

impl PartialOrd for NameComponent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for NameComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_uri(f)
    }
}

/// A hierarchical NDN name: an ordered sequence of [`NameComponent`]s.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Name {
    components: Vec<NameComponent>,
}

impl Name {
    pub fn new() -> Self {
        Self { components: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NameComponent> {
        self.components.get(index)
    }

    pub fn components(&self) -> &[NameComponent] {
        &self.components
    }

    pub fn append(mut self, component: NameComponent) -> Self {
        self.components.push(component);
        self
    }

    pub fn append_generic(self, value: impl Into<Bytes>) -> Self {
        self.append(NameComponent::generic(value))
    }

    /// Appends a `NonNegativeInteger`-marked component, for the `version`,
    /// `segment`, and `sequence-number` naming conventions that all share
    /// this encoding and differ only in `tlv_type`.
    pub fn append_number(self, tlv_type: u32, number: u64) -> Self {
        self.append(NameComponent::from_number(tlv_type, number))
    }

    /// Appends a `VersionNameComponent`, per the NDN naming-convention-rev2
    /// marker for "this number is a version", distinguishable on the wire
    /// from a segment or sequence number sharing the same value.
    pub fn append_version(self, version: u64) -> Self {
        self.append_number(types::VERSION_NAME_COMPONENT, version)
    }

    pub fn append_segment(self, segment: u64) -> Self {
        self.append_number(types::SEGMENT_NAME_COMPONENT, segment)
    }

    pub fn append_sequence_number(self, sequence: u64) -> Self {
        self.append_number(types::SEQUENCE_NUM_NAME_COMPONENT, sequence)
    }

    pub fn append_implicit_sha256_digest(self, digest: [u8; 32]) -> Self {
        self.append(NameComponent::implicit_sha256_digest(digest))
    }

    /// Returns a new name with the last component removed, or an empty
    /// name if `self` has no components.
    pub fn get_prefix(&self, n: usize) -> Name {
        let n = n.min(self.components.len());
        Name { components: self.components[..n].to_vec() }
    }

    /// Whether `self` is equal to, or a prefix of, `other`.
    pub fn is_prefix_of(&self, other: &Name) -> bool {
        if self.components.len() > other.components.len() {
            return false;
        }
        self.components.iter().zip(other.components.iter()).all(|(a, b)| a == b)
    }

    pub fn to_block(&self) -> Block {
        let mut block = Block::new(types::NAME);
        for component in &self.components {
            block.push_back(component.to_block());
        }
        block
    }

    pub fn from_block(block: &Block) -> Result<Name> {
        if block.tlv_type() != types::NAME {
            return Err(Error::UnexpectedType { expected: types::NAME, actual: block.tlv_type() });
        }
        let mut block = block.clone();
        block.parse()?;
        let components = block.elements().iter().map(NameComponent::from_block).collect();
        Ok(Name { components })
    }

    pub fn to_wire(&self) -> Result<Buffer> {
        let mut block = self.to_block();
        block.encode()?;
        Ok(block.to_bytes())
    }

    /// Parses an NDN URI of the form `/component/component/...`. A
    /// component written as `<type>=<value>` selects a non-generic
    /// `tlv_type`; percent-escapes (`%XX`) decode to raw bytes.
    pub fn from_uri(uri: &str) -> Result<Name> {
        let uri = uri.strip_prefix("ndn:").unwrap_or(uri);
        let mut name = Name::new();
        for segment in uri.split('/') {
            if segment.is_empty() {
                continue;
            }
            let (tlv_type, encoded_value) = match segment.split_once('=') {
                Some((type_str, value)) => {
                    let tlv_type: u32 = type_str
                        .parse()
                        .map_err(|_| Error::BadStructure(format!("bad component type in {segment:?}")))?;
                    (tlv_type, value)
                }
                None => (types::GENERIC_NAME_COMPONENT, segment),
            };
            let value = percent_decode(encoded_value)?;
            name = name.append(NameComponent::new(tlv_type, value));
        }
        Ok(name)
    }

    /// Computes the component representing the SHA-256 digest of `data`,
    /// suitable for [`Name::append_implicit_sha256_digest`].
    pub fn digest_component_for(data: &[u8]) -> NameComponent {
        let digest: [u8; 32] = Sha256::digest(data).into();
        NameComponent::implicit_sha256_digest(digest)
    }
}

fn percent_decode(input: &str) -> Result<Bytes> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 2 >= bytes.len() {
                return Err(Error::BadStructure(format!("truncated percent-escape in {input:?}")));
            }
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                .map_err(|_| Error::BadStructure(format!("non-UTF8 percent-escape in {input:?}")))?;
            let value = u8::from_str_radix(hex, 16)
                .map_err(|_| Error::BadStructure(format!("bad percent-escape in {input:?}")))?;
            out.push(value);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(Bytes::from(out))
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return write!(f, "/");
        }
        for component in &self.components {
            write!(f, "/")?;
            component.write_uri(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({self})")
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components.cmp(&other.components)
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_round_trips() {
        let name = Name::new().append_generic("hello").append_generic("w%orld");
        let uri = name.to_string();
        assert_eq!(uri, "/hello/w%25orld");
        let parsed = Name::from_uri(&uri).unwrap();
        assert_eq!(parsed, name);
    }

    #[test]
    fn canonical_component_order_by_type_then_length_then_bytes() {
        let short = NameComponent::generic(Bytes::from_static(b"a"));
        let long = NameComponent::generic(Bytes::from_static(b"aa"));
        assert!(short < long);

        let digest = NameComponent::implicit_sha256_digest([0u8; 32]);
        let generic = NameComponent::generic(Bytes::from_static(b"a"));
        assert!(digest < generic); // ImplicitSha256DigestComponent (1) < GenericNameComponent (8)
    }

    #[test]
    fn is_prefix_of() {
        let base = Name::from_uri("/a/b").unwrap();
        let extended = Name::from_uri("/a/b/c").unwrap();
        assert!(base.is_prefix_of(&extended));
        assert!(!extended.is_prefix_of(&base));
        assert!(base.is_prefix_of(&base));
    }

    #[test]
    fn wire_round_trip_preserves_components() {
        let name = Name::from_uri("/a/b/35=%01%02").unwrap();
        let wire = name.to_wire().unwrap();
        let block = Block::decode_from(&wire).unwrap();
        let decoded = Name::from_block(&block).unwrap();
        assert_eq!(decoded, name);
    }

    #[test]
    fn numeric_components_round_trip() {
        let name = Name::new().append_version(42).append_segment(0);
        assert_eq!(name.get(0).unwrap().to_number().unwrap(), 42);
        assert_eq!(name.get(1).unwrap().to_number().unwrap(), 0);
    }
}
