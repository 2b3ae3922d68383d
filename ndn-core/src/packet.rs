//! `Interest` and `Data`: the two NDN packet types, their `Selectors`,
//! `MetaInfo`, `KeyLocator`/`SignatureInfo`, and full-name computation.

use bytes::{Bytes, BytesMut};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::block::Block;
use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::name::{Name, NameComponent};
use crate::tag::TagHost;
use crate::tlv::{self, types, ContentType, SignatureType};

/// A `KeyLocator` names a signer either by `Name` or by the SHA-256
/// digest of their public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyLocator {
    Name(Name),
    KeyDigest(Bytes),
}

impl KeyLocator {
    fn to_block(&self) -> Block {
        let inner = match self {
            KeyLocator::Name(name) => name.to_block(),
            KeyLocator::KeyDigest(digest) => Block::from_value(types::KEY_DIGEST, digest.clone()),
        };
        let mut block = Block::new(types::KEY_LOCATOR);
        block.push_back(inner);
        block
    }

    fn from_block(block: &Block) -> Result<Self> {
        let mut block = block.clone();
        block.parse()?;
        let inner = block.elements().first().ok_or(Error::MissingElement("KeyLocator value"))?;
        match inner.tlv_type() {
            types::NAME => Ok(KeyLocator::Name(Name::from_block(inner)?)),
            types::KEY_DIGEST => Ok(KeyLocator::KeyDigest(inner.value())),
            other => Err(Error::UnexpectedType { expected: types::NAME, actual: other }),
        }
    }
}

/// One entry of an `Exclude` selector: either a literal excluded
/// component, or an `Any` marker meaning "and everything between the
/// neighboring components".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExcludeEntry {
    Component(NameComponent),
    Any,
}

/// The `Exclude` selector: an ascending sequence of excluded components
/// interspersed with `Any` wildcard ranges, per the NDN-TLV `Exclude`
/// element grammar (`Any? (NameComponent Any?)*`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exclude {
    entries: Vec<ExcludeEntry>,
}

impl Exclude {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude_one(&mut self, component: NameComponent) {
        self.entries.push(ExcludeEntry::Component(component));
    }

    pub fn exclude_any(&mut self) {
        if !matches!(self.entries.last(), Some(ExcludeEntry::Any)) {
            self.entries.push(ExcludeEntry::Any);
        }
    }

    pub fn entries(&self) -> &[ExcludeEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `component` is excluded: either listed literally, or
    /// covered by an adjacent `Any` range.
    pub fn is_excluded(&self, component: &NameComponent) -> bool {
        for (i, entry) in self.entries.iter().enumerate() {
            match entry {
                ExcludeEntry::Component(c) if c == component => return true,
                ExcludeEntry::Any => {
                    let lower = self.entries[..i].iter().rev().find_map(|e| match e {
                        ExcludeEntry::Component(c) => Some(c),
                        ExcludeEntry::Any => None,
                    });
                    let upper = self.entries[i + 1..].iter().find_map(|e| match e {
                        ExcludeEntry::Component(c) => Some(c),
                        ExcludeEntry::Any => None,
                    });
                    let above_lower = lower.map(|l| component > l).unwrap_or(true);
                    let below_upper = upper.map(|u| component < u).unwrap_or(true);
                    if above_lower && below_upper {
                        return true;
                    }
                }
                _ => {}
            }
        }
        false
    }

    fn to_block(&self) -> Block {
        let mut block = Block::new(types::EXCLUDE);
        for entry in &self.entries {
            match entry {
                ExcludeEntry::Component(c) => block.push_back(Block::from_value(c.tlv_type(), Bytes::copy_from_slice(c.value()))),
                ExcludeEntry::Any => block.push_back(Block::new(types::ANY)),
            }
        }
        block
    }

    fn from_block(block: &Block) -> Result<Self> {
        let mut block = block.clone();
        block.parse()?;
        let entries = block
            .elements()
            .iter()
            .map(|e| {
                if e.tlv_type() == types::ANY {
                    ExcludeEntry::Any
                } else {
                    ExcludeEntry::Component(NameComponent::new(e.tlv_type(), e.value()))
                }
            })
            .collect();
        Ok(Exclude { entries })
    }
}

/// Which end of the set of Interest-matching Data a forwarder/store
/// should prefer when more than one match exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildSelector {
    Leftmost,
    Rightmost,
}

/// `Interest`'s optional `Selectors` element, narrowing which `Data`
/// satisfy the Interest beyond simple name matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selectors {
    pub min_suffix_components: Option<u64>,
    pub max_suffix_components: Option<u64>,
    pub publisher_public_key_locator: Option<KeyLocator>,
    pub exclude: Option<Exclude>,
    pub child_selector: Option<ChildSelector>,
    pub must_be_fresh: bool,
}

impl Selectors {
    pub fn is_empty(&self) -> bool {
        self.min_suffix_components.is_none()
            && self.max_suffix_components.is_none()
            && self.publisher_public_key_locator.is_none()
            && self.exclude.is_none()
            && self.child_selector.is_none()
            && !self.must_be_fresh
    }

    fn to_block(&self) -> Block {
        let mut block = Block::new(types::SELECTORS);
        if let Some(v) = self.min_suffix_components {
            block.push_back(nonneg(types::MIN_SUFFIX_COMPONENTS, v));
        }
        if let Some(v) = self.max_suffix_components {
            block.push_back(nonneg(types::MAX_SUFFIX_COMPONENTS, v));
        }
        if let Some(locator) = &self.publisher_public_key_locator {
            block.push_back(locator.to_block());
        }
        if let Some(exclude) = &self.exclude {
            block.push_back(exclude.to_block());
        }
        if let Some(selector) = self.child_selector {
            let value = match selector {
                ChildSelector::Leftmost => 0,
                ChildSelector::Rightmost => 1,
            };
            block.push_back(nonneg(types::CHILD_SELECTOR, value));
        }
        if self.must_be_fresh {
            block.push_back(Block::new(types::MUST_BE_FRESH));
        }
        block
    }

    fn from_block(block: &Block) -> Result<Self> {
        let mut block = block.clone();
        block.parse()?;
        let mut selectors = Selectors::default();
        for element in block.elements() {
            match element.tlv_type() {
                types::MIN_SUFFIX_COMPONENTS => selectors.min_suffix_components = Some(read_nonneg(element)?),
                types::MAX_SUFFIX_COMPONENTS => selectors.max_suffix_components = Some(read_nonneg(element)?),
                types::PUBLISHER_PUBLIC_KEY_LOCATOR => {
                    selectors.publisher_public_key_locator = Some(KeyLocator::from_block(element)?)
                }
                types::EXCLUDE => selectors.exclude = Some(Exclude::from_block(element)?),
                types::CHILD_SELECTOR => {
                    selectors.child_selector = Some(match read_nonneg(element)? {
                        0 => ChildSelector::Leftmost,
                        _ => ChildSelector::Rightmost,
                    })
                }
                types::MUST_BE_FRESH => selectors.must_be_fresh = true,
                other if types::is_critical(other) => {
                    return Err(Error::CriticalUnknownElement(other as u64))
                }
                _ => {}
            }
        }
        Ok(selectors)
    }
}

fn nonneg(tlv_type: u32, value: u64) -> Block {
    let mut buf = BytesMut::new();
    tlv::encode_non_negative_integer(&mut buf, value);
    Block::from_value(tlv_type, buf.freeze())
}

fn read_nonneg(block: &Block) -> Result<u64> {
    let value = block.value();
    let mut cursor: &[u8] = &value;
    tlv::decode_non_negative_integer(&mut cursor, value.len())
}

/// An NDN Interest packet.
#[derive(Debug, Clone)]
pub struct Interest {
    name: Name,
    selectors: Option<Selectors>,
    nonce: Option<u32>,
    interest_lifetime: Option<u64>,
    wire: Option<Buffer>,
    tags: TagHost,
}

impl Interest {
    pub fn new(name: Name) -> Self {
        Self { name, selectors: None, nonce: None, interest_lifetime: None, wire: None, tags: TagHost::new() }
    }

    /// The per-packet side-channel metadata (incoming face id, PIT-token
    /// adjacent tags, ...) attached to this Interest. Tags are not part
    /// of the wire encoding: reading or writing them never touches
    /// `wire`.
    pub fn tags(&self) -> &TagHost {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut TagHost {
        &mut self.tags
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn set_name(&mut self, name: Name) {
        self.name = name;
        self.wire = None;
    }

    pub fn selectors(&self) -> Option<&Selectors> {
        self.selectors.as_ref()
    }

    pub fn set_selectors(&mut self, selectors: Selectors) {
        self.selectors = if selectors.is_empty() { None } else { Some(selectors) };
        self.wire = None;
    }

    pub fn nonce(&self) -> Option<u32> {
        self.nonce
    }

    pub fn set_nonce(&mut self, nonce: u32) {
        self.nonce = Some(nonce);
        self.wire = None;
    }

    /// Assigns a random nonce if one has not already been set, as a
    /// forwarder does on first hearing an Interest without one.
    pub fn ensure_nonce(&mut self) -> u32 {
        if self.nonce.is_none() {
            self.nonce = Some(rand::thread_rng().next_u32());
            self.wire = None;
        }
        self.nonce.unwrap()
    }

    pub fn interest_lifetime(&self) -> Option<u64> {
        self.interest_lifetime
    }

    pub fn set_interest_lifetime(&mut self, millis: u64) {
        self.interest_lifetime = Some(millis);
        self.wire = None;
    }

    pub fn must_be_fresh(&self) -> bool {
        self.selectors.as_ref().is_some_and(|s| s.must_be_fresh)
    }

    fn to_block(&self) -> Block {
        let mut block = Block::new(types::INTEREST);
        block.push_back(self.name.to_block());
        if let Some(selectors) = &self.selectors {
            block.push_back(selectors.to_block());
        }
        if let Some(nonce) = self.nonce {
            block.push_back(Block::from_value(types::NONCE, Bytes::copy_from_slice(&nonce.to_be_bytes())));
        }
        if let Some(lifetime) = self.interest_lifetime {
            block.push_back(nonneg(types::INTEREST_LIFETIME, lifetime));
        }
        block
    }

    /// Materializes and caches the wire encoding.
    pub fn encode(&mut self) -> Result<Buffer> {
        if let Some(wire) = &self.wire {
            return Ok(wire.clone());
        }
        let mut block = self.to_block();
        block.encode()?;
        let bytes = block.to_bytes();
        self.wire = Some(bytes.clone());
        Ok(bytes)
    }

    /// Decodes a top-level `Interest` element.
    ///
    /// Elements must appear in the strict order `Name, [Selectors],
    /// [Nonce], [InterestLifetime]` per the normative contract chosen for
    /// this library (out-of-order or repeated critical elements fail
    /// decode rather than being tolerated).
    pub fn from_wire(wire: &Buffer) -> Result<Interest> {
        let mut block = Block::decode_from(wire)?;
        if block.tlv_type() != types::INTEREST {
            return Err(Error::UnexpectedType { expected: types::INTEREST, actual: block.tlv_type() });
        }
        block.parse()?;

        let mut name = None;
        let mut selectors = None;
        let mut nonce = None;
        let mut interest_lifetime = None;
        // Monotonically advances past each recognized element; a known
        // type arriving before its own slot (repeated, or out of order)
        // falls through to the critical-unknown-element check below.
        let mut position = 0u8;

        for element in block.elements() {
            match element.tlv_type() {
                types::NAME if position == 0 => {
                    name = Some(Name::from_block(element)?);
                    position = 1;
                }
                types::SELECTORS if position <= 1 => {
                    selectors = Some(Selectors::from_block(element)?);
                    position = 2;
                }
                types::NONCE if position <= 2 => {
                    let value = element.value();
                    if value.len() != 4 {
                        return Err(Error::BadLength("Nonce must be 4 octets".into()));
                    }
                    nonce = Some(u32::from_be_bytes(value[..4].try_into().unwrap()));
                    position = 3;
                }
                types::INTEREST_LIFETIME if position <= 3 => {
                    interest_lifetime = Some(read_nonneg(element)?);
                    position = 4;
                }
                other if types::is_critical(other) => {
                    return Err(Error::CriticalUnknownElement(other as u64));
                }
                _ => {}
            }
        }

        let name = name.ok_or(Error::MissingElement("Interest.Name"))?;
        Ok(Interest { name, selectors, nonce, interest_lifetime, wire: Some(wire.clone()), tags: TagHost::new() })
    }

    /// Whether `data` satisfies this Interest: its name falls under the
    /// Interest's prefix (accounting for an implicit digest suffix), and
    /// `MustBeFresh`/`Exclude`/suffix-length selectors are respected.
    pub fn matches_data(&self, data: &Data) -> bool {
        let data_name = data.name();
        let prefix_ok = if self.name.len() == data_name.len() + 1 {
            // `self.name` may carry the implicit digest as its last component.
            self.name.get_prefix(self.name.len() - 1).is_prefix_of(data_name)
                && data
                    .full_name()
                    .ok()
                    .map(|full| full.get(full.len() - 1) == self.name.get(self.name.len() - 1))
                    .unwrap_or(false)
        } else {
            self.name.is_prefix_of(data_name)
        };
        if !prefix_ok {
            return false;
        }
        if self.must_be_fresh() && !data.meta_info.is_fresh_now() {
            return false;
        }
        if let Some(selectors) = &self.selectors {
            let suffix_len = data_name.len() - self.name.len().min(data_name.len());
            if let Some(min) = selectors.min_suffix_components {
                if (suffix_len as u64) < min {
                    return false;
                }
            }
            if let Some(max) = selectors.max_suffix_components {
                if (suffix_len as u64) > max {
                    return false;
                }
            }
            if let Some(exclude) = &selectors.exclude {
                if let Some(component) = data_name.get(self.name.len()) {
                    if exclude.is_excluded(component) {
                        return false;
                    }
                }
            }
        }
        true
    }
}

/// `Data`'s `MetaInfo` element: content classification, freshness, and
/// (for segmented publications) the name of the final segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaInfo {
    pub content_type: Option<ContentType>,
    pub freshness_period: Option<u64>,
    pub final_block_id: Option<NameComponent>,
}

impl MetaInfo {
    /// `MetaInfo` alone cannot say whether a Data is "fresh now" — that
    /// depends on how long ago it was received — so this only reports
    /// whether freshness was claimed at all. Callers enforcing
    /// `MustBeFresh` against a concrete reception time should consult the
    /// content store entry's staleness instead of this method.
    fn is_fresh_now(&self) -> bool {
        self.freshness_period.is_some_and(|p| p > 0)
    }

    fn to_block(&self) -> Block {
        let mut block = Block::new(types::META_INFO);
        if let Some(content_type) = self.content_type {
            block.push_back(nonneg(types::CONTENT_TYPE, content_type as u64));
        }
        if let Some(freshness) = self.freshness_period {
            block.push_back(nonneg(types::FRESHNESS_PERIOD, freshness));
        }
        if let Some(final_block) = &self.final_block_id {
            let mut wrapper = Block::new(types::FINAL_BLOCK_ID);
            wrapper.push_back(Block::from_value(final_block.tlv_type(), Bytes::copy_from_slice(final_block.value())));
            block.push_back(wrapper);
        }
        block
    }

    fn from_block(block: &Block) -> Result<Self> {
        let mut block = block.clone();
        block.parse()?;
        let mut meta = MetaInfo::default();
        for element in block.elements() {
            match element.tlv_type() {
                types::CONTENT_TYPE => meta.content_type = Some(ContentType::from_u64(read_nonneg(element)?)?),
                types::FRESHNESS_PERIOD => meta.freshness_period = Some(read_nonneg(element)?),
                types::FINAL_BLOCK_ID => {
                    let mut wrapper = element.clone();
                    wrapper.parse()?;
                    let inner = wrapper.elements().first().ok_or(Error::MissingElement("FinalBlockId value"))?;
                    meta.final_block_id = Some(NameComponent::new(inner.tlv_type(), inner.value()));
                }
                other if types::is_critical(other) => return Err(Error::CriticalUnknownElement(other as u64)),
                _ => {}
            }
        }
        Ok(meta)
    }
}

/// `Data`'s `SignatureInfo` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
    pub signature_type: SignatureType,
    pub key_locator: Option<KeyLocator>,
}

impl SignatureInfo {
    fn to_block(&self) -> Block {
        let mut block = Block::new(types::SIGNATURE_INFO);
        block.push_back(nonneg(types::SIGNATURE_TYPE, self.signature_type as u64));
        if let Some(locator) = &self.key_locator {
            block.push_back(locator.to_block());
        }
        block
    }

    fn from_block(block: &Block) -> Result<Self> {
        let mut block = block.clone();
        block.parse()?;
        let signature_type =
            SignatureType::from_u64(read_nonneg(block.get(types::SIGNATURE_TYPE, "SignatureInfo.SignatureType")?)?)?;
        let key_locator = match block.find(types::KEY_LOCATOR) {
            Some(b) => Some(KeyLocator::from_block(b)?),
            None => None,
        };
        Ok(SignatureInfo { signature_type, key_locator })
    }
}

/// An NDN Data packet.
#[derive(Debug, Clone)]
pub struct Data {
    name: Name,
    meta_info: MetaInfo,
    content: Bytes,
    signature_info: Option<SignatureInfo>,
    signature_value: Option<Bytes>,
    wire: Option<Buffer>,
    tags: TagHost,
}

impl Data {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            meta_info: MetaInfo::default(),
            content: Bytes::new(),
            signature_info: None,
            signature_value: None,
            wire: None,
            tags: TagHost::new(),
        }
    }

    /// The per-packet side-channel metadata attached to this Data (e.g.
    /// `CachePolicy` set by a dispatcher publishing a status-dataset
    /// segment). Not part of the wire encoding or of `Data` equality.
    pub fn tags(&self) -> &TagHost {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut TagHost {
        &mut self.tags
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn set_name(&mut self, name: Name) {
        self.name = name;
        self.wire = None;
    }

    pub fn meta_info(&self) -> &MetaInfo {
        &self.meta_info
    }

    pub fn set_content_type(&mut self, content_type: ContentType) {
        self.meta_info.content_type = Some(content_type);
        self.wire = None;
    }

    pub fn set_freshness_period(&mut self, millis: u64) {
        self.meta_info.freshness_period = Some(millis);
        self.wire = None;
    }

    pub fn set_final_block_id(&mut self, component: NameComponent) {
        self.meta_info.final_block_id = Some(component);
        self.wire = None;
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<Bytes>) {
        self.content = content.into();
        self.wire = None;
    }

    pub fn signature_info(&self) -> Option<&SignatureInfo> {
        self.signature_info.as_ref()
    }

    /// The `Name..SignatureInfo` octets a signer hashes/signs over, per
    /// the NDN-TLV definition of a Data packet's signed portion. Requires
    /// `signature_info` to already be set (the signer picks the
    /// `SignatureType`/`KeyLocator` before computing this).
    pub fn signed_portion(&self) -> Result<Bytes> {
        let signature_info = self.signature_info.as_ref().ok_or(Error::MissingElement("SignatureInfo"))?;
        let mut out = BytesMut::new();
        out.extend_from_slice(&self.name.to_wire()?);
        out.extend_from_slice(&self.meta_info.to_block().to_bytes());
        out.extend_from_slice(&Block::from_value(types::CONTENT, self.content.clone()).to_bytes());
        out.extend_from_slice(&signature_info.to_block().to_bytes());
        Ok(out.freeze())
    }

    /// Sets `SignatureInfo` and the raw signature bytes directly, for
    /// callers that computed the signature externally (e.g. against a
    /// hardware key) using [`Data::signed_portion`].
    pub fn set_signature(&mut self, signature_info: SignatureInfo, signature_value: impl Into<Bytes>) {
        self.signature_info = Some(signature_info);
        self.signature_value = Some(signature_value.into());
        self.wire = None;
    }

    /// Signs this Data with a `DigestSha256` signature: the simplest
    /// NDN signature type, a bare hash with no key material, usable
    /// whenever integrity rather than provenance is all that's needed.
    pub fn sign_digest_sha256(&mut self) -> Result<()> {
        self.signature_info = Some(SignatureInfo { signature_type: SignatureType::DigestSha256, key_locator: None });
        let signed = self.signed_portion()?;
        let digest = Sha256::digest(&signed);
        self.signature_value = Some(Bytes::copy_from_slice(&digest));
        self.wire = None;
        Ok(())
    }

    fn to_block(&self) -> Result<Block> {
        let signature_value = self.signature_value.clone().ok_or(Error::NotSigned)?;
        let signature_info = self.signature_info.as_ref().ok_or(Error::NotSigned)?;
        let mut block = Block::new(types::DATA);
        block.push_back(self.name.to_block());
        block.push_back(self.meta_info.to_block());
        block.push_back(Block::from_value(types::CONTENT, self.content.clone()));
        block.push_back(signature_info.to_block());
        block.push_back(Block::from_value(types::SIGNATURE_VALUE, signature_value));
        Ok(block)
    }

    pub fn encode(&mut self) -> Result<Buffer> {
        if let Some(wire) = &self.wire {
            return Ok(wire.clone());
        }
        let mut block = self.to_block()?;
        block.encode()?;
        let bytes = block.to_bytes();
        self.wire = Some(bytes.clone());
        Ok(bytes)
    }

    /// Decodes a top-level `Data` element.
    ///
    /// Elements must appear in the strict order `Name, [MetaInfo],
    /// [Content], SignatureInfo, SignatureValue`: a repeated or
    /// out-of-order critical element fails decode rather than being
    /// tolerated, per the normative contract chosen for this library.
    pub fn from_wire(wire: &Buffer) -> Result<Data> {
        let mut block = Block::decode_from(wire)?;
        if block.tlv_type() != types::DATA {
            return Err(Error::UnexpectedType { expected: types::DATA, actual: block.tlv_type() });
        }
        block.parse()?;

        let mut name = None;
        let mut meta_info = None;
        let mut content = None;
        let mut signature_info = None;
        let mut signature_value = None;
        let mut position = 0u8;

        for element in block.elements() {
            match element.tlv_type() {
                types::NAME if position == 0 => {
                    name = Some(Name::from_block(element)?);
                    position = 1;
                }
                types::META_INFO if position <= 1 => {
                    meta_info = Some(MetaInfo::from_block(element)?);
                    position = 2;
                }
                types::CONTENT if position <= 2 => {
                    content = Some(element.value());
                    position = 3;
                }
                types::SIGNATURE_INFO if position <= 3 => {
                    signature_info = Some(SignatureInfo::from_block(element)?);
                    position = 4;
                }
                types::SIGNATURE_VALUE if position <= 4 => {
                    signature_value = Some(element.value());
                    position = 5;
                }
                other if types::is_critical(other) => {
                    return Err(Error::CriticalUnknownElement(other as u64));
                }
                _ => {}
            }
        }

        let name = name.ok_or(Error::MissingElement("Data.Name"))?;
        let meta_info = meta_info.unwrap_or_default();
        let content = content.unwrap_or_default();
        let signature_info = Some(signature_info.ok_or(Error::MissingElement("Data.SignatureInfo"))?);
        let signature_value = Some(signature_value.ok_or(Error::MissingElement("Data.SignatureValue"))?);
        Ok(Data { name, meta_info, content, signature_info, signature_value, wire: Some(wire.clone()), tags: TagHost::new() })
    }

    /// The `Name` with an `ImplicitSha256DigestComponent` of this Data's
    /// complete wire encoding appended. Requires the Data to have been
    /// encoded (or decoded from the wire) already, since the digest is
    /// computed over the full packet, signature included.
    pub fn full_name(&self) -> Result<Name> {
        let wire = self.wire.clone().ok_or(Error::NotSigned)?;
        let digest: [u8; 32] = Sha256::digest(&wire).into();
        Ok(self.name.clone().append_implicit_sha256_digest(digest))
    }
}

impl PartialEq for Interest {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.selectors == other.selectors
            && self.nonce == other.nonce
            && self.interest_lifetime == other.interest_lifetime
    }
}

impl Eq for Interest {}

impl PartialEq for Data {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.meta_info == other.meta_info
            && self.content == other.content
            && self.signature_info == other.signature_info
            && self.signature_value == other.signature_value
    }
}

impl Eq for Data {}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_data(uri: &str, content: &[u8]) -> Data {
        let mut data = Data::new(Name::from_uri(uri).unwrap());
        data.set_content(Bytes::copy_from_slice(content));
        data.set_content_type(ContentType::Blob);
        data.sign_digest_sha256().unwrap();
        data.encode().unwrap();
        data
    }

    #[test]
    fn interest_wire_round_trip() {
        let mut interest = Interest::new(Name::from_uri("/a/b").unwrap());
        interest.set_nonce(0xDEADBEEF);
        interest.set_interest_lifetime(4000);
        let wire = interest.encode().unwrap();
        let decoded = Interest::from_wire(&wire).unwrap();
        assert_eq!(decoded.name(), interest.name());
        assert_eq!(decoded.nonce(), Some(0xDEADBEEF));
        assert_eq!(decoded.interest_lifetime(), Some(4000));
    }

    #[test]
    fn data_wire_round_trip_and_full_name() {
        let data = signed_data("/a/b", b"payload");
        let wire = data.encode_clone();
        let decoded = Data::from_wire(&wire).unwrap();
        assert_eq!(decoded.name(), data.name());
        assert_eq!(decoded.content(), data.content());
        let full = decoded.full_name().unwrap();
        assert_eq!(full.len(), data.name().len() + 1);
        assert!(full.get(full.len() - 1).unwrap().is_implicit_sha256_digest());
    }

    impl Data {
        fn encode_clone(&self) -> Buffer {
            self.wire.clone().expect("call encode() first")
        }
    }

    #[test]
    fn must_be_fresh_rejects_zero_freshness() {
        let interest = {
            let mut i = Interest::new(Name::from_uri("/a").unwrap());
            i.set_selectors(Selectors { must_be_fresh: true, ..Default::default() });
            i
        };
        let mut stale = Data::new(Name::from_uri("/a/b").unwrap());
        stale.set_content(Bytes::from_static(b"x"));
        stale.sign_digest_sha256().unwrap();
        stale.encode().unwrap();
        assert!(!interest.matches_data(&stale));

        let fresh = signed_data("/a/b", b"x");
        let mut fresh = fresh;
        fresh.set_freshness_period(1000);
        fresh.sign_digest_sha256().unwrap();
        fresh.encode().unwrap();
        assert!(interest.matches_data(&fresh));
    }

    #[test]
    fn data_decode_of_encode_is_equal() {
        let data = signed_data("/a/b", b"payload");
        let decoded = Data::from_wire(&data.encode_clone()).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn tags_are_not_part_of_equality_or_wire() {
        let mut a = signed_data("/a/b", b"payload");
        let b = Data::from_wire(&a.encode_clone()).unwrap();
        a.tags_mut().set(crate::tag::Tag::CachePolicy(crate::tag::CachePolicy::NoCache));
        assert_eq!(a, b);
    }

    #[test]
    fn exclude_covers_any_range() {
        let mut exclude = Exclude::new();
        exclude.exclude_one(NameComponent::generic(Bytes::from_static(b"a")));
        exclude.exclude_any();
        exclude.exclude_one(NameComponent::generic(Bytes::from_static(b"z")));
        assert!(exclude.is_excluded(&NameComponent::generic(Bytes::from_static(b"m"))));
        assert!(!exclude.is_excluded(&NameComponent::generic(Bytes::from_static(b"zz"))));
    }
}
