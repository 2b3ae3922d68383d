//! Per-packet side-channel tags: typed metadata (incoming face, PIT
//! token, congestion marks, ...) carried alongside an Interest/Data
//! without being part of its TLV wire format.
//!
//! The tag set is closed: forwarders and applications attach only the
//! kinds listed here, so `Tag` is a plain enum rather than an open
//! type-erased map. This mirrors how NDN link-layer tags are a small,
//! spec-fixed set (`IncomingFaceId`, `NextHopFaceId`, `CachePolicy`,
//! `CongestionMark`, `NonDiscovery`, `PrefixAnnouncement`) rather than an
//! extensible registry.

use std::fmt;

use crate::name::Name;

/// A value attachable to a [`TagHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    IncomingFaceId(u64),
    NextHopFaceId(u64),
    CachePolicy(CachePolicy),
    CongestionMark(u64),
    NonDiscovery,
    PrefixAnnouncement(Name),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    NoCache,
}

impl Tag {
    /// A small integer identifying this tag's *kind*, independent of its
    /// value, used as the key in a [`TagHost`]'s slot map. Each variant
    /// gets exactly one slot: attaching a new `IncomingFaceId` replaces
    /// any existing one rather than accumulating a list.
    fn kind(&self) -> TagKind {
        match self {
            Tag::IncomingFaceId(_) => TagKind::IncomingFaceId,
            Tag::NextHopFaceId(_) => TagKind::NextHopFaceId,
            Tag::CachePolicy(_) => TagKind::CachePolicy,
            Tag::CongestionMark(_) => TagKind::CongestionMark,
            Tag::NonDiscovery => TagKind::NonDiscovery,
            Tag::PrefixAnnouncement(_) => TagKind::PrefixAnnouncement,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TagKind {
    IncomingFaceId,
    NextHopFaceId,
    CachePolicy,
    CongestionMark,
    NonDiscovery,
    PrefixAnnouncement,
}

/// A holder of [`Tag`]s: one slot per [`TagKind`], so setting a tag of a
/// kind that is already present replaces it.
#[derive(Debug, Clone, Default)]
pub struct TagHost {
    tags: Vec<Tag>,
}

impl TagHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, tag: Tag) {
        let kind = tag.kind();
        self.tags.retain(|existing| existing.kind() != kind);
        self.tags.push(tag);
    }

    pub fn get_incoming_face_id(&self) -> Option<u64> {
        self.tags.iter().find_map(|t| match t {
            Tag::IncomingFaceId(id) => Some(*id),
            _ => None,
        })
    }

    pub fn get_next_hop_face_id(&self) -> Option<u64> {
        self.tags.iter().find_map(|t| match t {
            Tag::NextHopFaceId(id) => Some(*id),
            _ => None,
        })
    }

    pub fn get_cache_policy(&self) -> Option<CachePolicy> {
        self.tags.iter().find_map(|t| match t {
            Tag::CachePolicy(p) => Some(*p),
            _ => None,
        })
    }

    pub fn get_congestion_mark(&self) -> Option<u64> {
        self.tags.iter().find_map(|t| match t {
            Tag::CongestionMark(m) => Some(*m),
            _ => None,
        })
    }

    pub fn has_non_discovery(&self) -> bool {
        self.tags.iter().any(|t| matches!(t, Tag::NonDiscovery))
    }

    pub fn get_prefix_announcement(&self) -> Option<&Name> {
        self.tags.iter().find_map(|t| match t {
            Tag::PrefixAnnouncement(name) => Some(name),
            _ => None,
        })
    }

    fn remove(&mut self, kind: TagKind) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t.kind() != kind);
        self.tags.len() != before
    }

    pub fn remove_incoming_face_id(&mut self) -> bool {
        self.remove(TagKind::IncomingFaceId)
    }
}

/// PIT-token length bounds, per the NDNLPv2 `PitToken` field.
const PIT_TOKEN_MIN_LEN: usize = 1;
const PIT_TOKEN_MAX_LEN: usize = 32;

/// An opaque 1-to-32-byte value a forwarder attaches to an outgoing
/// Interest and echoes back on the corresponding Data, letting it match
/// the Data to a pending Interest table entry without retaining name
/// state. Opaque to everyone but whoever minted it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PitToken(Vec<u8>);

impl PitToken {
    pub fn new(bytes: Vec<u8>) -> Result<Self, crate::error::Error> {
        if bytes.len() < PIT_TOKEN_MIN_LEN || bytes.len() > PIT_TOKEN_MAX_LEN {
            return Err(crate::error::Error::BadLength(format!(
                "PitToken must be {PIT_TOKEN_MIN_LEN}-{PIT_TOKEN_MAX_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PitToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PitToken({self})")
    }
}

impl fmt::Display for PitToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_a_tag_replaces_the_previous_value_of_that_kind() {
        let mut host = TagHost::new();
        host.set(Tag::IncomingFaceId(1));
        host.set(Tag::IncomingFaceId(2));
        assert_eq!(host.get_incoming_face_id(), Some(2));
        assert_eq!(host.tags.len(), 1);
    }

    #[test]
    fn distinct_kinds_coexist() {
        let mut host = TagHost::new();
        host.set(Tag::IncomingFaceId(1));
        host.set(Tag::CongestionMark(9));
        assert_eq!(host.get_incoming_face_id(), Some(1));
        assert_eq!(host.get_congestion_mark(), Some(9));
    }

    #[test]
    fn pit_token_rejects_out_of_range_lengths() {
        assert!(PitToken::new(vec![]).is_err());
        assert!(PitToken::new(vec![0u8; 33]).is_err());
        assert!(PitToken::new(vec![0u8; 32]).is_ok());
    }

    #[test]
    fn pit_token_renders_uppercase_hex() {
        let token = PitToken::new(vec![0xAB, 0x01]).unwrap();
        assert_eq!(token.to_string(), "AB01");
    }
}
