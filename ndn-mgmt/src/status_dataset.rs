//! `StatusDatasetContext`: how a [`crate::dispatcher::Dispatcher`] hands a
//! status-dataset handler a place to write its response without knowing
//! about segmentation, versioning, or signing.
//!
//! Grounded in ndn-cxx's `mgmt::StatusDatasetContext`: a handler calls
//! [`StatusDatasetContext::append`] zero or more times, then exactly one
//! of [`StatusDatasetContext::end`] or [`StatusDatasetContext::reject`].
//! Calling either after the context is already finalized is a misuse of
//! the API, not a runtime condition — it panics, the same way ndn-cxx's
//! version throws `std::domain_error` for the same misuse.

use bytes::{Bytes, BytesMut};

use ndn_core::control::ControlResponse;
use ndn_core::tlv::MAX_NDN_PACKET_SIZE;
use ndn_core::Name;

/// A status-dataset response is segmented so each Data's content stays
/// at or under half the conventional maximum Data packet size, leaving
/// room for the Data's own framing and signature.
const MAX_SEGMENT_SIZE: usize = MAX_NDN_PACKET_SIZE / 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Initial,
    Responded,
    Finalized,
}

/// The outcome of a status-dataset request: either a sequence of
/// content segments to encode as Data packets under successive segment
/// numbers, or a rejection to answer with a single ControlResponse Nack.
pub enum DatasetOutcome {
    Segments { prefix: Name, segments: Vec<Bytes> },
    Rejected(ControlResponse),
}

/// Accumulates a status-dataset handler's response.
pub struct StatusDatasetContext {
    prefix: Name,
    buffer: BytesMut,
    state: State,
    outcome: Option<DatasetOutcome>,
}

impl StatusDatasetContext {
    /// `prefix` is the request's top-level-plus-relative prefix, with
    /// neither version nor segment components yet.
    pub fn new(prefix: Name) -> Self {
        Self { prefix, buffer: BytesMut::new(), state: State::Initial, outcome: None }
    }

    pub fn prefix(&self) -> &Name {
        &self.prefix
    }

    /// Overrides the prefix Data packets will be published under. Must
    /// start with the request's name; may include a caller-chosen
    /// version component (one is generated from the current time if
    /// omitted by the dispatcher).
    pub fn set_prefix(&mut self, prefix: Name) {
        assert!(self.state == State::Initial, "prefix must be set before the first append/end/reject");
        self.prefix = prefix;
    }

    /// Appends a block of content to the response.
    pub fn append(&mut self, block: &[u8]) {
        assert!(self.state != State::Finalized, "append called after end/reject");
        self.buffer.extend_from_slice(block);
        self.state = State::Responded;
    }

    /// Finishes the response successfully, segmenting the accumulated
    /// content so that each segment fits under [`MAX_SEGMENT_SIZE`].
    pub fn end(mut self) -> DatasetOutcome {
        assert!(self.state != State::Finalized, "end called twice");
        let content = self.buffer.split().freeze();
        let segments = segment(content);
        self.outcome = Some(DatasetOutcome::Segments { prefix: self.prefix.clone(), segments });
        self.state = State::Finalized;
        self.outcome.take().expect("just set")
    }

    /// Declares the non-existence of a response; the dispatcher replies
    /// with a producer Nack carrying `resp`.
    pub fn reject(mut self, resp: ControlResponse) -> DatasetOutcome {
        assert!(self.state == State::Initial, "reject called after append/end");
        self.state = State::Finalized;
        self.outcome = Some(DatasetOutcome::Rejected(resp));
        self.outcome.take().expect("just set")
    }
}

fn segment(content: Bytes) -> Vec<Bytes> {
    if content.is_empty() {
        return vec![Bytes::new()];
    }
    let mut segments = Vec::with_capacity(content.len() / MAX_SEGMENT_SIZE + 1);
    let mut offset = 0;
    while offset < content.len() {
        let end = (offset + MAX_SEGMENT_SIZE).min(content.len());
        segments.push(content.slice(offset..end));
        offset = end;
    }
    segments
}

/// Appends `/<version>/<segment>` components to `prefix`, matching
/// ndn-cxx's segmented-dataset naming convention.
pub fn segment_name(prefix: &Name, version: u64, index: u64) -> Name {
    prefix.clone().append_version(version).append_segment(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_response_yields_one_empty_segment() {
        let ctx = StatusDatasetContext::new(Name::from_uri("/localhost/nfd/status").unwrap());
        match ctx.end() {
            DatasetOutcome::Segments { segments, .. } => {
                assert_eq!(segments.len(), 1);
                assert!(segments[0].is_empty());
            }
            _ => panic!("expected segments"),
        }
    }

    #[test]
    fn large_response_is_segmented_under_the_limit() {
        let mut ctx = StatusDatasetContext::new(Name::from_uri("/localhost/nfd/status").unwrap());
        let chunk = vec![0xAB; MAX_SEGMENT_SIZE / 3];
        for _ in 0..10 {
            ctx.append(&chunk);
        }
        match ctx.end() {
            DatasetOutcome::Segments { segments, .. } => {
                assert!(segments.len() > 1);
                for segment in &segments {
                    assert!(segment.len() <= MAX_SEGMENT_SIZE);
                }
            }
            _ => panic!("expected segments"),
        }
    }

    #[test]
    #[should_panic]
    fn appending_after_end_panics() {
        // `end`/`reject` consume `self`, so the only way to exercise the
        // post-finalize guard from outside is to force the state
        // directly (available here since the test lives in this module).
        let mut ctx = StatusDatasetContext::new(Name::from_uri("/x").unwrap());
        ctx.append(b"a");
        ctx.state = State::Finalized;
        ctx.append(b"b");
    }

    #[test]
    fn reject_carries_the_response() {
        let ctx = StatusDatasetContext::new(Name::from_uri("/x").unwrap());
        match ctx.reject(ControlResponse::new(400, "malformed")) {
            DatasetOutcome::Rejected(resp) => assert_eq!(resp.status_code, 400),
            _ => panic!("expected rejection"),
        }
    }
}
