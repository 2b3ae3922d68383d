//! Authorization for incoming ControlCommand and StatusDataset requests.
//!
//! Mirrors ndn-cxx's `mgmt::Authorization`/`AcceptContinuation`/
//! `RejectContinuation` triad: a request is authorized by calling an
//! [`Authorization`] closure with `accept`/`reject` continuations rather
//! than returning a bool, so an implementation backed by an async
//! validator (e.g. one that needs to fetch a certificate) can answer
//! later without blocking the dispatcher.

use std::sync::Arc;

use ndn_core::control::ControlParameters;
use ndn_core::{Interest, Name};

/// How to respond when authorization is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReply {
    /// Drop the Interest silently.
    Silent,
    /// Reply with a ControlResponse carrying StatusCode 403.
    Status403,
}

/// Called when authorization succeeds. `requester` identifies who was
/// authorized, for logging only; it must not affect how the request is
/// processed.
pub type AcceptContinuation = Box<dyn FnOnce(String) + Send>;

/// Called when authorization is rejected.
pub type RejectContinuation = Box<dyn FnOnce(RejectReply) + Send>;

/// Authorizes an incoming request. `params` is `Some` only for
/// ControlCommand requests whose parameters parsed successfully.
pub type Authorization = Arc<
    dyn Fn(&Name, &Interest, Option<&ControlParameters>, AcceptContinuation, RejectContinuation)
        + Send
        + Sync,
>;

/// An [`Authorization`] that accepts every request, with `""` as the
/// requester.
pub fn accept_all() -> Authorization {
    Arc::new(|_prefix, _interest, _params, accept, _reject| accept(String::new()))
}
