//! Face abstraction and NDN management protocol dispatcher.
//!
//! This crate is the part of the workspace that talks to a forwarder (or
//! stands in for one): [`face::Face`] is the transport-agnostic
//! send/receive boundary, [`dispatcher::Dispatcher`] wires control
//! commands, status datasets, and notification streams onto it the way
//! ndn-cxx's `mgmt::Dispatcher` does, and [`certificate_fetcher`]
//! resolves a missing signing certificate by racing the usual FIB path
//! against a hop-hinted direct Interest.

pub mod authorization;
pub mod certificate_fetcher;
pub mod dispatcher;
pub mod face;
pub mod status_dataset;

pub use authorization::{accept_all, AcceptContinuation, Authorization, RejectContinuation, RejectReply};
pub use certificate_fetcher::{CertificateFetcher, CertificateSource, EmptyCertificateSource, FetchError};
pub use dispatcher::{Dispatcher, DispatcherError};
pub use face::{Face, FaceEvent, InProcessFace, InterestHandler};
pub use status_dataset::{DatasetOutcome, StatusDatasetContext};
