//! `Dispatcher`: the server side of the NDN management protocol — routes
//! Interests under a set of top-level prefixes to ControlCommand,
//! StatusDataset, or NotificationStream handlers, applying authorization
//! and signing the Data response.
//!
//! Grounded in ndn-cxx's `mgmt::Dispatcher`. Differences from the
//! original, noted here rather than scattered as comments: handlers are
//! invoked as `async` closures returning a boxed future instead of
//! taking a completion continuation (this crate has no analog of
//! ndn-cxx's io_service-driven callback chaining, so the natural Rust
//! shape is `async fn` rather than continuation-passing); prefix
//! registration with a forwarder is out of scope (no real network
//! transport), so `add_top_prefix` only wires up `Face::set_interest_filter`
//! and does not attempt `Face::register_prefix`.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use ndn_core::control::{ControlParameters, ControlResponse};
use ndn_core::tlv::MAX_NDN_PACKET_SIZE;
use ndn_core::{Block, ContentType, Data, Interest, Name};
use ndn_store::{Fifo, InMemoryStorage};

use crate::authorization::{Authorization, RejectReply};
use crate::face::{Face, InterestHandler};
use crate::status_dataset::{segment_name, DatasetOutcome, StatusDatasetContext};

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Validates parsed `ControlParameters` before a `ControlCommandHandler`
/// runs; returns `false` to reject with StatusCode 400.
pub type ValidateParameters = Arc<dyn Fn(&ControlParameters) -> bool + Send + Sync>;

/// Handles an authorized, validated ControlCommand, producing the
/// response to sign and send back.
pub type ControlCommandHandler =
    Arc<dyn Fn(Name, Interest, ControlParameters) -> BoxFuture<ControlResponse> + Send + Sync>;

/// Handles an authorized StatusDataset request, writing its response
/// into the given context and returning the finished outcome.
pub type StatusDatasetHandler =
    Arc<dyn Fn(Name, Interest, StatusDatasetContext) -> BoxFuture<DatasetOutcome> + Send + Sync>;

/// Returned by `add_notification_stream`; posts a notification payload
/// to every subscriber of that stream's prefix.
pub type PostNotification = Arc<dyn Fn(bytes::Bytes) + Send + Sync>;

#[derive(Debug, Error)]
pub enum DispatcherError {
    #[error("relative prefix {0} overlaps with a prefix already registered")]
    PrefixOverlap(Name),
    #[error("a top-level prefix was already added; no more handlers can be registered")]
    HandlersFrozen,
    #[error("top-level prefix {0} was already added")]
    TopPrefixAlreadyAdded(Name),
}

type Result<T> = std::result::Result<T, DispatcherError>;

enum Handler {
    ControlCommand { authorization: Authorization, validate: ValidateParameters, handler: ControlCommandHandler },
    StatusDataset { authorization: Authorization, handler: StatusDatasetHandler },
    NotificationStream,
}

struct TopPrefixEntry {
    filter_prefixes: Vec<Name>,
}

/// Dispatches incoming management Interests to registered handlers and
/// signs their Data responses.
pub struct Dispatcher {
    face: Arc<dyn Face>,
    store: Mutex<InMemoryStorage<Fifo>>,
    handlers: Mutex<HashMap<Name, Handler>>,
    top_level_prefixes: Mutex<HashMap<Name, TopPrefixEntry>>,
    streams: Mutex<HashMap<Name, u64>>,
}

impl Dispatcher {
    pub fn new(face: Arc<dyn Face>, store_capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            face,
            store: Mutex::new(InMemoryStorage::new(store_capacity, Fifo::default())),
            handlers: Mutex::new(HashMap::new()),
            top_level_prefixes: Mutex::new(HashMap::new()),
            streams: Mutex::new(HashMap::new()),
        })
    }

    fn overlaps_existing(handlers: &HashMap<Name, Handler>, rel_prefix: &Name) -> bool {
        handlers.keys().any(|existing| existing.is_prefix_of(rel_prefix) || rel_prefix.is_prefix_of(existing))
    }

    fn require_no_top_prefix(&self) -> Result<()> {
        if self.top_level_prefixes.lock().unwrap().is_empty() {
            Ok(())
        } else {
            Err(DispatcherError::HandlersFrozen)
        }
    }

    pub fn add_control_command(
        &self,
        rel_prefix: Name,
        authorization: Authorization,
        validate: ValidateParameters,
        handler: ControlCommandHandler,
    ) -> Result<()> {
        self.require_no_top_prefix()?;
        let mut handlers = self.handlers.lock().unwrap();
        if Self::overlaps_existing(&handlers, &rel_prefix) {
            return Err(DispatcherError::PrefixOverlap(rel_prefix));
        }
        handlers.insert(rel_prefix, Handler::ControlCommand { authorization, validate, handler });
        Ok(())
    }

    pub fn add_status_dataset(
        &self,
        rel_prefix: Name,
        authorization: Authorization,
        handler: StatusDatasetHandler,
    ) -> Result<()> {
        self.require_no_top_prefix()?;
        let mut handlers = self.handlers.lock().unwrap();
        if Self::overlaps_existing(&handlers, &rel_prefix) {
            return Err(DispatcherError::PrefixOverlap(rel_prefix));
        }
        handlers.insert(rel_prefix, Handler::StatusDataset { authorization, handler });
        Ok(())
    }

    pub fn add_notification_stream(&self, rel_prefix: Name) -> Result<PostNotification> {
        self.require_no_top_prefix()?;
        let mut handlers = self.handlers.lock().unwrap();
        if Self::overlaps_existing(&handlers, &rel_prefix) {
            return Err(DispatcherError::PrefixOverlap(rel_prefix));
        }
        handlers.insert(rel_prefix.clone(), Handler::NotificationStream);
        self.streams.lock().unwrap().insert(rel_prefix.clone(), 0);
        Ok(self.make_notification_poster(rel_prefix))
    }

    fn make_notification_poster(self: &Arc<Self>, rel_prefix: Name) -> PostNotification {
        let dispatcher = Arc::clone(self);
        Arc::new(move |payload: bytes::Bytes| {
            let dispatcher = Arc::clone(&dispatcher);
            let rel_prefix = rel_prefix.clone();
            tokio::spawn(async move { dispatcher.post_notification(rel_prefix, payload).await });
        })
    }

    async fn post_notification(&self, rel_prefix: Name, payload: bytes::Bytes) {
        let top_prefixes: Vec<Name> = self.top_level_prefixes.lock().unwrap().keys().cloned().collect();
        let Some(top_prefix) = top_prefixes.first() else {
            log::error!("cannot post notification: no top-level prefix has been added");
            return;
        };
        if top_prefixes.len() > 1 {
            log::error!("cannot post notification: more than one top-level prefix has been added");
            return;
        }
        let sequence = {
            let mut streams = self.streams.lock().unwrap();
            let seq = streams.entry(rel_prefix.clone()).or_insert(0);
            let current = *seq;
            *seq += 1;
            current
        };
        let name = full_prefix(top_prefix, &rel_prefix).append_sequence_number(sequence);
        if let Some(data) = self.sign_data(name, payload, ContentType::Blob, None) {
            self.send_and_cache(data).await;
        }
    }

    /// Registers `prefix` as a top-level prefix, wiring every handler
    /// registered so far into `face.set_interest_filter` under
    /// `prefix`/`relPrefix`.
    pub async fn add_top_prefix(self: &Arc<Self>, prefix: Name) -> Result<()> {
        {
            let top = self.top_level_prefixes.lock().unwrap();
            if top.contains_key(&prefix) {
                return Err(DispatcherError::TopPrefixAlreadyAdded(prefix));
            }
            // A top-level prefix overlapping an existing one in either
            // direction (not just an exact duplicate) is rejected (§4.7.4):
            // `/a` and `/a/b` can't both be routed here without ambiguity
            // over which one's handlers an Interest under `/a/b` belongs to.
            if top.keys().any(|existing| existing.is_prefix_of(&prefix) || prefix.is_prefix_of(existing)) {
                return Err(DispatcherError::PrefixOverlap(prefix));
            }
        }

        let rel_prefixes: Vec<Name> = self.handlers.lock().unwrap().keys().cloned().collect();
        let mut filter_prefixes = Vec::with_capacity(rel_prefixes.len());
        for rel_prefix in rel_prefixes {
            let full = full_prefix(&prefix, &rel_prefix);
            let handler = self.make_interest_handler(prefix.clone(), rel_prefix.clone());
            self.face
                .set_interest_filter(full.clone(), handler)
                .await
                .map_err(|_| DispatcherError::TopPrefixAlreadyAdded(prefix.clone()))?;
            filter_prefixes.push(full);
        }

        self.top_level_prefixes.lock().unwrap().insert(prefix, TopPrefixEntry { filter_prefixes });
        Ok(())
    }

    pub async fn remove_top_prefix(&self, prefix: &Name) {
        let entry = self.top_level_prefixes.lock().unwrap().remove(prefix);
        if let Some(entry) = entry {
            for full in entry.filter_prefixes {
                let _ = self.face.unset_interest_filter(&full).await;
            }
        }
    }

    fn make_interest_handler(self: &Arc<Self>, top_prefix: Name, rel_prefix: Name) -> InterestHandler {
        let dispatcher = Arc::clone(self);
        Arc::new(move |interest: Interest| {
            let dispatcher = Arc::clone(&dispatcher);
            let top_prefix = top_prefix.clone();
            let rel_prefix = rel_prefix.clone();
            tokio::spawn(async move {
                dispatcher.process_interest(top_prefix, rel_prefix, interest).await;
            });
        })
    }

    async fn process_interest(&self, top_prefix: Name, rel_prefix: Name, interest: Interest) {
        let full = full_prefix(&top_prefix, &rel_prefix);
        let handler_kind = {
            let handlers = self.handlers.lock().unwrap();
            match handlers.get(&rel_prefix) {
                Some(Handler::ControlCommand { authorization, validate, handler }) => {
                    HandlerRef::ControlCommand(Arc::clone(authorization), Arc::clone(validate), Arc::clone(handler))
                }
                Some(Handler::StatusDataset { authorization, handler }) => {
                    HandlerRef::StatusDataset(Arc::clone(authorization), Arc::clone(handler))
                }
                Some(Handler::NotificationStream) | None => return,
            }
        };

        match handler_kind {
            HandlerRef::ControlCommand(authorization, validate, handler) => {
                self.process_control_command(full, interest, authorization, validate, handler).await;
            }
            HandlerRef::StatusDataset(authorization, handler) => {
                self.process_status_dataset(full, interest, authorization, handler).await;
            }
        }
    }

    async fn process_control_command(
        &self,
        full_prefix: Name,
        interest: Interest,
        authorization: Authorization,
        validate: ValidateParameters,
        handler: ControlCommandHandler,
    ) {
        let Some(component) = interest.name().get(full_prefix.len()) else { return };
        let Ok(block) = Block::decode_from(&bytes::Bytes::copy_from_slice(component.value())) else { return };
        let Ok(params) = ControlParameters::from_block(&block) else { return };

        match authorize(&authorization, &full_prefix, &interest, Some(&params)).await {
            AuthOutcome::Rejected(reply) => self.after_authorization_rejected(reply, &interest).await,
            AuthOutcome::Accepted(_requester) => {
                let response = if validate(&params) {
                    handler(full_prefix, interest.clone(), params).await
                } else {
                    ControlResponse::new(400, "malformed control parameters")
                };
                self.send_control_response(response, &interest).await;
            }
        }
    }

    async fn process_status_dataset(
        &self,
        full_prefix: Name,
        interest: Interest,
        authorization: Authorization,
        handler: StatusDatasetHandler,
    ) {
        match authorize(&authorization, &full_prefix, &interest, None).await {
            AuthOutcome::Rejected(reply) => self.after_authorization_rejected(reply, &interest).await,
            AuthOutcome::Accepted(_requester) => {
                let context = StatusDatasetContext::new(full_prefix);
                match handler(interest.name().clone(), interest.clone(), context).await {
                    DatasetOutcome::Rejected(resp) => self.send_control_response(resp, &interest).await,
                    DatasetOutcome::Segments { prefix, segments } => {
                        let version = now_millis();
                        let last = segments.len().saturating_sub(1);
                        for (index, content) in segments.into_iter().enumerate() {
                            let name = segment_name(&prefix, version, index as u64);
                            let final_id = if index == last { Some(name.get(name.len() - 1).cloned()) } else { None };
                            if let Some(mut data) = self.sign_data(name, content, ContentType::Blob, final_id.flatten()) {
                                data.tags_mut().set(ndn_core::tag::Tag::CachePolicy(ndn_core::tag::CachePolicy::NoCache));
                                if index == 0 {
                                    self.send_and_cache(data).await;
                                } else {
                                    self.cache_only(data).await;
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    async fn after_authorization_rejected(&self, reply: RejectReply, interest: &Interest) {
        if reply == RejectReply::Status403 {
            self.send_control_response(ControlResponse::new(403, "authorization rejected"), interest).await;
        }
    }

    /// A control response is sent on the face only; per the management
    /// contract it is never cached in the dispatcher's internal store
    /// (unlike status-dataset segments and notifications).
    async fn send_control_response(&self, response: ControlResponse, interest: &Interest) {
        let content = response.encode();
        if let Some(data) = self.sign_data(interest.name().clone(), content, ContentType::Blob, None) {
            self.send(data).await;
        }
    }

    fn sign_data(
        &self,
        name: Name,
        content: bytes::Bytes,
        content_type: ContentType,
        final_block_id: Option<ndn_core::NameComponent>,
    ) -> Option<Data> {
        let mut data = Data::new(name);
        data.set_content(content);
        data.set_content_type(content_type);
        data.set_freshness_period(1000);
        if let Some(final_id) = final_block_id {
            data.set_final_block_id(final_id);
        }
        if data.sign_digest_sha256().is_err() {
            return None;
        }
        let wire = data.encode().ok()?;
        if wire.len() > MAX_NDN_PACKET_SIZE {
            log::error!("dropping oversized management response ({} bytes)", wire.len());
            return None;
        }
        Some(data)
    }

    /// Sends `data` on the face without caching it, for control-command
    /// responses (spec: "not cached in the internal store").
    async fn send(&self, data: Data) {
        if let Err(err) = self.face.put(data).await {
            log::error!("failed to send management response: {err}");
        }
    }

    /// Caches `data` in the internal store for later segment fetches,
    /// then sends it on the face. Used for segment 0 of a status dataset
    /// and every notification.
    async fn send_and_cache(&self, data: Data) {
        self.store.lock().unwrap().insert(data.clone()).ok();
        self.send(data).await;
    }

    /// Caches `data` without sending it on the face, for status-dataset
    /// segments after the first: a fetcher retrieves them by Interest
    /// against the store, not by an unsolicited push.
    async fn cache_only(&self, data: Data) {
        self.store.lock().unwrap().insert(data).ok();
    }
}

enum HandlerRef {
    ControlCommand(Authorization, ValidateParameters, ControlCommandHandler),
    StatusDataset(Authorization, StatusDatasetHandler),
}

enum AuthOutcome {
    Accepted(String),
    Rejected(RejectReply),
}

async fn authorize(
    authorization: &Authorization,
    prefix: &Name,
    interest: &Interest,
    params: Option<&ControlParameters>,
) -> AuthOutcome {
    let (tx, rx) = tokio::sync::oneshot::channel();
    let tx = Arc::new(Mutex::new(Some(tx)));
    let tx_accept = Arc::clone(&tx);
    let accept: Box<dyn FnOnce(String) + Send> = Box::new(move |requester| {
        if let Some(tx) = tx_accept.lock().unwrap().take() {
            let _ = tx.send(AuthOutcome::Accepted(requester));
        }
    });
    let reject: Box<dyn FnOnce(RejectReply) + Send> = Box::new(move |reply| {
        if let Some(tx) = tx.lock().unwrap().take() {
            let _ = tx.send(AuthOutcome::Rejected(reply));
        }
    });
    authorization(prefix, interest, params, accept, reject);
    rx.await.unwrap_or(AuthOutcome::Rejected(RejectReply::Silent))
}

fn full_prefix(top_prefix: &Name, rel_prefix: &Name) -> Name {
    let mut full = top_prefix.clone();
    for component in rel_prefix.components() {
        full = full.append(component.clone());
    }
    full
}

fn now_millis() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authorization::accept_all;
    use crate::face::InProcessFace;

    #[tokio::test]
    async fn second_top_prefix_that_is_a_prefix_of_the_first_is_rejected() {
        let (face, _peer) = InProcessFace::pair();
        let dispatcher = Dispatcher::new(face, 16);

        dispatcher.add_top_prefix(Name::from_uri("/a/b").unwrap()).await.unwrap();
        let err = dispatcher.add_top_prefix(Name::from_uri("/a").unwrap()).await.unwrap_err();
        assert!(matches!(err, DispatcherError::PrefixOverlap(_)));
    }

    #[tokio::test]
    async fn second_top_prefix_extending_the_first_is_also_rejected() {
        let (face, _peer) = InProcessFace::pair();
        let dispatcher = Dispatcher::new(face, 16);

        dispatcher.add_top_prefix(Name::from_uri("/a").unwrap()).await.unwrap();
        let err = dispatcher.add_top_prefix(Name::from_uri("/a/b").unwrap()).await.unwrap_err();
        assert!(matches!(err, DispatcherError::PrefixOverlap(_)));
    }

    #[tokio::test]
    async fn disjoint_top_prefixes_are_both_accepted() {
        let (face, _peer) = InProcessFace::pair();
        let dispatcher = Dispatcher::new(face, 16);

        dispatcher.add_top_prefix(Name::from_uri("/a").unwrap()).await.unwrap();
        dispatcher.add_top_prefix(Name::from_uri("/b").unwrap()).await.unwrap();
    }

    #[tokio::test]
    async fn adding_a_handler_after_a_top_prefix_is_attached_fails() {
        let (face, _peer) = InProcessFace::pair();
        let dispatcher = Dispatcher::new(face, 16);

        dispatcher.add_top_prefix(Name::from_uri("/a").unwrap()).await.unwrap();
        let err = dispatcher
            .add_control_command(
                Name::from_uri("/cmd").unwrap(),
                accept_all(),
                Arc::new(|_| true),
                Arc::new(|_, _, params| Box::pin(async move { ControlResponse::new(200, "ok").with_body(params) })),
            )
            .unwrap_err();
        assert!(matches!(err, DispatcherError::HandlersFrozen));
    }
}
