//! Fetching a signing certificate needed to validate a Data packet.
//!
//! Grounded in ndn-cxx's `security::CertificateFetcherDirectFetch`: when a
//! Data packet carries an `IncomingFaceId` tag (i.e. it just arrived off
//! a face, rather than being pulled from the content store), the fetcher
//! races two ways of retrieving the missing certificate: the normal
//! "infrastructure" path (an Interest expressed under the certificate's
//! own name, routed however the forwarder's FIB sees fit) and a "direct"
//! path (the same Interest, tagged with a `NextHopFaceId` hint so the
//! forwarder sends it back out the face the original Data arrived on,
//! skipping FIB lookup entirely). Whichever leg answers first wins; a
//! fetcher configured `direct_only` skips the infrastructure leg
//! altogether, matching links (e.g. a direct producer-consumer pairing)
//! where there is no FIB route to race against.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use ndn_core::tag::Tag;
use ndn_core::{Data, Interest, Name};

use crate::face::Face;

/// How a [`CertificateFetcher`] locates the certificate backing a given
/// key name; separated from [`Face`] so a fetcher can be pointed at a
/// local key chain as easily as at the network.
#[async_trait]
pub trait CertificateSource: Send + Sync {
    /// Returns the certificate Data for `key_name`, if already known
    /// without going to the network (e.g. a local trust anchor or an
    /// already-cached certificate).
    async fn lookup(&self, key_name: &Name) -> Option<Data>;
}

/// A [`CertificateSource`] that never has anything cached; every lookup
/// falls through to the network fetch.
#[derive(Debug, Default)]
pub struct EmptyCertificateSource;

#[async_trait]
impl CertificateSource for EmptyCertificateSource {
    async fn lookup(&self, _key_name: &Name) -> Option<Data> {
        None
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("no face available to fetch certificate {0}")]
    NoFace(Name),
    #[error("certificate {0} could not be retrieved after exhausting retries")]
    Exhausted(Name),
    #[error("cannot retrieve certificate {0}: direct_only fetcher has no incoming face id to hint toward")]
    CannotRetrieveCert(Name),
}

/// Fetches certificates not already available from a [`CertificateSource`],
/// retrying each leg up to a fixed number of times and racing an
/// infrastructure Interest against a direct, hop-hinted one whenever an
/// incoming face is known.
pub struct CertificateFetcher<S: CertificateSource> {
    face: Arc<dyn Face>,
    source: S,
    direct_only: bool,
    retries: u32,
    timeout: Duration,
}

const DEFAULT_RETRIES: u32 = 3;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);

impl<S: CertificateSource> CertificateFetcher<S> {
    pub fn new(face: Arc<dyn Face>, source: S) -> Self {
        Self { face, source, direct_only: false, retries: DEFAULT_RETRIES, timeout: DEFAULT_TIMEOUT }
    }

    /// Skips the infrastructure leg, relying solely on the direct,
    /// hop-hinted Interest. Appropriate when the face's peer is known to
    /// hold the certificate directly (e.g. a point-to-point link).
    pub fn direct_only(mut self, direct_only: bool) -> Self {
        self.direct_only = direct_only;
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetches the certificate named `key_name`. `incoming_face_id` is
    /// the `IncomingFaceId` tag copied off the Data packet that needs
    /// validating, if any. A `direct_only` fetcher with no incoming face
    /// id to hint toward fails immediately rather than falling back to
    /// the infrastructure leg, per the management contract.
    pub async fn fetch(&self, key_name: &Name, incoming_face_id: Option<u64>) -> Result<Data, FetchError> {
        if let Some(cached) = self.source.lookup(key_name).await {
            return Ok(cached);
        }

        match incoming_face_id {
            Some(face_id) if self.direct_only => self.fetch_direct(key_name, face_id).await,
            Some(face_id) => {
                tokio::select! {
                    infra = self.fetch_infrastructure(key_name) => infra,
                    direct = self.fetch_direct(key_name, face_id) => direct,
                }
            }
            None if self.direct_only => Err(FetchError::CannotRetrieveCert(key_name.clone())),
            None => self.fetch_infrastructure(key_name).await,
        }
    }

    async fn fetch_infrastructure(&self, key_name: &Name) -> Result<Data, FetchError> {
        self.retry(|| Interest::new(key_name.clone())).await
    }

    async fn fetch_direct(&self, key_name: &Name, face_id: u64) -> Result<Data, FetchError> {
        self.retry(|| {
            let mut interest = Interest::new(key_name.clone());
            interest.tags_mut().set(Tag::NextHopFaceId(face_id));
            interest
        })
        .await
    }

    async fn retry(&self, mut build: impl FnMut() -> Interest) -> Result<Data, FetchError> {
        for _ in 0..self.retries {
            let interest = build();
            if let Ok(data) = self.face.express_interest(interest, self.timeout).await {
                return Ok(data);
            }
        }
        Err(FetchError::Exhausted(build().name().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::InProcessFace;
    use bytes::Bytes;
    use ndn_core::ContentType;

    fn make_cert(name: &str) -> Data {
        let mut data = Data::new(Name::from_uri(name).unwrap());
        data.set_content(Bytes::from_static(b"cert bytes"));
        data.set_content_type(ContentType::Key);
        data.sign_digest_sha256().unwrap();
        data.encode().unwrap();
        data
    }

    #[tokio::test]
    async fn cached_lookup_skips_the_network() {
        struct Cached(Data);
        #[async_trait]
        impl CertificateSource for Cached {
            async fn lookup(&self, _key_name: &Name) -> Option<Data> {
                Some(self.0.clone())
            }
        }

        let (face, _peer) = InProcessFace::pair();
        let cert = make_cert("/alice/KEY/1");
        let fetcher = CertificateFetcher::new(face, Cached(cert.clone()));
        let fetched = fetcher.fetch(&Name::from_uri("/alice/KEY/1").unwrap(), None).await.unwrap();
        assert_eq!(fetched.name(), cert.name());
    }

    #[tokio::test]
    async fn infrastructure_leg_retrieves_certificate_via_filter() {
        let (face, peer) = InProcessFace::pair();
        let cert = make_cert("/alice/KEY/1");
        let cert_name = cert.name().clone();
        peer.set_interest_filter(
            cert_name.clone(),
            Arc::new({
                let peer = Arc::clone(&peer);
                let cert = cert.clone();
                move |interest: Interest| {
                    let peer = Arc::clone(&peer);
                    let data = cert.clone();
                    let name = interest.name().clone();
                    tokio::spawn(async move {
                        if name == data.name().clone() {
                            let _ = peer.put(data).await;
                        }
                    });
                }
            }),
        )
        .await
        .unwrap();

        let fetcher = CertificateFetcher::new(face, EmptyCertificateSource)
            .timeout(Duration::from_millis(200))
            .retries(1);
        let fetched = fetcher.fetch(&cert_name, None).await.unwrap();
        assert_eq!(fetched.name(), &cert_name);
    }

    #[tokio::test]
    async fn direct_only_without_incoming_face_id_fails_immediately() {
        let (face, _peer) = InProcessFace::pair();
        let fetcher = CertificateFetcher::new(face, EmptyCertificateSource).direct_only(true);
        let result = fetcher.fetch(&Name::from_uri("/alice/KEY/1").unwrap(), None).await;
        assert!(matches!(result, Err(FetchError::CannotRetrieveCert(_))));
    }

    #[tokio::test]
    async fn unreachable_certificate_exhausts_retries() {
        let (face, _peer) = InProcessFace::pair();
        let fetcher = CertificateFetcher::new(face, EmptyCertificateSource)
            .timeout(Duration::from_millis(20))
            .retries(2);
        let result = fetcher.fetch(&Name::from_uri("/nobody/KEY/1").unwrap(), None).await;
        assert!(matches!(result, Err(FetchError::Exhausted(_))));
    }
}
