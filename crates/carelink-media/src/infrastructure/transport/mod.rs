//! Peer transport infrastructure.
//!
//! [`PeerConnector`] opens exactly one [`PeerLink`] per call. The link owns
//! the outgoing track senders and performs offer/answer negotiation; events
//! flowing the other way (remote tracks, discovered candidates, connection
//! state) arrive on an explicit channel rather than single-slot callbacks, so
//! multiple observers and tests can consume them.
//!
//! A production implementation binds a real-time media stack behind this seam;
//! [`mock::MockPeerConnector`] provides an in-memory link for tests and
//! headless development.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::domain::media::MediaTrack;
use crate::domain::signaling::{IceCandidate, LinkState, SessionDescription};

pub mod mock;

/// Handle to an outgoing track sender attached to a [`PeerLink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SenderId(Uuid);

impl SenderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SenderId {
    fn default() -> Self {
        Self::new()
    }
}

/// Transport configuration: the fixed list of public NAT-traversal relays.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub relay_urls: Vec<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            relay_urls: vec![
                "stun:stun.l.google.com:19302".to_string(),
                "stun:stun1.l.google.com:19302".to_string(),
            ],
        }
    }
}

/// Events emitted by a [`PeerLink`] to the session.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// The remote participant added a track.
    RemoteTrackAdded(MediaTrack),
    /// A local network-path candidate was discovered and must be shipped to
    /// the remote side out of band.
    CandidateDiscovered(IceCandidate),
    /// The underlying connection changed state.
    StateChanged(LinkState),
}

/// Error type for transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("negotiation failed: {0}")]
    Negotiation(String),
    #[error("transport link is closed")]
    Closed,
}

/// Factory for peer links. One link per call.
#[async_trait]
pub trait PeerConnector: Send + Sync {
    /// Opens a new peer link configured with the given relay list, returning
    /// the link together with its event receiver.
    async fn open(
        &self,
        config: &TransportConfig,
    ) -> Result<(Box<dyn PeerLink>, mpsc::Receiver<TransportEvent>), TransportError>;
}

/// A single real-time transport link between two participants.
#[async_trait]
pub trait PeerLink: Send + Sync {
    /// Attaches a local track as an outgoing sender.
    async fn add_sender(&self, track: &MediaTrack) -> Result<SenderId, TransportError>;

    /// Detaches an outgoing sender. Unknown ids are tolerated.
    async fn remove_sender(&self, id: SenderId) -> Result<(), TransportError>;

    /// Creates an offer and applies it as the local description.
    async fn create_offer(&self) -> Result<SessionDescription, TransportError>;

    /// Applies a remote offer, then creates and applies a local answer,
    /// returned for out-of-band transmission.
    async fn accept_offer(
        &self,
        offer: &SessionDescription,
    ) -> Result<SessionDescription, TransportError>;

    /// Completes negotiation on the offering side.
    async fn apply_answer(&self, answer: &SessionDescription) -> Result<(), TransportError>;

    /// Incorporates an externally received network-path candidate. Late and
    /// duplicate candidates are silently tolerated.
    async fn add_remote_candidate(&self, candidate: &IceCandidate) -> Result<(), TransportError>;

    /// Closes the link. Idempotent.
    async fn close(&self);
}
