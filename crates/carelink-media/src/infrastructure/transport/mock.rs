//! In-memory peer transport for unit testing.
//!
//! [`MockPeerConnector`] hands out [`MockPeerLink`]s that negotiate synthetic
//! session descriptions without any network I/O. Each opened link also
//! produces a [`MockLinkHandle`] through which tests play the remote side:
//! injecting tracks, candidates, and connection-state changes, or forcing
//! negotiation to fail.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{
    PeerConnector, PeerLink, SenderId, TransportConfig, TransportError, TransportEvent,
};
use crate::domain::media::MediaTrack;
use crate::domain::signaling::{
    DescriptionKind, IceCandidate, LinkState, SessionDescription,
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Default)]
struct LinkShared {
    senders: Vec<(SenderId, MediaTrack)>,
    local_description: Option<SessionDescription>,
    remote_description: Option<SessionDescription>,
    applied_candidates: Vec<IceCandidate>,
    fail_negotiation: bool,
    closed: bool,
}

/// Remote-side control handle for one opened [`MockPeerLink`].
#[derive(Clone)]
pub struct MockLinkHandle {
    shared: Arc<Mutex<LinkShared>>,
    events: mpsc::Sender<TransportEvent>,
}

impl MockLinkHandle {
    /// Simulates the remote participant adding a track.
    pub async fn inject_remote_track(&self, track: MediaTrack) {
        let _ = self
            .events
            .send(TransportEvent::RemoteTrackAdded(track))
            .await;
    }

    /// Simulates a locally discovered network-path candidate.
    pub async fn inject_candidate(&self, candidate: IceCandidate) {
        let _ = self
            .events
            .send(TransportEvent::CandidateDiscovered(candidate))
            .await;
    }

    /// Simulates a connection-state change.
    pub async fn set_link_state(&self, state: LinkState) {
        let _ = self.events.send(TransportEvent::StateChanged(state)).await;
    }

    /// Makes subsequent negotiation calls fail.
    pub fn set_fail_negotiation(&self, fail: bool) {
        self.shared.lock().expect("lock poisoned").fail_negotiation = fail;
    }

    /// Number of senders currently attached to the link.
    pub fn sender_count(&self) -> usize {
        self.shared.lock().expect("lock poisoned").senders.len()
    }

    /// Number of remote candidates applied so far (duplicates included).
    pub fn applied_candidate_count(&self) -> usize {
        self.shared
            .lock()
            .expect("lock poisoned")
            .applied_candidates
            .len()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().expect("lock poisoned").closed
    }

    pub fn local_description(&self) -> Option<SessionDescription> {
        self.shared
            .lock()
            .expect("lock poisoned")
            .local_description
            .clone()
    }

    pub fn remote_description(&self) -> Option<SessionDescription> {
        self.shared
            .lock()
            .expect("lock poisoned")
            .remote_description
            .clone()
    }
}

/// A mock implementation of [`PeerLink`].
pub struct MockPeerLink {
    shared: Arc<Mutex<LinkShared>>,
    events: mpsc::Sender<TransportEvent>,
}

#[async_trait]
impl PeerLink for MockPeerLink {
    async fn add_sender(&self, track: &MediaTrack) -> Result<SenderId, TransportError> {
        let mut shared = self.shared.lock().expect("lock poisoned");
        if shared.closed {
            return Err(TransportError::Closed);
        }
        let id = SenderId::new();
        shared.senders.push((id, track.clone()));
        Ok(id)
    }

    async fn remove_sender(&self, id: SenderId) -> Result<(), TransportError> {
        let mut shared = self.shared.lock().expect("lock poisoned");
        if shared.closed {
            return Err(TransportError::Closed);
        }
        shared.senders.retain(|(sid, _)| *sid != id);
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription, TransportError> {
        let mut shared = self.shared.lock().expect("lock poisoned");
        if shared.closed {
            return Err(TransportError::Closed);
        }
        if shared.fail_negotiation {
            return Err(TransportError::Negotiation(
                "offer generation failed".to_string(),
            ));
        }
        let offer = SessionDescription {
            kind: DescriptionKind::Offer,
            sdp: format!("v=0 mock-offer {}", Uuid::new_v4()),
        };
        shared.local_description = Some(offer.clone());
        Ok(offer)
    }

    async fn accept_offer(
        &self,
        offer: &SessionDescription,
    ) -> Result<SessionDescription, TransportError> {
        let mut shared = self.shared.lock().expect("lock poisoned");
        if shared.closed {
            return Err(TransportError::Closed);
        }
        if shared.fail_negotiation {
            return Err(TransportError::Negotiation(
                "answer generation failed".to_string(),
            ));
        }
        if offer.kind != DescriptionKind::Offer {
            return Err(TransportError::Negotiation(
                "remote description is not an offer".to_string(),
            ));
        }
        shared.remote_description = Some(offer.clone());
        let answer = SessionDescription {
            kind: DescriptionKind::Answer,
            sdp: format!("v=0 mock-answer {}", Uuid::new_v4()),
        };
        shared.local_description = Some(answer.clone());
        Ok(answer)
    }

    async fn apply_answer(&self, answer: &SessionDescription) -> Result<(), TransportError> {
        let mut shared = self.shared.lock().expect("lock poisoned");
        if shared.closed {
            return Err(TransportError::Closed);
        }
        if answer.kind != DescriptionKind::Answer {
            return Err(TransportError::Negotiation(
                "remote description is not an answer".to_string(),
            ));
        }
        if shared.local_description.as_ref().map(|d| d.kind) != Some(DescriptionKind::Offer) {
            return Err(TransportError::Negotiation(
                "no local offer to pair the answer with".to_string(),
            ));
        }
        shared.remote_description = Some(answer.clone());
        Ok(())
    }

    async fn add_remote_candidate(&self, candidate: &IceCandidate) -> Result<(), TransportError> {
        // Late and duplicate candidates are tolerated even on a closed link.
        self.shared
            .lock()
            .expect("lock poisoned")
            .applied_candidates
            .push(candidate.clone());
        Ok(())
    }

    async fn close(&self) {
        let already_closed = {
            let mut shared = self.shared.lock().expect("lock poisoned");
            std::mem::replace(&mut shared.closed, true)
        };
        if !already_closed {
            let _ = self
                .events
                .send(TransportEvent::StateChanged(LinkState::Closed))
                .await;
        }
    }
}

/// A mock implementation of [`PeerConnector`].
///
/// Remembers the handle of the most recently opened link so tests can drive
/// the remote side after the session has taken ownership of the link.
#[derive(Default)]
pub struct MockPeerConnector {
    last_handle: Mutex<Option<MockLinkHandle>>,
}

impl MockPeerConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for the most recently opened link.
    pub fn last_handle(&self) -> Option<MockLinkHandle> {
        self.last_handle.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl PeerConnector for MockPeerConnector {
    async fn open(
        &self,
        _config: &TransportConfig,
    ) -> Result<(Box<dyn PeerLink>, mpsc::Receiver<TransportEvent>), TransportError> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let shared = Arc::new(Mutex::new(LinkShared::default()));
        let handle = MockLinkHandle {
            shared: Arc::clone(&shared),
            events: tx.clone(),
        };
        *self.last_handle.lock().expect("lock poisoned") = Some(handle);
        let link = MockPeerLink { shared, events: tx };
        Ok((Box::new(link), rx))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
