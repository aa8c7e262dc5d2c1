//! CallSession: the per-call media session state machine.
//!
//! One `CallSession` is constructed per video consultation and dropped when
//! the call ends. All state lives on the instance -- there is no module-level
//! connection state -- so independent calls (and tests) never interfere.
//!
//! # Lifecycle
//!
//! ```text
//! acquire_local_media  ─▶ CapturingLocal
//! create_session       ─▶ ConnectionEstablishing   (local tracks attached)
//! first remote track   ─▶ ConnectionActive
//! end_session          ─▶ Ended                    (idempotent, any state)
//! ```
//!
//! Negotiation (`create_offer` / `accept_offer` / `apply_answer`) and
//! candidate exchange produce and consume plain data; shipping that data to
//! the other participant is the caller's responsibility.
//!
//! # Retries and timeouts
//!
//! No operation retries internally and none carries a timeout. Device errors
//! are surfaced once (an automatic retry could re-prompt the user for
//! permission); a caller that wants a deadline races the returned future
//! against its own timer.

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::media::{
    LocalMediaSource, MediaConstraints, MediaTrack, RemoteMediaSource, SourceKind, TrackKind,
};
use crate::domain::signaling::{CallState, IceCandidate, LinkState, SessionDescription};
use crate::infrastructure::devices::{DeviceAccessError, MediaDevices};
use crate::infrastructure::transport::{
    PeerConnector, PeerLink, SenderId, TransportConfig, TransportError, TransportEvent,
};

const SESSION_EVENT_CAPACITY: usize = 64;

/// Error type for call session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Camera/microphone/display access was denied or no device matched.
    #[error(transparent)]
    DeviceAccess(#[from] DeviceAccessError),
    /// An operation was invoked out of order against the session lifecycle.
    #[error("invalid session state: {0}")]
    InvalidState(String),
    /// A negotiation primitive was called before `create_session`.
    #[error("no active session; call create_session first")]
    NoActiveSession,
    /// The transport rejected a description. Surfaced to the caller; the
    /// session never renegotiates on its own.
    #[error("negotiation failed: {0}")]
    Negotiation(String),
}

impl From<TransportError> for SessionError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Negotiation(msg) => SessionError::Negotiation(msg),
            TransportError::Closed => SessionError::NoActiveSession,
        }
    }
}

/// Outbound events a UI subscribes to via [`CallSession::take_events`].
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The remote participant's track arrived and was added to the aggregate
    /// remote source.
    RemoteTrackAdded(MediaTrack),
    /// A local network-path candidate must be shipped to the remote side.
    CandidateDiscovered(IceCandidate),
    /// Transport connection-state changed; for status display.
    LinkStateChanged(LinkState),
}

/// The media session manager for one call.
pub struct CallSession {
    devices: Arc<dyn MediaDevices>,
    connector: Arc<dyn PeerConnector>,
    config: TransportConfig,
    state: Arc<Mutex<CallState>>,
    local: Option<LocalMediaSource>,
    link: Option<Box<dyn PeerLink>>,
    senders: Vec<SenderId>,
    remote: Arc<Mutex<RemoteMediaSource>>,
    events_tx: mpsc::Sender<SessionEvent>,
    events_rx: Option<mpsc::Receiver<SessionEvent>>,
    pump: Option<JoinHandle<()>>,
}

impl CallSession {
    /// Creates an idle session bound to the given infrastructure seams.
    pub fn new(
        devices: Arc<dyn MediaDevices>,
        connector: Arc<dyn PeerConnector>,
        config: TransportConfig,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel(SESSION_EVENT_CAPACITY);
        Self {
            devices,
            connector,
            config,
            state: Arc::new(Mutex::new(CallState::Idle)),
            local: None,
            link: None,
            senders: Vec::new(),
            remote: Arc::new(Mutex::new(RemoteMediaSource::default())),
            events_tx,
            events_rx: Some(events_rx),
            pump: None,
        }
    }

    /// Takes the outbound event receiver. Yields `Some` exactly once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<SessionEvent>> {
        self.events_rx.take()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CallState {
        *self.state.lock().expect("state lock poisoned")
    }

    /// Kind of the currently open local source, if any.
    pub fn source_kind(&self) -> Option<SourceKind> {
        self.local.as_ref().map(|s| s.kind())
    }

    /// The currently open local source, if any.
    pub fn local_source(&self) -> Option<&LocalMediaSource> {
        self.local.as_ref()
    }

    /// Number of outgoing senders attached to the peer link.
    pub fn sender_count(&self) -> usize {
        self.senders.len()
    }

    /// Number of remote tracks aggregated so far.
    pub fn remote_track_count(&self) -> usize {
        self.remote.lock().expect("remote lock poisoned").track_count()
    }

    /// Whether a peer link currently exists.
    pub fn has_active_link(&self) -> bool {
        self.link.is_some()
    }

    // ── Local capture ─────────────────────────────────────────────────────────

    /// Requests camera/microphone access per `constraints` and installs the
    /// result as the local media source.
    ///
    /// Any previously open source is stopped first -- the capture hardware is
    /// a singleton resource. Callers re-use this after a failed
    /// [`toggle_screen_share`](CallSession::toggle_screen_share) left the
    /// session without local media.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::DeviceAccess`] when permission is denied or no
    /// device matches; the caller must surface this and must not proceed to
    /// connection setup.
    pub async fn acquire_local_media(
        &mut self,
        constraints: &MediaConstraints,
    ) -> Result<&LocalMediaSource, SessionError> {
        if self.state() == CallState::Ended {
            return Err(SessionError::InvalidState(
                "session has already ended".to_string(),
            ));
        }

        if let Some(old) = self.local.take() {
            debug!("stopping previous local source before re-acquiring");
            for track in old.tracks() {
                self.devices.release(track);
            }
        }

        let tracks = self.devices.open_user_media(constraints).await?;
        info!(track_count = tracks.len(), "local media acquired");
        let source = LocalMediaSource::new(SourceKind::Camera, tracks);
        if self.state() == CallState::Idle {
            self.set_state(CallState::CapturingLocal);
        }
        Ok(self.local.insert(source))
    }

    // ── Connection setup ──────────────────────────────────────────────────────

    /// Creates the peer connection, attaches every local track as an outgoing
    /// sender, and starts forwarding transport events.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidState`] if a session already exists or
    /// local media has not been acquired.
    pub async fn create_session(&mut self) -> Result<(), SessionError> {
        if self.link.is_some() {
            return Err(SessionError::InvalidState(
                "a session already exists; end it before creating another".to_string(),
            ));
        }
        if self.state() == CallState::Ended {
            return Err(SessionError::InvalidState(
                "session has already ended".to_string(),
            ));
        }
        let local = self.local.as_ref().ok_or_else(|| {
            SessionError::InvalidState(
                "local media must be acquired before creating a session".to_string(),
            )
        })?;

        let (link, transport_rx) = self.connector.open(&self.config).await?;

        let mut senders = Vec::with_capacity(local.track_count());
        for track in local.tracks() {
            senders.push(link.add_sender(track).await?);
        }

        self.pump = Some(self.spawn_event_pump(transport_rx));
        self.link = Some(link);
        self.senders = senders;
        self.set_state(CallState::ConnectionEstablishing);
        info!(
            sender_count = self.senders.len(),
            "peer session created, local tracks attached"
        );
        Ok(())
    }

    /// Forwards transport events to the session channel and keeps the
    /// aggregate remote source and call state current. Aggregation never
    /// depends on anyone consuming the outbound channel.
    fn spawn_event_pump(
        &self,
        mut transport_rx: mpsc::Receiver<TransportEvent>,
    ) -> JoinHandle<()> {
        let events_tx = self.events_tx.clone();
        let remote = Arc::clone(&self.remote);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            while let Some(event) = transport_rx.recv().await {
                let outbound = match event {
                    TransportEvent::RemoteTrackAdded(track) => {
                        remote
                            .lock()
                            .expect("remote lock poisoned")
                            .add_track(track.clone());
                        let mut st = state.lock().expect("state lock poisoned");
                        if *st == CallState::ConnectionEstablishing {
                            *st = CallState::ConnectionActive;
                            info!("first remote track received, connection active");
                        }
                        SessionEvent::RemoteTrackAdded(track)
                    }
                    TransportEvent::CandidateDiscovered(candidate) => {
                        SessionEvent::CandidateDiscovered(candidate)
                    }
                    TransportEvent::StateChanged(link_state) => {
                        SessionEvent::LinkStateChanged(link_state)
                    }
                };
                if let Err(err) = events_tx.try_send(outbound) {
                    debug!(%err, "session event dropped (no consumer keeping up)");
                }
            }
        })
    }

    // ── Negotiation ───────────────────────────────────────────────────────────

    /// Creates an offer for out-of-band transmission.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveSession`] before `create_session`, or
    /// [`SessionError::Negotiation`] if the transport rejects the request.
    pub async fn create_offer(&self) -> Result<SessionDescription, SessionError> {
        let link = self.active_link()?;
        Ok(link.create_offer().await?)
    }

    /// Applies a remote offer and returns the generated answer for
    /// out-of-band transmission.
    ///
    /// # Errors
    ///
    /// Same as [`create_offer`](CallSession::create_offer), plus
    /// [`SessionError::Negotiation`] for a malformed remote description.
    pub async fn accept_offer(
        &self,
        offer: &SessionDescription,
    ) -> Result<SessionDescription, SessionError> {
        let link = self.active_link()?;
        Ok(link.accept_offer(offer).await?)
    }

    /// Completes negotiation on the offering side.
    pub async fn apply_answer(&self, answer: &SessionDescription) -> Result<(), SessionError> {
        let link = self.active_link()?;
        Ok(link.apply_answer(answer).await?)
    }

    /// Incorporates an externally received network-path candidate.
    ///
    /// Late or duplicate candidates are silently tolerated; candidates can
    /// legitimately arrive after some network paths are already in use.
    pub async fn apply_remote_candidate(
        &self,
        candidate: &IceCandidate,
    ) -> Result<(), SessionError> {
        let link = self.active_link()?;
        Ok(link.add_remote_candidate(candidate).await?)
    }

    // ── Mid-call controls ─────────────────────────────────────────────────────

    /// Flips the enabled state of the local audio track and returns the new
    /// state. Returns `false` without error when no audio track exists.
    pub fn toggle_audio(&mut self) -> bool {
        self.toggle_track(TrackKind::Audio)
    }

    /// Flips the enabled state of the local video track and returns the new
    /// state. Returns `false` without error when no video track exists.
    pub fn toggle_video(&mut self) -> bool {
        self.toggle_track(TrackKind::Video)
    }

    fn toggle_track(&mut self, kind: TrackKind) -> bool {
        match self.local.as_mut().and_then(|s| s.track_mut(kind)) {
            Some(track) => {
                track.enabled = !track.enabled;
                debug!(?kind, enabled = track.enabled, "track toggled");
                track.enabled
            }
            None => false,
        }
    }

    /// Switches the local source between camera and screen share, returning
    /// the new source kind.
    ///
    /// Ordering is deliberate: senders are detached and the old tracks are
    /// stopped *before* the new source is opened, so two capture devices are
    /// never held open at once. Switching to screen share captures the
    /// display and then re-acquires the microphone separately (display
    /// capture APIs do not deliver the microphone) and merges both into one
    /// source. No renegotiation is performed; a caller whose transport
    /// requires a fresh offer after track replacement calls
    /// [`create_offer`](CallSession::create_offer) again.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::DeviceAccess`] if the new source cannot be
    /// acquired. The old source is already stopped at that point: the caller
    /// is left without local media and must
    /// [`acquire_local_media`](CallSession::acquire_local_media) again or end
    /// the call.
    pub async fn toggle_screen_share(&mut self) -> Result<SourceKind, SessionError> {
        if self.link.is_none() {
            return Err(SessionError::NoActiveSession);
        }
        let current_state = self.state();
        if !matches!(
            current_state,
            CallState::ConnectionEstablishing | CallState::ConnectionActive
        ) {
            return Err(SessionError::InvalidState(format!(
                "cannot switch media source in {current_state:?}"
            )));
        }
        let old_source = self.local.take().ok_or_else(|| {
            SessionError::InvalidState("no local media source to switch".to_string())
        })?;
        let old_senders = std::mem::take(&mut self.senders);

        {
            let link = self.active_link()?;
            for id in old_senders {
                link.remove_sender(id).await?;
            }
        }
        for track in old_source.tracks() {
            self.devices.release(track);
        }

        let new_source = match old_source.kind() {
            SourceKind::Camera => self.open_screen_share_source().await,
            SourceKind::ScreenShare => self.open_camera_source().await,
        };
        let new_source = match new_source {
            Ok(source) => source,
            Err(err) => {
                // The old source is already stopped; the caller must
                // re-acquire local media or end the call.
                warn!(%err, "source switch failed, session left without local media");
                return Err(err);
            }
        };

        let new_kind = new_source.kind();
        let mut attached = Vec::with_capacity(new_source.track_count());
        {
            let link = self.active_link()?;
            for track in new_source.tracks() {
                match link.add_sender(track).await {
                    Ok(id) => attached.push(id),
                    Err(err) => {
                        for id in attached.drain(..) {
                            let _ = link.remove_sender(id).await;
                        }
                        for t in new_source.tracks() {
                            self.devices.release(t);
                        }
                        return Err(err.into());
                    }
                }
            }
        }
        self.senders = attached;
        self.local = Some(new_source);
        info!(?new_kind, "local media source switched");
        Ok(new_kind)
    }

    // ── Teardown ──────────────────────────────────────────────────────────────

    /// Stops every local track, closes the peer link, and discards the
    /// aggregate remote source. Idempotent: calling this in `Idle` or `Ended`
    /// is a no-op, and partial setups (local media without a session) are
    /// torn down cleanly.
    pub async fn end_session(&mut self) {
        if matches!(self.state(), CallState::Idle | CallState::Ended) {
            return;
        }

        if let Some(local) = self.local.take() {
            for track in local.tracks() {
                self.devices.release(track);
            }
        }
        if let Some(link) = self.link.take() {
            link.close().await;
        }
        self.senders.clear();
        self.remote.lock().expect("remote lock poisoned").clear();
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        self.set_state(CallState::Ended);
        info!("call session ended");
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn active_link(&self) -> Result<&dyn PeerLink, SessionError> {
        self.link.as_deref().ok_or(SessionError::NoActiveSession)
    }

    fn set_state(&self, state: CallState) {
        *self.state.lock().expect("state lock poisoned") = state;
    }

    async fn open_screen_share_source(&self) -> Result<LocalMediaSource, SessionError> {
        let mut tracks = self.devices.open_display_media().await?;
        // Display capture carries no microphone; acquire it separately and
        // merge both into one source.
        match self
            .devices
            .open_user_media(&MediaConstraints::audio_only())
            .await
        {
            Ok(mic) => tracks.extend(mic),
            Err(err) => {
                for track in &tracks {
                    self.devices.release(track);
                }
                return Err(err.into());
            }
        }
        Ok(LocalMediaSource::new(SourceKind::ScreenShare, tracks))
    }

    async fn open_camera_source(&self) -> Result<LocalMediaSource, SessionError> {
        let tracks = self
            .devices
            .open_user_media(&MediaConstraints::default())
            .await?;
        Ok(LocalMediaSource::new(SourceKind::Camera, tracks))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::devices::mock::MockMediaDevices;
    use crate::infrastructure::transport::mock::MockPeerConnector;

    fn make_session() -> (CallSession, Arc<MockMediaDevices>, Arc<MockPeerConnector>) {
        let devices = Arc::new(MockMediaDevices::new());
        let connector = Arc::new(MockPeerConnector::new());
        let session = CallSession::new(
            Arc::clone(&devices) as Arc<dyn MediaDevices>,
            Arc::clone(&connector) as Arc<dyn PeerConnector>,
            TransportConfig::default(),
        );
        (session, devices, connector)
    }

    async fn make_established_session(
    ) -> (CallSession, Arc<MockMediaDevices>, Arc<MockPeerConnector>) {
        let (mut session, devices, connector) = make_session();
        session
            .acquire_local_media(&MediaConstraints::default())
            .await
            .unwrap();
        session.create_session().await.unwrap();
        (session, devices, connector)
    }

    // ── Local capture ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_acquire_local_media_moves_to_capturing_state() {
        let (mut session, devices, _) = make_session();

        let source = session
            .acquire_local_media(&MediaConstraints::default())
            .await
            .unwrap();

        assert_eq!(source.track_count(), 2);
        assert_eq!(session.state(), CallState::CapturingLocal);
        assert_eq!(devices.open_handle_count(), 2);
    }

    #[tokio::test]
    async fn test_acquire_local_media_surfaces_device_denial() {
        // Arrange
        let (mut session, devices, _) = make_session();
        devices.set_deny_user_media(true);

        // Act
        let result = session
            .acquire_local_media(&MediaConstraints::default())
            .await;

        // Assert – denial is surfaced and the session stays idle
        assert!(matches!(result, Err(SessionError::DeviceAccess(_))));
        assert_eq!(session.state(), CallState::Idle);
        assert_eq!(devices.open_handle_count(), 0);
    }

    #[tokio::test]
    async fn test_reacquiring_local_media_stops_the_previous_source() {
        // Arrange
        let (mut session, devices, _) = make_session();
        session
            .acquire_local_media(&MediaConstraints::default())
            .await
            .unwrap();
        assert_eq!(devices.open_handle_count(), 2);

        // Act
        session
            .acquire_local_media(&MediaConstraints::audio_only())
            .await
            .unwrap();

        // Assert – only the new source's handle remains open
        assert_eq!(devices.open_handle_count(), 1);
    }

    // ── Session creation ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_create_session_requires_local_media() {
        let (mut session, _, _) = make_session();

        let result = session.create_session().await;

        assert!(matches!(result, Err(SessionError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_second_create_session_fails_with_invalid_state() {
        // Arrange
        let (mut session, _, _) = make_established_session().await;

        // Act
        let result = session.create_session().await;

        // Assert
        assert!(matches!(result, Err(SessionError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_create_session_attaches_all_local_tracks_as_senders() {
        let (session, _, connector) = make_established_session().await;

        assert_eq!(session.sender_count(), 2);
        assert_eq!(connector.last_handle().unwrap().sender_count(), 2);
        assert_eq!(session.state(), CallState::ConnectionEstablishing);
    }

    // ── Negotiation ordering ──────────────────────────────────────────────────

    #[tokio::test]
    async fn test_negotiation_before_create_session_fails_with_no_active_session() {
        let (mut session, _, _) = make_session();
        session
            .acquire_local_media(&MediaConstraints::default())
            .await
            .unwrap();

        let offer = SessionDescription {
            kind: crate::domain::signaling::DescriptionKind::Offer,
            sdp: "v=0".to_string(),
        };
        let candidate = IceCandidate {
            candidate: "candidate:1".to_string(),
            sdp_mid: None,
            sdp_mline_index: None,
        };

        assert!(matches!(
            session.create_offer().await,
            Err(SessionError::NoActiveSession)
        ));
        assert!(matches!(
            session.accept_offer(&offer).await,
            Err(SessionError::NoActiveSession)
        ));
        assert!(matches!(
            session.apply_remote_candidate(&candidate).await,
            Err(SessionError::NoActiveSession)
        ));
    }

    #[tokio::test]
    async fn test_negotiation_failure_propagates_without_retry() {
        // Arrange
        let (session, _, connector) = make_established_session().await;
        connector.last_handle().unwrap().set_fail_negotiation(true);

        // Act
        let result = session.create_offer().await;

        // Assert
        assert!(matches!(result, Err(SessionError::Negotiation(_))));
    }

    // ── Mute toggles ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_toggle_sequence_reports_latest_state_and_keeps_track_count() {
        // Arrange
        let (mut session, _, _) = make_established_session().await;
        let tracks_before = session.local_source().unwrap().track_count();

        // Act / Assert – each call reports the new enabled state
        assert!(!session.toggle_audio());
        assert!(session.toggle_audio());
        assert!(!session.toggle_audio());
        assert!(!session.toggle_video());
        assert!(session.toggle_video());

        // Track count never changes
        assert_eq!(session.local_source().unwrap().track_count(), tracks_before);
    }

    #[tokio::test]
    async fn test_toggle_without_matching_track_returns_false() {
        // Arrange – audio-only source, so there is no video track
        let (mut session, _, _) = make_session();
        session
            .acquire_local_media(&MediaConstraints::audio_only())
            .await
            .unwrap();

        // Act / Assert
        assert!(!session.toggle_video());
        // And with no source at all
        let (mut idle, _, _) = make_session();
        assert!(!idle.toggle_audio());
    }

    // ── Screen share ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_toggle_screen_share_switches_source_and_merges_microphone() {
        // Arrange
        let (mut session, devices, _) = make_established_session().await;
        assert_eq!(session.source_kind(), Some(SourceKind::Camera));

        // Act
        let kind = session.toggle_screen_share().await.unwrap();

        // Assert – display video plus re-acquired microphone
        assert_eq!(kind, SourceKind::ScreenShare);
        let source = session.local_source().unwrap();
        assert_eq!(source.track_count(), 2);
        assert!(source.track(TrackKind::Video).unwrap().label.contains("display"));
        assert!(source.track(TrackKind::Audio).is_some());
        // No handle from the camera source leaked
        assert_eq!(devices.open_handle_count(), 2);
    }

    #[tokio::test]
    async fn test_toggle_screen_share_requires_an_active_session() {
        let (mut session, _, _) = make_session();
        session
            .acquire_local_media(&MediaConstraints::default())
            .await
            .unwrap();

        let result = session.toggle_screen_share().await;

        assert!(matches!(result, Err(SessionError::NoActiveSession)));
    }

    #[tokio::test]
    async fn test_failed_screen_share_leaves_session_without_local_media() {
        // Arrange
        let (mut session, devices, connector) = make_established_session().await;
        devices.set_deny_display(true);

        // Act
        let result = session.toggle_screen_share().await;

        // Assert – the old source was already stopped when acquisition failed
        assert!(matches!(result, Err(SessionError::DeviceAccess(_))));
        assert!(session.local_source().is_none());
        assert_eq!(session.sender_count(), 0);
        assert_eq!(devices.open_handle_count(), 0);
        assert_eq!(connector.last_handle().unwrap().sender_count(), 0);

        // Recovery path: re-acquire and re-attach by creating nothing new --
        // local media alone is enough to keep the call going.
        devices.set_deny_display(false);
        session
            .acquire_local_media(&MediaConstraints::default())
            .await
            .unwrap();
        assert_eq!(devices.open_handle_count(), 2);
    }

    // ── Teardown ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_end_session_is_idempotent() {
        // Arrange
        let (mut session, devices, connector) = make_established_session().await;

        // Act – call three times
        session.end_session().await;
        session.end_session().await;
        session.end_session().await;

        // Assert – same observable effect as calling once
        assert_eq!(session.state(), CallState::Ended);
        assert_eq!(devices.open_handle_count(), 0);
        assert!(connector.last_handle().unwrap().is_closed());
        assert!(!session.has_active_link());
        assert_eq!(session.remote_track_count(), 0);
    }

    #[tokio::test]
    async fn test_end_session_in_idle_is_a_no_op() {
        let (mut session, _, _) = make_session();

        session.end_session().await;

        assert_eq!(session.state(), CallState::Idle);
    }

    #[tokio::test]
    async fn test_end_session_tolerates_partial_setup() {
        // Arrange – local media but no peer session
        let (mut session, devices, _) = make_session();
        session
            .acquire_local_media(&MediaConstraints::default())
            .await
            .unwrap();

        // Act
        session.end_session().await;

        // Assert
        assert_eq!(session.state(), CallState::Ended);
        assert_eq!(devices.open_handle_count(), 0);
    }

    #[tokio::test]
    async fn test_operations_after_end_are_rejected() {
        let (mut session, _, _) = make_established_session().await;
        session.end_session().await;

        assert!(matches!(
            session
                .acquire_local_media(&MediaConstraints::default())
                .await,
            Err(SessionError::InvalidState(_))
        ));
        assert!(matches!(
            session.create_session().await,
            Err(SessionError::InvalidState(_))
        ));
        assert!(matches!(
            session.create_offer().await,
            Err(SessionError::NoActiveSession)
        ));
    }

    // ── Event forwarding ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_discovered_candidates_are_forwarded_to_the_caller() {
        // Arrange
        let (mut session, _, connector) = make_established_session().await;
        let mut events = session.take_events().unwrap();
        let handle = connector.last_handle().unwrap();

        // Act
        handle
            .inject_candidate(IceCandidate {
                candidate: "candidate:1 1 udp 1 10.0.0.5 50000 typ host".to_string(),
                sdp_mid: Some("0".to_string()),
                sdp_mline_index: Some(0),
            })
            .await;

        // Assert
        assert!(matches!(
            events.recv().await,
            Some(SessionEvent::CandidateDiscovered(_))
        ));
    }

    #[tokio::test]
    async fn test_take_events_yields_the_receiver_only_once() {
        let (mut session, _, _) = make_session();

        assert!(session.take_events().is_some());
        assert!(session.take_events().is_none());
    }
}
