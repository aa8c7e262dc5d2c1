//! Signaling artifacts and the per-call state machine.
//!
//! The session never opens a signaling channel itself. Offers, answers, and
//! network-path candidates are plain serde data; the UI layer ships them over
//! whatever out-of-band channel the deployment provides.

use serde::{Deserialize, Serialize};

/// Which half of the offer/answer exchange a description represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionKind {
    Offer,
    Answer,
}

/// A session description produced or consumed during negotiation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: DescriptionKind,
    pub sdp: String,
}

/// A network-path candidate discovered during connectivity checks.
///
/// Candidates can legitimately arrive after some paths are already in use;
/// applying a late or duplicate candidate is always tolerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceCandidate {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_mline_index: Option<u16>,
}

/// Lifecycle of one call, driven by [`CallSession`].
///
/// ```text
/// Idle ─▶ CapturingLocal ─▶ ConnectionEstablishing ─▶ ConnectionActive ─▶ Ended
///                (any state) ──────── end_session ────────▶ Ended
/// ```
///
/// [`CallSession`]: crate::application::call_session::CallSession
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    /// No resources acquired yet.
    Idle,
    /// Local capture is open; no peer connection exists.
    CapturingLocal,
    /// Peer connection created and local tracks attached; waiting for the
    /// remote participant's media.
    ConnectionEstablishing,
    /// At least one remote track has arrived.
    ConnectionActive,
    /// Terminal. All tracks stopped, connection closed.
    Ended,
}

/// Connection-state of the underlying transport link, forwarded to callers
/// for UI status display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
