//! # carelink-media
//!
//! Media session lifecycle for CareLink video consultations.
//!
//! This crate owns everything between "the patient clicked *Join call*" and
//! "the call ended": acquiring the local camera/microphone, setting up a
//! single peer connection, assembling the remote participant's tracks, and
//! switching the outgoing source between camera and screen share mid-call.
//!
//! It deliberately owns **no signaling transport**: session descriptions and
//! network-path candidates are surfaced as plain data and the caller is
//! responsible for exchanging them over whatever channel the deployment uses.
//!
//! # Layering
//!
//! - **`domain`** – pure vocabulary: tracks, sources, session descriptions,
//!   call states. No I/O, no async.
//! - **`infrastructure`** – the trait seams to the outside world
//!   ([`MediaDevices`](infrastructure::devices::MediaDevices) for capture
//!   hardware, [`PeerConnector`](infrastructure::transport::PeerConnector)
//!   for the real-time transport) plus mock implementations used by tests
//!   and headless development.
//! - **`application`** – [`CallSession`], the per-call state machine that
//!   orchestrates the two seams.

pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export the most-used types at the crate root so callers can write
// `carelink_media::CallSession` instead of the full module path.
pub use application::call_session::{CallSession, SessionError, SessionEvent};
pub use domain::media::{
    LocalMediaSource, MediaConstraints, MediaTrack, RemoteMediaSource, SourceKind, TrackKind,
    TrackSelector,
};
pub use domain::signaling::{
    CallState, DescriptionKind, IceCandidate, LinkState, SessionDescription,
};
pub use infrastructure::devices::DeviceAccessError;
pub use infrastructure::transport::{TransportConfig, TransportError, TransportEvent};
