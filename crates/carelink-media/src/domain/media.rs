//! Media sources, tracks, and capture constraints.
//!
//! The source kind is carried as an explicit tagged variant ([`SourceKind`])
//! rather than being inferred from device labels, so "are we screen sharing"
//! is always a field read and never a string match.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a track carries audio or video samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackKind {
    Audio,
    Video,
}

/// The capture source currently feeding the local media tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Camera plus microphone.
    Camera,
    /// Display capture plus a separately acquired microphone.
    ScreenShare,
}

/// One audio or video track, local or remote.
///
/// `enabled` is the mute toggle: a disabled track stays attached to the
/// session (no renegotiation) but produces no media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTrack {
    pub id: Uuid,
    pub kind: TrackKind,
    /// Device label reported by the capture layer, for UI display only.
    pub label: String,
    pub enabled: bool,
}

impl MediaTrack {
    /// Creates an enabled track with a fresh id.
    pub fn new(kind: TrackKind, label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            label: label.into(),
            enabled: true,
        }
    }
}

/// How a track of a given kind should be captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackSelector {
    /// Do not capture this kind at all.
    Disabled,
    /// Capture from whatever device the platform considers default.
    Default,
    /// Capture from the named device; fails if no such device exists.
    Device(String),
}

impl TrackSelector {
    /// Returns `true` unless the selector is [`TrackSelector::Disabled`].
    pub fn is_requested(&self) -> bool {
        !matches!(self, TrackSelector::Disabled)
    }
}

/// Capture constraints passed to [`MediaDevices::open_user_media`].
///
/// [`MediaDevices::open_user_media`]: crate::infrastructure::devices::MediaDevices::open_user_media
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaConstraints {
    pub audio: TrackSelector,
    pub video: TrackSelector,
}

impl MediaConstraints {
    /// Microphone only, used when re-acquiring audio alongside a display
    /// capture (display capture APIs do not deliver the microphone).
    pub fn audio_only() -> Self {
        Self {
            audio: TrackSelector::Default,
            video: TrackSelector::Disabled,
        }
    }
}

impl Default for MediaConstraints {
    /// Camera plus microphone from the default devices.
    fn default() -> Self {
        Self {
            audio: TrackSelector::Default,
            video: TrackSelector::Default,
        }
    }
}

/// The set of tracks currently captured locally, tagged with their source.
#[derive(Debug, Clone)]
pub struct LocalMediaSource {
    kind: SourceKind,
    tracks: Vec<MediaTrack>,
}

impl LocalMediaSource {
    pub fn new(kind: SourceKind, tracks: Vec<MediaTrack>) -> Self {
        Self { kind, tracks }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// First track of the given kind, if any.
    pub fn track(&self, kind: TrackKind) -> Option<&MediaTrack> {
        self.tracks.iter().find(|t| t.kind == kind)
    }

    /// Mutable access to the first track of the given kind, if any.
    pub fn track_mut(&mut self, kind: TrackKind) -> Option<&mut MediaTrack> {
        self.tracks.iter_mut().find(|t| t.kind == kind)
    }
}

/// The remote participant's tracks, aggregated as they arrive.
#[derive(Debug, Default, Clone)]
pub struct RemoteMediaSource {
    tracks: Vec<MediaTrack>,
}

impl RemoteMediaSource {
    /// Appends a remote track. A track with an already-known id replaces the
    /// stored copy instead of duplicating it.
    pub fn add_track(&mut self, track: MediaTrack) {
        if let Some(existing) = self.tracks.iter_mut().find(|t| t.id == track.id) {
            *existing = track;
        } else {
            self.tracks.push(track);
        }
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
