//! Mock capture devices for unit testing.
//!
//! Lets tests deny access, name the available devices, and count how many
//! capture handles are open at any moment -- the single-open-source invariant
//! of the session is asserted through that count.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{DeviceAccessError, MediaDevices};
use crate::domain::media::{MediaConstraints, MediaTrack, TrackKind, TrackSelector};

/// A mock implementation of [`MediaDevices`] backed by an in-memory handle set.
pub struct MockMediaDevices {
    deny_user_media: AtomicBool,
    deny_display: AtomicBool,
    known_devices: Vec<String>,
    open_handles: Mutex<HashSet<Uuid>>,
}

impl MockMediaDevices {
    /// Creates a mock with one camera and one microphone available.
    pub fn new() -> Self {
        Self {
            deny_user_media: AtomicBool::new(false),
            deny_display: AtomicBool::new(false),
            known_devices: vec![
                "integrated-camera".to_string(),
                "built-in-microphone".to_string(),
            ],
            open_handles: Mutex::new(HashSet::new()),
        }
    }

    /// Makes subsequent camera/microphone requests fail with
    /// [`DeviceAccessError::PermissionDenied`].
    pub fn set_deny_user_media(&self, deny: bool) {
        self.deny_user_media.store(deny, Ordering::SeqCst);
    }

    /// Makes subsequent display requests fail with
    /// [`DeviceAccessError::PermissionDenied`].
    pub fn set_deny_display(&self, deny: bool) {
        self.deny_display.store(deny, Ordering::SeqCst);
    }

    /// Number of capture handles currently open (tracks acquired and not yet
    /// released).
    pub fn open_handle_count(&self) -> usize {
        self.open_handles.lock().expect("lock poisoned").len()
    }

    fn register(&self, track: &MediaTrack) {
        self.open_handles
            .lock()
            .expect("lock poisoned")
            .insert(track.id);
    }

    fn resolve_label(
        &self,
        selector: &TrackSelector,
        default_label: &str,
    ) -> Result<Option<String>, DeviceAccessError> {
        match selector {
            TrackSelector::Disabled => Ok(None),
            TrackSelector::Default => Ok(Some(default_label.to_string())),
            TrackSelector::Device(name) => {
                if self.known_devices.iter().any(|d| d == name) {
                    Ok(Some(name.clone()))
                } else {
                    Err(DeviceAccessError::NoMatchingDevice(name.clone()))
                }
            }
        }
    }
}

impl Default for MockMediaDevices {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaDevices for MockMediaDevices {
    async fn open_user_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Vec<MediaTrack>, DeviceAccessError> {
        if self.deny_user_media.load(Ordering::SeqCst) {
            return Err(DeviceAccessError::PermissionDenied("camera/microphone"));
        }

        let audio_label = self.resolve_label(&constraints.audio, "built-in-microphone")?;
        let video_label = self.resolve_label(&constraints.video, "integrated-camera")?;
        if audio_label.is_none() && video_label.is_none() {
            return Err(DeviceAccessError::NoMatchingDevice(
                "neither audio nor video requested".to_string(),
            ));
        }

        let mut tracks = Vec::new();
        if let Some(label) = audio_label {
            tracks.push(MediaTrack::new(TrackKind::Audio, label));
        }
        if let Some(label) = video_label {
            tracks.push(MediaTrack::new(TrackKind::Video, label));
        }
        for track in &tracks {
            self.register(track);
        }
        Ok(tracks)
    }

    async fn open_display_media(&self) -> Result<Vec<MediaTrack>, DeviceAccessError> {
        if self.deny_display.load(Ordering::SeqCst) {
            return Err(DeviceAccessError::PermissionDenied("display"));
        }
        let track = MediaTrack::new(TrackKind::Video, "virtual-display");
        self.register(&track);
        Ok(vec![track])
    }

    fn release(&self, track: &MediaTrack) {
        self.open_handles
            .lock()
            .expect("lock poisoned")
            .remove(&track.id);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_constraints_yield_audio_and_video_tracks() {
        // Arrange
        let devices = MockMediaDevices::new();

        // Act
        let tracks = devices
            .open_user_media(&MediaConstraints::default())
            .await
            .unwrap();

        // Assert
        assert_eq!(tracks.len(), 2);
        assert!(tracks.iter().any(|t| t.kind == TrackKind::Audio));
        assert!(tracks.iter().any(|t| t.kind == TrackKind::Video));
        assert_eq!(devices.open_handle_count(), 2);
    }

    #[tokio::test]
    async fn test_denied_user_media_returns_permission_error() {
        // Arrange
        let devices = MockMediaDevices::new();
        devices.set_deny_user_media(true);

        // Act
        let result = devices.open_user_media(&MediaConstraints::default()).await;

        // Assert
        assert!(matches!(
            result,
            Err(DeviceAccessError::PermissionDenied(_))
        ));
        assert_eq!(devices.open_handle_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_device_selector_returns_no_matching_device() {
        // Arrange
        let devices = MockMediaDevices::new();
        let constraints = MediaConstraints {
            audio: TrackSelector::Default,
            video: TrackSelector::Device("usb-capture-card".to_string()),
        };

        // Act
        let result = devices.open_user_media(&constraints).await;

        // Assert
        assert_eq!(
            result,
            Err(DeviceAccessError::NoMatchingDevice(
                "usb-capture-card".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_fully_disabled_constraints_are_rejected() {
        let devices = MockMediaDevices::new();
        let constraints = MediaConstraints {
            audio: TrackSelector::Disabled,
            video: TrackSelector::Disabled,
        };

        let result = devices.open_user_media(&constraints).await;

        assert!(matches!(result, Err(DeviceAccessError::NoMatchingDevice(_))));
    }

    #[tokio::test]
    async fn test_release_closes_the_capture_handle() {
        // Arrange
        let devices = MockMediaDevices::new();
        let tracks = devices
            .open_user_media(&MediaConstraints::audio_only())
            .await
            .unwrap();
        assert_eq!(devices.open_handle_count(), 1);

        // Act
        devices.release(&tracks[0]);

        // Assert
        assert_eq!(devices.open_handle_count(), 0);
    }

    #[tokio::test]
    async fn test_display_capture_yields_a_single_video_track() {
        let devices = MockMediaDevices::new();

        let tracks = devices.open_display_media().await.unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].kind, TrackKind::Video);
        assert_eq!(tracks[0].label, "virtual-display");
    }
}
