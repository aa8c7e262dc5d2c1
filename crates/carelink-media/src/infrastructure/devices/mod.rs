//! Capture device infrastructure.
//!
//! The capture hardware (camera, microphone, display) is a singleton resource:
//! only one local media source may be open per call, and the session always
//! releases the old source before opening a new one. The [`MediaDevices`]
//! trait lets unit tests verify that invariant by counting live handles in
//! [`mock::MockMediaDevices`] instead of touching real hardware.
//!
//! A production implementation binds to the platform capture APIs behind this
//! same seam.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::media::{MediaConstraints, MediaTrack};

pub mod mock;

/// Error type for capture operations.
///
/// Device errors are user-facing and never retried automatically: a silent
/// retry could re-prompt the user for permission in a loop.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceAccessError {
    #[error("permission to use the {0} was denied")]
    PermissionDenied(&'static str),
    #[error("no capture device matches the requested constraints: {0}")]
    NoMatchingDevice(String),
    #[error("capture device unavailable: {0}")]
    Unavailable(String),
}

/// Trait abstracting capture hardware.
///
/// All acquisition is asynchronous (the platform may prompt the user).
/// Release is synchronous and infallible: stopping a track that is already
/// stopped is a no-op.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Opens camera and/or microphone tracks per the given constraints.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceAccessError::PermissionDenied`] if the user refused
    /// access, and [`DeviceAccessError::NoMatchingDevice`] if a named device
    /// selector matches nothing (or both kinds are disabled).
    async fn open_user_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Vec<MediaTrack>, DeviceAccessError>;

    /// Opens a display (screen) capture. Yields video only; the microphone
    /// must be re-acquired separately via [`open_user_media`].
    ///
    /// [`open_user_media`]: MediaDevices::open_user_media
    async fn open_display_media(&self) -> Result<Vec<MediaTrack>, DeviceAccessError>;

    /// Stops the track and releases its capture handle.
    fn release(&self, track: &MediaTrack);
}
