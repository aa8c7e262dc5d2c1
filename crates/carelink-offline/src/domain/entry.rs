//! Pending writes and their store partitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Partition reserved for locally cached user data (profile, dashboards).
/// Read/written by the UI shell; the worker only guarantees it exists.
pub const CACHED_USER_DATA_PARTITION: &str = "cached-user-data";

/// The kind of user action a pending write represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteKind {
    Appointment,
    Message,
}

impl WriteKind {
    /// Store partition holding queued writes of this kind.
    pub fn partition(&self) -> &'static str {
        match self {
            WriteKind::Appointment => "pending-appointments",
            WriteKind::Message => "pending-messages",
        }
    }

    /// Background-sync tag the host uses to trigger replay of this kind.
    pub fn sync_tag(&self) -> &'static str {
        match self {
            WriteKind::Appointment => "sync-appointments",
            WriteKind::Message => "sync-messages",
        }
    }

    /// Maps a host sync tag back to the write kind, if recognised.
    pub fn from_sync_tag(tag: &str) -> Option<Self> {
        match tag {
            "sync-appointments" => Some(WriteKind::Appointment),
            "sync-messages" => Some(WriteKind::Message),
            _ => None,
        }
    }
}

/// One not-yet-synced outbound action.
///
/// Created when a network write fails (or connectivity is absent), deleted
/// only after a confirmed successful remote replay, never mutated otherwise.
/// `id` is unique per partition; re-enqueueing the same id overwrites, so at
/// most one pending copy of a logical item exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingWrite {
    pub id: String,
    pub kind: WriteKind,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl PendingWrite {
    /// Creates an entry stamped with the current time.
    pub fn new(id: impl Into<String>, kind: WriteKind, payload: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            kind,
            payload,
            created_at: Utc::now(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
