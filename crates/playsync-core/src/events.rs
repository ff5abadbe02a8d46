//! Typed server-push event vocabulary.
//!
//! The push channel surfaces raw `(kind, data)` frames; [`PushEvent::parse`]
//! converts them into the typed vocabulary the dispatchers consume. Events
//! are independent per kind — there is no cross-kind ordering guarantee,
//! only arrival order within a kind.
//!
//! [`Notification`] is deliberately the *single* user-visible reporting
//! path: server-pushed toast fragments and client-synthesized failures
//! (request timeouts) both travel through it, so the notification region
//! renders them identically.

use serde::{Deserialize, Serialize};

/// Refreshable UI region kinds an element can declare interest in.
///
/// Elements carrying an interest attribute for one of these kinds are
/// re-triggered through the view bridge whenever the matching event
/// arrives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// Playback status changed (play/pause/buffering widgets).
    Status,
    /// The queue/tracklist changed (track lists, now-playing panels).
    Tracklist,
}

impl RegionKind {
    /// Attribute value elements use to declare interest in this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Tracklist => "tracklist",
        }
    }
}

/// Playback state carried by `status` events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// Actively playing.
    Playing,
    /// Paused.
    Paused,
    /// Stream opening or rebuffering.
    Buffering,
}

impl PlaybackStatus {
    fn parse(data: &str) -> Option<Self> {
        match data {
            "play" => Some(Self::Playing),
            "pause" => Some(Self::Paused),
            "buffering" => Some(Self::Buffering),
            _ => None,
        }
    }
}

/// Severity of a user-visible notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// Operation failed; user attention required.
    Error,
    /// Degraded but recoverable.
    Warn,
    /// Operation completed.
    Success,
    /// Informational.
    Info,
}

impl NotificationLevel {
    /// Event kind name for the server-pushed variant of this level.
    pub fn event_kind(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Success => "success",
            Self::Info => "info",
        }
    }

    fn from_event_kind(kind: &str) -> Option<Self> {
        match kind {
            "error" => Some(Self::Error),
            "warn" => Some(Self::Warn),
            "success" => Some(Self::Success),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

/// A user-visible notification, prepended into the shared notification
/// region.
///
/// Server-pushed notifications carry a pre-rendered markup fragment and no
/// status. Client-synthesized failures (request timeouts) carry a plain
/// message plus an HTTP-equivalent status so they render through the same
/// path as server-reported errors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Rendered fragment or plain message body.
    pub body: String,
    /// HTTP-equivalent status for synthesized failures (408 for timeouts).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl Notification {
    /// Server-pushed notification from a markup fragment.
    pub fn pushed(level: NotificationLevel, body: impl Into<String>) -> Self {
        Self {
            level,
            body: body.into(),
            status: None,
        }
    }

    /// Client-synthesized request failure with an HTTP-equivalent status.
    pub fn request_failed(status: u16, body: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            body: body.into(),
            status: Some(status),
        }
    }
}

/// Typed server-push events, parsed from raw transport frames.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushEvent {
    /// Server state changed incompatibly with incremental sync; the whole
    /// view must be reloaded.
    Reload,
    /// Playback status changed. Dispatch refreshes status regions; the
    /// payload is preserved for listeners that render it directly.
    Status {
        /// New playback state.
        status: PlaybackStatus,
    },
    /// The tracklist changed. Dispatch refreshes tracklist regions and the
    /// derived backdrop element.
    Tracklist,
    /// Authoritative volume changed.
    Volume {
        /// Volume in percent, 0-100.
        percent: u32,
    },
    /// Authoritative playback position changed.
    Position {
        /// Position in milliseconds.
        millis: u64,
    },
    /// A user-visible notification fragment.
    Notify {
        /// The notification to prepend.
        notification: Notification,
    },
}

impl PushEvent {
    /// Parse a raw `(kind, data)` transport frame into a typed event.
    ///
    /// Unknown kinds and unparsable payloads are errors; callers log and
    /// drop them rather than propagating (a malformed frame must never kill
    /// the channel).
    pub fn parse(kind: &str, data: &str) -> crate::Result<Self> {
        let malformed = || crate::SyncError::MalformedEvent {
            kind: kind.to_string(),
            data: data.to_string(),
        };
        match kind {
            "reload" => Ok(Self::Reload),
            "status" => PlaybackStatus::parse(data)
                .map(|status| Self::Status { status })
                .ok_or_else(malformed),
            "tracklist" => Ok(Self::Tracklist),
            "volume" => data
                .trim()
                .parse::<u32>()
                .map(|percent| Self::Volume { percent })
                .map_err(|_| malformed()),
            "position" => data
                .trim()
                .parse::<u64>()
                .map(|millis| Self::Position { millis })
                .map_err(|_| malformed()),
            _ => NotificationLevel::from_event_kind(kind)
                .map(|level| Self::Notify {
                    notification: Notification::pushed(level, data),
                })
                .ok_or_else(|| crate::SyncError::UnknownEventKind(kind.to_string())),
        }
    }

    /// Event kind discriminator, matching the transport-level event name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Reload => "reload",
            Self::Status { .. } => "status",
            Self::Tracklist => "tracklist",
            Self::Volume { .. } => "volume",
            Self::Position { .. } => "position",
            Self::Notify { notification } => notification.level.event_kind(),
        }
    }
}
