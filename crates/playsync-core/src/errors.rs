//! Error taxonomy for the playsync crates.
//!
//! Failure policy: no error here is fatal to the page. Channel failures are
//! silent (the system degrades to refresh-on-demand until the next re-init),
//! request timeouts surface exactly once through the notification region,
//! and cancellation races are swallowed at the call site.

use thiserror::Error;

/// Convenience result alias used across the playsync crates.
pub type Result<T, E = SyncError> = std::result::Result<T, E>;

/// Errors produced by the synchronization core.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The push channel could not be constructed. Leaves the channel in the
    /// Absent state; the next `ensure_open` call retries.
    #[error("push channel connect failed: {0}")]
    ChannelConnect(String),

    /// The transport reported terminal closure of an open channel.
    #[error("push channel closed by transport")]
    ChannelClosed,

    /// A request's 30-second watchdog fired before its completion hook.
    /// Surfaced to the user as a synthesized 408-equivalent notification.
    #[error("request to {path} failed: no response within {seconds}s")]
    RequestTimeout {
        /// Normalized destination path of the timed-out request.
        path: String,
        /// Watchdog duration in whole seconds.
        seconds: u64,
    },

    /// A push event arrived with a payload that does not parse.
    #[error("malformed `{kind}` event payload: {data:?}")]
    MalformedEvent {
        /// Event kind name as surfaced by the transport.
        kind: String,
        /// Raw payload string.
        data: String,
    },

    /// The transport surfaced an event kind this core does not consume.
    #[error("unknown push event kind: {0:?}")]
    UnknownEventKind(String),
}

impl SyncError {
    /// HTTP-equivalent status code for errors that surface as user-visible
    /// request failures. Only timeouts carry one (408).
    pub fn status_equivalent(&self) -> Option<u16> {
        match self {
            Self::RequestTimeout { .. } => Some(408),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_path_and_duration() {
        let err = SyncError::RequestTimeout {
            path: "/tracks".into(),
            seconds: 30,
        };
        let msg = err.to_string();
        assert!(msg.contains("/tracks"));
        assert!(msg.contains("30s"));
    }

    #[test]
    fn timeout_maps_to_408() {
        let err = SyncError::RequestTimeout {
            path: "/".into(),
            seconds: 30,
        };
        assert_eq!(err.status_equivalent(), Some(408));
    }

    #[test]
    fn non_timeout_has_no_status() {
        assert_eq!(SyncError::ChannelClosed.status_equivalent(), None);
        assert_eq!(
            SyncError::ChannelConnect("refused".into()).status_equivalent(),
            None
        );
    }
}
