//! The push-channel wire seam.
//!
//! A transport hands back a stream of raw `(kind, data)` frames per
//! connection. The production transport is server-sent events over
//! reqwest; tests substitute scripted in-memory streams.

use std::pin::Pin;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use playsync_core::{Result, SyncError};
use tracing::debug;
use url::Url;

/// One raw event frame as surfaced by the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushFrame {
    /// Event kind name (`reload`, `status`, `volume`, ...).
    pub kind: String,
    /// Raw payload line(s).
    pub data: String,
}

/// A live channel: frames in arrival order. An `Err` item is terminal —
/// the reader tears the channel down when it sees one.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<PushFrame>> + Send>>;

/// Connection factory for the push channel.
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Open a fresh channel. Construction failures are recoverable: the
    /// manager stays Absent and retries on the next external re-init.
    async fn connect(&self) -> Result<FrameStream>;
}

/// Server-sent-events transport over reqwest.
pub struct SseTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl SseTransport {
    /// Transport for the given SSE endpoint.
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Transport reusing an existing client (connection pooling with the
    /// rest of the application).
    pub fn with_client(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl PushTransport for SseTransport {
    async fn connect(&self) -> Result<FrameStream> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .header("accept", "text/event-stream")
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| SyncError::ChannelConnect(e.to_string()))?;

        debug!(endpoint = %self.endpoint, "push channel connected");

        let frames = response.bytes_stream().eventsource().map(|item| {
            item.map(|event| PushFrame {
                kind: event.event,
                data: event.data,
            })
            .map_err(|_| SyncError::ChannelClosed)
        });
        Ok(Box::pin(frames))
    }
}
