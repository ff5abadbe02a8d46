//! # playsync-channel
//!
//! The server-push side of the playsync coordinator.
//!
//! [`manager::PushChannelManager`] owns the single push-channel connection
//! and its open/close/teardown policy; [`transport::PushTransport`] is the
//! wire seam (SSE over reqwest in production, scripted streams in tests);
//! [`dispatch::PushDispatcher`] maps typed events onto view effects; and
//! [`refresh::ViewRefreshBridge`] re-triggers the document regions that
//! declared interest in an event kind.
//!
//! Reconnection is opportunistic, never timer-driven: a dropped channel
//! clears the singleton slot and waits for the next external
//! `ensure_open` (document visibility regain, reload, initial load).

#![deny(unsafe_code)]

pub mod dispatch;
pub mod manager;
pub mod refresh;
pub mod transport;

pub use dispatch::{PushDispatcher, RemoteValueSink};
pub use manager::{ChannelState, PushChannelManager};
pub use refresh::{REFRESH_EVENT, ViewRefreshBridge};
pub use transport::{FrameStream, PushFrame, PushTransport, SseTransport};
