//! # playsync
//!
//! Facade crate for the playsync live-state coordinator.
//!
//! A [`Coordinator`] is constructed once at startup and owns the whole
//! subsystem: the push-channel manager, the request-lifecycle registry,
//! and the two interactive range controls. Handlers receive it by
//! reference instead of reaching for ambient globals, and
//! [`Coordinator::teardown`] gives shutdown and tests a clean exit.
//!
//! ```ignore
//! let settings = Settings::load(None);
//! let transport = Arc::new(SseTransport::new(settings.sse_url()?));
//! let coordinator = Coordinator::new(driver, transport, progress, volume, &settings);
//! coordinator.startup().await;
//! ```

#![deny(unsafe_code)]

pub mod coordinator;
pub mod settings;

pub use coordinator::{Coordinator, RangeControls};
pub use settings::{Settings, SettingsError};

pub use playsync_channel::{
    ChannelState, FrameStream, PushChannelManager, PushDispatcher, PushFrame, PushTransport,
    REFRESH_EVENT, RemoteValueSink, SseTransport, ViewRefreshBridge,
};
pub use playsync_controls::{RangeController, RangeSurface};
pub use playsync_core::{
    ElementId, Notification, NotificationLevel, PlaybackStatus, PushEvent, RegionKind,
    RegionTarget, SyncError, ViewDriver, logging::init_tracing,
};
pub use playsync_requests::{
    CancelReason, RequestKey, RequestLifecycleRegistry, SwapDecision,
};
