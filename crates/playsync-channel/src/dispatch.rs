//! Typed event dispatch: push events to view effects.

use std::sync::Arc;

use metrics::counter;
use playsync_core::{ElementId, PushEvent, RegionKind, ViewDriver};
use tracing::{debug, trace};

use crate::refresh::{REFRESH_EVENT, ViewRefreshBridge};

/// Consumer of remote value updates for the range controls.
///
/// Implemented by the coordinator over its progress/volume controllers;
/// the sink decides whether an update is rendered (dropped mid-gesture).
pub trait RemoteValueSink: Send + Sync {
    /// Authoritative volume changed, percent 0-100.
    fn volume_changed(&self, percent: u32);
    /// Authoritative playback position changed, in milliseconds.
    fn position_changed(&self, millis: u64);
}

/// Maps each push event onto its view effect. Dispatch is synchronous —
/// one event is fully handled before the next is taken off the channel,
/// preserving per-kind arrival order.
pub struct PushDispatcher {
    driver: Arc<dyn ViewDriver>,
    bridge: ViewRefreshBridge,
    values: Arc<dyn RemoteValueSink>,
    /// Background element given a derived refresh on tracklist changes
    /// (the blurred artwork backdrop behind the now-playing view).
    backdrop: Option<ElementId>,
}

impl PushDispatcher {
    /// Dispatcher over the given driver and value sink.
    pub fn new(driver: Arc<dyn ViewDriver>, values: Arc<dyn RemoteValueSink>) -> Self {
        let bridge = ViewRefreshBridge::new(driver.clone());
        Self {
            driver,
            bridge,
            values,
            backdrop: None,
        }
    }

    /// Register the backdrop element refreshed alongside tracklist
    /// regions.
    #[must_use]
    pub fn with_backdrop(mut self, element: ElementId) -> Self {
        self.backdrop = Some(element);
        self
    }

    /// Apply one event's effect.
    pub fn dispatch(&self, event: &PushEvent) {
        counter!("playsync_push_events_total", "kind" => event.kind()).increment(1);
        trace!(kind = event.kind(), "dispatching push event");
        match event {
            PushEvent::Reload => {
                debug!("server requested full reload");
                self.driver.reload_page();
            }
            PushEvent::Status { .. } => {
                let _ = self.bridge.refresh(RegionKind::Status);
            }
            PushEvent::Tracklist => {
                let _ = self.bridge.refresh(RegionKind::Tracklist);
                if let Some(backdrop) = &self.backdrop
                    && self.driver.is_attached(backdrop)
                {
                    self.driver.trigger(backdrop, REFRESH_EVENT);
                }
            }
            PushEvent::Volume { percent } => self.values.volume_changed(*percent),
            PushEvent::Position { millis } => self.values.position_changed(*millis),
            PushEvent::Notify { notification } => {
                self.driver.prepend_notification(notification);
            }
        }
    }
}
