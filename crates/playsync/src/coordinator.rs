//! The process-scoped coordinator.
//!
//! One `Coordinator` is constructed at startup and injected into event
//! handlers; nothing in the subsystem is reachable as an ambient global.
//! It owns the push channel, the request registry, and both range
//! controls, and wires them together: channel value events flow into the
//! controls, and registry navigation cancellations close the channel.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use playsync_channel::{PushChannelManager, PushDispatcher, PushTransport, RemoteValueSink};
use playsync_controls::{RangeController, RangeSurface};
use playsync_core::{ElementId, ViewDriver};
use playsync_requests::RequestLifecycleRegistry;

use crate::settings::Settings;

/// The two interactive range controls, progress and volume, behind one
/// handle. Also the [`RemoteValueSink`] the push dispatcher feeds.
pub struct RangeControls {
    progress: Mutex<RangeController>,
    volume: Mutex<RangeController>,
}

impl RangeControls {
    fn new(progress_surface: Arc<dyn RangeSurface>, volume_surface: Arc<dyn RangeSurface>) -> Self {
        Self {
            // Progress bound is unknown until a track loads; the
            // controller sanitizes the missing max to 1.
            progress: Mutex::new(RangeController::new("progress", progress_surface, None)),
            volume: Mutex::new(RangeController::new("volume", volume_surface, Some(100.0))),
        }
    }

    /// New track: rebind the progress control to its duration.
    pub fn set_track_duration_millis(&self, millis: Option<u64>) {
        self.progress.lock().set_max(millis.map(|m| m as f64));
    }

    /// Pointer-down on the progress bar.
    pub fn progress_pointer_down(&self, fraction: f64) {
        self.progress.lock().begin_drag(fraction);
    }

    /// Pointer-move on the progress bar.
    pub fn progress_pointer_move(&self, fraction: f64) {
        self.progress.lock().drag_move(fraction);
    }

    /// Pointer-up on the progress bar; returns the committed position.
    pub fn progress_pointer_up(&self) -> Option<u64> {
        self.progress.lock().end_drag()
    }

    /// Pointer-down on the volume slider.
    pub fn volume_pointer_down(&self, fraction: f64) {
        self.volume.lock().begin_drag(fraction);
    }

    /// Pointer-move on the volume slider.
    pub fn volume_pointer_move(&self, fraction: f64) {
        self.volume.lock().drag_move(fraction);
    }

    /// Pointer-up on the volume slider; returns the committed percent.
    pub fn volume_pointer_up(&self) -> Option<u64> {
        self.volume.lock().end_drag()
    }

    /// Display-frame tick: apply at most one pending repaint per control.
    pub fn frame_tick(&self) {
        self.progress.lock().frame_tick();
        self.volume.lock().frame_tick();
    }

    /// Whether the progress bar is mid-gesture.
    pub fn progress_dragging(&self) -> bool {
        self.progress.lock().is_dragging()
    }

    /// Whether the volume slider is mid-gesture.
    pub fn volume_dragging(&self) -> bool {
        self.volume.lock().is_dragging()
    }
}

impl RemoteValueSink for RangeControls {
    fn volume_changed(&self, percent: u32) {
        let _ = self.volume.lock().apply_remote(f64::from(percent));
    }

    fn position_changed(&self, millis: u64) {
        let _ = self.progress.lock().apply_remote(millis as f64);
    }
}

/// Process-scoped owner of the synchronization subsystem.
pub struct Coordinator {
    channel: Arc<PushChannelManager>,
    registry: Arc<RequestLifecycleRegistry>,
    controls: Arc<RangeControls>,
}

impl Coordinator {
    /// Wire up the subsystem. The driver is the seam to the UI framework;
    /// the surfaces render the two range controls.
    pub fn new(
        driver: Arc<dyn ViewDriver>,
        transport: Arc<dyn PushTransport>,
        progress_surface: Arc<dyn RangeSurface>,
        volume_surface: Arc<dyn RangeSurface>,
        settings: &Settings,
    ) -> Self {
        let controls = Arc::new(RangeControls::new(progress_surface, volume_surface));

        let values: Arc<dyn RemoteValueSink> = Arc::<RangeControls>::clone(&controls);
        let mut dispatcher = PushDispatcher::new(Arc::clone(&driver), values);
        if let Some(backdrop) = &settings.backdrop_element {
            dispatcher = dispatcher.with_backdrop(ElementId::new(backdrop.clone()));
        }
        let channel = Arc::new(PushChannelManager::new(transport, Arc::new(dispatcher)));

        let registry = Arc::new(RequestLifecycleRegistry::with_timeout(
            driver,
            settings.request_timeout(),
        ));
        let closer = Arc::clone(&channel);
        registry.set_channel_closer(move || closer.close());

        Self {
            channel,
            registry,
            controls,
        }
    }

    /// Initial load: open the push channel. A failed open is silent —
    /// the page degrades to refresh-on-demand until the next re-init.
    pub async fn startup(&self) {
        if let Err(e) = self.channel.ensure_open().await {
            debug!(error = %e, "starting without push channel");
        }
    }

    /// Document visibility changed. Regaining visibility is one of the
    /// opportunistic reconnect points; going hidden leaves the channel
    /// alone.
    pub async fn visibility_changed(&self, visible: bool) {
        if visible && let Err(e) = self.channel.ensure_open().await {
            debug!(error = %e, "visibility regain could not reopen push channel");
        }
    }

    /// Clean shutdown: cancel all in-flight work and close the channel.
    /// Idempotent; also the teardown entry point for tests.
    pub fn teardown(&self) {
        self.registry.on_unload();
        self.channel.close();
    }

    /// The push-channel manager.
    pub fn channel(&self) -> &Arc<PushChannelManager> {
        &self.channel
    }

    /// The request-lifecycle registry.
    pub fn registry(&self) -> &Arc<RequestLifecycleRegistry> {
        &self.registry
    }

    /// The range controls.
    pub fn controls(&self) -> &Arc<RangeControls> {
        &self.controls
    }
}
