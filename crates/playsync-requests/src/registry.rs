//! The request-lifecycle registry.
//!
//! All hook entry points are synchronous; the only asynchronous piece is
//! the per-request watchdog task, which sleeps for the timeout and then
//! re-checks the registry before acting (a completed request leaves no
//! entry to act on).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use parking_lot::Mutex;
use playsync_core::{ElementId, Notification, RegionTarget, SyncError, ViewDriver};
use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::key::RequestKey;

/// Fixed per-request watchdog duration.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a bulk cancellation was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelReason {
    /// The browser is about to replace or discard the current document.
    Navigation,
    /// The page is unloading.
    Unload,
}

impl CancelReason {
    /// Whether the push channel should be closed along with the requests.
    /// There is no point keeping a live stream while leaving the page or
    /// replacing the whole document.
    pub fn closes_channel(self) -> bool {
        match self {
            Self::Navigation | Self::Unload => true,
        }
    }

    /// Reason label for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Navigation => "navigation",
            Self::Unload => "unload",
        }
    }
}

/// One in-flight attempt: its abort capability plus the watchdog that
/// bounds it.
pub(crate) struct RequestEntry {
    pub(crate) cancel: CancellationToken,
    pub(crate) watchdog: AbortHandle,
}

impl RequestEntry {
    /// Best-effort cancel: stop the watchdog, request abort. Cancelling an
    /// already-completed request is a benign no-op.
    fn cancel(&self) {
        self.watchdog.abort();
        self.cancel.cancel();
    }
}

/// Tracks in-flight UI-triggered requests keyed by (path, target-region).
///
/// Invariant: at most one entry per key at any time, maintained by
/// cancelling-then-replacing, never merging. Entries are owned exclusively
/// by the registry and removed on completion, timeout, or cancellation.
pub struct RequestLifecycleRegistry {
    pub(crate) driver: Arc<dyn ViewDriver>,
    timeout: Duration,
    entries: Arc<Mutex<HashMap<RequestKey, RequestEntry>>>,
    channel_closer: Mutex<Option<Box<dyn Fn() + Send + Sync>>>,
}

impl RequestLifecycleRegistry {
    /// Registry with the fixed 30-second watchdog.
    pub fn new(driver: Arc<dyn ViewDriver>) -> Self {
        Self::with_timeout(driver, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Registry with a custom watchdog duration.
    pub fn with_timeout(driver: Arc<dyn ViewDriver>, timeout: Duration) -> Self {
        Self {
            driver,
            timeout,
            entries: Arc::new(Mutex::new(HashMap::new())),
            channel_closer: Mutex::new(None),
        }
    }

    /// Install the closure that closes the push channel on
    /// navigation/unload cancellation.
    pub fn set_channel_closer(&self, closer: impl Fn() + Send + Sync + 'static) {
        *self.channel_closer.lock() = Some(Box::new(closer));
    }

    /// Deterministic key for a triggering element's declared target and
    /// destination path. The path falls back to the current location when
    /// the request does not carry one.
    pub fn key_for(&self, declared_target: Option<ElementId>, path: Option<&str>) -> RequestKey {
        let path = path.map_or_else(|| self.driver.current_path(), str::to_string);
        RequestKey::new(&path, RegionTarget::from_declared(declared_target))
    }

    /// Before-request hook: supersede any existing attempt under the key,
    /// arm a fresh watchdog, record the new entry.
    pub fn on_before_request(&self, key: RequestKey, cancel: CancellationToken) {
        let mut entries = self.entries.lock();
        if let Some(previous) = entries.remove(&key) {
            debug!(key = %key, "superseding in-flight request");
            counter!("playsync_requests_superseded_total").increment(1);
            previous.cancel();
        }

        let watchdog = self.spawn_watchdog(key.clone());
        let _ = entries.insert(key, RequestEntry { cancel, watchdog });
    }

    /// After-request hook: the request completed (success or failure)
    /// before the watchdog fired. Disarms the watchdog and drops the
    /// entry; a missing entry means the watchdog or a cancel won the race,
    /// which is fine.
    pub fn on_after_request(&self, key: &RequestKey) {
        if let Some(entry) = self.entries.lock().remove(key) {
            entry.watchdog.abort();
            debug!(key = %key, "request completed");
        }
    }

    /// Swap-rejected hook: clear the loading indicator only; key
    /// bookkeeping is handled by `on_after_request` or the watchdog.
    pub fn on_swap_rejected(&self) {
        self.driver.set_loading(false);
    }

    /// Response-error hook: clear the loading indicator only.
    pub fn on_response_error(&self) {
        self.driver.set_loading(false);
    }

    /// Send-error hook: clear the loading indicator only.
    pub fn on_send_error(&self) {
        self.driver.set_loading(false);
    }

    /// Cancel every in-flight attempt, best-effort, and clear the loading
    /// indicator. Navigation/unload reasons also close the push channel.
    pub fn cancel_all(&self, reason: CancelReason) {
        let drained: Vec<(RequestKey, RequestEntry)> =
            self.entries.lock().drain().collect();
        let cancelled = drained.len();
        for (key, entry) in drained {
            debug!(key = %key, reason = reason.as_str(), "cancelling request");
            entry.cancel();
        }
        self.driver.set_loading(false);
        if cancelled > 0 {
            counter!("playsync_requests_cancelled_total").increment(cancelled as u64);
        }

        if reason.closes_channel()
            && let Some(closer) = &*self.channel_closer.lock()
        {
            closer();
        }
    }

    /// Number of in-flight entries.
    pub fn active_count(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether a key currently has an in-flight entry.
    pub fn is_active(&self, key: &RequestKey) -> bool {
        self.entries.lock().contains_key(key)
    }

    /// Arm the timeout watchdog for a key. On firing it cancels the
    /// request, clears the loading indicator, and surfaces a synthesized
    /// 408-equivalent failure through the notification region.
    fn spawn_watchdog(&self, key: RequestKey) -> AbortHandle {
        let entries = Arc::clone(&self.entries);
        let driver = Arc::clone(&self.driver);
        let timeout = self.timeout;
        let task = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            // The entry may already be gone: completion or a cancel beat us.
            let Some(entry) = entries.lock().remove(&key) else {
                return;
            };
            entry.cancel.cancel();
            driver.set_loading(false);

            let failure = SyncError::RequestTimeout {
                path: key.path.clone(),
                seconds: timeout.as_secs(),
            };
            warn!(key = %key, "request watchdog fired");
            driver.prepend_notification(&Notification::request_failed(
                failure.status_equivalent().unwrap_or(408),
                failure.to_string(),
            ));
            counter!("playsync_request_timeouts_total").increment(1);
        });
        task.abort_handle()
    }
}
