//! Region refresh bridging.

use std::sync::Arc;

use playsync_core::{RegionKind, ViewDriver};
use tracing::trace;

/// Event name used when re-triggering an interested element through the
/// framework's `trigger` primitive.
pub const REFRESH_EVENT: &str = "playsync:refresh";

/// Thin adapter that asks the UI framework to re-trigger the elements
/// interested in a region kind. Stateless.
pub struct ViewRefreshBridge {
    driver: Arc<dyn ViewDriver>,
}

impl ViewRefreshBridge {
    /// Bridge over the given view driver.
    pub fn new(driver: Arc<dyn ViewDriver>) -> Self {
        Self { driver }
    }

    /// Re-trigger every attached element interested in `kind`. Detached
    /// elements are skipped silently; a no-op when none are attached.
    /// Returns the number of elements refreshed.
    pub fn refresh(&self, kind: RegionKind) -> usize {
        let mut refreshed = 0;
        for element in self.driver.interested_elements(kind) {
            if self.driver.is_attached(&element) {
                self.driver.trigger(&element, REFRESH_EVENT);
                refreshed += 1;
            } else {
                trace!(element = element.as_str(), kind = kind.as_str(), "skipping detached element");
            }
        }
        refreshed
    }
}
