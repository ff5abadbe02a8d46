//! Navigation and swap interception.
//!
//! Two situations demand pre-emptive cleanup before the framework acts:
//! a full-document swap to the current location (really a navigation),
//! and a plain hyperlink click that will make the browser discard the
//! document. One situation demands suppression: a swap whose target left
//! the document while the response was in flight.

use metrics::counter;
use playsync_core::RegionTarget;
use tracing::debug;

use crate::key::normalize_path;
use crate::registry::{CancelReason, RequestLifecycleRegistry};

/// Outcome of swap interception.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwapDecision {
    /// Let the framework perform the swap.
    Proceed,
    /// Suppress the swap. Swapping into a detached node is meaningless
    /// and indicates a stale pending request.
    Veto,
}

impl RequestLifecycleRegistry {
    /// Intercept a swap the framework is about to perform.
    ///
    /// A detached target vetoes the swap silently (loading cleared, no
    /// notification — this is not a failure). A full-document swap to the
    /// current path is treated as a navigation: everything in flight is
    /// cancelled first, then the swap proceeds.
    pub fn intercept_swap(&self, target: &RegionTarget, path: &str) -> SwapDecision {
        match target {
            RegionTarget::Element(id) if !self.driver.is_attached(id) => {
                debug!(target = id.as_str(), "vetoing swap into detached target");
                counter!("playsync_swaps_vetoed_total").increment(1);
                self.driver.set_loading(false);
                SwapDecision::Veto
            }
            RegionTarget::Document
                if normalize_path(path) == normalize_path(&self.driver.current_path()) =>
            {
                debug!(path, "full-document swap to current path, treating as navigation");
                self.cancel_all(CancelReason::Navigation);
                SwapDecision::Proceed
            }
            _ => SwapDecision::Proceed,
        }
    }

    /// A hyperlink was clicked. Framework-wired links manage their own
    /// lifecycle; a plain document-leaving link cancels everything
    /// pre-emptively since the browser is about to discard this document.
    /// Returns whether the click was treated as a navigation.
    pub fn on_link_click(&self, href: &str, framework_wired: bool) -> bool {
        if framework_wired || !is_plain_navigation_href(href) {
            return false;
        }
        debug!(href, "plain link navigation, cancelling in-flight work");
        self.cancel_all(CancelReason::Navigation);
        true
    }

    /// The page is unloading; cancel everything unconditionally.
    pub fn on_unload(&self) {
        self.cancel_all(CancelReason::Unload);
    }
}

/// Whether an href leaves the current document: non-empty, not a fragment
/// jump, not a script pseudo-link.
pub fn is_plain_navigation_href(href: &str) -> bool {
    !href.is_empty() && !href.starts_with('#') && !href.starts_with("javascript:")
}
