//! Shared test utilities for the playsync crates.
//!
//! Provides [`FakeViewDriver`] — an in-memory stand-in for the UI framework
//! and document, so channel dispatch, request bookkeeping, and drag
//! arbitration are testable without a live document.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use crate::events::{Notification, RegionKind};
use crate::view::{ElementId, ViewDriver};

/// In-memory fake for [`ViewDriver`].
///
/// Thread-safe via `Mutex` so `ViewDriver` (which requires `Send + Sync`)
/// is satisfied. Supports builder-style setup (`with_element`) and
/// post-hoc assertions over recorded calls.
#[derive(Default)]
pub struct FakeViewDriver {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    attached: HashSet<ElementId>,
    interests: HashMap<RegionKind, Vec<ElementId>>,
    triggers: Vec<(ElementId, String)>,
    notifications: Vec<Notification>,
    loading_history: Vec<bool>,
    reloads: usize,
    path: String,
}

impl FakeViewDriver {
    /// Empty document located at `/`.
    pub fn new() -> Self {
        let driver = Self::default();
        driver.inner.lock().path = "/".into();
        driver
    }

    /// Add an attached element, optionally interested in a region kind.
    #[must_use]
    pub fn with_element(self, id: impl Into<ElementId>, interest: Option<RegionKind>) -> Self {
        let id = id.into();
        {
            let mut inner = self.inner.lock();
            let _ = inner.attached.insert(id.clone());
            if let Some(kind) = interest {
                inner.interests.entry(kind).or_default().push(id);
            }
        }
        self
    }

    /// Set the current document path.
    #[must_use]
    pub fn with_path(self, path: impl Into<String>) -> Self {
        self.inner.lock().path = path.into();
        self
    }

    /// Detach an element from the document (it stays registered as
    /// interested, mirroring a stale listener).
    pub fn detach(&self, id: &ElementId) {
        let _ = self.inner.lock().attached.remove(id);
    }

    /// Recorded `(element, event)` trigger calls, in order.
    pub fn triggers(&self) -> Vec<(ElementId, String)> {
        self.inner.lock().triggers.clone()
    }

    /// Recorded notifications, newest last.
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.lock().notifications.clone()
    }

    /// Recorded loading-indicator transitions, in order.
    pub fn loading_history(&self) -> Vec<bool> {
        self.inner.lock().loading_history.clone()
    }

    /// Whether the loading indicator is currently shown.
    pub fn loading_active(&self) -> bool {
        self.inner.lock().loading_history.last().copied().unwrap_or(false)
    }

    /// Number of full-page reloads requested.
    pub fn reload_count(&self) -> usize {
        self.inner.lock().reloads
    }
}

impl ViewDriver for FakeViewDriver {
    fn trigger(&self, element: &ElementId, event: &str) {
        self.inner
            .lock()
            .triggers
            .push((element.clone(), event.to_string()));
    }

    fn is_attached(&self, element: &ElementId) -> bool {
        self.inner.lock().attached.contains(element)
    }

    fn interested_elements(&self, kind: RegionKind) -> Vec<ElementId> {
        self.inner
            .lock()
            .interests
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    fn reload_page(&self) {
        self.inner.lock().reloads += 1;
    }

    fn prepend_notification(&self, notification: &Notification) {
        self.inner.lock().notifications.push(notification.clone());
    }

    fn set_loading(&self, active: bool) {
        self.inner.lock().loading_history.push(active);
    }

    fn current_path(&self) -> String {
        self.inner.lock().path.clone()
    }
}
