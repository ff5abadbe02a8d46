//! The seam to the external request-triggering UI framework.
//!
//! This core never touches a document directly. Everything side-effecting
//! goes through [`ViewDriver`], and every element-directed dispatch is
//! gated on [`ViewDriver::is_attached`] — the single validity predicate —
//! so a listener never acts on a detached element.

use serde::{Deserialize, Serialize};

use crate::events::{Notification, RegionKind};

/// Opaque handle to a document element, as issued by the UI framework.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub String);

impl ElementId {
    /// Wrap a framework-issued element identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The DOM subtree a request's response is meant to replace.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionTarget {
    /// Whole-document sentinel, used when the triggering element declares
    /// no target of its own.
    Document,
    /// A specific element subtree.
    Element(ElementId),
}

impl RegionTarget {
    /// Target for an element's optional declared target-region attribute.
    pub fn from_declared(declared: Option<ElementId>) -> Self {
        declared.map_or(Self::Document, Self::Element)
    }
}

/// Boundary trait to the declarative UI framework and the document.
///
/// Object-safe; the coordinator holds it as `Arc<dyn ViewDriver>`. All
/// methods are synchronous fire-and-forget from this core's perspective —
/// the framework performs the actual DOM work on its own schedule.
pub trait ViewDriver: Send + Sync {
    /// Re-trigger an element through the framework's `trigger(element,
    /// event)` primitive.
    fn trigger(&self, element: &ElementId, event: &str);

    /// Whether the element is currently attached to the document.
    fn is_attached(&self, element: &ElementId) -> bool;

    /// All elements declaring interest in the given region kind, attached
    /// or not. Callers filter through [`Self::is_attached`] before acting.
    fn interested_elements(&self, kind: RegionKind) -> Vec<ElementId>;

    /// Hard full-page refresh.
    fn reload_page(&self);

    /// Insert a notification at the front of the shared notification
    /// region.
    fn prepend_notification(&self, notification: &Notification);

    /// Show or clear the global loading indicator.
    fn set_loading(&self, active: bool);

    /// Path component of the current document location.
    fn current_path(&self) -> String;
}
