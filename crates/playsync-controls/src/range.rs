//! Drag state machine for a single range control.
//!
//! States: **Idle** (fill driven by the committed/remote value) and
//! **Dragging** (fill driven by pointer position). The controller owns the
//! arbitration invariant: while a gesture is active, remote value updates
//! never touch the rendered fill — only the underlying committed value —
//! and the gesture's final value wins once the pointer lifts.
//!
//! Repaints during a gesture are coalesced through a single pending-paint
//! slot: a new pointer move cancels and replaces any pending repaint, and
//! the embedder drains the slot once per display frame via
//! [`RangeController::frame_tick`]. This is the only back-pressure
//! mechanism in the system.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::math::{fill_percent, sanitized_max, value_at_fraction};

/// Visual surface of a range control, implemented by the embedder.
pub trait RangeSurface: Send + Sync {
    /// Render the fill at the given percentage (already clamped).
    fn set_fill_percent(&self, percent: f64);

    /// Enable or suppress transition animations. Suppressed for the
    /// duration of a gesture so the fill tracks the pointer exactly.
    fn set_transitions_enabled(&self, enabled: bool);

    /// Persist a committed value upstream (the control's "change"
    /// notification). Called exactly once per completed gesture.
    fn commit_change(&self, value: u64);
}

/// One interactive range control (progress or volume).
pub struct RangeController {
    name: &'static str,
    surface: Arc<dyn RangeSurface>,
    max: f64,
    committed: f64,
    dragging: bool,
    drag_value: u64,
    pending_paint: Option<f64>,
}

impl RangeController {
    /// Create an idle controller with the given bound. A degenerate bound
    /// is sanitized to 1.
    pub fn new(name: &'static str, surface: Arc<dyn RangeSurface>, max: Option<f64>) -> Self {
        Self {
            name,
            surface,
            max: sanitized_max(max),
            committed: 0.0,
            dragging: false,
            drag_value: 0,
            pending_paint: None,
        }
    }

    /// Whether a gesture is currently active.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// The authoritative committed value.
    pub fn committed_value(&self) -> f64 {
        self.committed
    }

    /// Replace the control's bound (e.g. a new track's duration). Repaints
    /// the committed fill when idle; a live gesture keeps pointer control.
    pub fn set_max(&mut self, raw: Option<f64>) {
        self.max = sanitized_max(raw);
        if !self.dragging {
            self.paint_committed();
        }
    }

    /// Pointer-down over the hit region: enter Dragging, suppress
    /// transitions, and paint the pointer-derived value immediately.
    pub fn begin_drag(&mut self, fraction: f64) {
        if !self.dragging {
            self.dragging = true;
            self.surface.set_transitions_enabled(false);
            trace!(control = self.name, "gesture started");
        }
        self.pending_paint = None;
        self.drag_value = value_at_fraction(fraction, self.max);
        self.surface
            .set_fill_percent(fill_percent(self.drag_value as f64, self.max));
    }

    /// Pointer-move while Dragging: recompute the target value and replace
    /// any pending repaint. No-op when idle (stray move events arrive
    /// after pointer-up).
    pub fn drag_move(&mut self, fraction: f64) {
        if !self.dragging {
            return;
        }
        self.drag_value = value_at_fraction(fraction, self.max);
        self.pending_paint = Some(fill_percent(self.drag_value as f64, self.max));
    }

    /// Display-frame tick: apply the pending repaint, if any.
    pub fn frame_tick(&mut self) {
        if let Some(percent) = self.pending_paint.take() {
            self.surface.set_fill_percent(percent);
        }
    }

    /// Pointer-up / touch-end: return to Idle, restore transitions, commit
    /// the gesture's final value exactly once, and resync the fill to it.
    ///
    /// The locally committed value is authoritative after a gesture: a
    /// remote update that arrived mid-drag is overwritten here, and the
    /// next remote push event resynchronizes. Returns the committed value,
    /// or `None` when no gesture was active.
    pub fn end_drag(&mut self) -> Option<u64> {
        if !self.dragging {
            return None;
        }
        self.dragging = false;
        self.pending_paint = None;
        self.surface.set_transitions_enabled(true);
        self.committed = self.drag_value as f64;
        self.paint_committed();
        self.surface.commit_change(self.drag_value);
        debug!(control = self.name, value = self.drag_value, "gesture committed");
        Some(self.drag_value)
    }

    /// Remote push update for this control's value.
    ///
    /// Idle: updates the committed value and repaints. Dragging: updates
    /// only the underlying committed value — the rendered fill stays with
    /// the pointer, and the update is not queued for replay. Returns
    /// whether the update was rendered.
    pub fn apply_remote(&mut self, value: f64) -> bool {
        self.committed = value;
        if self.dragging {
            debug!(
                control = self.name,
                value, "dropping remote update mid-gesture"
            );
            return false;
        }
        self.paint_committed();
        true
    }

    fn paint_committed(&self) {
        self.surface
            .set_fill_percent(fill_percent(self.committed, self.max));
    }
}
