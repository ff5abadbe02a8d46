//! # playsync-controls
//!
//! Interactive range controls for the playsync coordinator.
//!
//! Two instances of one design — the playback progress bar and the volume
//! slider. Each converts pointer/touch gestures into value updates,
//! coalesces visual repaints to at most one per display frame, and
//! arbitrates between local drag state and remote push updates: while a
//! gesture is active the pointer owns the rendered position, and remote
//! value updates are dropped visually (never queued for replay).

#![deny(unsafe_code)]

pub mod math;
pub mod range;

pub use range::{RangeController, RangeSurface};
