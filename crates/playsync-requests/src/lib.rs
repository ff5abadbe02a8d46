//! # playsync-requests
//!
//! Request-lifecycle tracking for UI-triggered network attempts.
//!
//! Every attempt is keyed by (normalized destination path, target region).
//! The registry enforces at-most-one in-flight attempt per key by
//! cancelling-then-replacing, arms a fixed 30-second watchdog per attempt,
//! and supports bulk cancellation when the page navigates away or unloads.
//! Swap interception vetoes swaps into detached targets and recognizes
//! full-document swaps to the current path as navigations.
//!
//! Cancellation is cooperative and best-effort throughout: a request may
//! complete between a watchdog firing and the cancel reaching it, and the
//! registry treats that race as benign.

#![deny(unsafe_code)]

pub mod key;
pub mod navigation;
pub mod registry;

pub use key::RequestKey;
pub use navigation::SwapDecision;
pub use registry::{CancelReason, RequestLifecycleRegistry};
