//! # playsync-core
//!
//! Foundation types for the playsync live-state coordinator.
//!
//! This crate provides the shared vocabulary the other playsync crates
//! depend on:
//!
//! - **Push events**: [`events::PushEvent`] — the typed server-push
//!   vocabulary (reload, status, tracklist, volume, position, notifications)
//! - **Regions**: [`events::RegionKind`] — the refreshable UI region kinds
//!   elements can declare interest in
//! - **Notifications**: [`events::Notification`] — the single error/info
//!   reporting path, shared by server-pushed fragments and client-side
//!   synthesized failures
//! - **View seam**: [`view::ViewDriver`] — the trait boundary to the
//!   external request-triggering UI framework
//! - **Errors**: [`errors::SyncError`] hierarchy via `thiserror`
//! - **Logging**: [`logging::init_tracing`] env-filtered subscriber setup
//!
//! ## Crate position
//!
//! Foundation crate. Depended on by all other playsync crates.

#![deny(unsafe_code)]

pub mod errors;
pub mod events;
pub mod logging;
pub mod testutil;
pub mod view;

pub use errors::{Result, SyncError};
pub use events::{Notification, NotificationLevel, PlaybackStatus, PushEvent, RegionKind};
pub use view::{ElementId, RegionTarget, ViewDriver};
