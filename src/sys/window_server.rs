//! Window discovery and positioning collaborators.
//!
//! The orchestrator never talks to the OS directly; it consumes these
//! traits. Change notifications are pushed as [`WindowServerEvent`]s into
//! the orchestrator's channel by whatever adapter owns the OS callbacks.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sys::geometry::Rect;

#[allow(non_camel_case_types)]
pub type pid_t = i32;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct WindowId(pub u64);

impl WindowId {
    pub fn get(&self) -> u64 { self.0 }
}

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// Immutable snapshot of one on-screen window, valid for a single tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub id: WindowId,
    pub title: String,
    pub app_name: String,
    pub bundle_id: Option<String>,
    pub frame: Rect,
    pub is_resizable: bool,
    pub is_floating: bool,
    pub owner_pid: pid_t,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusedWindowInfo {
    pub id: WindowId,
    pub owner_pid: pid_t,
}

/// Push-style change notification from the window discovery adapter.
///
/// Only `Opened`, `Closed`, and `Focused` trigger retiles; `Moved` and
/// `Resized` represent user-initiated geometry changes the tiler must not
/// fight, so they are observed and ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowServerEvent {
    Opened(WindowInfo),
    Closed(WindowId),
    Focused(WindowId),
    Moved(WindowId, Rect),
    Resized(WindowId, Rect),
}

/// Window discovery collaborator.
pub trait WindowSource: Send + Sync {
    fn visible_windows(&self) -> Vec<WindowInfo>;
    fn focused_window(&self) -> Option<FocusedWindowInfo>;
}

/// One target rectangle for one window, produced by the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowPlacement {
    pub window_id: WindowId,
    pub owner_pid: pid_t,
    pub target_frame: Rect,
}

/// Outcome of one positioning batch.
///
/// A single window failing to position (its element disappeared mid-batch)
/// must not fail the batch; sinks log and continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchResult {
    Completed,
    Cancelled,
    Failed(String),
}

/// Positioning/animation collaborator.
pub trait WindowPositioner: Send + Sync {
    /// Moves every window in the batch to its target frame. `duration` of
    /// zero positions instantly.
    fn animate_batch(&self, placements: &[WindowPlacement], duration: Duration) -> BatchResult;

    /// Raises the given windows in order; the last id ends up topmost.
    fn raise_windows(&self, order: &[WindowId]);
}
