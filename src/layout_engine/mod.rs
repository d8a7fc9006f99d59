//! The layout engine: pure geometry, no I/O, no mutable state.
//!
//! [`calculate`] maps one container's windows onto target rectangles for
//! the accordion arrangement. Everything it needs arrives in the
//! [`LayoutInput`]; everything it decides leaves in the [`LayoutResult`].

mod accordion;

pub use accordion::calculate;
use serde::{Deserialize, Serialize};

use crate::sys::geometry::Rect;
use crate::sys::window_server::{WindowId, WindowPlacement, pid_t};

/// Horizontal movement between adjacent containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
}

/// Ring traversal direction within a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleDirection {
    Next,
    Previous,
}

/// Axis along which a container's accordion stacks its windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Per-window facts the engine needs, snapshotted by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowLayoutInfo {
    pub id: WindowId,
    pub owner_pid: pid_t,
    /// The window's current on-screen frame; only consulted for
    /// non-resizable windows, which keep their natural size.
    pub frame: Rect,
    pub is_resizable: bool,
    pub is_floating: bool,
}

/// Input for one container's geometry pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutInput {
    /// Windows in ring order.
    pub windows: Vec<WindowLayoutInfo>,
    /// The container's own focus bookkeeping.
    pub ring_focus: Option<WindowId>,
    /// What the OS considers focused, which may disagree with the ring.
    pub actual_focus: Option<WindowId>,
    pub container_frame: Rect,
    /// Accordion peek distance in pixels.
    pub offset: f64,
    pub orientation: Orientation,
}

/// Placements for every window that should be positioned. Floating windows
/// and unplaceable oversized non-resizable windows are omitted, not failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResult {
    pub placements: Vec<WindowPlacement>,
}
