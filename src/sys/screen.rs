//! Monitor identity and enumeration.
//!
//! Real adapters wrap the OS display list; the simulation in
//! [`sys::simulation`](crate::sys::simulation) provides the same interface
//! in memory.

use serde::{Deserialize, Serialize};

use crate::sys::geometry::Rect;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct MonitorId(pub u64);

impl MonitorId {
    pub fn get(&self) -> u64 { self.0 }
}

impl std::fmt::Display for MonitorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "monitor#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorInfo {
    pub id: MonitorId,
    pub name: String,
    /// Full frame including any reserved areas (menu bar, dock).
    pub frame: Rect,
    /// The area available for tiling.
    pub visible_frame: Rect,
    pub is_main: bool,
}

/// Monitor enumeration collaborator.
pub trait MonitorSource: Send + Sync {
    fn connected_monitors(&self) -> Vec<MonitorInfo>;
}
