//! The tiling data model: containers, per-monitor state, layouts, and the
//! persistence records derived from them.

pub mod container;
pub mod layout;
pub mod monitor;
pub mod persist;

pub use container::{Container, ContainerId};
pub use layout::LayoutId;
pub use monitor::MonitorTilingState;
pub use persist::{FileStore, MonitorRecord, NullStore, StateStore};
