//! Boundary to everything the OS would provide: geometry currency, monitor
//! and window discovery, positioning. Real platform adapters live outside
//! this crate; the simulation stands in for them.

pub mod geometry;
pub mod screen;
pub mod simulation;
pub mod window_server;
