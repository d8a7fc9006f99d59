//! Concertina: the tiling core of an accordion-style window manager.
//!
//! Windows on each monitor live in ordered containers; each container
//! stacks its windows accordion-style behind a focused one. The
//! [`actor::orchestrator`] module reacts to window, monitor, and focus
//! events, the [`model`] holds the assignment state, and the
//! [`layout_engine`] turns one container's state into pixel rectangles.
//! Platform integration enters through the traits in [`sys`].

pub mod actor;
pub mod common;
pub mod layout_engine;
pub mod model;
pub mod sys;

pub use common::config::Config;
pub use common::error::Error;
