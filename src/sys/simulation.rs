//! In-memory window server.
//!
//! Backs the replay binary and the orchestrator tests: a mutable world of
//! monitors and windows behind the same traits a real platform adapter
//! implements. Positioning calls are applied to the world immediately and
//! recorded for inspection.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::trace;

use crate::sys::geometry::Rect;
use crate::sys::screen::{MonitorInfo, MonitorSource};
use crate::sys::window_server::{
    BatchResult, FocusedWindowInfo, WindowId, WindowInfo, WindowPlacement, WindowPositioner,
    WindowServerEvent, WindowSource,
};

#[derive(Default)]
struct World {
    monitors: Vec<MonitorInfo>,
    windows: Vec<WindowInfo>,
    focused: Option<WindowId>,
    batches: Vec<(Vec<WindowPlacement>, Duration)>,
    raises: Vec<Vec<WindowId>>,
}

/// Shared handle to the simulated world. Clones see the same state.
#[derive(Clone, Default)]
pub struct SimulatedWindowServer {
    world: Arc<Mutex<World>>,
}

impl SimulatedWindowServer {
    pub fn new(monitors: Vec<MonitorInfo>) -> Self {
        SimulatedWindowServer {
            world: Arc::new(Mutex::new(World { monitors, ..World::default() })),
        }
    }

    pub fn set_monitors(&self, monitors: Vec<MonitorInfo>) {
        self.world.lock().monitors = monitors;
    }

    pub fn open_window(&self, info: WindowInfo) {
        let mut world = self.world.lock();
        if world.windows.iter().any(|w| w.id == info.id) {
            return;
        }
        world.windows.push(info);
    }

    pub fn close_window(&self, id: WindowId) {
        let mut world = self.world.lock();
        world.windows.retain(|w| w.id != id);
        if world.focused == Some(id) {
            world.focused = None;
        }
    }

    pub fn focus_window(&self, id: WindowId) {
        let mut world = self.world.lock();
        if world.windows.iter().any(|w| w.id == id) {
            world.focused = Some(id);
        }
    }

    pub fn clear_focus(&self) { self.world.lock().focused = None; }

    pub fn set_window_frame(&self, id: WindowId, frame: Rect) {
        let mut world = self.world.lock();
        if let Some(window) = world.windows.iter_mut().find(|w| w.id == id) {
            window.frame = frame;
        }
    }

    pub fn window_frame(&self, id: WindowId) -> Option<Rect> {
        self.world.lock().windows.iter().find(|w| w.id == id).map(|w| w.frame)
    }

    /// Applies an event to the world itself, mirroring what the OS would
    /// have done before notifying us.
    pub fn apply(&self, event: &WindowServerEvent) {
        match event {
            WindowServerEvent::Opened(info) => self.open_window(info.clone()),
            WindowServerEvent::Closed(id) => self.close_window(*id),
            WindowServerEvent::Focused(id) => self.focus_window(*id),
            WindowServerEvent::Moved(id, frame) | WindowServerEvent::Resized(id, frame) => {
                self.set_window_frame(*id, *frame)
            }
        }
    }

    pub fn batches(&self) -> Vec<(Vec<WindowPlacement>, Duration)> {
        self.world.lock().batches.clone()
    }

    pub fn raises(&self) -> Vec<Vec<WindowId>> { self.world.lock().raises.clone() }

    pub fn clear_recordings(&self) {
        let mut world = self.world.lock();
        world.batches.clear();
        world.raises.clear();
    }
}

impl WindowSource for SimulatedWindowServer {
    fn visible_windows(&self) -> Vec<WindowInfo> { self.world.lock().windows.clone() }

    fn focused_window(&self) -> Option<FocusedWindowInfo> {
        let world = self.world.lock();
        let id = world.focused?;
        let window = world.windows.iter().find(|w| w.id == id)?;
        Some(FocusedWindowInfo { id, owner_pid: window.owner_pid })
    }
}

impl MonitorSource for SimulatedWindowServer {
    fn connected_monitors(&self) -> Vec<MonitorInfo> { self.world.lock().monitors.clone() }
}

impl WindowPositioner for SimulatedWindowServer {
    fn animate_batch(&self, placements: &[WindowPlacement], duration: Duration) -> BatchResult {
        let mut world = self.world.lock();
        for placement in placements {
            match world.windows.iter_mut().find(|w| w.id == placement.window_id) {
                Some(window) => window.frame = placement.target_frame,
                // The window disappeared mid-batch. Tolerated per window.
                None => trace!(window = %placement.window_id, "skipping placement for gone window"),
            }
        }
        world.batches.push((placements.to_vec(), duration));
        BatchResult::Completed
    }

    fn raise_windows(&self, order: &[WindowId]) {
        self.world.lock().raises.push(order.to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::window_server::pid_t;

    fn window(id: u64, pid: pid_t) -> WindowInfo {
        WindowInfo {
            id: WindowId(id),
            title: format!("window {id}"),
            app_name: "test".into(),
            bundle_id: None,
            frame: Rect::new(0.0, 0.0, 400.0, 300.0),
            is_resizable: true,
            is_floating: false,
            owner_pid: pid,
        }
    }

    #[test]
    fn batches_move_windows_and_are_recorded() {
        let sim = SimulatedWindowServer::default();
        sim.open_window(window(1, 100));

        let placement = WindowPlacement {
            window_id: WindowId(1),
            owner_pid: 100,
            target_frame: Rect::new(10.0, 20.0, 800.0, 600.0),
        };
        let result = sim.animate_batch(&[placement], Duration::ZERO);

        assert_eq!(result, BatchResult::Completed);
        assert_eq!(sim.window_frame(WindowId(1)), Some(Rect::new(10.0, 20.0, 800.0, 600.0)));
        assert_eq!(sim.batches().len(), 1);
    }

    #[test]
    fn placement_for_gone_window_does_not_fail_batch() {
        let sim = SimulatedWindowServer::default();
        sim.open_window(window(1, 100));

        let placements = [
            WindowPlacement {
                window_id: WindowId(77),
                owner_pid: 1,
                target_frame: Rect::new(0.0, 0.0, 1.0, 1.0),
            },
            WindowPlacement {
                window_id: WindowId(1),
                owner_pid: 100,
                target_frame: Rect::new(5.0, 5.0, 100.0, 100.0),
            },
        ];
        assert_eq!(sim.animate_batch(&placements, Duration::ZERO), BatchResult::Completed);
        assert_eq!(sim.window_frame(WindowId(1)), Some(Rect::new(5.0, 5.0, 100.0, 100.0)));
    }

    #[test]
    fn closing_focused_window_clears_focus() {
        let sim = SimulatedWindowServer::default();
        sim.open_window(window(1, 100));
        sim.focus_window(WindowId(1));
        assert!(sim.focused_window().is_some());

        sim.close_window(WindowId(1));
        assert!(sim.focused_window().is_none());
    }
}
