//! Per-monitor tiling state.
//!
//! Owns the window→container assignment for one monitor: which layout is
//! active, the ordered containers (left-to-right = layout position order),
//! the focused container, and a per-layout memory of past assignments used
//! when switching back to a layout.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::collections::HashMap;
use crate::layout_engine::{CycleDirection, Direction, Orientation};
use crate::model::container::{Container, ContainerId};
use crate::model::layout::LayoutId;
use crate::sys::geometry::Rect;
use crate::sys::screen::MonitorId;
use crate::sys::window_server::WindowId;

/// Remembered window→container-slot assignment for one layout shape.
pub type LayoutMemory = HashMap<LayoutId, Vec<Vec<WindowId>>>;

/// Remembered accordion direction per container position, per layout.
pub type OrientationMemory = HashMap<LayoutId, Vec<Orientation>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorTilingState {
    pub monitor_id: MonitorId,
    pub active_layout: LayoutId,
    containers: Vec<Container>,
    focused_container: Option<ContainerId>,
    /// Container ids increase monotonically and are never reused within
    /// this monitor's lifetime.
    next_container_id: u64,
    layout_memory: LayoutMemory,
    orientation_memory: OrientationMemory,
}

impl MonitorTilingState {
    pub fn new(monitor_id: MonitorId) -> Self {
        MonitorTilingState {
            monitor_id,
            active_layout: LayoutId::Monocle,
            containers: Vec::new(),
            focused_container: None,
            next_container_id: 0,
            layout_memory: LayoutMemory::default(),
            orientation_memory: OrientationMemory::default(),
        }
    }

    pub fn containers(&self) -> &[Container] { &self.containers }

    pub fn focused_container_id(&self) -> Option<ContainerId> { self.focused_container }

    pub fn focused_container(&self) -> Option<&Container> {
        let id = self.focused_container?;
        self.containers.iter().find(|c| c.id == id)
    }

    pub fn layout_memory(&self) -> &LayoutMemory { &self.layout_memory }

    pub fn orientation_memory(&self) -> &OrientationMemory { &self.orientation_memory }

    pub fn restore_memories(&mut self, layout: LayoutMemory, orientation: OrientationMemory) {
        self.layout_memory = layout;
        self.orientation_memory = orientation;
    }

    /// The container a remembered assignment for the active layout would
    /// put `window` into, if any. Used to restore windows to their old
    /// places after a monitor reconnect.
    pub fn remembered_container_for(&self, window: WindowId) -> Option<ContainerId> {
        let slots = self.layout_memory.get(&self.active_layout)?;
        let slot = slots.iter().position(|s| s.contains(&window))?;
        self.containers.get(slot).map(|c| c.id)
    }

    fn alloc_container(&mut self, frame: Rect) -> ContainerId {
        let id = ContainerId(self.next_container_id);
        self.next_container_id += 1;
        self.containers.push(Container::new(id, frame));
        id
    }

    fn container_mut(&mut self, id: ContainerId) -> Option<&mut Container> {
        self.containers.iter_mut().find(|c| c.id == id)
    }

    fn container_index(&self, id: ContainerId) -> Option<usize> {
        self.containers.iter().position(|c| c.id == id)
    }

    /// Appends a window: to the named container when given, else to the
    /// focused one, else to the first. Creates the monitor's first
    /// container on demand.
    pub fn assign_window(&mut self, id: WindowId, to_container: Option<ContainerId>) {
        if self.contains_window(id) {
            return;
        }
        if self.containers.is_empty() {
            let container = self.alloc_container(Rect::default());
            self.focused_container = Some(container);
        }
        let target = to_container
            .filter(|&c| self.container_index(c).is_some())
            .or(self.focused_container.filter(|&c| self.container_index(c).is_some()))
            .unwrap_or(self.containers[0].id);
        if let Some(container) = self.container_mut(target) {
            container.add_window(id);
        }
    }

    pub fn remove_window(&mut self, id: WindowId) {
        if let Some(container) = self.containers.iter_mut().find(|c| c.contains(id)) {
            container.remove_window(id);
        }
    }

    pub fn container_for_window(&self, id: WindowId) -> Option<&Container> {
        self.containers.iter().find(|c| c.contains(id))
    }

    pub fn contains_window(&self, id: WindowId) -> bool {
        self.container_for_window(id).is_some()
    }

    /// All windows in collection order: containers left to right, each
    /// container's ring order preserved.
    pub fn all_windows(&self) -> Vec<WindowId> {
        self.containers.iter().flat_map(|c| c.windows().iter().copied()).collect()
    }

    /// Replaces the containers with exactly `frames.len()` fresh ones and
    /// deals the collected windows round-robin: window `i` lands in
    /// container `i mod k`. Focus moves to the first new container.
    pub fn redistribute_windows(&mut self, frames: &[Rect]) {
        let windows = self.all_windows();
        let new_ids = self.replace_containers(frames, self.active_layout);
        if new_ids.is_empty() {
            return;
        }
        for (i, window) in windows.into_iter().enumerate() {
            let target = new_ids[i % new_ids.len()];
            if let Some(container) = self.container_mut(target) {
                container.add_window(window);
            }
        }
        self.focused_container = new_ids.first().copied();
    }

    fn replace_containers(&mut self, frames: &[Rect], layout: LayoutId) -> Vec<ContainerId> {
        self.containers.clear();
        self.focused_container = None;
        let ids: Vec<ContainerId> =
            frames.iter().map(|&frame| self.alloc_container(frame)).collect();
        if let Some(orientations) = self.orientation_memory.get(&layout).cloned() {
            for (container, orientation) in self.containers.iter_mut().zip(orientations) {
                container.orientation = orientation;
            }
        }
        ids
    }

    /// Sets the accordion direction of one container and remembers it for
    /// the container's position under the active layout.
    pub fn set_container_orientation(&mut self, id: ContainerId, orientation: Orientation) {
        let Some(index) = self.container_index(id) else {
            return;
        };
        self.containers[index].orientation = orientation;
        let count = self.containers.len();
        let remembered = self
            .orientation_memory
            .entry(self.active_layout)
            .or_insert_with(|| vec![Orientation::default(); count]);
        if remembered.len() <= index {
            remembered.resize(index + 1, Orientation::default());
        }
        remembered[index] = orientation;
    }

    /// Switches the active layout, reassigning windows into the new
    /// container shape. Same-layout switches are no-ops. Precedence:
    /// remembered per-layout assignment, then nearest-center placement from
    /// `window_frames`, then round-robin.
    pub fn switch_layout(
        &mut self,
        to: LayoutId,
        container_frames: &[Rect],
        window_frames: Option<&HashMap<WindowId, Rect>>,
    ) {
        if to == self.active_layout {
            return;
        }
        debug!(monitor = %self.monitor_id, from = %self.active_layout, to = %to, "switching layout");

        self.remember_active_assignment();
        let previously_focused = self.focused_container().and_then(|c| c.focused_window());
        let windows = self.all_windows();

        let remembered = self.layout_memory.get(&to).cloned();
        let new_ids = self.replace_containers(container_frames, to);
        if new_ids.is_empty() {
            return;
        }

        if let Some(slots) = remembered {
            self.restore_remembered(&windows, &slots, &new_ids);
        } else if let Some(frames) = window_frames {
            self.assign_by_nearest_center(&windows, frames, &new_ids);
        } else {
            for (i, window) in windows.iter().enumerate() {
                let target = new_ids[i % new_ids.len()];
                if let Some(container) = self.container_mut(target) {
                    container.add_window(*window);
                }
            }
        }

        self.focused_container = previously_focused
            .and_then(|w| self.container_for_window(w).map(|c| c.id))
            .or(new_ids.first().copied());
        self.active_layout = to;
    }

    fn remember_active_assignment(&mut self) {
        let slots: Vec<Vec<WindowId>> =
            self.containers.iter().map(|c| c.windows().to_vec()).collect();
        self.layout_memory.insert(self.active_layout, slots);
    }

    /// Restores windows to their remembered slots. Remembered windows that
    /// no longer exist are dropped silently; windows the memory has never
    /// seen are dealt round-robin after the restore.
    fn restore_remembered(
        &mut self,
        windows: &[WindowId],
        slots: &[Vec<WindowId>],
        new_ids: &[ContainerId],
    ) {
        let mut placed = Vec::new();
        for (slot, remembered) in slots.iter().enumerate().take(new_ids.len()) {
            for &window in remembered {
                if !windows.contains(&window) {
                    continue;
                }
                if let Some(container) = self.container_mut(new_ids[slot]) {
                    container.add_window(window);
                    placed.push(window);
                }
            }
        }
        let leftover: Vec<WindowId> =
            windows.iter().copied().filter(|w| !placed.contains(w)).collect();
        for (i, window) in leftover.into_iter().enumerate() {
            let target = new_ids[i % new_ids.len()];
            if let Some(container) = self.container_mut(target) {
                container.add_window(window);
            }
        }
    }

    /// Maps each window to the new container whose rectangle center is
    /// nearest the window's own current-frame center; ties and unknown
    /// frames go to the smallest container index.
    fn assign_by_nearest_center(
        &mut self,
        windows: &[WindowId],
        window_frames: &HashMap<WindowId, Rect>,
        new_ids: &[ContainerId],
    ) {
        for &window in windows {
            let target = match window_frames.get(&window) {
                Some(frame) => {
                    let center = frame.center();
                    let mut best = 0;
                    let mut best_distance = f64::INFINITY;
                    for (i, &id) in new_ids.iter().enumerate() {
                        let Some(index) = self.container_index(id) else { continue };
                        let distance = self.containers[index].frame.distance_squared_to(center);
                        if distance < best_distance {
                            best_distance = distance;
                            best = i;
                        }
                    }
                    new_ids[best]
                }
                None => new_ids[0],
            };
            if let Some(container) = self.container_mut(target) {
                container.add_window(window);
            }
        }
    }

    /// Cycles the ring focus of the container owning `window`.
    pub fn cycle_window(&mut self, direction: CycleDirection, window: WindowId) {
        let Some(id) = self.container_for_window(window).map(|c| c.id) else {
            return;
        };
        if let Some(container) = self.container_mut(id) {
            match direction {
                CycleDirection::Next => container.cycle_next(),
                CycleDirection::Previous => container.cycle_previous(),
            }
        }
    }

    /// Moves `window` to the adjacent container. No-op at either boundary
    /// or with a single container. The source container's focus only moves
    /// if the departing window held it; the destination focuses the moved
    /// window only when it was empty before.
    pub fn move_window(&mut self, window: WindowId, direction: Direction) {
        let Some(source) = self.container_for_window(window).map(|c| c.id) else {
            return;
        };
        let Some(source_index) = self.container_index(source) else {
            return;
        };
        let destination_index = match direction {
            Direction::Left => source_index.checked_sub(1),
            Direction::Right => {
                (source_index + 1 < self.containers.len()).then_some(source_index + 1)
            }
        };
        let Some(destination_index) = destination_index else {
            return;
        };
        let destination = self.containers[destination_index].id;
        if let Some(container) = self.container_mut(source) {
            container.remove_window(window);
        }
        if let Some(container) = self.container_mut(destination) {
            container.add_window(window);
        }
    }

    /// Moves the focused-container pointer to the adjacent container.
    pub fn set_focused_container(&mut self, direction: Direction) {
        let Some(current) = self.focused_container.and_then(|id| self.container_index(id))
        else {
            return;
        };
        let next = match direction {
            Direction::Left => current.checked_sub(1),
            Direction::Right => (current + 1 < self.containers.len()).then_some(current + 1),
        };
        if let Some(next) = next {
            self.focused_container = Some(self.containers[next].id);
        }
    }

    /// Points the focused-container pointer at the container owning
    /// `window`; no-op when the window is unknown.
    pub fn update_focused_container(&mut self, window: WindowId) {
        if let Some(id) = self.container_for_window(window).map(|c| c.id) {
            self.focused_container = Some(id);
        }
    }

    /// Focuses `window` within its own container's ring.
    pub fn focus_window_in_container(&mut self, window: WindowId) {
        let Some(id) = self.container_for_window(window).map(|c| c.id) else {
            return;
        };
        if let Some(container) = self.container_mut(id) {
            container.focus_window(window);
        }
    }

    /// Manual container resize: pins the new frame and marks the layout
    /// dynamic, so retiles stop recomputing frames from the layout table.
    /// Hosts wire this to their drag/resize handling.
    pub fn resize_container(&mut self, id: ContainerId, frame: Rect) {
        let Some(index) = self.container_index(id) else {
            return;
        };
        self.containers[index].frame = frame;
        self.active_layout = LayoutId::Dynamic;
    }

    /// Applies the layout's frames to the existing containers, or rebuilds
    /// the container shape round-robin when the counts disagree.
    pub fn apply_container_frames(&mut self, frames: &[Rect]) {
        if frames.len() == self.containers.len() {
            for (container, &frame) in self.containers.iter_mut().zip(frames) {
                container.frame = frame;
            }
        } else {
            self.redistribute_windows(frames);
        }
    }
}
