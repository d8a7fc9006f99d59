//! The container: an ordered ring of windows sharing one rectangle.
//!
//! Modeled as a `Vec` plus a focused id; every wrap operation is modulo
//! arithmetic over the current length. Operations on absent windows are
//! idempotent no-ops.

use serde::{Deserialize, Serialize};

use crate::layout_engine::Orientation;
use crate::sys::geometry::Rect;
use crate::sys::window_server::WindowId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ContainerId(pub u64);

impl ContainerId {
    pub fn get(&self) -> u64 { self.0 }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "container#{}", self.0)
    }
}

/// Invariants: `window_ids` holds no duplicates; `focused` is `None` iff
/// the container is empty, otherwise it names a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub id: ContainerId,
    pub frame: Rect,
    window_ids: Vec<WindowId>,
    focused: Option<WindowId>,
    pub orientation: Orientation,
}

impl Container {
    pub fn new(id: ContainerId, frame: Rect) -> Self {
        Container {
            id,
            frame,
            window_ids: Vec::new(),
            focused: None,
            orientation: Orientation::Horizontal,
        }
    }

    pub fn windows(&self) -> &[WindowId] { &self.window_ids }

    pub fn focused_window(&self) -> Option<WindowId> { self.focused }

    pub fn contains(&self, id: WindowId) -> bool { self.window_ids.contains(&id) }

    pub fn is_empty(&self) -> bool { self.window_ids.is_empty() }

    pub fn len(&self) -> usize { self.window_ids.len() }

    /// Appends a window to the ring. The first window into an empty
    /// container becomes its focused member.
    pub fn add_window(&mut self, id: WindowId) {
        if self.contains(id) {
            return;
        }
        self.window_ids.push(id);
        if self.focused.is_none() {
            self.focused = Some(id);
        }
    }

    /// Removes a window if present. Removing the focused member advances
    /// focus to its ring successor, wrapping to the first window when the
    /// removed one was last.
    pub fn remove_window(&mut self, id: WindowId) {
        let Some(index) = self.window_ids.iter().position(|&w| w == id) else {
            return;
        };
        self.window_ids.remove(index);
        if self.window_ids.is_empty() {
            self.focused = None;
        } else if self.focused == Some(id) {
            self.focused = Some(self.window_ids[index % self.window_ids.len()]);
        }
    }

    /// Advances focus to the next ring member. No-op with fewer than two.
    pub fn cycle_next(&mut self) { self.cycle(1) }

    /// Retreats focus to the previous ring member. No-op with fewer than two.
    pub fn cycle_previous(&mut self) { self.cycle(-1) }

    fn cycle(&mut self, step: isize) {
        if self.window_ids.len() < 2 {
            return;
        }
        let Some(current) = self.focused_index() else {
            return;
        };
        let len = self.window_ids.len() as isize;
        let next = (current as isize + step).rem_euclid(len) as usize;
        self.focused = Some(self.window_ids[next]);
    }

    /// Detaches and returns the focused window, advancing focus to its
    /// successor. Returns `None` on an empty container.
    pub fn take_focused_window(&mut self) -> Option<WindowId> {
        let id = self.focused?;
        self.remove_window(id);
        Some(id)
    }

    fn focused_index(&self) -> Option<usize> {
        let focused = self.focused?;
        self.window_ids.iter().position(|&w| w == focused)
    }

    /// Sets focus to `id` if it is a member.
    pub fn focus_window(&mut self, id: WindowId) {
        if self.contains(id) {
            self.focused = Some(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn container_with(ids: &[u64]) -> Container {
        let mut container = Container::new(ContainerId(0), Rect::default());
        for &id in ids {
            container.add_window(WindowId(id));
        }
        container
    }

    #[test]
    fn first_window_becomes_focused() {
        let mut container = Container::new(ContainerId(0), Rect::default());
        assert_eq!(container.focused_window(), None);

        container.add_window(WindowId(1));
        assert_eq!(container.focused_window(), Some(WindowId(1)));

        container.add_window(WindowId(2));
        assert_eq!(container.focused_window(), Some(WindowId(1)));
        assert_eq!(container.windows(), &[WindowId(1), WindowId(2)]);
    }

    #[test]
    fn duplicate_add_is_a_no_op() {
        let mut container = container_with(&[1, 2]);
        container.add_window(WindowId(1));
        assert_eq!(container.windows(), &[WindowId(1), WindowId(2)]);
    }

    #[test]
    fn removing_focused_advances_to_successor() {
        let mut container = container_with(&[1, 2, 3]);
        container.remove_window(WindowId(1));
        assert_eq!(container.focused_window(), Some(WindowId(2)));
        assert_eq!(container.windows(), &[WindowId(2), WindowId(3)]);
    }

    #[test]
    fn removing_focused_last_wraps_to_first() {
        let mut container = container_with(&[1, 2, 3]);
        container.focus_window(WindowId(3));
        container.remove_window(WindowId(3));
        assert_eq!(container.focused_window(), Some(WindowId(1)));
    }

    #[test]
    fn removing_non_focused_keeps_order_and_focus() {
        let mut container = container_with(&[1, 2, 3]);
        container.remove_window(WindowId(3));
        assert_eq!(container.focused_window(), Some(WindowId(1)));
        assert_eq!(container.windows(), &[WindowId(1), WindowId(2)]);
    }

    #[test]
    fn removing_absent_window_is_a_no_op() {
        let mut container = container_with(&[1, 2]);
        container.remove_window(WindowId(9));
        assert_eq!(container.windows(), &[WindowId(1), WindowId(2)]);
        assert_eq!(container.focused_window(), Some(WindowId(1)));
    }

    #[test]
    fn remove_and_re_add_preserves_order_but_not_focus() {
        let mut container = container_with(&[1, 2, 3]);
        container.remove_window(WindowId(1));
        container.add_window(WindowId(1));
        // Membership is back, but the focus handoff is not undone.
        assert_eq!(container.windows(), &[WindowId(2), WindowId(3), WindowId(1)]);
        assert_eq!(container.focused_window(), Some(WindowId(2)));
    }

    #[test]
    fn re_adding_into_empty_container_resets_focus() {
        let mut container = container_with(&[1]);
        container.remove_window(WindowId(1));
        assert_eq!(container.focused_window(), None);
        container.add_window(WindowId(1));
        assert_eq!(container.focused_window(), Some(WindowId(1)));
    }

    #[test]
    fn cycle_wraps_both_directions() {
        let mut container = container_with(&[1, 2, 3]);
        container.cycle_next();
        assert_eq!(container.focused_window(), Some(WindowId(2)));
        container.cycle_next();
        container.cycle_next();
        assert_eq!(container.focused_window(), Some(WindowId(1)));

        container.cycle_previous();
        assert_eq!(container.focused_window(), Some(WindowId(3)));
    }

    #[test]
    fn cycle_is_a_no_op_below_two_members() {
        let mut empty = Container::new(ContainerId(0), Rect::default());
        empty.cycle_next();
        assert_eq!(empty.focused_window(), None);

        let mut single = container_with(&[1]);
        single.cycle_next();
        single.cycle_previous();
        assert_eq!(single.focused_window(), Some(WindowId(1)));
    }

    #[test]
    fn take_focused_advances_focus_and_empties_singleton() {
        let mut container = container_with(&[1, 2]);
        assert_eq!(container.take_focused_window(), Some(WindowId(1)));
        assert_eq!(container.focused_window(), Some(WindowId(2)));

        assert_eq!(container.take_focused_window(), Some(WindowId(2)));
        assert_eq!(container.focused_window(), None);
        assert!(container.is_empty());
        assert_eq!(container.take_focused_window(), None);
    }
}
