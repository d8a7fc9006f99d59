//! Accordion geometry.
//!
//! Windows in a container stack behind the focused one, each peeking out by
//! the configured offset. Non-resizable windows are never stretched; they
//! keep their natural size and are pinned to the ring slot they occupy, or
//! centered when they hold the actual focus.

use crate::layout_engine::{LayoutInput, LayoutResult, Orientation, WindowLayoutInfo};
use crate::sys::geometry::Rect;
use crate::sys::window_server::{WindowId, WindowPlacement};

/// Where a window sits in the ring relative to the effective focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RingSlot {
    Focus,
    Previous,
    Next,
    Other,
}

pub fn calculate(input: &LayoutInput) -> LayoutResult {
    let ring: Vec<&WindowLayoutInfo> =
        input.windows.iter().filter(|w| !w.is_floating).collect();
    if ring.is_empty() {
        return LayoutResult::default();
    }

    let tileable: Vec<&WindowLayoutInfo> =
        ring.iter().copied().filter(|w| w.is_resizable).collect();

    // The ring focus drives geometry, but only while it names a tileable
    // member; a missing, floating, or non-resizable focus falls back to the
    // first tileable window, which freezes the accordion in place.
    let focus_id = input
        .ring_focus
        .filter(|id| tileable.iter().any(|w| w.id == *id))
        .or_else(|| tileable.first().map(|w| w.id));

    let mut placements = Vec::with_capacity(ring.len());
    for &window in &ring {
        let placement = if window.is_resizable {
            tileable_frame(&tileable, focus_id, window.id, input)
        } else {
            non_resizable_frame(&ring, &tileable, focus_id, window, input)
        };
        if let Some(target_frame) = placement {
            placements.push(WindowPlacement {
                window_id: window.id,
                owner_pid: window.owner_pid,
                target_frame,
            });
        }
    }
    LayoutResult { placements }
}

/// Accordion rectangle for one tileable window.
fn tileable_frame(
    tileable: &[&WindowLayoutInfo],
    focus_id: Option<WindowId>,
    id: WindowId,
    input: &LayoutInput,
) -> Option<Rect> {
    let n = tileable.len();
    let c = input.container_frame;
    if n == 1 {
        return Some(c);
    }

    let slot = ring_slot(tileable, focus_id, id)?;
    let o = input.offset;
    let (length, along) = match n {
        2 => {
            let length = primary_length(c, input.orientation) - o;
            let along = match slot {
                RingSlot::Focus => 0.0,
                _ => o,
            };
            (length, along)
        }
        _ => {
            let length = primary_length(c, input.orientation) - 2.0 * o;
            let along = match slot {
                RingSlot::Previous => 0.0,
                RingSlot::Focus | RingSlot::Other => o,
                RingSlot::Next => 2.0 * o,
            };
            (length, along)
        }
    };
    Some(oriented_rect(c, along, length.max(0.0), input.orientation))
}

/// A non-resizable window keeps its natural size. Centered when it holds
/// the actual focus or no tileable windows remain; otherwise pinned to its
/// ring slot's origin, centered across the transverse axis. Omitted when it
/// cannot fit the container at all.
fn non_resizable_frame(
    ring: &[&WindowLayoutInfo],
    tileable: &[&WindowLayoutInfo],
    focus_id: Option<WindowId>,
    window: &WindowLayoutInfo,
    input: &LayoutInput,
) -> Option<Rect> {
    let c = input.container_frame;
    let size = window.frame.size;
    if size.width > c.size.width || size.height > c.size.height {
        // Skip, retain position.
        return None;
    }

    let centered = Rect::new(
        c.mid_x() - size.width / 2.0,
        c.mid_y() - size.height / 2.0,
        size.width,
        size.height,
    );
    if input.actual_focus == Some(window.id) || tileable.len() <= 1 {
        return Some(centered);
    }

    let slot = ring_slot(ring, focus_id, window.id).unwrap_or(RingSlot::Other);
    let o = input.offset;
    let along = match tileable.len() {
        2 => match slot {
            RingSlot::Focus => 0.0,
            _ => o,
        },
        _ => match slot {
            RingSlot::Previous => 0.0,
            RingSlot::Focus | RingSlot::Other => o,
            RingSlot::Next => 2.0 * o,
        },
    };
    Some(match input.orientation {
        Orientation::Horizontal => Rect::new(
            c.min_x() + along,
            c.mid_y() - size.height / 2.0,
            size.width,
            size.height,
        ),
        Orientation::Vertical => Rect::new(
            c.mid_x() - size.width / 2.0,
            c.min_y() + along,
            size.width,
            size.height,
        ),
    })
}

/// Classifies `id` relative to the focus within `ring` order, wrapping.
fn ring_slot(
    ring: &[&WindowLayoutInfo],
    focus_id: Option<WindowId>,
    id: WindowId,
) -> Option<RingSlot> {
    let index = ring.iter().position(|w| w.id == id)?;
    let focus_index = match focus_id.and_then(|f| ring.iter().position(|w| w.id == f)) {
        Some(i) => i,
        None => return Some(RingSlot::Other),
    };
    let n = ring.len();
    Some(if index == focus_index {
        RingSlot::Focus
    } else if (focus_index + 1) % n == index {
        RingSlot::Next
    } else if (index + 1) % n == focus_index {
        RingSlot::Previous
    } else {
        RingSlot::Other
    })
}

fn primary_length(c: Rect, orientation: Orientation) -> f64 {
    match orientation {
        Orientation::Horizontal => c.size.width,
        Orientation::Vertical => c.size.height,
    }
}

fn oriented_rect(c: Rect, along: f64, length: f64, orientation: Orientation) -> Rect {
    match orientation {
        Orientation::Horizontal => {
            Rect::new(c.min_x() + along, c.min_y(), length, c.size.height)
        }
        Orientation::Vertical => Rect::new(c.min_x(), c.min_y() + along, c.size.width, length),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::layout_engine::LayoutInput;
    use crate::sys::geometry::Size;

    const CONTAINER: Rect = Rect::new(0.0, 0.0, 1920.0, 1080.0);

    fn tiled(id: u64) -> WindowLayoutInfo {
        WindowLayoutInfo {
            id: WindowId(id),
            owner_pid: 100,
            frame: Rect::new(0.0, 0.0, 600.0, 400.0),
            is_resizable: true,
            is_floating: false,
        }
    }

    fn fixed(id: u64, width: f64, height: f64) -> WindowLayoutInfo {
        WindowLayoutInfo {
            id: WindowId(id),
            owner_pid: 100,
            frame: Rect::new(0.0, 0.0, width, height),
            is_resizable: false,
            is_floating: false,
        }
    }

    fn floating(id: u64) -> WindowLayoutInfo {
        WindowLayoutInfo {
            is_floating: true,
            ..tiled(id)
        }
    }

    fn input(windows: Vec<WindowLayoutInfo>, ring_focus: Option<u64>) -> LayoutInput {
        LayoutInput {
            windows,
            ring_focus: ring_focus.map(WindowId),
            actual_focus: None,
            container_frame: CONTAINER,
            offset: 50.0,
            orientation: Orientation::Horizontal,
        }
    }

    fn frame_of(result: &LayoutResult, id: u64) -> Rect {
        result
            .placements
            .iter()
            .find(|p| p.window_id == WindowId(id))
            .map(|p| p.target_frame)
            .expect("missing placement")
    }

    #[test]
    fn empty_input_emits_nothing() {
        let result = calculate(&input(vec![], None));
        assert_eq!(result, LayoutResult::default());
    }

    #[test]
    fn all_floating_emits_nothing() {
        let result = calculate(&input(vec![floating(1), floating(2)], Some(1)));
        assert!(result.placements.is_empty());
    }

    #[test]
    fn single_window_fills_the_container_exactly() {
        let result = calculate(&input(vec![tiled(1)], None));
        assert_eq!(result.placements.len(), 1);
        assert_eq!(frame_of(&result, 1), CONTAINER);
    }

    #[test]
    fn two_windows_peek_by_one_offset() {
        let result = calculate(&input(vec![tiled(1), tiled(2)], Some(2)));
        assert_eq!(frame_of(&result, 1), Rect::new(50.0, 0.0, 1870.0, 1080.0));
        assert_eq!(frame_of(&result, 2), Rect::new(0.0, 0.0, 1870.0, 1080.0));
    }

    #[test]
    fn three_windows_occupy_the_three_slots() {
        let result = calculate(&input(vec![tiled(1), tiled(2), tiled(3)], Some(2)));
        // Predecessor, focus, successor.
        assert_eq!(frame_of(&result, 1), Rect::new(0.0, 0.0, 1820.0, 1080.0));
        assert_eq!(frame_of(&result, 2), Rect::new(50.0, 0.0, 1820.0, 1080.0));
        assert_eq!(frame_of(&result, 3), Rect::new(100.0, 0.0, 1820.0, 1080.0));
    }

    #[test]
    fn ring_adjacency_wraps_at_the_ends() {
        let result = calculate(&input(vec![tiled(1), tiled(2), tiled(3)], Some(1)));
        // 3 precedes 1 (wrap), 2 follows it.
        assert_eq!(frame_of(&result, 3), Rect::new(0.0, 0.0, 1820.0, 1080.0));
        assert_eq!(frame_of(&result, 1), Rect::new(50.0, 0.0, 1820.0, 1080.0));
        assert_eq!(frame_of(&result, 2), Rect::new(100.0, 0.0, 1820.0, 1080.0));
    }

    #[test]
    fn non_adjacent_windows_hide_behind_focus() {
        let result =
            calculate(&input(vec![tiled(1), tiled(2), tiled(3), tiled(4), tiled(5)], Some(2)));
        let focus = frame_of(&result, 2);
        // 4 and 5 are neither adjacent to 2 nor focused; both stack with it,
        // still receiving placements so they stay put off-click.
        assert_eq!(frame_of(&result, 4), focus);
        assert_eq!(frame_of(&result, 5), focus);
        assert_eq!(result.placements.len(), 5);
    }

    #[test]
    fn no_placement_ever_leaves_the_container() {
        for n in 1..=6u64 {
            let windows: Vec<_> = (1..=n).map(tiled).collect();
            for focus in 1..=n {
                let result = calculate(&input(windows.clone(), Some(focus)));
                for placement in &result.placements {
                    let f = placement.target_frame;
                    assert!(f.min_x() >= CONTAINER.min_x(), "n={n} focus={focus}");
                    assert!(f.max_x() <= CONTAINER.max_x() + 1e-9, "n={n} focus={focus}");
                }
            }
        }
    }

    #[test]
    fn absent_focus_defaults_to_the_first_window() {
        let result = calculate(&input(vec![tiled(1), tiled(2)], Some(99)));
        assert_eq!(frame_of(&result, 1), Rect::new(0.0, 0.0, 1870.0, 1080.0));
        assert_eq!(frame_of(&result, 2), Rect::new(50.0, 0.0, 1870.0, 1080.0));
    }

    #[test]
    fn floating_focus_falls_through_to_first_tileable() {
        let result = calculate(&input(vec![floating(1), tiled(2), tiled(3)], Some(1)));
        assert_eq!(frame_of(&result, 2), Rect::new(0.0, 0.0, 1870.0, 1080.0));
        assert_eq!(frame_of(&result, 3), Rect::new(50.0, 0.0, 1870.0, 1080.0));
        assert!(result.placements.iter().all(|p| p.window_id != WindowId(1)));
    }

    #[test]
    fn sole_non_resizable_window_is_centered() {
        let mut layout_input = input(vec![fixed(1, 400.0, 300.0)], Some(1));
        layout_input.actual_focus = Some(WindowId(1));
        let result = calculate(&layout_input);
        assert_eq!(frame_of(&result, 1), Rect::new(760.0, 390.0, 400.0, 300.0));
    }

    #[test]
    fn non_resizable_actual_focus_freezes_the_accordion() {
        let mut layout_input = input(vec![tiled(1), tiled(2), fixed(3, 500.0, 400.0)], Some(1));
        layout_input.actual_focus = Some(WindowId(3));
        let result = calculate(&layout_input);
        // Tileable geometry is computed as if 1 were still focused.
        assert_eq!(frame_of(&result, 1), Rect::new(0.0, 0.0, 1870.0, 1080.0));
        assert_eq!(frame_of(&result, 2), Rect::new(50.0, 0.0, 1870.0, 1080.0));
        // The frozen window floats centered above the stack.
        assert_eq!(frame_of(&result, 3), Rect::new(710.0, 340.0, 500.0, 400.0));
    }

    #[test]
    fn non_resizable_neighbor_sits_at_its_slot_with_natural_size() {
        let result = calculate(&input(
            vec![tiled(1), fixed(2, 400.0, 300.0), tiled(3), tiled(4)],
            Some(1),
        ));
        // Window 2 follows the focus in ring order: next slot at 2 offsets,
        // vertically centered in the container.
        assert_eq!(frame_of(&result, 2), Rect::new(100.0, 390.0, 400.0, 300.0));
    }

    #[test]
    fn oversized_non_resizable_window_is_omitted_not_failed() {
        let result = calculate(&input(vec![tiled(1), fixed(2, 2500.0, 600.0)], Some(1)));
        assert_eq!(result.placements.len(), 1);
        assert_eq!(frame_of(&result, 1), CONTAINER);

        let result = calculate(&input(vec![tiled(1), fixed(2, 600.0, 1200.0)], Some(1)));
        assert_eq!(result.placements.len(), 1);
    }

    #[test]
    fn vertical_orientation_transposes_the_rule() {
        let mut layout_input = input(vec![tiled(1), tiled(2), tiled(3)], Some(2));
        layout_input.orientation = Orientation::Vertical;
        let result = calculate(&layout_input);
        assert_eq!(frame_of(&result, 1), Rect::new(0.0, 0.0, 1920.0, 980.0));
        assert_eq!(frame_of(&result, 2), Rect::new(0.0, 50.0, 1920.0, 980.0));
        assert_eq!(frame_of(&result, 3), Rect::new(0.0, 100.0, 1920.0, 980.0));
    }

    #[test]
    fn vertical_non_resizable_centers_horizontally() {
        let mut layout_input =
            input(vec![tiled(1), fixed(2, 400.0, 300.0), tiled(3)], Some(1));
        layout_input.orientation = Orientation::Vertical;
        let result = calculate(&layout_input);
        let frame = frame_of(&result, 2);
        assert_eq!(frame.size, Size::new(400.0, 300.0));
        assert_eq!(frame.min_x(), 760.0);
        // With two tileable windows the non-focus slot sits one offset in.
        assert_eq!(frame.min_y(), 50.0);
    }

    #[test]
    fn offset_larger_than_container_clamps_to_zero_width() {
        let mut layout_input = input(vec![tiled(1), tiled(2), tiled(3)], Some(1));
        layout_input.container_frame = Rect::new(0.0, 0.0, 80.0, 600.0);
        let result = calculate(&layout_input);
        for placement in &result.placements {
            assert!(placement.target_frame.size.width >= 0.0);
        }
    }
}
