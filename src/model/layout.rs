//! Built-in layouts.
//!
//! A layout is a left-to-right column split of a monitor's visible frame,
//! expressed as fractions of the available width. `Dynamic` marks a monitor
//! whose containers have been manually resized; retiles then keep the
//! containers' existing frames instead of recomputing them from a table.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::sys::geometry::Rect;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LayoutId {
    Monocle,
    SplitHalves,
    MainTwoThirds,
    StackTwoThirds,
    Thirds,
    WideCenter,
    MainThreeFifths,
    StackThreeFifths,
    Fifths,
    Dynamic,
}

impl LayoutId {
    /// The nine built-in layouts, in selection order. Layout 1 is Monocle.
    pub fn from_index(index: usize) -> Option<LayoutId> {
        use LayoutId::*;
        match index {
            1 => Some(Monocle),
            2 => Some(SplitHalves),
            3 => Some(MainTwoThirds),
            4 => Some(StackTwoThirds),
            5 => Some(Thirds),
            6 => Some(WideCenter),
            7 => Some(MainThreeFifths),
            8 => Some(StackThreeFifths),
            9 => Some(Fifths),
            _ => None,
        }
    }

    /// Column width fractions, left to right. `None` for `Dynamic`.
    pub fn fractions(&self) -> Option<&'static [f64]> {
        use LayoutId::*;
        const THIRD: f64 = 1.0 / 3.0;
        const FIFTH: f64 = 1.0 / 5.0;
        match self {
            Monocle => Some(&[1.0]),
            SplitHalves => Some(&[0.5, 0.5]),
            MainTwoThirds => Some(&[2.0 * THIRD, THIRD]),
            StackTwoThirds => Some(&[THIRD, 2.0 * THIRD]),
            Thirds => Some(&[THIRD, THIRD, THIRD]),
            WideCenter => Some(&[FIFTH, 3.0 * FIFTH, FIFTH]),
            MainThreeFifths => Some(&[3.0 * FIFTH, 2.0 * FIFTH]),
            StackThreeFifths => Some(&[2.0 * FIFTH, 3.0 * FIFTH]),
            Fifths => Some(&[FIFTH; 5]),
            Dynamic => None,
        }
    }

    /// Splits `visible_frame` into container rectangles: inset by `margin`,
    /// with `padding` between adjacent columns. `None` for `Dynamic`.
    pub fn container_frames(
        &self,
        visible_frame: Rect,
        margin: f64,
        padding: f64,
    ) -> Option<Vec<Rect>> {
        let fractions = self.fractions()?;
        let count = fractions.len();
        let inset = visible_frame.inset(margin);
        let available_width = (inset.size.width - padding * (count as f64 - 1.0)).max(0.0);

        let mut frames = Vec::with_capacity(count);
        let mut x = inset.min_x();
        for fraction in fractions {
            let width = available_width * fraction;
            frames.push(Rect::new(x, inset.min_y(), width, inset.size.height));
            x += width + padding;
        }
        Some(frames)
    }
}
