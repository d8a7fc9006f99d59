//! Platform-neutral geometry types.
//!
//! Screen coordinates: x grows right, y grows down, all values in pixels.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self { Point { x, y } }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self { Size { width, height } }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn min_x(&self) -> f64 { self.origin.x }

    pub fn min_y(&self) -> f64 { self.origin.y }

    pub fn max_x(&self) -> f64 { self.origin.x + self.size.width }

    pub fn max_y(&self) -> f64 { self.origin.y + self.size.height }

    pub fn mid_x(&self) -> f64 { self.origin.x + self.size.width / 2.0 }

    pub fn mid_y(&self) -> f64 { self.origin.y + self.size.height / 2.0 }

    pub fn center(&self) -> Point { Point::new(self.mid_x(), self.mid_y()) }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.x < self.max_x()
            && point.y >= self.min_y()
            && point.y < self.max_y()
    }

    /// Shrinks the rect by `amount` on every side. Collapses to a zero-size
    /// rect at the center rather than going negative.
    pub fn inset(&self, amount: f64) -> Rect {
        let width = (self.size.width - 2.0 * amount).max(0.0);
        let height = (self.size.height - 2.0 * amount).max(0.0);
        Rect {
            origin: Point::new(
                self.origin.x + (self.size.width - width) / 2.0,
                self.origin.y + (self.size.height - height) / 2.0,
            ),
            size: Size::new(width, height),
        }
    }

    pub fn distance_squared_to(&self, point: Point) -> f64 {
        let dx = self.mid_x() - point.x;
        let dy = self.mid_y() - point.y;
        dx * dx + dy * dy
    }
}
