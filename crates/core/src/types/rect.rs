use serde::{Deserialize, Serialize};

use super::{PhysicalRect, Point, Size};

/// Axis-aligned rectangle in logical units, as reported by UI layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub const fn from_parts(origin: Point, size: Size) -> Self {
        Self::new(origin.x(), origin.y(), size.width(), size.height())
    }

    pub const fn x(&self) -> f64 {
        self.x
    }

    pub const fn y(&self) -> f64 {
        self.y
    }

    pub const fn width(&self) -> f64 {
        self.width
    }

    pub const fn height(&self) -> f64 {
        self.height
    }

    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Converts to physical pixels by multiplying every component with
    /// `scale` and truncating toward zero.
    ///
    /// Float to integer casts saturate at the `i32` bounds and map NaN to 0,
    /// so a broken scale factor yields a degenerate rectangle instead of
    /// garbage coordinates.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_physical(&self, scale: f64) -> PhysicalRect {
        PhysicalRect::new(
            (self.x * scale) as i32,
            (self.y * scale) as i32,
            (self.width * scale) as i32,
            (self.height * scale) as i32,
        )
    }
}
