use serde::{Deserialize, Serialize};
use std::fmt;

/// Rectangle in physical (device) pixels relative to the window's client
/// area. This is the unit non-client region APIs consume.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhysicalRect {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl PhysicalRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub const fn x(&self) -> i32 {
        self.x
    }

    pub const fn y(&self) -> i32 {
        self.y
    }

    pub const fn width(&self) -> i32 {
        self.width
    }

    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Only rectangles with a positive width and height may be applied as a
    /// region.
    pub const fn has_area(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Half-open containment test (`[x, x + width)`), computed in `i64` so
    /// rectangles near the `i32` bounds cannot overflow.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        let (px, py) = (i64::from(px), i64::from(py));
        let (x, y) = (i64::from(self.x), i64::from(self.y));
        self.has_area()
            && px >= x
            && py >= y
            && px < x + i64::from(self.width)
            && py < y + i64::from(self.height)
    }
}

impl fmt::Display for PhysicalRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}x{})", self.x, self.y, self.width, self.height)
    }
}
