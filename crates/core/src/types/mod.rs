mod physical;
mod point;
mod rect;
mod size;

pub use physical::PhysicalRect;
pub use point::Point;
pub use rect::Rect;
pub use size::Size;
