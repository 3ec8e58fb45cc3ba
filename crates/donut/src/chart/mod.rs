mod brush;
mod model;
pub mod view;

pub use brush::Brush;
pub use model::{DonutChart, Frame, PaintedSegment, RingSettings};
