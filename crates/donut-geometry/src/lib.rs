//! Geometry for ring ("donut") chart slices with rounded corners.
//!
//! Everything here is pure: [`layout_slices`] turns magnitudes into angular
//! spans, and [`compute_contours`] turns each span into a closed outline made
//! of moves, lines and circular arcs that any 2D surface can replay.

pub mod cap;
pub mod contour;
pub mod fillet;
pub mod point;
pub mod ring;
pub mod slice;

pub use cap::SmallSweepCap;
pub use contour::{
    ArcSegment, PathOp, SegmentContour, SideRounding, SkipReason, SliceOutcome, build_contour,
    compute_contours,
};
pub use fillet::{Corner, CornerError, CornerFillet, End};
pub use point::Point;
pub use ring::{RingError, RingGeometry, Side, ThresholdCache, Thresholds};
pub use slice::{Slice, layout_slices};
