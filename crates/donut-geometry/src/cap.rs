use crate::contour::ArcSegment;
use crate::point::{Point, perpendicular_foot, point_at_distance, positive_angle};
use crate::ring::{RingGeometry, Side};
use crate::slice::SliceEdges;
use serde::Serialize;

/// A single circle rounding one whole side of a slice that is too narrow for
/// two corner fillets. It touches both radial edges and the ring arc.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SmallSweepCap {
    pub side: Side,
    pub center: Point,
    pub radius: f64,
    /// Where the contour joins the cap: on the start edge for the outer side,
    /// on the end edge for the inner side.
    pub entry: Point,
    pub start_angle: f64,
    pub sweep_angle: f64,
}

impl SmallSweepCap {
    pub fn arc(&self) -> ArcSegment {
        ArcSegment {
            center: self.center,
            radius: self.radius,
            start_angle: self.start_angle,
            sweep_angle: self.sweep_angle,
        }
    }

    /// Where the contour leaves the cap.
    pub fn exit(&self) -> Point {
        self.arc().end_point()
    }
}

/// Radius of the circle tangent to both edges of a wedge of `sweep` degrees
/// and to the ring arc of `ring_radius` on `side`.
pub fn cap_radius(side: Side, ring_radius: f64, sweep: f64) -> f64 {
    let half_sin = (sweep.to_radians() / 2.0).sin();
    match side {
        Side::Outer => half_sin * ring_radius / (1.0 + half_sin),
        Side::Inner => half_sin * ring_radius / (1.0 - half_sin),
    }
}

/// Builds the fallback cap for one side of a slice of `sweep` degrees.
///
/// Returns `None` when the sweep admits no finite cap, which happens for the
/// inner side once the slice reaches half a turn.
pub fn solve_cap(
    ring: &RingGeometry,
    edges: &SliceEdges,
    sweep: f64,
    side: Side,
) -> Option<SmallSweepCap> {
    let radius = cap_radius(side, ring.radius(side), sweep);
    if !(radius.is_finite() && radius > 0.0) {
        return None;
    }

    let from_center = match side {
        Side::Outer => ring.outer_radius - radius,
        Side::Inner => ring.inner_radius + radius,
    };
    let bisector = edges.start.outer.midpoint(edges.end.outer);
    let center = point_at_distance(ring.center, bisector, from_center);

    let entry_edge = match side {
        Side::Outer => edges.start.outer,
        Side::Inner => edges.end.outer,
    };
    let entry = perpendicular_foot(ring.center, entry_edge, center);

    let sweep_angle = match side {
        Side::Outer => (90.0 + sweep / 2.0) * 2.0,
        Side::Inner => (90.0 - sweep / 2.0) * 2.0,
    };

    let cap = SmallSweepCap {
        side,
        center,
        radius,
        entry,
        start_angle: positive_angle(center, entry),
        sweep_angle,
    };
    (cap.center.x.is_finite() && cap.center.y.is_finite()).then_some(cap)
}
