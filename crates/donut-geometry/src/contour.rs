use crate::cap::{SmallSweepCap, solve_cap};
use crate::fillet::{Corner, CornerError, CornerFillet, End, solve_corner};
use crate::point::{Point, clockwise_angle, positive_angle};
use crate::ring::{RingGeometry, Side, Thresholds};
use crate::slice::{Slice, SliceEdges};
use serde::Serialize;
use thiserror::Error;

/// A circular arc. A positive sweep runs clockwise on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArcSegment {
    pub center: Point,
    pub radius: f64,
    pub start_angle: f64,
    pub sweep_angle: f64,
}

/// Axis-aligned box, used to describe an arc's ellipse for surfaces that
/// want one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl ArcSegment {
    pub fn point_at(&self, degrees: f64) -> Point {
        Point::on_circle(self.center, self.radius, degrees)
    }

    pub fn start_point(&self) -> Point {
        self.point_at(self.start_angle)
    }

    pub fn end_point(&self) -> Point {
        self.point_at(self.start_angle + self.sweep_angle)
    }

    pub fn is_clockwise(&self) -> bool {
        self.sweep_angle >= 0.0
    }

    /// Bounding box of the full circle the arc belongs to.
    pub fn bounds(&self) -> Bounds {
        Bounds {
            left: self.center.x - self.radius,
            top: self.center.y - self.radius,
            right: self.center.x + self.radius,
            bottom: self.center.y + self.radius,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PathOp {
    MoveTo(Point),
    LineTo(Point),
    /// Surfaces connect the current point to the arc's start with a line.
    Arc(ArcSegment),
    Close,
}

/// The closed outline of one slice. `index` is the slice's position in the
/// data, and so also picks its brush.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentContour {
    pub index: usize,
    pub ops: Vec<PathOp>,
}

impl SegmentContour {
    pub fn start_point(&self) -> Option<Point> {
        match self.ops.first() {
            Some(PathOp::MoveTo(p)) => Some(*p),
            _ => None,
        }
    }

    /// The current point right before the path is closed.
    pub fn end_point(&self) -> Option<Point> {
        self.ops.iter().rev().find_map(|op| match op {
            PathOp::MoveTo(p) | PathOp::LineTo(p) => Some(*p),
            PathOp::Arc(arc) => Some(arc.end_point()),
            PathOp::Close => None,
        })
    }

    /// Largest jump a surface would have to bridge with an implicit line:
    /// between the current point and each arc's start, and between the last
    /// point and the first.
    pub fn max_discontinuity(&self) -> f64 {
        let mut current = None::<Point>;
        let mut worst = 0.0_f64;
        for op in &self.ops {
            match op {
                PathOp::MoveTo(p) | PathOp::LineTo(p) => current = Some(*p),
                PathOp::Arc(arc) => {
                    if let Some(c) = current {
                        worst = worst.max(c.distance(arc.start_point()));
                    }
                    current = Some(arc.end_point());
                }
                PathOp::Close => {}
            }
        }
        if let (Some(first), Some(last)) = (self.start_point(), current) {
            worst = worst.max(first.distance(last));
        }
        worst
    }

    pub fn is_closed(&self, tolerance: f64) -> bool {
        matches!(self.ops.last(), Some(PathOp::Close)) && self.max_discontinuity() <= tolerance
    }
}

/// What rounds one side (outer or inner) of a slice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SideRounding {
    Fillets {
        start: CornerFillet,
        end: CornerFillet,
    },
    Cap(SmallSweepCap),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    #[error("sweep angle is not positive")]
    NonPositiveSweep,
    #[error("{corner} corner unresolved: {error}")]
    Unresolved { corner: Corner, error: CornerError },
    #[error("no finite {side} cap fits the slice")]
    CapUnresolved { side: Side },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SliceOutcome {
    Drawn(SegmentContour),
    Skipped { index: usize, reason: SkipReason },
}

impl SliceOutcome {
    pub fn contour(&self) -> Option<&SegmentContour> {
        match self {
            Self::Drawn(contour) => Some(contour),
            Self::Skipped { .. } => None,
        }
    }

    pub fn into_contour(self) -> Option<SegmentContour> {
        match self {
            Self::Drawn(contour) => Some(contour),
            Self::Skipped { .. } => None,
        }
    }
}

/// Fillets for all four corners of a slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceFillets {
    pub outer_start: CornerFillet,
    pub outer_end: CornerFillet,
    pub inner_start: CornerFillet,
    pub inner_end: CornerFillet,
}

impl SliceFillets {
    pub fn solve(
        ring: &RingGeometry,
        edges: &SliceEdges,
    ) -> Result<Self, (Corner, CornerError)> {
        let solve = |side: Side, end: End| {
            let corner = Corner::new(side, end);
            let edge = match end {
                End::Start => edges.start,
                End::End => edges.end,
            };
            solve_corner(
                ring.center,
                ring.radius(side),
                edge,
                ring.fillet_radius,
                corner,
            )
            .map_err(|e| (corner, e))
        };

        Ok(Self {
            outer_start: solve(Side::Outer, End::Start)?,
            outer_end: solve(Side::Outer, End::End)?,
            inner_start: solve(Side::Inner, End::Start)?,
            inner_end: solve(Side::Inner, End::End)?,
        })
    }

    fn side(&self, side: Side) -> SideRounding {
        match side {
            Side::Outer => SideRounding::Fillets {
                start: self.outer_start,
                end: self.outer_end,
            },
            Side::Inner => SideRounding::Fillets {
                start: self.inner_start,
                end: self.inner_end,
            },
        }
    }
}

#[derive(Debug, Default)]
struct PathBuilder {
    ops: Vec<PathOp>,
}

impl PathBuilder {
    fn move_to(&mut self, p: Point) {
        self.ops.push(PathOp::MoveTo(p));
    }

    fn line_to(&mut self, p: Point) {
        self.ops.push(PathOp::LineTo(p));
    }

    fn arc(&mut self, arc: ArcSegment) {
        self.ops.push(PathOp::Arc(arc));
    }

    fn fillet(&mut self, fillet: &CornerFillet) {
        if !fillet.is_sharp() {
            self.arc(fillet.arc());
        }
    }

    fn close(mut self) -> Vec<PathOp> {
        self.ops.push(PathOp::Close);
        self.ops
    }
}

/// Ring arc between two fillets' points on the curve, running from `from`
/// to `to` clockwise, or counter-clockwise when `reverse` is set.
fn ring_arc(
    ring: &RingGeometry,
    side: Side,
    from: Point,
    to: Point,
    reverse: bool,
) -> ArcSegment {
    let sweep = if reverse {
        -clockwise_angle(to, ring.center, from)
    } else {
        clockwise_angle(from, ring.center, to)
    };
    ArcSegment {
        center: ring.center,
        radius: ring.radius(side),
        start_angle: positive_angle(ring.center, from),
        sweep_angle: sweep,
    }
}

/// Traces the outline clockwise: outer arc, end edge inward, inner arc back,
/// start edge outward.
fn trace(ring: &RingGeometry, outer: &SideRounding, inner: &SideRounding) -> Vec<PathOp> {
    let mut path = PathBuilder::default();

    match outer {
        SideRounding::Cap(cap) => {
            path.move_to(cap.entry);
            path.arc(cap.arc());
        }
        SideRounding::Fillets { start, end } => {
            path.move_to(start.point_on_curve);
            path.arc(ring_arc(
                ring,
                Side::Outer,
                start.point_on_curve,
                end.point_on_curve,
                false,
            ));
            path.fillet(end);
        }
    }

    match inner {
        SideRounding::Cap(cap) => {
            path.line_to(cap.entry);
            path.arc(cap.arc());
        }
        SideRounding::Fillets { start, end } => {
            path.line_to(end.point_on_line);
            path.fillet(end);
            path.arc(ring_arc(
                ring,
                Side::Inner,
                end.point_on_curve,
                start.point_on_curve,
                true,
            ));
            path.fillet(start);
        }
    }

    match outer {
        SideRounding::Cap(cap) => path.line_to(cap.entry),
        SideRounding::Fillets { start, .. } => {
            path.line_to(start.point_on_line);
            path.fillet(start);
        }
    }

    path.close()
}

/// Chooses fillets or a cap for one side of a slice.
fn side_rounding(
    ring: &RingGeometry,
    thresholds: &Thresholds,
    edges: &SliceEdges,
    fillets: &SliceFillets,
    slice: &Slice,
    side: Side,
) -> Result<SideRounding, SkipReason> {
    if !thresholds.needs_cap(side, slice.sweep_angle) {
        return Ok(fillets.side(side));
    }
    solve_cap(ring, edges, slice.sweep_angle, side)
        .map(SideRounding::Cap)
        .ok_or(SkipReason::CapUnresolved { side })
}

/// Builds the rounded outline of one slice.
pub fn build_contour(ring: &RingGeometry, thresholds: &Thresholds, slice: &Slice) -> SliceOutcome {
    let skipped = |reason| SliceOutcome::Skipped {
        index: slice.index,
        reason,
    };

    if !slice.is_drawable() {
        return skipped(SkipReason::NonPositiveSweep);
    }

    let edges = SliceEdges::new(ring, slice);
    let fillets = match SliceFillets::solve(ring, &edges) {
        Ok(f) => f,
        Err((corner, error)) => {
            let reason = SkipReason::Unresolved { corner, error };
            log::warn!("Skipping slice {}: {}", slice.index, reason);
            return skipped(reason);
        }
    };

    let rounding = |side| side_rounding(ring, thresholds, &edges, &fillets, slice, side);
    let (outer, inner) = match (rounding(Side::Outer), rounding(Side::Inner)) {
        (Ok(outer), Ok(inner)) => (outer, inner),
        (Err(reason), _) | (_, Err(reason)) => {
            log::warn!("Skipping slice {}: {}", slice.index, reason);
            return skipped(reason);
        }
    };

    SliceOutcome::Drawn(SegmentContour {
        index: slice.index,
        ops: trace(ring, &outer, &inner),
    })
}

/// Outlines for every slice, in order. Skipped slices keep their place so
/// callers can see why nothing was drawn for them.
pub fn compute_contours(
    ring: &RingGeometry,
    thresholds: &Thresholds,
    slices: &[Slice],
) -> Vec<SliceOutcome> {
    slices
        .iter()
        .map(|slice| build_contour(ring, thresholds, slice))
        .collect()
}
