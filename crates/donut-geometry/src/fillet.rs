use crate::contour::ArcSegment;
use crate::point::{
    Point, angle_at_vertex, is_clockwise, perpendicular_foot, point_at_distance, positive_angle,
};
use crate::ring::Side;
use crate::slice::RadialEdge;
use derive_more::Display;
use serde::Serialize;
use strum::{Display as StrumDisplay, EnumIter, IntoEnumIterator};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIter, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum End {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[display("{side}-{end}")]
pub struct Corner {
    pub side: Side,
    pub end: End,
}

impl Corner {
    pub fn new(side: Side, end: End) -> Self {
        Self { side, end }
    }

    /// Every corner of a slice, outer side first.
    pub fn all() -> impl Iterator<Item = Corner> {
        Side::iter().flat_map(|side| End::iter().map(move |end| Corner::new(side, end)))
    }

    /// Whether the fillet arc for this corner is drawn from its point on the
    /// ring arc (as opposed to its point on the radial edge).
    fn starts_on_curve(&self) -> bool {
        matches!(
            (self.end, self.side),
            (End::End, Side::Outer) | (End::Start, Side::Inner)
        )
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerError {
    #[error("radial edge has zero length")]
    DegenerateEdge,
    #[error("fillet radius is too large for the ring")]
    RadiusTooLarge,
    #[error("no offset line lies on the slice side of the radial edge")]
    NoOffsetCandidate,
}

/// A circular arc rounding one corner of a slice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CornerFillet {
    pub corner: Corner,
    pub center: Point,
    pub radius: f64,
    /// Tangency point on the radial edge.
    pub point_on_line: Point,
    /// Tangency point on the ring arc.
    pub point_on_curve: Point,
    pub start_angle: f64,
    pub sweep_angle: f64,
}

impl CornerFillet {
    fn sharp(corner: Corner, at: Point) -> Self {
        Self {
            corner,
            center: at,
            radius: 0.0,
            point_on_line: at,
            point_on_curve: at,
            start_angle: 0.0,
            sweep_angle: 0.0,
        }
    }

    pub fn is_sharp(&self) -> bool {
        self.radius == 0.0
    }

    pub fn arc(&self) -> ArcSegment {
        ArcSegment {
            center: self.center,
            radius: self.radius,
            start_angle: self.start_angle,
            sweep_angle: self.sweep_angle,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct OffsetLine {
    outer: Point,
    inner: Point,
}

/// The two lines parallel to `edge` at distance `offset`, one on each side.
fn offset_lines(edge: RadialEdge, offset: f64) -> [OffsetLine; 2] {
    let d = edge.outer - edge.inner;
    let angle = d.y.atan2(d.x);
    let shift = Point::new(-offset * angle.sin(), offset * angle.cos());
    [
        OffsetLine {
            outer: edge.outer + shift,
            inner: edge.inner + shift,
        },
        OffsetLine {
            outer: edge.outer - shift,
            inner: edge.inner - shift,
        },
    ]
}

/// Solves the fillet of `fillet_radius` for one corner of a slice.
///
/// `ring_radius` is the radius of the ring arc on the corner's side, and
/// `edge` is the radial edge at the corner's end of the slice. The fillet
/// circle is tangent to that edge on the slice's side and tangent to the
/// ring arc: internally for the outer ring, externally for the inner one.
pub fn solve_corner(
    ring_center: Point,
    ring_radius: f64,
    edge: RadialEdge,
    fillet_radius: f64,
    corner: Corner,
) -> Result<CornerFillet, CornerError> {
    if edge.outer.distance(edge.inner) <= f64::EPSILON {
        return Err(CornerError::DegenerateEdge);
    }

    if fillet_radius == 0.0 {
        let at = match corner.side {
            Side::Outer => edge.outer,
            Side::Inner => edge.inner,
        };
        return Ok(CornerFillet::sharp(corner, at));
    }

    // distance from the ring center, along the radial edge, to the tangency
    let radicand = match corner.side {
        Side::Outer => (ring_radius - fillet_radius).powi(2) - fillet_radius.powi(2),
        Side::Inner => (ring_radius + fillet_radius).powi(2) - fillet_radius.powi(2),
    };
    if !(radicand > 0.0) {
        return Err(CornerError::RadiusTooLarge);
    }
    let along = radicand.sqrt();

    let offset = offset_lines(edge, fillet_radius)
        .into_iter()
        .find(|line| {
            let clockwise = is_clockwise(ring_center, edge.outer, line.outer);
            match corner.end {
                End::Start => clockwise,
                End::End => !clockwise,
            }
        })
        .ok_or(CornerError::NoOffsetCandidate)?;

    let foot = perpendicular_foot(offset.inner, offset.outer, ring_center);
    let center = point_at_distance(foot, offset.inner, along);

    let point_on_line = point_at_distance(ring_center, edge.inner, along);
    let point_on_curve = point_at_distance(ring_center, center, ring_radius);

    let sweep_angle = angle_at_vertex(point_on_line, center, point_on_curve);
    let first = if corner.starts_on_curve() {
        point_on_curve
    } else {
        point_on_line
    };

    Ok(CornerFillet {
        corner,
        center,
        radius: fillet_radius,
        point_on_line,
        point_on_curve,
        start_angle: positive_angle(center, first),
        sweep_angle,
    })
}
