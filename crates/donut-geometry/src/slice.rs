use crate::point::Point;
use crate::ring::RingGeometry;
use serde::Serialize;

/// One wedge of the chart. A non-positive sweep marks a slice that is laid
/// out (it still consumes the gap) but never drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Slice {
    pub index: usize,
    pub start_angle: f64,
    pub sweep_angle: f64,
}

impl Slice {
    pub fn is_drawable(&self) -> bool {
        self.sweep_angle > 0.0
    }

    pub fn end_angle(&self) -> f64 {
        self.start_angle + self.sweep_angle
    }

    /// How far this slice moves the angular cursor.
    pub fn advance(&self, gap_angle: f64) -> f64 {
        if self.is_drawable() {
            self.sweep_angle + gap_angle
        } else {
            gap_angle
        }
    }
}

/// Magnitudes are percentages of the full circle.
pub fn magnitude_to_degrees(value: f64) -> f64 {
    value / 100.0 * 360.0
}

/// Lays slices out clockwise from `start_angle`, each one starting where the
/// previous one (plus the gap) ended.
pub fn layout_slices(values: &[f64], start_angle: f64, gap_angle: f64) -> Vec<Slice> {
    values
        .iter()
        .enumerate()
        .scan(start_angle, |cursor, (index, &value)| {
            let slice = Slice {
                index,
                start_angle: *cursor,
                sweep_angle: magnitude_to_degrees(value) - gap_angle,
            };
            *cursor += slice.advance(gap_angle);
            Some(slice)
        })
        .collect()
}

/// The four points where a slice's radial edges meet the ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceEdges {
    pub start: RadialEdge,
    pub end: RadialEdge,
}

/// A radial edge of a slice, from the inner ring to the outer ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialEdge {
    pub outer: Point,
    pub inner: Point,
}

impl SliceEdges {
    pub fn new(ring: &RingGeometry, slice: &Slice) -> Self {
        let outer_start = Point::on_circle(ring.center, ring.outer_radius, slice.start_angle);
        let inner_start = Point::on_circle(ring.center, ring.inner_radius, slice.start_angle);
        Self {
            start: RadialEdge {
                outer: outer_start,
                inner: inner_start,
            },
            end: RadialEdge {
                outer: outer_start.rotate(slice.sweep_angle, ring.center),
                inner: inner_start.rotate(slice.sweep_angle, ring.center),
            },
        }
    }
}
