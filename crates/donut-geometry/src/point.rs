use serde::Serialize;
use std::ops::{Add, Mul, Sub};

/// A point (or vector) in screen space: x to the right, y down.
///
/// Angles throughout the crate are in degrees and grow clockwise as seen on
/// screen, which is the same direction `f64::atan2` grows in y-down space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The point at `radius` from `center` in direction `degrees`.
    pub fn on_circle(center: Point, radius: f64, degrees: f64) -> Self {
        let rad = degrees.to_radians();
        Self::new(center.x + radius * rad.cos(), center.y + radius * rad.sin())
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Point) -> f64 {
        (other - self).length()
    }

    pub fn midpoint(self, other: Point) -> Point {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Rotates this point about `center` by `degrees`.
    pub fn rotate(self, degrees: f64, center: Point) -> Point {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let d = self - center;
        Self::new(
            d.x * cos - d.y * sin + center.x,
            d.x * sin + d.y * cos + center.y,
        )
    }

    pub fn approx_eq(self, other: Point, tolerance: f64) -> bool {
        self.distance(other) <= tolerance
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Wraps an angle into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// The point `distance` units from `from` in the direction of `toward`.
pub fn point_at_distance(from: Point, toward: Point, distance: f64) -> Point {
    let d = toward - from;
    from + d * (distance / d.length())
}

/// Orthogonal projection of `p` onto the infinite line through `a` and `b`.
///
/// Yields NaN coordinates when `a == b`.
pub fn perpendicular_foot(a: Point, b: Point, p: Point) -> Point {
    let v = b - a;
    let w = p - a;
    let t = (w.x * v.x + w.y * v.y) / (v.x * v.x + v.y * v.y);
    a + v * t
}

/// Direction of the vector `from -> to`, in `[0, 360)`.
pub fn positive_angle(from: Point, to: Point) -> f64 {
    let d = to - from;
    normalize_degrees(d.y.atan2(d.x).to_degrees())
}

/// Unsigned angle `a-vertex-c` in `[0, 180]`, via the law of cosines.
pub fn angle_at_vertex(a: Point, vertex: Point, c: Point) -> f64 {
    let ab = a.distance(vertex);
    let bc = vertex.distance(c);
    let ac = a.distance(c);
    if ab == 0.0 || bc == 0.0 {
        return 0.0;
    }
    let cos = ((ab * ab + bc * bc - ac * ac) / (2.0 * ab * bc)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Sweep from ray `vertex -> a` to ray `vertex -> c`, in `[0, 360)`.
pub fn clockwise_angle(a: Point, vertex: Point, c: Point) -> f64 {
    normalize_degrees(positive_angle(vertex, c) - positive_angle(vertex, a))
}

/// True when the shorter way around `center` from `from` to `to` is clockwise.
pub fn is_clockwise(center: Point, from: Point, to: Point) -> bool {
    let diff = normalize_degrees(positive_angle(center, to) - positive_angle(center, from));
    (0.0..=180.0).contains(&diff)
}
