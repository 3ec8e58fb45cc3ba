use crate::point::Point;
use serde::Serialize;
use strum::{Display as StrumDisplay, EnumIter};
use thiserror::Error;

pub const DEFAULT_GAP_ANGLE: f64 = 4.0;
pub const DEFAULT_START_ANGLE: f64 = 90.0;
/// Extra room added to the fillet radius when deciding whether two corner
/// fillets fit on one side of a slice.
pub const DEFAULT_THRESHOLD_MARGIN: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIter, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Outer,
    Inner,
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum RingError {
    #[error("outer radius must be positive, got {0}")]
    NonPositiveOuter(f64),
    #[error("inner radius {inner} must lie strictly between 0 and the outer radius {outer}")]
    InnerOutOfRange { inner: f64, outer: f64 },
    #[error("fillet radius must not be negative, got {0}")]
    NegativeFillet(f64),
}

/// The annulus every slice is cut from, plus the per-chart layout settings.
///
/// A fillet radius above half the stroke width makes the outer and inner
/// fillets of a radial edge overlap, and outlines then cross themselves; see
/// [`RingGeometry::fillets_overlap`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RingGeometry {
    pub center: Point,
    pub outer_radius: f64,
    pub inner_radius: f64,
    pub fillet_radius: f64,
    pub gap_angle: f64,
    pub start_angle: f64,
    pub threshold_margin: f64,
}

impl RingGeometry {
    pub fn new(
        center: Point,
        outer_radius: f64,
        inner_radius: f64,
        fillet_radius: f64,
    ) -> Result<Self, RingError> {
        if !(outer_radius > 0.0) {
            return Err(RingError::NonPositiveOuter(outer_radius));
        }
        if !(inner_radius > 0.0 && inner_radius < outer_radius) {
            return Err(RingError::InnerOutOfRange {
                inner: inner_radius,
                outer: outer_radius,
            });
        }
        if !(fillet_radius >= 0.0) {
            return Err(RingError::NegativeFillet(fillet_radius));
        }

        Ok(Self {
            center,
            outer_radius,
            inner_radius,
            fillet_radius,
            gap_angle: DEFAULT_GAP_ANGLE,
            start_angle: DEFAULT_START_ANGLE,
            threshold_margin: DEFAULT_THRESHOLD_MARGIN,
        })
    }

    /// Builds a ring whose stroke is `stroke_fraction` of the outer radius.
    pub fn from_stroke_fraction(
        center: Point,
        outer_radius: f64,
        stroke_fraction: f64,
        fillet_radius: f64,
    ) -> Result<Self, RingError> {
        let inner_radius = outer_radius - stroke_fraction * outer_radius;
        Self::new(center, outer_radius, inner_radius, fillet_radius)
    }

    pub fn with_gap_angle(mut self, degrees: f64) -> Self {
        self.gap_angle = degrees;
        self
    }

    pub fn with_start_angle(mut self, degrees: f64) -> Self {
        self.start_angle = degrees;
        self
    }

    /// Negative margins are treated as zero.
    pub fn with_threshold_margin(mut self, margin: f64) -> Self {
        self.threshold_margin = margin.max(0.0);
        self
    }

    pub fn radius(&self, side: Side) -> f64 {
        match side {
            Side::Outer => self.outer_radius,
            Side::Inner => self.inner_radius,
        }
    }

    pub fn stroke_width(&self) -> f64 {
        self.outer_radius - self.inner_radius
    }

    /// Whether the outer fillet's tangency on a radial edge sits closer to
    /// the center than the inner fillet's.
    pub fn fillets_overlap(&self) -> bool {
        let r = self.fillet_radius;
        let outer = ((self.outer_radius - r).powi(2) - r.powi(2)).sqrt();
        let inner = ((self.inner_radius + r).powi(2) - r.powi(2)).sqrt();
        outer < inner
    }

    /// Sharp corners (zero fillet radius) never need the cap fallback, so
    /// both thresholds are zero then.
    pub fn thresholds(&self) -> Thresholds {
        if self.fillet_radius == 0.0 {
            return Thresholds::default();
        }
        let inflated = self.fillet_radius + self.threshold_margin;
        Thresholds {
            outer: threshold_angle(inflated, self.outer_radius - inflated),
            inner: threshold_angle(inflated, self.inner_radius + inflated),
        }
    }

    /// The inputs the thresholds depend on; center, gap and start angle are
    /// irrelevant to them.
    fn threshold_key(&self) -> [f64; 4] {
        [
            self.outer_radius,
            self.inner_radius,
            self.fillet_radius,
            self.threshold_margin,
        ]
    }
}

/// Central angle between two circles of radius `inflated` whose centers sit
/// `center_distance` from the ring center and just touch each other.
fn threshold_angle(inflated: f64, center_distance: f64) -> f64 {
    let cos = 1.0 - 2.0 * inflated.powi(2) / center_distance.powi(2);
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Minimum slice sweeps, in degrees, that still leave room for two
/// independent corner fillets on each side.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Thresholds {
    pub outer: f64,
    pub inner: f64,
}

impl Thresholds {
    pub fn for_side(&self, side: Side) -> f64 {
        match side {
            Side::Outer => self.outer,
            Side::Inner => self.inner,
        }
    }

    /// Whether a slice of `sweep` degrees needs the single-cap fallback on `side`.
    pub fn needs_cap(&self, side: Side, sweep: f64) -> bool {
        sweep <= self.for_side(side)
    }
}

/// Keeps the last computed [`Thresholds`] until the ring's radii, fillet
/// radius or margin change.
#[derive(Debug, Default)]
pub struct ThresholdCache {
    key: Option<[f64; 4]>,
    value: Thresholds,
}

impl ThresholdCache {
    pub fn get(&mut self, ring: &RingGeometry) -> Thresholds {
        let key = ring.threshold_key();
        if self.key != Some(key) {
            self.value = ring.thresholds();
            self.key = Some(key);
            log::debug!(
                "Recomputed thresholds: outer {:.2}°, inner {:.2}°",
                self.value.outer,
                self.value.inner
            );
            if ring.fillets_overlap() {
                log::debug!(
                    "Fillet radius {} exceeds half the stroke width {}, outlines will self-intersect",
                    ring.fillet_radius,
                    ring.stroke_width()
                );
            }
        }
        self.value
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }

    pub fn is_valid_for(&self, ring: &RingGeometry) -> bool {
        self.key == Some(ring.threshold_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ring() -> RingGeometry {
        RingGeometry::new(Point::new(100.0, 100.0), 100.0, 52.0, 20.0).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_radii() {
        let c = Point::default();
        assert_eq!(
            RingGeometry::new(c, 0.0, 10.0, 1.0),
            Err(RingError::NonPositiveOuter(0.0))
        );
        assert!(matches!(
            RingGeometry::new(c, 50.0, 50.0, 1.0),
            Err(RingError::InnerOutOfRange { .. })
        ));
        assert!(matches!(
            RingGeometry::new(c, 50.0, 0.0, 1.0),
            Err(RingError::InnerOutOfRange { .. })
        ));
        assert_eq!(
            RingGeometry::new(c, 50.0, 20.0, -1.0),
            Err(RingError::NegativeFillet(-1.0))
        );
        assert!(RingGeometry::new(c, 50.0, 20.0, f64::NAN).is_err());
    }

    #[test]
    fn test_from_stroke_fraction() {
        let ring =
            RingGeometry::from_stroke_fraction(Point::default(), 100.0, 0.48, 20.0).unwrap();
        assert_abs_diff_eq!(ring.inner_radius, 52.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ring.stroke_width(), 48.0, epsilon = 1e-9);
        assert!(RingGeometry::from_stroke_fraction(Point::default(), 100.0, 1.0, 20.0).is_err());
    }

    #[test]
    fn test_thresholds_default_margin() {
        let t = ring().thresholds();
        // acos(1 - 2 * 24^2 / 76^2)
        let expected = (1.0_f64 - 2.0 * 576.0 / 5776.0).acos().to_degrees();
        assert_abs_diff_eq!(t.outer, expected, epsilon = 1e-9);
        // 52 + 24 == 100 - 24, so both sides agree for this ring
        assert_abs_diff_eq!(t.inner, expected, epsilon = 1e-9);
        assert!(t.outer > 30.0 && t.outer < 40.0);
        assert!(!t.needs_cap(Side::Outer, 86.0));
        assert!(t.needs_cap(Side::Outer, t.outer));
    }

    #[test]
    fn test_thresholds_clamp_instead_of_nan() {
        let huge = RingGeometry::new(Point::default(), 100.0, 52.0, 60.0).unwrap();
        let t = huge.thresholds();
        assert_abs_diff_eq!(t.outer, 180.0);
        assert!(t.inner.is_finite());
    }

    #[test]
    fn test_zero_fillet_has_no_threshold() {
        for margin in [0.0, DEFAULT_THRESHOLD_MARGIN, 10.0] {
            let sharp = RingGeometry::new(Point::default(), 100.0, 52.0, 0.0)
                .unwrap()
                .with_threshold_margin(margin);
            let t = sharp.thresholds();
            assert_eq!(t, Thresholds::default(), "margin {margin}");
            assert!(!t.needs_cap(Side::Outer, 0.1));
            assert!(!t.needs_cap(Side::Inner, 0.1));
        }
    }

    #[test]
    fn test_fillets_overlap_past_half_stroke() {
        let center = Point::default();
        let fits = RingGeometry::new(center, 100.0, 52.0, 20.0).unwrap();
        assert!(!fits.fillets_overlap());
        let sharp = RingGeometry::new(center, 100.0, 52.0, 0.0).unwrap();
        assert!(!sharp.fillets_overlap());
        let wide = RingGeometry::new(center, 100.0, 52.0, 30.0).unwrap();
        assert!(wide.fillets_overlap());
    }

    #[test]
    fn test_cache_invalidates_on_shape_change() {
        let mut cache = ThresholdCache::default();
        let a = ring();
        let first = cache.get(&a);
        assert!(cache.is_valid_for(&a));

        // moving the ring or changing the gap keeps the cached value
        let moved = RingGeometry {
            center: Point::new(5.0, 5.0),
            ..a.with_gap_angle(10.0)
        };
        assert!(cache.is_valid_for(&moved));
        assert_eq!(cache.get(&moved), first);

        let bigger_fillet = RingGeometry {
            fillet_radius: 30.0,
            ..a
        };
        assert!(!cache.is_valid_for(&bigger_fillet));
        assert!(cache.get(&bigger_fillet).outer > first.outer);

        cache.invalidate();
        assert!(!cache.is_valid_for(&bigger_fillet));
    }
}
