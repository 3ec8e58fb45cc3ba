use super::brush::Brush;
use crate::config::{
    ChartConfig, DEFAULT_FILLET_RADIUS, DEFAULT_STROKE_WIDTH_FRACTION, HexColor,
};
use donut_geometry::ring::{DEFAULT_GAP_ANGLE, DEFAULT_START_ANGLE, DEFAULT_THRESHOLD_MARGIN};
use donut_geometry::{
    Point, RingGeometry, SegmentContour, Slice, SliceOutcome, ThresholdCache, Thresholds,
    compute_contours, layout_slices,
};
use palette::Srgba;

/// Layout settings that do not depend on the surface size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingSettings {
    pub gap_angle: f64,
    /// In pixels.
    pub fillet_radius: f64,
    pub stroke_width_fraction: f64,
    pub start_angle: f64,
    pub threshold_margin: f64,
}

impl Default for RingSettings {
    fn default() -> Self {
        Self {
            gap_angle: DEFAULT_GAP_ANGLE,
            fillet_radius: DEFAULT_FILLET_RADIUS,
            stroke_width_fraction: DEFAULT_STROKE_WIDTH_FRACTION,
            start_angle: DEFAULT_START_ANGLE,
            threshold_margin: DEFAULT_THRESHOLD_MARGIN,
        }
    }
}

impl From<&ChartConfig> for RingSettings {
    fn from(cfg: &ChartConfig) -> Self {
        Self {
            gap_angle: cfg.gap_angle,
            fillet_radius: cfg.fillet_radius_px(),
            stroke_width_fraction: cfg.stroke_width_fraction,
            start_angle: cfg.start_angle,
            threshold_margin: cfg.threshold_margin,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaintedSegment {
    pub contour: SegmentContour,
    pub brush: Brush,
}

/// Everything a surface needs to paint one frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub background: Option<Srgba<f64>>,
    pub segments: Vec<PaintedSegment>,
}

/// A ring chart bound to a surface size.
///
/// The ring is centered on the surface, its outer radius is half the shorter
/// side, and it is rebuilt whenever the size or settings change. Thresholds
/// are cached across frames and recomputed only when the ring's radii, fillet
/// radius or margin change.
#[derive(Debug, Default)]
pub struct DonutChart {
    settings: RingSettings,
    width: f64,
    height: f64,
    ring: Option<RingGeometry>,
    thresholds: ThresholdCache,
    values: Vec<f64>,
    brushes: Vec<Brush>,
    background: Option<Srgba<f64>>,
}

impl DonutChart {
    pub fn new(settings: RingSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn from_config(cfg: &ChartConfig) -> Self {
        let mut chart = Self::new(RingSettings::from(cfg));
        chart.apply_config(cfg);
        chart
    }

    pub fn apply_config(&mut self, cfg: &ChartConfig) {
        self.settings = RingSettings::from(cfg);
        self.background = cfg.background.map(HexColor::into);
        self.set_data(
            cfg.values(),
            cfg.slices.iter().map(Brush::from_config).collect(),
        );
        self.resize(cfg.width as f64, cfg.height as f64);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.rebuild_ring();
    }

    pub fn set_settings(&mut self, settings: RingSettings) {
        self.settings = settings;
        self.rebuild_ring();
    }

    /// Replaces the chart data. `brushes[i]` paints slice `i`; slices without
    /// a brush are laid out but not painted.
    pub fn set_data(&mut self, values: Vec<f64>, brushes: Vec<Brush>) {
        self.values = values;
        self.brushes = brushes;
    }

    pub fn settings(&self) -> &RingSettings {
        &self.settings
    }

    pub fn ring(&self) -> Option<&RingGeometry> {
        self.ring.as_ref()
    }

    pub fn slices(&self) -> Vec<Slice> {
        layout_slices(
            &self.values,
            self.settings.start_angle,
            self.settings.gap_angle,
        )
    }

    pub fn thresholds(&mut self) -> Option<Thresholds> {
        let ring = self.ring.as_ref()?;
        Some(self.thresholds.get(ring))
    }

    /// Contours for every slice, in data order. Empty while the ring cannot
    /// be laid out.
    pub fn outcomes(&mut self) -> Vec<SliceOutcome> {
        let Some(ring) = self.ring else {
            return Vec::new();
        };
        let thresholds = self.thresholds.get(&ring);
        compute_contours(&ring, &thresholds, &self.slices())
    }

    pub fn frame(&mut self) -> Frame {
        let segments = self
            .outcomes()
            .into_iter()
            .filter_map(SliceOutcome::into_contour)
            .filter_map(|contour| match self.brushes.get(contour.index) {
                Some(&brush) => Some(PaintedSegment { contour, brush }),
                None => {
                    log::debug!("No brush for slice {}", contour.index);
                    None
                }
            })
            .collect();

        Frame {
            width: self.width,
            height: self.height,
            background: self.background,
            segments,
        }
    }

    fn rebuild_ring(&mut self) {
        let center = Point::new(self.width / 2.0, self.height / 2.0);
        let radius = self.width.min(self.height) / 2.0;

        self.ring = match RingGeometry::from_stroke_fraction(
            center,
            radius,
            self.settings.stroke_width_fraction,
            self.settings.fillet_radius,
        ) {
            Ok(ring) => Some(
                ring.with_gap_angle(self.settings.gap_angle)
                    .with_start_angle(self.settings.start_angle)
                    .with_threshold_margin(self.settings.threshold_margin),
            ),
            Err(e) => {
                log::warn!("Cannot lay out ring at {}x{}: {}", self.width, self.height, e);
                self.thresholds.invalidate();
                None
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn quarters() -> DonutChart {
        let mut chart = DonutChart::new(RingSettings::default());
        chart.set_data(vec![25.0; 4], vec![Brush::default(); 4]);
        chart.resize(200.0, 200.0);
        chart
    }

    #[test]
    fn test_ring_follows_surface() {
        let mut chart = quarters();
        let ring = *chart.ring().unwrap();
        assert_eq!(ring.center, Point::new(100.0, 100.0));
        assert_abs_diff_eq!(ring.outer_radius, 100.0);
        assert_abs_diff_eq!(ring.inner_radius, 52.0, epsilon = 1e-9);

        chart.resize(400.0, 120.0);
        let ring = *chart.ring().unwrap();
        assert_eq!(ring.center, Point::new(200.0, 60.0));
        assert_abs_diff_eq!(ring.outer_radius, 60.0);
    }

    #[test]
    fn test_thresholds_track_size_and_fillet() {
        let mut chart = quarters();
        let before = chart.thresholds().unwrap();

        chart.resize(300.0, 300.0);
        let bigger = chart.thresholds().unwrap();
        assert!(bigger.outer < before.outer);

        chart.set_settings(RingSettings {
            fillet_radius: 40.0,
            ..RingSettings::default()
        });
        let rounder = chart.thresholds().unwrap();
        assert!(rounder.outer > bigger.outer);
        assert_eq!(rounder, chart.ring().unwrap().thresholds());
    }

    #[test]
    fn test_frame_paints_every_drawn_slice() {
        let mut chart = quarters();
        let frame = chart.frame();
        assert_eq!(frame.segments.len(), 4);
        for (i, segment) in frame.segments.iter().enumerate() {
            assert_eq!(segment.contour.index, i);
            assert!(segment.contour.is_closed(1e-3));
        }
    }

    #[test]
    fn test_frame_skips_unpainted_and_tiny_slices() {
        let mut chart = DonutChart::new(RingSettings::default());
        // 1% is 3.6 degrees, less than the gap
        chart.set_data(vec![50.0, 1.0, 30.0], vec![Brush::default(); 2]);
        chart.resize(200.0, 200.0);

        let outcomes = chart.outcomes();
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[1].contour().is_none());
        assert!(outcomes[2].contour().is_some());

        // the third slice has no brush
        let frame = chart.frame();
        let painted: Vec<usize> = frame.segments.iter().map(|s| s.contour.index).collect();
        assert_eq!(painted, vec![0]);
    }

    #[test]
    fn test_zero_size_has_no_ring() {
        let mut chart = DonutChart::new(RingSettings::default());
        chart.set_data(vec![100.0], vec![Brush::default()]);
        assert!(chart.ring().is_none());
        assert!(chart.outcomes().is_empty());
        assert!(chart.thresholds().is_none());
    }

    #[test]
    fn test_density_scales_fillet() {
        let cfg = ChartConfig {
            fillet_radius: 10.0,
            density: 2.0,
            width: 200,
            height: 200,
            ..ChartConfig::default()
        };
        let chart = DonutChart::from_config(&cfg);
        assert_abs_diff_eq!(chart.settings().fillet_radius, 20.0);
        assert_abs_diff_eq!(chart.ring().unwrap().fillet_radius, 20.0);
    }
}
