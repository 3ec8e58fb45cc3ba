use super::model::{Frame, PaintedSegment};
use cairo::{Context, Format, ImageSurface};
use donut_geometry::{PathOp, SegmentContour};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid surface size {0}x{1}")]
    InvalidSize(f64, f64),
    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),
    #[error("PNG error: {0}")]
    Png(#[from] cairo::IoError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

struct SegmentRenderer<'a> {
    segment: &'a PaintedSegment,
    width: f64,
    height: f64,
}

impl<'a> SegmentRenderer<'a> {
    fn new(segment: &'a PaintedSegment, width: f64, height: f64) -> Self {
        Self {
            segment,
            width,
            height,
        }
    }

    fn draw(&self, cr: &Context) -> Result<(), cairo::Error> {
        trace(cr, &self.segment.contour);
        self.segment.brush.apply(cr, self.width, self.height)?;
        cr.fill()
    }
}

/// Replays a contour as the current cairo path.
fn trace(cr: &Context, contour: &SegmentContour) {
    cr.new_path();
    for op in &contour.ops {
        match op {
            PathOp::MoveTo(p) => cr.move_to(p.x, p.y),
            PathOp::LineTo(p) => cr.line_to(p.x, p.y),
            PathOp::Arc(arc) => {
                let from = arc.start_angle.to_radians();
                let to = (arc.start_angle + arc.sweep_angle).to_radians();
                // cairo angles grow clockwise in device space, same as ours
                if arc.is_clockwise() {
                    cr.arc(arc.center.x, arc.center.y, arc.radius, from, to);
                } else {
                    cr.arc_negative(arc.center.x, arc.center.y, arc.radius, from, to);
                }
            }
            PathOp::Close => cr.close_path(),
        }
    }
}

pub fn draw(cr: &Context, frame: &Frame) -> Result<(), cairo::Error> {
    if let Some(background) = frame.background {
        let (r, g, b, a) = background.into_components();
        cr.set_source_rgba(r, g, b, a);
        cr.paint()?;
    }

    for segment in &frame.segments {
        SegmentRenderer::new(segment, frame.width, frame.height).draw(cr)?;
    }
    Ok(())
}

pub fn render_surface(frame: &Frame) -> Result<ImageSurface, RenderError> {
    let (width, height) = (frame.width.round(), frame.height.round());
    let valid = |side: f64| (1.0..=i32::MAX as f64).contains(&side);
    if !(valid(width) && valid(height)) {
        return Err(RenderError::InvalidSize(frame.width, frame.height));
    }

    let surface = ImageSurface::create(Format::ARgb32, width as i32, height as i32)?;
    {
        let cr = Context::new(&surface)?;
        draw(&cr, frame)?;
    }
    surface.flush();
    Ok(surface)
}

pub fn render_png(frame: &Frame, path: &Path) -> Result<(), RenderError> {
    let surface = render_surface(frame)?;
    let mut file = fs_err::File::create(path)?;
    surface.write_to_png(&mut file)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Brush, DonutChart, RingSettings};
    use palette::Srgba;

    fn red() -> Srgba<f64> {
        Srgba::new(1.0, 0.0, 0.0, 1.0)
    }

    fn blue() -> Srgba<f64> {
        Srgba::new(0.0, 0.0, 1.0, 1.0)
    }

    /// (a, r, g, b) of one pixel, premultiplied.
    fn pixel(surface: &mut ImageSurface, x: usize, y: usize) -> (u8, u8, u8, u8) {
        let stride = surface.stride() as usize;
        let data = surface.data().unwrap();
        let offset = y * stride + x * 4;
        let px = u32::from_ne_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ]);
        (
            (px >> 24) as u8,
            (px >> 16) as u8,
            (px >> 8) as u8,
            px as u8,
        )
    }

    fn halves() -> Frame {
        let mut chart = DonutChart::new(RingSettings::default());
        chart.set_data(
            vec![50.0, 50.0],
            vec![Brush::Solid(red()), Brush::Solid(blue())],
        );
        chart.resize(200.0, 200.0);
        chart.frame()
    }

    #[test]
    fn test_draws_slices_in_their_colors() {
        let mut surface = render_surface(&halves()).unwrap();

        // first slice spans 90..266 degrees, its middle points left
        assert_eq!(pixel(&mut surface, 24, 100), (255, 255, 0, 0));
        // second slice spans 270..446, its middle points right
        assert_eq!(pixel(&mut surface, 176, 100), (255, 0, 0, 255));
    }

    #[test]
    fn test_hole_and_gaps_stay_transparent() {
        let mut surface = render_surface(&halves()).unwrap();

        assert_eq!(pixel(&mut surface, 100, 100).0, 0);
        // middle of the gap at 268 degrees, radius 76
        assert_eq!(pixel(&mut surface, 97, 24).0, 0);
        // corners of the surface
        assert_eq!(pixel(&mut surface, 2, 2).0, 0);
    }

    #[test]
    fn test_background_fills_surface() {
        let mut frame = halves();
        frame.background = Some(Srgba::new(0.0, 1.0, 0.0, 1.0));
        let mut surface = render_surface(&frame).unwrap();
        assert_eq!(pixel(&mut surface, 100, 100), (255, 0, 255, 0));
        assert_eq!(pixel(&mut surface, 24, 100), (255, 255, 0, 0));
    }

    #[test]
    fn test_gradient_runs_bottom_to_top() {
        let mut chart = DonutChart::new(RingSettings::default());
        chart.set_data(
            vec![100.0],
            vec![Brush::Gradient {
                start: red(),
                end: blue(),
            }],
        );
        chart.resize(200.0, 200.0);
        let mut surface = render_surface(&chart.frame()).unwrap();

        // mid-stroke at 135 and 315 degrees
        let (_, r_bottom, _, b_bottom) = pixel(&mut surface, 46, 154);
        let (_, r_top, _, b_top) = pixel(&mut surface, 154, 46);
        assert!(r_bottom > b_bottom);
        assert!(b_top > r_top);
    }

    #[test]
    fn test_rejects_empty_surface() {
        let mut chart = DonutChart::new(RingSettings::default());
        assert!(matches!(
            render_surface(&chart.frame()),
            Err(RenderError::InvalidSize(..))
        ));
    }
}
