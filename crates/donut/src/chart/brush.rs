use crate::config::SliceConfig;
use cairo::{Context, LinearGradient};
use palette::Srgba;

/// How a slice is filled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Brush {
    Solid(Srgba<f64>),
    /// Vertical gradient across the whole surface, `start` at the bottom
    /// edge and `end` at the top.
    Gradient { start: Srgba<f64>, end: Srgba<f64> },
}

impl Default for Brush {
    fn default() -> Self {
        Self::Solid(Srgba::new(0.5, 0.5, 0.5, 1.0))
    }
}

impl Brush {
    pub fn from_config(cfg: &SliceConfig) -> Self {
        match (cfg.gradient, cfg.color) {
            (Some([start, end]), _) => Self::Gradient {
                start: *start,
                end: *end,
            },
            (None, Some(color)) => Self::Solid(*color),
            (None, None) => Self::default(),
        }
    }

    /// Makes this brush the current cairo source for a `width` x `height`
    /// surface.
    pub fn apply(&self, cr: &Context, width: f64, height: f64) -> Result<(), cairo::Error> {
        match self {
            Self::Solid(color) => {
                let (r, g, b, a) = color.into_components();
                cr.set_source_rgba(r, g, b, a);
                Ok(())
            }
            Self::Gradient { start, end } => {
                let gradient = LinearGradient::new(width / 2.0, height, width / 2.0, 0.0);
                for (offset, color) in [(0.0, start), (1.0, end)] {
                    let (r, g, b, a) = color.into_components();
                    gradient.add_color_stop_rgba(offset, r, g, b, a);
                }
                cr.set_source(&gradient)
            }
        }
    }
}
