use crate::events::AppEvent;
use async_channel::Sender;
use derive_more::{Deref, From, Into};
use directories::ProjectDirs;
use donut_geometry::ring::{DEFAULT_GAP_ANGLE, DEFAULT_START_ANGLE, DEFAULT_THRESHOLD_MARGIN};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use palette::{Srgb, Srgba};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_FILLET_RADIUS: f64 = 20.0;
pub const DEFAULT_STROKE_WIDTH_FRACTION: f64 = 0.48;
pub const DEFAULT_SIZE: i32 = 512;

/// An opaque color written as `#rrggbb`, `rrggbb` or `#rgb`.
#[derive(Debug, Clone, Copy, PartialEq, SerializeDisplay, DeserializeFromStr, Deref, From, Into)]
pub struct HexColor(Srgba<f64>);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid hex color '{0}'")]
pub struct ColorParseError(String);

impl FromStr for HexColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rgb: Srgb<u8> = s
            .trim()
            .parse()
            .map_err(|_| ColorParseError(s.to_string()))?;
        let (r, g, b) = rgb.into_format::<f64>().into_components();
        Ok(Self(Srgba::new(r, g, b, 1.0)))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b, _) = self.0.into_components();
        write!(f, "#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
    }
}

/// One data point. `gradient` wins over `color` when both are given.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SliceConfig {
    /// Percent of the full circle.
    pub value: f64,
    pub color: Option<HexColor>,
    pub gradient: Option<[HexColor; 2]>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChartConfig {
    pub gap_angle: f64,
    /// In device-independent units; multiplied by `density`.
    pub fillet_radius: f64,
    pub density: f64,
    pub stroke_width_fraction: f64,
    pub start_angle: f64,
    pub threshold_margin: f64,
    pub width: i32,
    pub height: i32,
    pub background: Option<HexColor>,
    pub slices: Vec<SliceConfig>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            gap_angle: DEFAULT_GAP_ANGLE,
            fillet_radius: DEFAULT_FILLET_RADIUS,
            density: 1.0,
            stroke_width_fraction: DEFAULT_STROKE_WIDTH_FRACTION,
            start_angle: DEFAULT_START_ANGLE,
            threshold_margin: DEFAULT_THRESHOLD_MARGIN,
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            background: None,
            slices: Vec::new(),
        }
    }
}

impl ChartConfig {
    /// Fillet radius in pixels.
    pub fn fillet_radius_px(&self) -> f64 {
        self.fillet_radius * self.density
    }

    pub fn values(&self) -> Vec<f64> {
        self.slices.iter().map(|s| s.value).collect()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "donut", "donut").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

/// Loads the chart config, with `DONUT_*` environment variables on top.
///
/// An explicitly given file must exist; the default one is optional.
pub fn load_config(path: Option<&Path>) -> Result<ChartConfig, ConfigError> {
    let (config_path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (get_config_path()?, false),
    };

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(required))
        .add_source(config::Environment::with_prefix("DONUT").try_parsing(true))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn write_default_config(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => get_config_path()?,
    };
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

pub async fn run_async_watcher(config_path: PathBuf, tx: Sender<AppEvent>) {
    if let Err(e) = watch_config(&config_path, &tx).await {
        log::error!("Config watcher error: {}", e);
    }
    let _ = tx.send(AppEvent::WatcherStopped).await;
}

async fn watch_config(config_path: &Path, tx: &Sender<AppEvent>) -> Result<(), ConfigError> {
    let config_path = std::path::absolute(config_path)?;
    let config_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .ok_or(ConfigError::ConfigDirNotFound)?;

    fs_err::create_dir_all(&config_dir)?;

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    )?;

    watcher.watch(&config_dir, RecursiveMode::NonRecursive)?;
    log::info!("Watching {}", config_path.display());

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> ChartConfig {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_color_deserialization() {
        let cases = vec![
            ("\"#ff0000\"", (1.0, 0.0, 0.0)),
            ("\"00ff00\"", (0.0, 1.0, 0.0)),
            ("\"#00F\"", (0.0, 0.0, 1.0)),
        ];

        for (json, (r, g, b)) in cases {
            let color: HexColor = serde_json::from_str(json).unwrap();
            assert_eq!(color.into_components(), (r, g, b, 1.0));
        }

        assert!(serde_json::from_str::<HexColor>("\"#12345\"").is_err());
        assert!(serde_json::from_str::<HexColor>("\"red\"").is_err());
    }

    #[test]
    fn test_color_display() {
        let color: HexColor = "#1A2b3c".parse().unwrap();
        assert_eq!(color.to_string(), "#1a2b3c");
        assert_eq!(serde_json::to_string(&color).unwrap(), "\"#1a2b3c\"");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = parse("");
        assert_eq!(cfg.gap_angle, 4.0);
        assert_eq!(cfg.fillet_radius, 20.0);
        assert_eq!(cfg.stroke_width_fraction, 0.48);
        assert_eq!(cfg.start_angle, 90.0);
        assert_eq!(cfg.threshold_margin, 4.0);
        assert!(cfg.background.is_none());
        assert!(cfg.slices.is_empty());
    }

    #[test]
    fn test_default_config_parses() {
        let cfg = parse(DEFAULT_CONFIG);
        assert!(!cfg.slices.is_empty());
        let total: f64 = cfg.values().iter().sum();
        assert!(total <= 100.0);
        assert!(cfg.slices.iter().any(|s| s.gradient.is_some()));
        assert!(cfg.slices.iter().any(|s| s.color.is_some()));
    }

    #[test]
    fn test_slices_and_density() {
        let cfg = parse(
            r##"
            fillet_radius = 10
            density = 2.5
            background = "#101010"

            [[slices]]
            value = 60
            color = "#336699"

            [[slices]]
            value = 40
            gradient = ["#000000", "#ffffff"]
            "##,
        );
        assert_eq!(cfg.fillet_radius_px(), 25.0);
        assert_eq!(cfg.values(), vec![60.0, 40.0]);
        assert_eq!(cfg.background.unwrap().to_string(), "#101010");
        let [start, end] = cfg.slices[1].gradient.unwrap();
        assert_eq!(start.to_string(), "#000000");
        assert_eq!(end.to_string(), "#ffffff");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let missing = std::env::temp_dir().join("donut-config-that-does-not-exist.toml");
        assert!(matches!(
            load_config(Some(&missing)),
            Err(ConfigError::Config(_))
        ));
    }
}
