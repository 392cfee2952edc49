//! Optional `racun.toml` configuration. Every key has a default, so a
//! missing file and an empty file behave the same.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{RacunError, Result};

/// Default scale the view is rasterized at.
pub const DEFAULT_RASTER_SCALE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Lay the view out directly as PDF text and graphics.
    #[default]
    Direct,
    /// Place a rasterized bitmap of the view across A4 pages.
    Raster,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub strategy: StrategyKind,
    /// Directory the `racun-<number>.pdf` file is written into.
    pub output_dir: PathBuf,
    pub compress: bool,
    /// Pixels per layout pixel for rasterizers that render the view
    /// themselves. A snapshot already has its scale and ignores this.
    pub raster_scale: f64,
    /// Pre-captured PNG of the invoice view, used by the raster strategy.
    pub snapshot: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            strategy: StrategyKind::Direct,
            output_dir: PathBuf::from("."),
            compress: true,
            raster_scale: DEFAULT_RASTER_SCALE,
            snapshot: None,
        }
    }
}

/// Font faces embedded by the direct strategy. Set both or neither; with
/// neither the builtin Helvetica pair is used.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub regular: Option<PathBuf>,
    pub bold: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub export: ExportConfig,
    pub fonts: FontConfig,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(s).map_err(|e| RacunError::Config(format!("failed to parse config: {e}")))?;
        if !(config.export.raster_scale.is_finite() && config.export.raster_scale > 0.0) {
            return Err(RacunError::Config(format!(
                "raster_scale must be a positive number, got {}",
                config.export.raster_scale
            )));
        }
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            RacunError::Config(format!("failed to read {}: {e}", path.as_ref().display()))
        })?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.export.strategy, StrategyKind::Direct);
        assert!(config.export.compress);
        assert_eq!(config.export.raster_scale, 2.0);
    }

    #[test]
    fn parse_full_config() {
        let config = Config::from_toml_str(
            r#"
            [export]
            strategy = "raster"
            output_dir = "out"
            compress = false
            raster_scale = 3.0
            snapshot = "preview.png"

            [fonts]
            regular = "fonts/NotoSans-Regular.ttf"
            bold = "fonts/NotoSans-Bold.ttf"
            "#,
        )
        .unwrap();
        assert_eq!(config.export.strategy, StrategyKind::Raster);
        assert_eq!(config.export.output_dir, PathBuf::from("out"));
        assert!(!config.export.compress);
        assert_eq!(config.export.snapshot, Some(PathBuf::from("preview.png")));
        assert_eq!(config.fonts.bold, Some(PathBuf::from("fonts/NotoSans-Bold.ttf")));
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let err = Config::from_toml_str("[export]\nstrategy = \"fax\"").unwrap_err();
        assert!(matches!(err, RacunError::Config(_)));
    }

    #[test]
    fn non_positive_scale_is_rejected() {
        assert!(Config::from_toml_str("[export]\nraster_scale = 0.0").is_err());
    }
}
