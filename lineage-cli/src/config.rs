//! Configuration loading and parsing

use anyhow::{Context, Result};
use lineage_decoder::ParserConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    /// Lineage export (.sbd)
    pub sbd: Option<PathBuf>,
    /// Companion settings file (.sbc)
    pub sbc: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    /// Interpolation density in (0, 1]
    #[serde(default = "default_fraction")]
    pub fraction: f64,
    /// Image width the calibration setting is relative to
    #[serde(default = "default_reference_width")]
    pub reference_width: f64,
    /// Multiplier applied to z levels
    #[serde(default = "default_z_scale")]
    pub z_scale: f64,
    /// Only export descendants of this cell
    pub lineage: Option<String>,
    /// CSV cell matrix output
    pub matrix: Option<PathBuf>,
    /// JSON track output
    pub tracks: Option<PathBuf>,
}

fn default_fraction() -> f64 {
    1.0
}

fn default_reference_width() -> f64 {
    512.0
}

fn default_z_scale() -> f64 {
    10.0
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            fraction: default_fraction(),
            reference_width: default_reference_width(),
            z_scale: default_z_scale(),
            lineage: None,
            matrix: None,
            tracks: None,
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .parser
        .validate()
        .with_context(|| format!("Invalid [parser] section in {:?}", path))?;

    Ok(config)
}
