//! Tool configuration module.
//!
//! Handles loading, validating, and merging `squeeze.toml`. Stock defaults are
//! overridden by the user file; CLI flags override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [defaults]
//! format = "webp"        # jpeg | png | webp | avif
//! quality = 80           # 10-100
//! fit = "inside"         # inside | cover | fill
//! # max_width = 1920     # no bound unless set
//! # max_height = 1080    # no bound unless set
//! # preset = "full-hd"   # named size preset; explicit bounds win
//!
//! [output]
//! directory = "."        # where optimized files are written
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [defaults]
//! format = "avif"
//! ```
//!
//! Unknown keys are rejected to catch typos early. The codec thresholds
//! (AVIF offset, PNG palette cut-off, JPEG chroma switch) are fixed and have
//! no config keys.

use crate::imaging::{FitMode, OutputFormat, Quality};
use crate::presets::find_preset;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "squeeze.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `squeeze.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SqueezeConfig {
    /// Transcode knobs used when the matching CLI flag is absent.
    pub defaults: DefaultsConfig,
    /// Where results are written.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    pub format: OutputFormat,
    pub quality: u32,
    pub fit: FitMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::WebP,
            quality: Quality::DEFAULT,
            fit: FitMode::Inside,
            max_width: None,
            max_height: None,
            preset: None,
        }
    }
}

impl DefaultsConfig {
    /// Size bounds from this config: explicit `max_width`/`max_height` if
    /// either is set, else the preset's bounds, else none.
    pub fn bounds(&self) -> (Option<u32>, Option<u32>) {
        if self.max_width.is_some() || self.max_height.is_some() {
            return (self.max_width, self.max_height);
        }
        self.preset
            .as_deref()
            .and_then(find_preset)
            .map(|p| (p.max_width, p.max_height))
            .unwrap_or((None, None))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
        }
    }
}

impl SqueezeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.defaults;
        if !(Quality::MIN..=Quality::MAX).contains(&d.quality) {
            return Err(ConfigError::Validation(format!(
                "defaults.quality must be {}-{}",
                Quality::MIN,
                Quality::MAX
            )));
        }
        if d.max_width == Some(0) || d.max_height == Some(0) {
            return Err(ConfigError::Validation(
                "defaults.max_width and defaults.max_height must be positive".into(),
            ));
        }
        if let Some(name) = &d.preset {
            if find_preset(name).is_none() {
                return Err(ConfigError::Validation(format!(
                    "defaults.preset: unknown preset '{name}'"
                )));
            }
        }
        if self.output.directory.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.directory must not be empty".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SqueezeConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SqueezeConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SqueezeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is absent.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<SqueezeConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `squeeze.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# image-squeeze configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Command-line flags override them.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Transcode defaults
# ---------------------------------------------------------------------------
[defaults]
# Output format: jpeg, png, webp or avif.
format = "webp"

# Quality from 10 (smallest) to 100 (best). Each format derives its own
# encoder settings from this value.
quality = 80

# How bounds are applied when both are set:
#   inside - shrink to fit within both bounds, keep aspect ratio
#   cover  - shrink to cover both bounds, crop the overflow
#   fill   - stretch to exactly the bounds
fit = "inside"

# Maximum output size in pixels. Inside and cover never enlarge; fill may
# stretch one axis to reach the exact bounds.
# With neither bound (and no preset), output is capped at 1920px wide.
# max_width = 1920
# max_height = 1080

# Named size preset: original, 4k, full-hd, hd, medium, small.
# Ignored when max_width or max_height is set.
# preset = "full-hd"

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Directory the optimized file is written to.
directory = "."
"##
}
