//! Tool configuration module.
//!
//! Handles loading, validating, and merging `crop.toml`. Stock defaults are
//! overridden by a sparse user file, and CLI flags are applied on top of the
//! result by the binary.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! root = "assets/images"    # Asset root; each subfolder is processed
//! exclude_folders = ["mogul_avatars", "premium_avatars", "platinum_unlocks"]
//! extensions = ["jpg"]      # Case-insensitive; *.backup never matches
//!
//! [crop]
//! # match_width = 768       # Omit to match on height alone
//! match_height = 768
//! remove_from_bottom = 33
//! quality = 95              # JPEG re-encode quality (1-100)
//! restore_on_failure = true # Copy the backup back if the write fails
//!
//! [analyze]
//! report_dir = "."          # Where skipped_images_report_*.json is written
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::crop::CropSpec;
use crate::imaging::Quality;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "crop.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `crop.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Asset root; its immediate subfolders are processed.
    pub root: PathBuf,
    /// Folder names under the root that are never entered.
    pub exclude_folders: Vec<String>,
    /// Image file extensions to process (without the dot).
    pub extensions: Vec<String>,
    /// Match predicate and crop amount.
    pub crop: CropConfig,
    /// Analysis report settings.
    pub analyze: AnalyzeConfig,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets/images"),
            exclude_folders: vec![
                "mogul_avatars".to_string(),
                "premium_avatars".to_string(),
                "platinum_unlocks".to_string(),
            ],
            extensions: vec!["jpg".to_string()],
            crop: CropConfig::default(),
            analyze: AnalyzeConfig::default(),
        }
    }
}

impl ToolConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "extensions must not be empty".into(),
            ));
        }
        if self.extensions.iter().any(|e| e.is_empty() || e.starts_with('.')) {
            return Err(ConfigError::Validation(
                "extensions must be bare names like \"jpg\"".into(),
            ));
        }
        self.crop.validate()
    }
}

/// The crop predicate and amount, as written in `[crop]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropConfig {
    /// Exact width to match; absent matches any width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_width: Option<u32>,
    /// Exact height to match.
    pub match_height: u32,
    /// Rows removed from the bottom of a matching image.
    pub remove_from_bottom: u32,
    /// JPEG re-encode quality (1-100).
    pub quality: u32,
    /// Copy the backup back over the original when writing fails.
    pub restore_on_failure: bool,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            match_width: None,
            match_height: 768,
            remove_from_bottom: 33,
            quality: 95,
            restore_on_failure: true,
        }
    }
}

impl CropConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.match_width == Some(0) {
            return Err(ConfigError::Validation(
                "crop.match_width must be positive".into(),
            ));
        }
        if self.match_height == 0 {
            return Err(ConfigError::Validation(
                "crop.match_height must be positive".into(),
            ));
        }
        if self.remove_from_bottom >= self.match_height {
            return Err(ConfigError::Validation(format!(
                "crop.remove_from_bottom ({}) must be less than crop.match_height ({})",
                self.remove_from_bottom, self.match_height
            )));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::Validation(
                "crop.quality must be 1-100".into(),
            ));
        }
        Ok(())
    }

    /// The immutable spec handed to [`crop`](crate::crop::crop).
    pub fn to_spec(&self) -> CropSpec {
        CropSpec {
            match_width: self.match_width,
            match_height: self.match_height,
            remove_from_bottom: self.remove_from_bottom,
            quality: Quality::new(self.quality),
            restore_on_failure: self.restore_on_failure,
        }
    }
}

/// Analysis report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzeConfig {
    /// Directory the JSON report is written to.
    pub report_dir: PathBuf,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            report_dir: PathBuf::from("."),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ToolConfig::default()).expect("default config must serialize")
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

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
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
) -> Result<ToolConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ToolConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults if it is absent.
///
/// User values are merged on top of stock defaults, unknown keys are
/// rejected, and the result is validated.
pub fn load_config(path: &Path) -> Result<ToolConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    if overlay.is_some() {
        tracing::debug!(path = %path.display(), "loaded config file");
    }
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `crop.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# asset-crop configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.
#
# CLI flags (--width, --height, --remove-bottom, --quality, --no-restore,
# --root) override the values in this file.

# Asset root. Every immediate subfolder is processed; files directly in the
# root are ignored.
root = "assets/images"

# Subfolders of the root that are never entered.
exclude_folders = ["mogul_avatars", "premium_avatars", "platinum_unlocks"]

# Image extensions to process, case-insensitive. Files ending in .backup
# are never processed.
extensions = ["jpg"]

# ---------------------------------------------------------------------------
# Crop predicate and amount
# ---------------------------------------------------------------------------
[crop]
# Only images exactly this size are cropped. Omit match_width to match on
# height alone.
# match_width = 768
match_height = 768

# Rows removed from the bottom edge. Must be less than match_height.
remove_from_bottom = 33

# JPEG re-encode quality (1 = worst, 100 = best).
quality = 95

# If writing the cropped image fails after the backup was made, copy the
# backup back over the original. The backup is kept either way.
restore_on_failure = true

# ---------------------------------------------------------------------------
# Analysis report
# ---------------------------------------------------------------------------
[analyze]
# Directory the skipped_images_report_<timestamp>.json file is written to.
report_dir = "."
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = ToolConfig::default();
        assert_eq!(config.root, PathBuf::from("assets/images"));
        assert_eq!(
            config.exclude_folders,
            vec!["mogul_avatars", "premium_avatars", "platinum_unlocks"]
        );
        assert_eq!(config.extensions, vec!["jpg"]);
        assert_eq!(config.crop.match_width, None);
        assert_eq!(config.crop.match_height, 768);
        assert_eq!(config.crop.remove_from_bottom, 33);
        assert_eq!(config.crop.quality, 95);
        assert!(config.crop.restore_on_failure);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[crop]
match_width = 768
match_height = 576
"#;
        let config: ToolConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.crop.match_width, Some(768));
        assert_eq!(config.crop.match_height, 576);
        // Defaults preserved
        assert_eq!(config.crop.remove_from_bottom, 33);
        assert_eq!(config.extensions, vec!["jpg"]);
    }

    #[test]
    fn to_spec_carries_every_field() {
        let config = CropConfig {
            match_width: Some(768),
            match_height: 576,
            remove_from_bottom: 33,
            quality: 80,
            restore_on_failure: false,
        };
        let spec = config.to_spec();
        assert_eq!(spec.match_width, Some(768));
        assert_eq!(spec.match_height, 576);
        assert_eq!(spec.remove_from_bottom, 33);
        assert_eq!(spec.quality.value(), 80);
        assert!(!spec.restore_on_failure);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config.crop.match_height, 768);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"
root = "game/assets"
exclude_folders = []

[crop]
match_height = 576
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.root, PathBuf::from("game/assets"));
        assert!(config.exclude_folders.is_empty());
        assert_eq!(config.crop.match_height, 576);
        assert_eq!(config.crop.quality, 95);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "this is not valid toml [[[").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "[crop]\nmatch_heigth = 576\n").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "[crop]\nmatch_height = 20\nremove_from_bottom = 33\n").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(ToolConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_quality_bounds() {
        let mut config = ToolConfig::default();
        config.crop.quality = 100;
        assert!(config.validate().is_ok());
        config.crop.quality = 0;
        assert!(config.validate().is_err());
        config.crop.quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_zero_width_rejected() {
        let mut config = ToolConfig::default();
        config.crop.match_width = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_extensions() {
        let mut config = ToolConfig::default();
        config.extensions = vec![];
        assert!(config.validate().is_err());
        config.extensions = vec![".jpg".to_string()];
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // Merging
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str("[crop]\nmatch_height = 768\nquality = 95\n").unwrap();
        let overlay: toml::Value = toml::from_str("[crop]\nquality = 80\n").unwrap();
        let merged = merge_toml(base, overlay);
        let crop = merged.get("crop").unwrap();
        assert_eq!(crop.get("match_height").unwrap().as_integer(), Some(768));
        assert_eq!(crop.get("quality").unwrap().as_integer(), Some(80));
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base: toml::Value = toml::from_str("exclude_folders = [\"a\", \"b\"]").unwrap();
        let overlay: toml::Value = toml::from_str("exclude_folders = [\"c\"]").unwrap();
        let merged = merge_toml(base, overlay);
        let folders = merged.get("exclude_folders").unwrap().as_array().unwrap();
        assert_eq!(folders.len(), 1);
    }

    #[test]
    fn stock_defaults_omit_match_width() {
        let value = stock_defaults_value();
        let crop = value.get("crop").unwrap();
        assert!(crop.get("match_width").is_none());
        assert!(crop.get("match_height").is_some());
    }

    // =========================================================================
    // Stock config
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: ToolConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = ToolConfig::default();
        assert_eq!(config.root, defaults.root);
        assert_eq!(config.exclude_folders, defaults.exclude_folders);
        assert_eq!(config.extensions, defaults.extensions);
        assert_eq!(config.crop.match_width, defaults.crop.match_width);
        assert_eq!(config.crop.match_height, defaults.crop.match_height);
        assert_eq!(config.crop.remove_from_bottom, defaults.crop.remove_from_bottom);
        assert_eq!(config.crop.quality, defaults.crop.quality);
        assert_eq!(config.analyze.report_dir, defaults.analyze.report_dir);
    }
}
