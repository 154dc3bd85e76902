//! Tool configuration module.
//!
//! Handles loading, validating, and merging `media-workflow.toml`. Stock
//! defaults are the base layer; a user file only needs the keys it changes.
//!
//! ## Config File Location
//!
//! The CLI reads `media-workflow.toml` from the current directory, or the
//! file named with `--config`. Without either, stock defaults apply.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [folders]
//! convert = "Converted"     # Created next to each source
//! resize = "Resized"
//! banner = "Banner"
//!
//! [naming]
//! separator = "_"           # Between base name and suffix
//!
//! [resize]
//! presets = ["286x410", "960x1440", "380x560", "630x945"]
//! default_size = "286x410"
//!
//! [banner]
//! # template_dir = "/path/to/templates"   # default: directory of the executable
//! two_day = "banner_2day.png"
//! three_day = "banner_3day.png"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [folders]
//! banner = "Banners"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::TargetSize;
use crate::types::{BannerKind, JobMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "media-workflow.toml";

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

/// Tool configuration loaded from `media-workflow.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Output folder names, one per job mode.
    pub folders: FoldersConfig,
    /// Output file-name assembly.
    pub naming: NamingConfig,
    /// Resize presets and the default target.
    pub resize: ResizeConfig,
    /// Overlay template lookup.
    pub banner: BannerConfig,
}

impl ToolConfig {
    /// Validate values that deserialization alone cannot catch.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, name) in [
            ("folders.convert", &self.folders.convert),
            ("folders.resize", &self.folders.resize),
            ("folders.banner", &self.folders.banner),
        ] {
            check_path_component(key, name)?;
        }
        check_path_component("naming.separator", &self.naming.separator)?;
        if self.resize.presets.is_empty() {
            return Err(ConfigError::Validation(
                "resize.presets must not be empty".into(),
            ));
        }
        for (key, name) in [
            ("banner.two_day", &self.banner.two_day),
            ("banner.three_day", &self.banner.three_day),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        Ok(())
    }
}

/// A value that ends up as one path component: non-empty, no separators.
fn check_path_component(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{key} must not be empty")));
    }
    if value.contains(['/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "{key} must not contain path separators, got {value:?}"
        )));
    }
    if value == "." || value == ".." {
        return Err(ConfigError::Validation(format!(
            "{key} must name a real folder, got {value:?}"
        )));
    }
    Ok(())
}

/// Output folder names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FoldersConfig {
    pub convert: String,
    pub resize: String,
    pub banner: String,
}

impl Default for FoldersConfig {
    fn default() -> Self {
        Self {
            convert: "Converted".to_string(),
            resize: "Resized".to_string(),
            banner: "Banner".to_string(),
        }
    }
}

impl FoldersConfig {
    /// Folder that outputs of `mode` are written into.
    pub fn for_mode(&self, mode: &JobMode) -> &str {
        match mode {
            JobMode::Convert => &self.convert,
            JobMode::Resize(_) => &self.resize,
            JobMode::Banner(_) => &self.banner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConfig {
    /// Joins the base name and the mode suffix.
    pub separator: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            separator: "_".to_string(),
        }
    }
}

/// Resize targets offered by `presets` and used when `--size` is omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    pub presets: Vec<TargetSize>,
    pub default_size: TargetSize,
}

/// Stock presets; the first is the banner tile size.
const STOCK_PRESETS: [TargetSize; 4] = [
    TargetSize::BANNER,
    TargetSize::fixed(960, 1440),
    TargetSize::fixed(380, 560),
    TargetSize::fixed(630, 945),
];

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            presets: STOCK_PRESETS.to_vec(),
            default_size: TargetSize::BANNER,
        }
    }
}

/// Overlay templates for banner jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BannerConfig {
    /// Directory holding the templates. Defaults to the executable's directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<PathBuf>,
    pub two_day: String,
    pub three_day: String,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            template_dir: None,
            two_day: "banner_2day.png".to_string(),
            three_day: "banner_3day.png".to_string(),
        }
    }
}

impl BannerConfig {
    /// Template file name for `kind`.
    pub fn template_name(&self, kind: BannerKind) -> &str {
        match kind {
            BannerKind::TwoDay => &self.two_day,
            BannerKind::ThreeDay => &self.three_day,
        }
    }

    /// Full path of the template for `kind`.
    ///
    /// Without a configured `template_dir` the templates are expected next
    /// to the running executable, falling back to the working directory.
    pub fn template_path(&self, kind: BannerKind) -> PathBuf {
        let dir = self
            .template_dir
            .clone()
            .or_else(executable_dir)
            .unwrap_or_default();
        dir.join(self.template_name(kind))
    }
}

fn executable_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ToolConfig::default())?)
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
) -> Result<ToolConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ToolConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `media-workflow.toml` from `dir`, or stock defaults when it is absent.
pub fn load_config(dir: &Path) -> Result<ToolConfig, ConfigError> {
    let overlay = load_raw_config(&dir.join(CONFIG_FILE_NAME))?;
    resolve_config(stock_defaults_value()?, overlay)
}

/// Load an explicitly named config file. A missing file is an error.
pub fn load_config_file(path: &Path) -> Result<ToolConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let overlay: toml::Value = toml::from_str(&content)?;
    resolve_config(stock_defaults_value()?, Some(overlay))
}

/// Returns a fully-commented stock `media-workflow.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# media-workflow Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the working directory as media-workflow.toml,
# or pass it explicitly with --config FILE.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output folders
# ---------------------------------------------------------------------------
# Each job writes into a folder of this name created next to every source
# file. Plain folder names only, no path separators.
[folders]
convert = "Converted"
resize = "Resized"
banner = "Banner"

# ---------------------------------------------------------------------------
# Output file names
# ---------------------------------------------------------------------------
[naming]
# Placed between the base name and the mode suffix:
#   photo_286x410.jpg, SummerShoe_2DayBanner_286x410.jpg
# Also used to number titled jobs: Campaign_01, Campaign_02, ...
separator = "_"

# ---------------------------------------------------------------------------
# Resize
# ---------------------------------------------------------------------------
[resize]
# Sizes listed by `media-workflow presets`, as "WIDTHxHEIGHT".
presets = ["286x410", "960x1440", "380x560", "630x945"]

# Used when `resize` is run without --size.
default_size = "286x410"

# ---------------------------------------------------------------------------
# Banner overlays
# ---------------------------------------------------------------------------
[banner]
# Directory holding the overlay templates.
# Omit to look next to the media-workflow executable.
# template_dir = "/path/to/templates"

# Overlay PNGs (with transparency) for each banner kind. Resized to 286x410
# when their native size differs.
two_day = "banner_2day.png"
three_day = "banner_3day.png"
"##
}
