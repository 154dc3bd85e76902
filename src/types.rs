//! Shared job types used by the batch runner, the CLI, and output rendering.

use crate::imaging::TargetSize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Which overlay a banner job uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BannerKind {
    TwoDay,
    ThreeDay,
}

impl BannerKind {
    /// File-name suffix for banners of this kind.
    pub fn suffix(self) -> &'static str {
        match self {
            BannerKind::TwoDay => "2DayBanner_286x410",
            BannerKind::ThreeDay => "3DayBanner_286x410",
        }
    }
}

impl fmt::Display for BannerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BannerKind::TwoDay => "2day",
            BannerKind::ThreeDay => "3day",
        })
    }
}

impl FromStr for BannerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "2day" | "2" | "two" => Ok(BannerKind::TwoDay),
            "3day" | "3" | "three" => Ok(BannerKind::ThreeDay),
            other => Err(format!("unknown banner kind {other:?}, expected 2day or 3day")),
        }
    }
}

/// Banner job parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerOptions {
    pub kind: BannerKind,
    /// Job-wide base name; numbered when the job has more than one file.
    pub title: Option<String>,
    /// Per-file base-name overrides, keyed by source path as given.
    pub renames: BTreeMap<PathBuf, String>,
}

impl BannerOptions {
    pub fn new(kind: BannerKind) -> Self {
        Self {
            kind,
            title: None,
            renames: BTreeMap::new(),
        }
    }
}

/// The transform a batch job applies to every file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobMode {
    /// Flatten to a single-layer JPEG at native size.
    Convert,
    /// Stretch to exact dimensions.
    Resize(TargetSize),
    /// Composite onto the 286×410 banner canvas.
    Banner(BannerOptions),
}

impl JobMode {
    /// Short name used in logs and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            JobMode::Convert => "psd-convert",
            JobMode::Resize(_) => "resize",
            JobMode::Banner(_) => "banner",
        }
    }

    /// File-name suffix; empty for plain conversion.
    pub fn suffix(&self) -> String {
        match self {
            JobMode::Convert => String::new(),
            JobMode::Resize(size) => size.label(),
            JobMode::Banner(options) => options.kind.suffix().to_string(),
        }
    }
}

/// One unit of work: a mode plus the ordered list of sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub mode: JobMode,
    pub sources: Vec<PathBuf>,
}
