//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the batch runner (which decides what each job needs) and
//! the [`operations`](super::operations) module (which does the pixel work).
//!
//! ## Types
//!
//! - [`Quality`]: JPEG quality. Every output is written at the maximum.
//! - [`Sharpening`]: Unsharp-mask parameters (radius + percent + threshold).
//! - [`TargetSize`]: Exact output dimensions for resize jobs, parsed from `"WxH"`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Banner canvas width in pixels.
pub const BANNER_WIDTH: u32 = 286;
/// Banner canvas height in pixels.
pub const BANNER_HEIGHT: u32 = 410;
/// Height of the artwork area at the top of the banner canvas.
///
/// The remaining `BANNER_HEIGHT - ART_HEIGHT` rows belong to the overlay strip.
pub const ART_HEIGHT: u32 = 371;

/// Quality setting for JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub const MAX: Quality = Quality(100);

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::MAX
    }
}

/// Sharpening parameters for unsharp mask.
///
/// - `radius`: Gaussian blur sigma used to build the mask
/// - `percent`: How much of the difference is added back (100 = 1×)
/// - `threshold`: Minimum per-channel difference before a pixel is sharpened
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sharpening {
    pub radius: f32,
    pub percent: u32,
    pub threshold: u8,
}

impl Sharpening {
    /// Pass applied to banner artwork after the downscale.
    pub fn banner() -> Self {
        Self {
            radius: 0.8,
            percent: 110,
            threshold: 3,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SizeError {
    #[error("target size must be WIDTHxHEIGHT, got {0:?}")]
    Malformed(String),
    #[error("target size must be positive, got {width}x{height}")]
    Zero { width: u32, height: u32 },
}

/// Exact output dimensions for a resize job.
///
/// Always positive. Serialized as the `"WxH"` label used in output filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetSize {
    width: u32,
    height: u32,
}

impl TargetSize {
    pub fn new(width: u32, height: u32) -> Result<Self, SizeError> {
        if width == 0 || height == 0 {
            return Err(SizeError::Zero { width, height });
        }
        Ok(Self { width, height })
    }

    /// Constructor for sizes known at compile time.
    ///
    /// Intended for `const` items, where a zero dimension fails the build.
    pub const fn fixed(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "target size must be positive");
        Self { width, height }
    }

    /// The 286×410 banner canvas size.
    pub const BANNER: TargetSize = TargetSize::fixed(BANNER_WIDTH, BANNER_HEIGHT);

    pub fn width(self) -> u32 {
        self.width
    }

    pub fn height(self) -> u32 {
        self.height
    }

    /// Filename label, e.g. `286x410`.
    pub fn label(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for TargetSize {
    type Err = SizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || SizeError::Malformed(s.to_string());
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(malformed)?;
        let width = w.trim().parse::<u32>().map_err(|_| malformed())?;
        let height = h.trim().parse::<u32>().map_err(|_| malformed())?;
        Self::new(width, height)
    }
}

impl TryFrom<String> for TargetSize {
    type Error = SizeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TargetSize> for String {
    fn from(size: TargetSize) -> Self {
        size.label()
    }
}
