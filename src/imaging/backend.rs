//! Image I/O backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the batch runner
//! needs from the outside world: load, write_jpeg, and identify. Everything
//! between load and write is a pure function in
//! [`operations`](super::operations).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), pure Rust and statically
//! linked.

use image::{DynamicImage, ImageFormat, RgbImage};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Print resolution in dots per inch.
///
/// Defaults to 72×72, the value assumed whenever a source carries no density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dpi {
    pub x: u16,
    pub y: u16,
}

impl Dpi {
    pub const FALLBACK: Dpi = Dpi { x: 72, y: 72 };
}

impl Default for Dpi {
    fn default() -> Self {
        Self::FALLBACK
    }
}

impl fmt::Display for Dpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}

/// Container the source was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Layered Photoshop document, flattened on load.
    Psd,
    Raster(ImageFormat),
}

impl SourceFormat {
    /// Human-readable format label.
    pub fn label(self) -> String {
        match self {
            SourceFormat::Psd => "PSD (Adobe)".to_string(),
            SourceFormat::Raster(ImageFormat::Jpeg) => "JPEG".to_string(),
            SourceFormat::Raster(ImageFormat::Png) => "PNG".to_string(),
            SourceFormat::Raster(ImageFormat::Tiff) => "TIFF".to_string(),
            SourceFormat::Raster(ImageFormat::WebP) => "WEBP".to_string(),
            SourceFormat::Raster(other) => format!("{other:?}").to_uppercase(),
        }
    }
}

/// A decoded, flattened source image with its print resolution.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub image: DynamicImage,
    pub dpi: Dpi,
    pub format: SourceFormat,
}

/// Header-level facts about an input file, read without a full decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    /// Format label, e.g. `"JPEG"` or `"PSD (Adobe)"`.
    pub format: String,
    /// Pixel mode, e.g. `"RGB"`, `"RGBA"`, `"CMYK"`.
    pub color_mode: String,
    pub size_bytes: u64,
    /// `None` when the file carries no density (PSD documents never report one).
    pub dpi: Option<Dpi>,
}

/// Trait for image I/O backends.
///
/// `Send + Sync` so a backend can be moved onto the batch worker thread.
pub trait ImageBackend: Send + Sync {
    /// Decode a file into a single flattened raster plus its DPI.
    fn load(&self, path: &Path) -> Result<LoadedImage, BackendError>;

    /// Encode an RGB image as maximum-quality JPEG at `path`.
    ///
    /// The parent directory is created when missing.
    fn write_jpeg(&self, image: &RgbImage, path: &Path, dpi: Dpi) -> Result<(), BackendError>;

    /// Read dimensions, format, and pixel mode without decoding pixels.
    fn identify(&self, path: &Path) -> Result<FileInfo, BackendError>;
}

/// Identify every source in order, keeping failures beside their paths.
pub fn identify_all(
    backend: &impl ImageBackend,
    sources: &[PathBuf],
) -> (Vec<FileInfo>, Vec<(PathBuf, BackendError)>) {
    let mut infos = Vec::new();
    let mut failures = Vec::new();
    for source in sources {
        match backend.identify(source) {
            Ok(info) => infos.push(info),
            Err(e) => failures.push((source.clone(), e)),
        }
    }
    (infos, failures)
}
