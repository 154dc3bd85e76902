//! Image processing: pure Rust, statically linked.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Load** | `image::ImageReader` (rasters), `psd` crate (layered documents) |
//! | **DPI** | custom reader (JFIF, EXIF, PNG pHYs, TIFF IFD0) |
//! | **Resize** | `resize_exact` with Lanczos3 |
//! | **Banner** | Lanczos3 + unsharp mask + alpha-masked overlay paste |
//! | **Encode** | `JpegEncoder`, quality 100, 4:4:4, JFIF density |
//!
//! The module is split into:
//! - **Calculations**: Pure per-channel and unit-conversion math (unit testable)
//! - **Parameters**: Canvas constants, quality, sharpening, target sizes
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Pixel pipelines between a backend load and a backend write

pub mod backend;
pub mod calculations;
pub mod density;
pub mod layered;
pub mod operations;
pub(crate) mod params;
pub mod rust_backend;

pub use backend::{
    BackendError, Dpi, FileInfo, ImageBackend, LoadedImage, SourceFormat, identify_all,
};
pub use params::{
    ART_HEIGHT, BANNER_HEIGHT, BANNER_WIDTH, Quality, Sharpening, SizeError, TargetSize,
};
pub use rust_backend::{RustBackend, supported_input_extensions};
