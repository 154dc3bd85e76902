//! Pure Rust image backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Decode (PSD) | `psd` crate, visible layers flattened ([`layered`](super::layered)) |
//! | Source DPI | custom [`density`](super::density) reader (JFIF, EXIF, pHYs, TIFF) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder`, quality 100, 4:4:4, JFIF density |
//! | Identify | decoder header only, no pixel decode |

use super::backend::{BackendError, Dpi, FileInfo, ImageBackend, LoadedImage, SourceFormat};
use super::params::Quality;
use super::{density, layered};
use image::codecs::jpeg::{JpegEncoder, PixelDensity, PixelDensityUnit};
use image::{
    DynamicImage, ExtendedColorType, ImageDecoder, ImageEncoder, ImageFormat, ImageReader,
    RgbImage,
};
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;

/// Raster extensions whose decoders are compiled in.
const RASTER_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut exts: Vec<&'static str> = RASTER_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect();
    // PSD is decoded by the psd crate, not the image crate
    exts.push("psd");
    exts
});

/// Returns every input extension that has a working decoder compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// True when `path` has a `.psd` extension, any case.
pub fn is_psd(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("psd"))
}

/// Pure Rust backend using the `image` and `psd` crates.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Pixel mode name for a decoder's native colour type.
fn color_mode_name(color: ExtendedColorType) -> &'static str {
    match color {
        ExtendedColorType::L1
        | ExtendedColorType::L2
        | ExtendedColorType::L4
        | ExtendedColorType::L8
        | ExtendedColorType::L16 => "L",
        ExtendedColorType::La8 | ExtendedColorType::La16 => "LA",
        ExtendedColorType::Rgb8
        | ExtendedColorType::Rgb16
        | ExtendedColorType::Rgb32F
        | ExtendedColorType::Bgr8 => "RGB",
        ExtendedColorType::Rgba8
        | ExtendedColorType::Rgba16
        | ExtendedColorType::Rgba32F
        | ExtendedColorType::Bgra8 => "RGBA",
        ExtendedColorType::Cmyk8 => "CMYK",
        _ => "Unknown",
    }
}

/// Sniff the container from content and hand back a reader over `data`.
fn raster_reader(data: &[u8]) -> Result<(ImageReader<Cursor<&[u8]>>, ImageFormat), BackendError> {
    let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    let format = reader
        .format()
        .ok_or_else(|| BackendError::Decode("unrecognised image format".into()))?;
    Ok((reader, format))
}

fn load_psd(data: &[u8]) -> Result<LoadedImage, BackendError> {
    let rgba = layered::flatten(data)?;
    Ok(LoadedImage {
        image: DynamicImage::ImageRgba8(rgba),
        dpi: Dpi::FALLBACK,
        format: SourceFormat::Psd,
    })
}

fn load_raster(data: &[u8]) -> Result<LoadedImage, BackendError> {
    let (reader, format) = raster_reader(data)?;
    let image = reader
        .decode()
        .map_err(|e| BackendError::Decode(e.to_string()))?;
    Ok(LoadedImage {
        image,
        dpi: density::read_dpi(data).unwrap_or_default(),
        format: SourceFormat::Raster(format),
    })
}

/// Encode `image` as baseline JPEG into memory.
///
/// The `image` encoder samples every component at 1×1, so output is always
/// 4:4:4. The JFIF header carries `dpi` in dots per inch.
fn encode_jpeg(image: &RgbImage, dpi: Dpi) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, Quality::MAX.value());
    encoder.set_pixel_density(PixelDensity {
        density: (dpi.x, dpi.y),
        unit: PixelDensityUnit::Inches,
    });
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| BackendError::Encode(e.to_string()))?;
    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn load(&self, path: &Path) -> Result<LoadedImage, BackendError> {
        let data = std::fs::read(path)?;
        if is_psd(path) {
            load_psd(&data)
        } else {
            load_raster(&data)
        }
    }

    fn write_jpeg(&self, image: &RgbImage, path: &Path, dpi: Dpi) -> Result<(), BackendError> {
        // Encode first so a failed encode never leaves a truncated file behind
        let bytes = encode_jpeg(image, dpi)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn identify(&self, path: &Path) -> Result<FileInfo, BackendError> {
        let data = std::fs::read(path)?;
        let file_name = file_name_of(path);
        let size_bytes = data.len() as u64;

        if is_psd(path) {
            let header = layered::read_header(&data)?;
            return Ok(FileInfo {
                file_name,
                width: header.width,
                height: header.height,
                format: SourceFormat::Psd.label(),
                color_mode: header.color_mode_name().to_string(),
                size_bytes,
                dpi: None,
            });
        }

        let (reader, format) = raster_reader(&data)?;
        let decoder = reader
            .into_decoder()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        let (width, height) = decoder.dimensions();
        Ok(FileInfo {
            file_name,
            width,
            height,
            format: SourceFormat::Raster(format).label(),
            color_mode: color_mode_name(decoder.original_color_type()).to_string(),
            size_bytes,
            dpi: density::read_dpi(&data),
        })
    }
}
