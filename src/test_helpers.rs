//! Shared fixtures for unit tests.
//!
//! Everything is synthesised on the fly: tiny JPEGs with a chosen density, a
//! minimal uncompressed PSD, and banner overlay templates. Nothing is read
//! from the repository.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! write_test_jpeg(&tmp.path().join("a.jpg"), 640, 480, 300);
//! write_test_psd(&tmp.path().join("b.psd"), 32, 24, [200, 100, 50]);
//! write_overlay(&tmp.path().join("banner_2day.png"));
//! ```

use image::codecs::jpeg::{JpegEncoder, PixelDensity, PixelDensityUnit};
use image::{ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

use crate::imaging::params::{ART_HEIGHT, BANNER_HEIGHT, BANNER_WIDTH};

/// Colour of the opaque strip painted by [`write_overlay`].
pub const OVERLAY_STRIP: [u8; 3] = [200, 0, 0];

// =========================================================================
// Raster sources
// =========================================================================

/// Gradient RGB image, distinct per pixel so resizes are not no-ops.
pub fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// JPEG bytes with a JFIF density of `dpi`×`dpi` inches.
pub fn jpeg_bytes(width: u32, height: u32, dpi: u16) -> Vec<u8> {
    let img = gradient(width, height);
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, 90);
    encoder.set_pixel_density(PixelDensity {
        density: (dpi, dpi),
        unit: PixelDensityUnit::Inches,
    });
    encoder
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Write a gradient JPEG at `path` with the given density.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32, dpi: u16) {
    std::fs::write(path, jpeg_bytes(width, height, dpi)).unwrap();
}

/// Write a gradient PNG at `path` (no `pHYs` chunk).
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    gradient(width, height).save(path).unwrap();
}

// =========================================================================
// Photoshop documents
// =========================================================================

/// Minimal single-colour RGB PSD: no layers, raw (uncompressed) merged image.
pub fn psd_bytes(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let mut data = psd_header(width, height);

    // Layer and mask info: empty layer info, empty global mask
    data.extend_from_slice(&8u32.to_be_bytes());
    data.extend_from_slice(&[0; 8]);

    push_raw_image(&mut data, (width * height) as usize, rgb);
    data
}

/// 8-bit, 3-channel RGB header plus empty colour mode data and resources.
fn psd_header(width: u32, height: u32) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(b"8BPS");
    data.extend_from_slice(&1u16.to_be_bytes());
    data.extend_from_slice(&[0; 6]);
    data.extend_from_slice(&3u16.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&8u16.to_be_bytes());
    data.extend_from_slice(&3u16.to_be_bytes());

    // Colour mode data, image resources
    data.extend_from_slice(&0u32.to_be_bytes());
    data.extend_from_slice(&0u32.to_be_bytes());
    data
}

/// Merged image data: raw planar R, G, B.
fn push_raw_image(data: &mut Vec<u8>, plane: usize, rgb: [u8; 3]) {
    data.extend_from_slice(&0u16.to_be_bytes());
    for value in rgb {
        data.extend(std::iter::repeat_n(value, plane));
    }
}

/// Layer flag bit the `psd` crate reads as "visible".
const LAYER_VISIBLE: u8 = 0b10;

/// Full-canvas RGB PSD with one opaque layer per entry of `layers`, listed
/// bottom to top as `(colour, visible)`, over a merged composite of `merged`.
pub fn layered_psd_bytes(
    width: u32,
    height: u32,
    merged: [u8; 3],
    layers: &[([u8; 3], bool)],
) -> Vec<u8> {
    let plane = (width * height) as usize;
    let channel_len = 2 + plane as u32;

    let mut records = Vec::new();
    let mut channel_data = Vec::new();
    for (i, (rgb, visible)) in layers.iter().enumerate() {
        // Bounds: top, left, bottom, right
        for edge in [0, 0, height, width] {
            records.extend_from_slice(&edge.to_be_bytes());
        }
        records.extend_from_slice(&3u16.to_be_bytes());
        for id in 0i16..3 {
            records.extend_from_slice(&id.to_be_bytes());
            records.extend_from_slice(&channel_len.to_be_bytes());
        }
        records.extend_from_slice(b"8BIMnorm");
        let flags = if *visible { LAYER_VISIBLE } else { 0 };
        records.extend_from_slice(&[255, 0, flags, 0]);

        // Extra data: empty mask, empty blending ranges, padded Pascal name
        let name = format!("layer{i}");
        let mut pascal = vec![name.len() as u8];
        pascal.extend_from_slice(name.as_bytes());
        while pascal.len() % 4 != 0 {
            pascal.push(0);
        }
        records.extend_from_slice(&(8 + pascal.len() as u32).to_be_bytes());
        records.extend_from_slice(&0u32.to_be_bytes());
        records.extend_from_slice(&0u32.to_be_bytes());
        records.extend_from_slice(&pascal);

        for value in rgb {
            channel_data.extend_from_slice(&0u16.to_be_bytes());
            channel_data.extend(std::iter::repeat_n(*value, plane));
        }
    }

    let mut layer_info = (layers.len() as i16).to_be_bytes().to_vec();
    layer_info.extend_from_slice(&records);
    layer_info.extend_from_slice(&channel_data);
    if layer_info.len() % 2 != 0 {
        layer_info.push(0);
    }

    let mut section = (layer_info.len() as u32).to_be_bytes().to_vec();
    section.extend_from_slice(&layer_info);
    // Empty global layer mask
    section.extend_from_slice(&0u32.to_be_bytes());

    let mut data = psd_header(width, height);
    data.extend_from_slice(&(section.len() as u32).to_be_bytes());
    data.extend_from_slice(&section);
    push_raw_image(&mut data, plane, merged);
    data
}

pub fn write_test_psd(path: &Path, width: u32, height: u32, rgb: [u8; 3]) {
    std::fs::write(path, psd_bytes(width, height, rgb)).unwrap();
}

// =========================================================================
// Banner templates
// =========================================================================

/// Overlay at canvas size: transparent over the artwork, opaque over the strip.
pub fn overlay_image() -> RgbaImage {
    let [r, g, b] = OVERLAY_STRIP;
    RgbaImage::from_fn(BANNER_WIDTH, BANNER_HEIGHT, |_, y| {
        if y >= ART_HEIGHT {
            Rgba([r, g, b, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// Write [`overlay_image`] as a PNG template at `path`.
pub fn write_overlay(path: &Path) {
    overlay_image().save(path).unwrap();
}

/// Write both overlay templates into `dir` under their default names.
pub fn write_templates(dir: &Path) {
    write_overlay(&dir.join("banner_2day.png"));
    write_overlay(&dir.join("banner_3day.png"));
}
