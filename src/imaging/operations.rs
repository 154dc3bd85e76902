//! High-level image operations.
//!
//! Everything here except [`write_output`] is a pure function from pixels to
//! pixels. The batch runner chains them between a backend `load` and a backend
//! `write_jpeg`.

use super::backend::{BackendError, Dpi, ImageBackend};
use super::calculations::{blend_channel, sharpen_channel};
use super::params::{ART_HEIGHT, BANNER_HEIGHT, BANNER_WIDTH, Sharpening, TargetSize};
use crate::naming::output_file_name;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage, RgbaImage};
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Canvas colour behind banner artwork.
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Stretch or shrink to exactly `size`, ignoring the source aspect ratio.
pub fn resize_exact(image: &DynamicImage, size: TargetSize) -> DynamicImage {
    image.resize_exact(size.width(), size.height(), FilterType::Lanczos3)
}

/// Unsharp mask with an explicit amount.
///
/// `imageops::unsharpen` always adds back 100 % of the difference; banner
/// artwork needs 110 %, so the mask is applied channel by channel here.
pub fn unsharp_mask(image: &RgbImage, sharpening: Sharpening) -> RgbImage {
    let blurred = imageops::blur(image, sharpening.radius);
    let mut out = image.clone();
    for (px, soft) in out.pixels_mut().zip(blurred.pixels()) {
        for c in 0..3 {
            px[c] = sharpen_channel(px[c], soft[c], sharpening.percent, sharpening.threshold);
        }
    }
    out
}

/// Bring an overlay template to RGBA at exactly the banner canvas size.
pub fn prepare_overlay(image: &DynamicImage) -> RgbaImage {
    let rgba = image.to_rgba8();
    if rgba.dimensions() == (BANNER_WIDTH, BANNER_HEIGHT) {
        rgba
    } else {
        imageops::resize(&rgba, BANNER_WIDTH, BANNER_HEIGHT, FilterType::Lanczos3)
    }
}

/// Paste `overlay` onto `canvas` at `(x, y)` using the overlay's own alpha as mask.
///
/// Fully transparent overlay pixels leave the canvas untouched, fully opaque
/// ones replace it. Parts of the overlay outside the canvas are clipped.
pub fn paste_masked(canvas: &mut RgbImage, overlay: &RgbaImage, x: u32, y: u32) {
    let (cw, ch) = canvas.dimensions();
    for (ox, oy, over) in overlay.enumerate_pixels() {
        let (tx, ty) = (x + ox, y + oy);
        if tx >= cw || ty >= ch {
            continue;
        }
        let alpha = over[3];
        if alpha == 0 {
            continue;
        }
        let under = canvas.get_pixel_mut(tx, ty);
        for c in 0..3 {
            under[c] = blend_channel(over[c], under[c], alpha);
        }
    }
}

/// Compose a finished banner from product artwork and a pre-sized overlay.
///
/// 1. Resize artwork to 286×371 (Lanczos3)
/// 2. Unsharp mask (radius 0.8, 110 %, threshold 3)
/// 3. Paste at the top-left of a white 286×410 canvas, leaving a 39-row strip
/// 4. Paste the overlay over the whole canvas with its alpha as mask
///
/// `overlay` must come from [`prepare_overlay`].
pub fn compose_banner(artwork: &DynamicImage, overlay: &RgbaImage) -> RgbImage {
    let art = artwork
        .resize_exact(BANNER_WIDTH, ART_HEIGHT, FilterType::Lanczos3)
        .to_rgb8();
    let art = unsharp_mask(&art, Sharpening::banner());

    let mut canvas = RgbImage::from_pixel(BANNER_WIDTH, BANNER_HEIGHT, WHITE);
    imageops::replace(&mut canvas, &art, 0, 0);
    paste_masked(&mut canvas, overlay, 0, 0);
    canvas
}

/// Flatten any pixel mode to plain 8-bit RGB for JPEG encoding.
///
/// Alpha is dropped, grey is expanded, 16-bit and float samples are narrowed.
pub fn prepare_for_jpeg(image: DynamicImage) -> RgbImage {
    match image {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    }
}

/// Write `image` as `{dest_dir}/{base}{separator}{suffix}.jpg`.
///
/// Returns the path written. The destination directory is created by the
/// backend when missing.
pub fn write_output(
    backend: &impl ImageBackend,
    image: &RgbImage,
    dest_dir: &Path,
    base: &str,
    suffix: &str,
    separator: &str,
    dpi: Dpi,
) -> Result<PathBuf> {
    let path = dest_dir.join(output_file_name(base, separator, suffix));
    backend.write_jpeg(image, &path, dpi)?;
    Ok(path)
}
