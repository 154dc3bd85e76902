//! Layered Photoshop document support.
//!
//! Flattening goes through the `psd` crate; the header is read by hand so
//! [`identify`](super::ImageBackend::identify) never pays for a full decode.
//!
//! Header layout (26 bytes, big-endian):
//!
//! ```text
//! 0..4   "8BPS"
//! 4..6   version (1 = PSD)
//! 6..12  reserved
//! 12..14 channels
//! 14..18 height
//! 18..22 width
//! 22..24 depth (bits per channel)
//! 24..26 colour mode
//! ```

use super::backend::BackendError;
use ::psd::Psd;
use image::RgbaImage;

const SIGNATURE: &[u8] = b"8BPS";
const HEADER_LEN: usize = 26;

/// Fixed-size PSD file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PsdHeader {
    pub channels: u16,
    pub width: u32,
    pub height: u32,
    pub depth: u16,
    pub color_mode: u16,
}

impl PsdHeader {
    /// Pixel mode name for the header's colour mode.
    pub fn color_mode_name(&self) -> &'static str {
        match self.color_mode {
            0 => "1",
            1 => "L",
            2 => "P",
            3 if self.channels >= 4 => "RGBA",
            3 => "RGB",
            4 => "CMYK",
            7 => "Multichannel",
            8 => "Duotone",
            9 => "LAB",
            _ => "Unknown",
        }
    }
}

/// Parse the 26-byte header of a PSD file.
pub fn read_header(data: &[u8]) -> Result<PsdHeader, BackendError> {
    if data.len() < HEADER_LEN || !data.starts_with(SIGNATURE) {
        return Err(BackendError::Decode("not a Photoshop document".into()));
    }
    let be_u16 = |offset: usize| u16::from_be_bytes([data[offset], data[offset + 1]]);
    let be_u32 = |offset: usize| {
        u32::from_be_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ])
    };

    let version = be_u16(4);
    if version != 1 {
        return Err(BackendError::Decode(format!(
            "unsupported Photoshop document version {version}"
        )));
    }

    Ok(PsdHeader {
        channels: be_u16(12),
        height: be_u32(14),
        width: be_u32(18),
        depth: be_u16(22),
        color_mode: be_u16(24),
    })
}

/// Flatten a PSD into one RGBA raster.
///
/// Visible layers are composited in stack order. Documents without layer
/// records (flattened saves) use the merged image stored in the file.
///
/// The `psd` crate indexes section data directly and can panic on truncated
/// documents; the panic is caught and reported as a decode error so a single
/// bad file cannot take down the batch worker.
pub fn flatten(data: &[u8]) -> Result<RgbaImage, BackendError> {
    read_header(data)?;

    let decoded = std::panic::catch_unwind(|| decode_rgba(data)).map_err(|_| {
        BackendError::Decode("Photoshop document is truncated or malformed".into())
    })?;
    let (width, height, rgba) = decoded?;

    RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
        BackendError::Decode(format!(
            "flattened pixel buffer does not match {width}x{height}"
        ))
    })
}

fn decode_rgba(data: &[u8]) -> Result<(u32, u32, Vec<u8>), BackendError> {
    let psd = Psd::from_bytes(data)
        .map_err(|e| BackendError::Decode(format!("Photoshop document: {e:?}")))?;

    let rgba = if psd.layers().is_empty() {
        psd.rgba()
    } else {
        psd.flatten_layers_rgba(&|(_, layer)| layer.visible())
            .map_err(|e| BackendError::Decode(format!("flattening layers: {e:?}")))?
    };

    Ok((psd.width(), psd.height(), rgba))
}
