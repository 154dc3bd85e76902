//! Minimal print-resolution (DPI) reader for JPEG, PNG and TIFF files.
//!
//! The `image` crate decodes pixels but drops density metadata, so it is
//! recovered here straight from the container bytes:
//!
//! - JPEG: JFIF APP0 density first, then EXIF APP1 (TIFF IFD0 resolution tags).
//! - PNG: `pHYs` chunk when its unit is metres.
//! - TIFF: IFD0 `XResolution` (282) / `YResolution` (283) / `ResolutionUnit` (296).
//!
//! Every function returns `None` on any parse failure; callers fall back to
//! the 72×72 default.

use super::backend::Dpi;
use super::calculations::{ResolutionUnit, dpi_from_pixels_per_metre, dpi_from_resolution};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JFIF_HEADER: &[u8] = b"JFIF\0";
const EXIF_HEADER: &[u8] = b"Exif\0\0";

const TAG_X_RESOLUTION: u16 = 282;
const TAG_Y_RESOLUTION: u16 = 283;
const TAG_RESOLUTION_UNIT: u16 = 296;

/// Read the embedded DPI from raw file bytes, sniffing the container by magic.
pub fn read_dpi(data: &[u8]) -> Option<Dpi> {
    if data.starts_with(&[0xFF, 0xD8]) {
        read_dpi_from_jpeg(data)
    } else if data.starts_with(PNG_SIGNATURE) {
        read_dpi_from_png(data)
    } else if data.starts_with(b"II") || data.starts_with(b"MM") {
        read_dpi_from_tiff(data)
    } else {
        None
    }
}

fn dpi_pair(x: Option<u16>, y: Option<u16>) -> Option<Dpi> {
    match (x, y) {
        (Some(x), Some(y)) => Some(Dpi { x, y }),
        // Some writers only fill one axis; treat the pixels as square
        (Some(v), None) | (None, Some(v)) => Some(Dpi { x: v, y: v }),
        (None, None) => None,
    }
}

// ---------------------------------------------------------------------------
// JPEG: JFIF APP0, then EXIF APP1
// ---------------------------------------------------------------------------

fn read_dpi_from_jpeg(data: &[u8]) -> Option<Dpi> {
    let mut exif: Option<&[u8]> = None;

    for (marker, segment) in jpeg_segments(data) {
        match marker {
            0xE0 if segment.starts_with(JFIF_HEADER) => {
                if let Some(dpi) = parse_jfif_density(&segment[JFIF_HEADER.len()..]) {
                    return Some(dpi);
                }
            }
            0xE1 if segment.starts_with(EXIF_HEADER) && exif.is_none() => {
                exif = Some(&segment[EXIF_HEADER.len()..]);
            }
            _ => {}
        }
    }

    exif.and_then(read_dpi_from_tiff)
}

/// JFIF body after the identifier:
///   Bytes 0-1: version
///   Byte 2:    units (0 = aspect only, 1 = dots/inch, 2 = dots/cm)
///   Bytes 3-4: X density (big-endian u16)
///   Bytes 5-6: Y density (big-endian u16)
fn parse_jfif_density(body: &[u8]) -> Option<Dpi> {
    if body.len() < 7 {
        return None;
    }
    let unit = match body[2] {
        1 => ResolutionUnit::Inch,
        2 => ResolutionUnit::Centimetre,
        _ => return None,
    };
    let x = u16::from_be_bytes([body[3], body[4]]) as f64;
    let y = u16::from_be_bytes([body[5], body[6]]) as f64;
    dpi_pair(dpi_from_resolution(x, unit), dpi_from_resolution(y, unit))
}

/// Iterate `(marker, payload)` for every length-carrying segment before SOS.
fn jpeg_segments(data: &[u8]) -> impl Iterator<Item = (u8, &[u8])> {
    let mut pos = 2; // skip SOI
    std::iter::from_fn(move || {
        while pos + 4 <= data.len() {
            if data[pos] != 0xFF {
                pos += 1;
                continue;
            }
            let marker = data[pos + 1];
            // Fill bytes and standalone markers
            if marker == 0xFF {
                pos += 1;
                continue;
            }
            if marker == 0x01 || (0xD0..=0xD8).contains(&marker) {
                pos += 2;
                continue;
            }
            // SOS (0xDA) means entropy-coded data starts, EOI ends the image
            if marker == 0xDA || marker == 0xD9 {
                return None;
            }
            let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
            if seg_len < 2 {
                return None;
            }
            let seg_start = pos + 4;
            let seg_end = (pos + 2 + seg_len).min(data.len());
            pos += 2 + seg_len;
            return Some((marker, &data[seg_start..seg_end]));
        }
        None
    })
}

// ---------------------------------------------------------------------------
// PNG: pHYs chunk
// ---------------------------------------------------------------------------

/// Walk PNG chunks until `pHYs` or `IDAT`.
///
/// Chunk layout: length (4, BE) + type (4) + data + CRC (4).
/// `pHYs` data: X ppu (4), Y ppu (4), unit (1; 1 = metre).
fn read_dpi_from_png(data: &[u8]) -> Option<Dpi> {
    let mut pos = PNG_SIGNATURE.len();
    while pos + 8 <= data.len() {
        let len = u32::from_be_bytes(data[pos..pos + 4].try_into().ok()?) as usize;
        let kind = &data[pos + 4..pos + 8];
        let body_start = pos + 8;
        let body_end = body_start.checked_add(len)?;
        if body_end > data.len() {
            return None;
        }

        match kind {
            b"pHYs" if len >= 9 => {
                let body = &data[body_start..body_end];
                if body[8] != 1 {
                    return None;
                }
                let x = u32::from_be_bytes(body[0..4].try_into().ok()?) as f64;
                let y = u32::from_be_bytes(body[4..8].try_into().ok()?) as f64;
                return dpi_pair(dpi_from_pixels_per_metre(x), dpi_from_pixels_per_metre(y));
            }
            // pHYs must precede image data
            b"IDAT" | b"IEND" => return None,
            _ => {}
        }

        pos = body_end + 4;
    }
    None
}

// ---------------------------------------------------------------------------
// TIFF (standalone files and EXIF payloads)
// ---------------------------------------------------------------------------

/// Byte-order aware view over a TIFF structure.
struct TiffReader<'a> {
    data: &'a [u8],
    big_endian: bool,
}

impl<'a> TiffReader<'a> {
    fn new(data: &'a [u8]) -> Option<Self> {
        if data.len() < 8 {
            return None;
        }
        let big_endian = match &data[0..2] {
            b"MM" => true,
            b"II" => false,
            _ => return None,
        };
        let reader = Self { data, big_endian };
        // Verify TIFF magic (42)
        (reader.u16_at(2)? == 42).then_some(reader)
    }

    fn u16_at(&self, offset: usize) -> Option<u16> {
        let bytes: [u8; 2] = self.data.get(offset..offset + 2)?.try_into().ok()?;
        Some(if self.big_endian {
            u16::from_be_bytes(bytes)
        } else {
            u16::from_le_bytes(bytes)
        })
    }

    fn u32_at(&self, offset: usize) -> Option<u32> {
        let bytes: [u8; 4] = self.data.get(offset..offset + 4)?.try_into().ok()?;
        Some(if self.big_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        })
    }

    /// RATIONAL values are always stored out of line: the entry holds an offset.
    fn rational_at(&self, entry_offset: usize) -> Option<f64> {
        let value_offset = self.u32_at(entry_offset + 8)? as usize;
        let numerator = self.u32_at(value_offset)? as f64;
        let denominator = self.u32_at(value_offset + 4)? as f64;
        if denominator == 0.0 {
            return None;
        }
        Some(numerator / denominator)
    }
}

/// Read resolution tags from IFD0 of a TIFF structure.
fn read_dpi_from_tiff(data: &[u8]) -> Option<Dpi> {
    let tiff = TiffReader::new(data)?;
    let ifd_offset = tiff.u32_at(4)? as usize;
    let entry_count = tiff.u16_at(ifd_offset)? as usize;

    let mut x_res = None;
    let mut y_res = None;
    // TIFF 6.0: ResolutionUnit defaults to inches when absent
    let mut unit = Some(ResolutionUnit::Inch);

    for i in 0..entry_count {
        let entry_offset = ifd_offset + 2 + i * 12;
        let tag = tiff.u16_at(entry_offset)?;
        match tag {
            TAG_X_RESOLUTION => x_res = tiff.rational_at(entry_offset),
            TAG_Y_RESOLUTION => y_res = tiff.rational_at(entry_offset),
            TAG_RESOLUTION_UNIT => {
                // SHORT stored inline in the first two bytes of the value field
                unit = match tiff.u16_at(entry_offset + 8)? {
                    2 => Some(ResolutionUnit::Inch),
                    3 => Some(ResolutionUnit::Centimetre),
                    _ => None,
                };
            }
            _ => {}
        }
    }

    let unit = unit?;
    dpi_pair(
        x_res.and_then(|v| dpi_from_resolution(v, unit)),
        y_res.and_then(|v| dpi_from_resolution(v, unit)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jfif_jpeg(unit: u8, x: u16, y: u16) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        data.extend_from_slice(b"JFIF\0");
        data.extend_from_slice(&[0x01, 0x02, unit]);
        data.extend_from_slice(&x.to_be_bytes());
        data.extend_from_slice(&y.to_be_bytes());
        data.extend_from_slice(&[0x00, 0x00]);
        // SOS then junk scan data then EOI
        data.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02, 0x12, 0x34, 0xFF, 0xD9]);
        data
    }

    /// Little-endian TIFF header + IFD0 with resolution tags.
    fn tiff_bytes(x: (u32, u32), y: (u32, u32), unit: Option<u16>) -> Vec<u8> {
        let entries: u16 = if unit.is_some() { 3 } else { 2 };
        let ifd_len = 2 + entries as usize * 12 + 4;
        let rationals_offset = (8 + ifd_len) as u32;

        let mut data = Vec::new();
        data.extend_from_slice(b"II");
        data.extend_from_slice(&42u16.to_le_bytes());
        data.extend_from_slice(&8u32.to_le_bytes());
        data.extend_from_slice(&entries.to_le_bytes());

        // XResolution, RATIONAL (5), count 1
        data.extend_from_slice(&TAG_X_RESOLUTION.to_le_bytes());
        data.extend_from_slice(&5u16.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&rationals_offset.to_le_bytes());
        // YResolution
        data.extend_from_slice(&TAG_Y_RESOLUTION.to_le_bytes());
        data.extend_from_slice(&5u16.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&(rationals_offset + 8).to_le_bytes());
        if let Some(unit) = unit {
            data.extend_from_slice(&TAG_RESOLUTION_UNIT.to_le_bytes());
            data.extend_from_slice(&3u16.to_le_bytes());
            data.extend_from_slice(&1u32.to_le_bytes());
            data.extend_from_slice(&unit.to_le_bytes());
            data.extend_from_slice(&[0, 0]);
        }
        // No next IFD
        data.extend_from_slice(&0u32.to_le_bytes());

        data.extend_from_slice(&x.0.to_le_bytes());
        data.extend_from_slice(&x.1.to_le_bytes());
        data.extend_from_slice(&y.0.to_le_bytes());
        data.extend_from_slice(&y.1.to_le_bytes());
        data
    }

    #[test]
    fn jfif_inches() {
        assert_eq!(
            read_dpi(&jfif_jpeg(1, 300, 300)),
            Some(Dpi { x: 300, y: 300 })
        );
    }

    #[test]
    fn jfif_centimetres() {
        assert_eq!(
            read_dpi(&jfif_jpeg(2, 118, 59)),
            Some(Dpi { x: 300, y: 150 })
        );
    }

    #[test]
    fn jfif_aspect_only_is_none() {
        assert_eq!(read_dpi(&jfif_jpeg(0, 1, 1)), None);
    }

    #[test]
    fn jpeg_exif_fallback() {
        let tiff = tiff_bytes((240, 1), (240, 1), Some(2));
        let seg_len = (2 + EXIF_HEADER.len() + tiff.len()) as u16;

        let mut data = vec![0xFF, 0xD8, 0xFF, 0xE1];
        data.extend_from_slice(&seg_len.to_be_bytes());
        data.extend_from_slice(EXIF_HEADER);
        data.extend_from_slice(&tiff);
        data.extend_from_slice(&[0xFF, 0xD9]);

        assert_eq!(read_dpi(&data), Some(Dpi { x: 240, y: 240 }));
    }

    #[test]
    fn png_phys_metres() {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend_from_slice(&9u32.to_be_bytes());
        data.extend_from_slice(b"pHYs");
        data.extend_from_slice(&11811u32.to_be_bytes());
        data.extend_from_slice(&11811u32.to_be_bytes());
        data.push(1);
        data.extend_from_slice(&[0, 0, 0, 0]); // CRC (not checked)
        assert_eq!(read_dpi(&data), Some(Dpi { x: 300, y: 300 }));
    }

    #[test]
    fn png_phys_unknown_unit_is_none() {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend_from_slice(&9u32.to_be_bytes());
        data.extend_from_slice(b"pHYs");
        data.extend_from_slice(&1u32.to_be_bytes());
        data.extend_from_slice(&1u32.to_be_bytes());
        data.push(0);
        data.extend_from_slice(&[0, 0, 0, 0]);
        assert_eq!(read_dpi(&data), None);
    }

    #[test]
    fn png_without_phys_is_none() {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(b"IEND");
        data.extend_from_slice(&[0, 0, 0, 0]);
        assert_eq!(read_dpi(&data), None);
    }

    #[test]
    fn tiff_default_unit_is_inches() {
        let data = tiff_bytes((600, 2), (300, 1), None);
        assert_eq!(read_dpi(&data), Some(Dpi { x: 300, y: 300 }));
    }

    #[test]
    fn tiff_centimetre_unit() {
        let data = tiff_bytes((59, 1), (59, 1), Some(3));
        assert_eq!(read_dpi(&data), Some(Dpi { x: 150, y: 150 }));
    }

    #[test]
    fn tiff_no_unit_is_none() {
        let data = tiff_bytes((72, 1), (72, 1), Some(1));
        assert_eq!(read_dpi(&data), None);
    }

    #[test]
    fn tiff_zero_denominator_is_none() {
        let data = tiff_bytes((72, 0), (72, 0), Some(2));
        assert_eq!(read_dpi(&data), None);
    }

    #[test]
    fn truncated_inputs_are_none() {
        assert_eq!(read_dpi(&[]), None);
        assert_eq!(read_dpi(&[0xFF, 0xD8]), None);
        assert_eq!(read_dpi(b"II*\0"), None);
        assert_eq!(read_dpi(b"GIF89a"), None);
    }
}
