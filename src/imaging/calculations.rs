//! Pure calculation functions for pixel math and resolution units.
//!
//! All functions here are pure and testable without any I/O or images.

/// Centimetres per inch.
const CM_PER_INCH: f64 = 2.54;
/// Inches per metre.
const INCHES_PER_METRE: f64 = 39.370_078_740_157_48;

/// Sharpen a single channel value against its blurred counterpart.
///
/// `diff = orig - blurred`. When `|diff| >= threshold` the result is
/// `orig + diff * percent / 100`, clamped to `0..=255`; otherwise `orig`.
///
/// # Examples
/// ```
/// # use media_workflow::imaging::calculations::sharpen_channel;
/// // Edge pixel brighter than its surroundings gets brighter
/// assert_eq!(sharpen_channel(120, 100, 110, 3), 142);
/// // Below threshold: untouched
/// assert_eq!(sharpen_channel(101, 100, 110, 3), 101);
/// ```
pub fn sharpen_channel(orig: u8, blurred: u8, percent: u32, threshold: u8) -> u8 {
    let diff = orig as i32 - blurred as i32;
    if diff.abs() < threshold as i32 {
        return orig;
    }
    let boosted = orig as f64 + diff as f64 * percent as f64 / 100.0;
    boosted.round().clamp(0.0, 255.0) as u8
}

/// Blend one channel of an overlay onto the canvas using the overlay alpha.
///
/// Alpha 255 yields the overlay value exactly, alpha 0 the canvas value.
pub fn blend_channel(over: u8, under: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((over as u32 * a + under as u32 * (255 - a) + 127) / 255) as u8
}

/// Convert a resolution value into whole DPI.
///
/// `unit` follows the TIFF/EXIF ResolutionUnit and JFIF conventions once
/// normalized by the caller: [`ResolutionUnit::Inch`] or
/// [`ResolutionUnit::Centimetre`]. Zero, negative and non-finite values
/// yield `None`; large values clamp to `u16::MAX`.
pub fn dpi_from_resolution(value: f64, unit: ResolutionUnit) -> Option<u16> {
    let dpi = match unit {
        ResolutionUnit::Inch => value,
        ResolutionUnit::Centimetre => value * CM_PER_INCH,
    };
    to_dpi(dpi)
}

/// Convert a PNG `pHYs` pixels-per-metre value into whole DPI.
pub fn dpi_from_pixels_per_metre(ppm: f64) -> Option<u16> {
    to_dpi(ppm / INCHES_PER_METRE)
}

fn to_dpi(value: f64) -> Option<u16> {
    if !value.is_finite() {
        return None;
    }
    let rounded = value.round();
    if rounded < 1.0 {
        return None;
    }
    Some(rounded.min(u16::MAX as f64) as u16)
}

/// Physical unit a resolution value is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionUnit {
    Inch,
    Centimetre,
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // sharpen_channel tests
    // =========================================================================

    #[test]
    fn sharpen_adds_scaled_difference() {
        // diff 20 * 1.1 = 22
        assert_eq!(sharpen_channel(120, 100, 110, 3), 142);
    }

    #[test]
    fn sharpen_darkens_below_blur() {
        // diff -20 * 1.1 = -22
        assert_eq!(sharpen_channel(80, 100, 110, 3), 58);
    }

    #[test]
    fn sharpen_threshold_is_inclusive() {
        assert_eq!(sharpen_channel(103, 100, 100, 3), 106);
        assert_eq!(sharpen_channel(102, 100, 100, 3), 102);
    }

    #[test]
    fn sharpen_clamps_to_u8_range() {
        assert_eq!(sharpen_channel(250, 150, 110, 3), 255);
        assert_eq!(sharpen_channel(5, 100, 110, 3), 0);
    }

    #[test]
    fn sharpen_flat_region_unchanged() {
        assert_eq!(sharpen_channel(200, 200, 110, 0), 200);
    }

    // =========================================================================
    // blend_channel tests
    // =========================================================================

    #[test]
    fn blend_opaque_takes_overlay() {
        assert_eq!(blend_channel(10, 250, 255), 10);
    }

    #[test]
    fn blend_transparent_keeps_canvas() {
        assert_eq!(blend_channel(10, 250, 0), 250);
    }

    #[test]
    fn blend_half_alpha_is_midpoint() {
        assert_eq!(blend_channel(0, 255, 128), 127);
        assert_eq!(blend_channel(255, 255, 128), 255);
    }

    // =========================================================================
    // Resolution conversions
    // =========================================================================

    #[test]
    fn dpi_inches_passthrough() {
        assert_eq!(dpi_from_resolution(300.0, ResolutionUnit::Inch), Some(300));
    }

    #[test]
    fn dpi_from_centimetres() {
        // 118.11 px/cm ≈ 300 dpi
        assert_eq!(
            dpi_from_resolution(118.11, ResolutionUnit::Centimetre),
            Some(300)
        );
    }

    #[test]
    fn dpi_zero_is_none() {
        assert_eq!(dpi_from_resolution(0.0, ResolutionUnit::Inch), None);
        assert_eq!(dpi_from_pixels_per_metre(0.0), None);
    }

    #[test]
    fn dpi_non_finite_is_none() {
        assert_eq!(dpi_from_resolution(f64::NAN, ResolutionUnit::Inch), None);
    }

    #[test]
    fn dpi_from_png_pixels_per_metre() {
        // 11811 px/m is what most tools write for 300 dpi
        assert_eq!(dpi_from_pixels_per_metre(11811.0), Some(300));
        // 2835 px/m ≈ 72 dpi
        assert_eq!(dpi_from_pixels_per_metre(2835.0), Some(72));
    }

    #[test]
    fn dpi_clamps_to_u16() {
        assert_eq!(
            dpi_from_resolution(1.0e9, ResolutionUnit::Inch),
            Some(u16::MAX)
        );
    }
}
