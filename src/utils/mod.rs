//! Internal utility functions for imageops-cutout.
//!
//! This module contains the numeric building blocks shared by the cutout
//! stages: fixed-point luminance, saturating rounding and shape checks.

pub mod gaussian;
pub mod morphology;

use crate::error::CutoutError;

/// Rounds a floating-point value to the nearest `u8`, saturating at the ends.
///
/// NaN maps to 0.
#[inline]
pub fn saturate_u8(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

const LUMA_SHIFT: u32 = 14;
const LUMA_R: u32 = 4899; // 0.299 * 2^14
const LUMA_G: u32 = 9617; // 0.587 * 2^14
const LUMA_B: u32 = 1868; // 0.114 * 2^14

/// Computes `0.299 R + 0.587 G + 0.114 B` in 14-bit fixed point, rounded.
#[inline]
pub fn luminance(red: u8, green: u8, blue: u8) -> u8 {
    let weighted = u32::from(red) * LUMA_R + u32::from(green) * LUMA_G + u32::from(blue) * LUMA_B;
    ((weighted + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8
}

/// Validates that two images have matching dimensions.
///
/// # Arguments
///
/// * `expected` - Dimensions of the reference image (width, height)
/// * `actual` - Dimensions of the image being checked (width, height)
///
/// # Returns
///
/// `Ok(())` if the dimensions match, otherwise `CutoutError::DimensionMismatch`
pub fn validate_matching_dimensions(
    expected: (u32, u32),
    actual: (u32, u32),
) -> Result<(), CutoutError> {
    if expected == actual {
        Ok(())
    } else {
        Err(CutoutError::DimensionMismatch { expected, actual })
    }
}

/// Validates that a kernel or stroke size is odd and non-zero.
pub fn validate_odd_size(value: u32, what: &str) -> Result<(), CutoutError> {
    if value == 0 || value % 2 == 0 {
        Err(CutoutError::InvalidParameter(format!(
            "{what} must be an odd positive number, got {value}"
        )))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturate_u8() {
        assert_eq!(saturate_u8(-10.0), 0);
        assert_eq!(saturate_u8(0.4), 0);
        assert_eq!(saturate_u8(127.5), 128);
        assert_eq!(saturate_u8(254.99997), 255);
        assert_eq!(saturate_u8(300.0), 255);
        assert_eq!(saturate_u8(f32::NAN), 0);
    }

    #[test]
    fn test_luminance() {
        assert_eq!(luminance(0, 0, 0), 0);
        assert_eq!(luminance(255, 255, 255), 255);
        assert_eq!(luminance(255, 0, 0), 76);
        assert_eq!(luminance(0, 255, 0), 150);
        assert_eq!(luminance(0, 0, 255), 29);
        // A single unit of blue rounds away to black.
        assert_eq!(luminance(0, 0, 1), 0);
        assert_eq!(luminance(0, 0, 9), 1);
    }

    #[test]
    fn test_validate_matching_dimensions() {
        assert!(validate_matching_dimensions((100, 100), (100, 100)).is_ok());
        assert_eq!(
            validate_matching_dimensions((100, 100), (100, 50)),
            Err(CutoutError::DimensionMismatch {
                expected: (100, 100),
                actual: (100, 50),
            })
        );
    }

    #[test]
    fn test_validate_odd_size() {
        assert!(validate_odd_size(1, "kernel").is_ok());
        assert!(validate_odd_size(7, "kernel").is_ok());
        assert!(validate_odd_size(0, "kernel").is_err());
        assert!(validate_odd_size(4, "kernel").is_err());
    }
}
