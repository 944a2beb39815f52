//! Test utilities for imageops-cutout
//!
//! This module provides common fixtures for testing the cutout stages.
//! It is only compiled when running tests.

use image::{Luma, Rgb, Rgba};
use imageproc::definitions::Image;

/// Color used for the object in blob fixtures.
pub const BLOB_COLOR: [u8; 3] = [200, 120, 40];

/// Colors of the 2x2 fixtures, row-major.
const FIXTURE_COLORS: [[u8; 3]; 4] = [
    [200, 150, 100],
    [100, 200, 150],
    [150, 100, 200],
    [50, 75, 25],
];

/// Alpha of the 2x2 RGBA fixture: opaque, half, quarter, cleared.
const FIXTURE_MATTE: [u8; 4] = [255, 128, 64, 0];

#[inline]
fn fixture_index(x: u32, y: u32) -> usize {
    (y * 2 + x) as usize
}

/// 2x2 color image without alpha, the shape a segmenter is fed.
pub fn create_test_rgb_image() -> Image<Rgb<u8>> {
    Image::from_fn(2, 2, |x, y| Rgb(FIXTURE_COLORS[fixture_index(x, y)]))
}

/// 2x2 segmenter output with one pixel per coverage level.
pub fn create_test_rgba_image() -> Image<Rgba<u8>> {
    Image::from_fn(2, 2, |x, y| {
        let i = fixture_index(x, y);
        let [red, green, blue] = FIXTURE_COLORS[i];
        Rgba([red, green, blue, FIXTURE_MATTE[i]])
    })
}

/// 2x2 standalone matte: 255, 192 / 128, 64.
pub fn create_test_alpha_mask() -> Image<Luma<u8>> {
    const LEVELS: [u8; 4] = [255, 192, 128, 64];
    Image::from_fn(2, 2, |x, y| Luma([LEVELS[fixture_index(x, y)]]))
}

/// Creates a matted square object on a transparent black background.
///
/// Pixels with both coordinates in `start..end` are `BLOB_COLOR` at full
/// opacity; everything else is `[0, 0, 0, 0]`.
pub fn create_blob_rgba_image(width: u32, height: u32, start: u32, end: u32) -> Image<Rgba<u8>> {
    let [red, green, blue] = BLOB_COLOR;
    Image::from_fn(width, height, |x, y| {
        if (start..end).contains(&x) && (start..end).contains(&y) {
            Rgba([red, green, blue, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_share_colors_row_major() {
        let image = create_test_rgba_image();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(0, 0), &Rgba([200, 150, 100, 255]));
        assert_eq!(image.get_pixel(0, 1), &Rgba([150, 100, 200, 64]));
        assert_eq!(image.get_pixel(1, 1), &Rgba([50, 75, 25, 0]));
        assert_eq!(create_test_rgb_image().get_pixel(1, 0), &Rgb([100, 200, 150]));
        assert_eq!(create_test_alpha_mask().as_raw(), &vec![255, 192, 128, 64]);
    }

    #[test]
    fn create_blob_rgba_image_places_square() {
        let image = create_blob_rgba_image(6, 6, 2, 4);
        assert_eq!(image.get_pixel(2, 2), &Rgba([200, 120, 40, 255]));
        assert_eq!(image.get_pixel(3, 3), &Rgba([200, 120, 40, 255]));
        assert_eq!(image.get_pixel(4, 3), &Rgba([0, 0, 0, 0]));
        assert_eq!(image.pixels().filter(|p| p[3] == 255).count(), 4);
    }
}
