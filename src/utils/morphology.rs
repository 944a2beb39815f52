//! Morphology with the fixed 3×3 square structuring element.
//!
//! Applying the 3×3 square `n` times equals one pass with a
//! `(2n + 1) × (2n + 1)` square, so an iteration count maps directly to the
//! radius of a square [`Mask`]. Every operation reduces over in-image pixels
//! only: pixels outside the image never take part, so a fully opaque matte
//! stays opaque however small the image is.

use image::Luma;
use imageproc::definitions::Image;
use imageproc::morphology::{self, Mask};

/// Radius of the structuring element (3×3 square).
pub const STRUCTURING_ELEMENT_RADIUS: u8 = 1;

#[inline]
fn square(iterations: u8) -> Mask {
    Mask::square(iterations.saturating_mul(STRUCTURING_ELEMENT_RADIUS))
}

/// Binary opening (erosion then dilation) of a 0/255 mask.
pub fn binary_open(mask: &Image<Luma<u8>>, iterations: u8) -> Image<Luma<u8>> {
    morphology::grayscale_open(mask, &square(iterations))
}

/// Binary closing (dilation then erosion) of a 0/255 mask.
pub fn binary_close(mask: &Image<Luma<u8>>, iterations: u8) -> Image<Luma<u8>> {
    morphology::grayscale_close(mask, &square(iterations))
}

/// Binary dilation of a 0/255 mask by an explicit square radius.
pub fn binary_dilate(mask: &Image<Luma<u8>>, radius: u8) -> Image<Luma<u8>> {
    morphology::grayscale_dilate(mask, &Mask::square(radius))
}

/// Grayscale erosion: every pixel becomes the minimum of its square
/// neighbourhood, clipped to the image.
pub fn grayscale_erode(image: &Image<Luma<u8>>, iterations: u8) -> Image<Luma<u8>> {
    morphology::grayscale_erode(image, &square(iterations))
}
