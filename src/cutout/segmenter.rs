use std::convert::Infallible;
use std::fmt::Display;

use image::{DynamicImage, Rgba};
use imageproc::definitions::Image;

/// The background-removal collaborator
///
/// A segmenter turns a color image into an RGBA image of the same size
/// whose alpha separates object from background. The alpha is expected to
/// be roughly bimodal but noisy; the cutout pipeline cleans it up.
pub trait Segmenter {
    type Error: Display;

    /// Estimates the object matte of `image`.
    ///
    /// # Errors
    ///
    /// Whatever the underlying model or service reports.
    fn segment(&self, image: &DynamicImage) -> Result<Image<Rgba<u8>>, Self::Error>;
}

impl<F, E> Segmenter for F
where
    F: Fn(&DynamicImage) -> Result<Image<Rgba<u8>>, E>,
    E: Display,
{
    type Error = E;

    fn segment(&self, image: &DynamicImage) -> Result<Image<Rgba<u8>>, Self::Error> {
        self(image)
    }
}

/// Segmenter for images whose background has already been removed
///
/// The input's own alpha is used as the matte; images without alpha are
/// treated as fully opaque.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Segmenter for Passthrough {
    type Error = Infallible;

    fn segment(&self, image: &DynamicImage) -> Result<Image<Rgba<u8>>, Self::Error> {
        Ok(image.to_rgba8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_rgb_image, create_test_rgba_image};

    #[test]
    fn test_passthrough_keeps_alpha() {
        let image = DynamicImage::ImageRgba8(create_test_rgba_image());
        let matte = Passthrough.segment(&image).unwrap();
        assert_eq!(matte, create_test_rgba_image());
    }

    #[test]
    fn test_passthrough_makes_rgb_opaque() {
        let image = DynamicImage::ImageRgb8(create_test_rgb_image());
        let matte = Passthrough.segment(&image).unwrap();
        assert!(matte.pixels().all(|p| p[3] == 255));
        assert_eq!(matte.get_pixel(0, 0), &Rgba([200, 150, 100, 255]));
    }

    #[test]
    fn test_closure_segmenter() {
        let failing = |_: &DynamicImage| -> Result<Image<Rgba<u8>>, String> {
            Err("model not loaded".to_string())
        };
        let image = DynamicImage::new_rgb8(2, 2);
        assert_eq!(failing.segment(&image).unwrap_err(), "model not loaded");
    }
}
