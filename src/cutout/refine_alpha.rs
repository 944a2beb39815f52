//! Alpha matte refinement.
//!
//! A segmentation matte is roughly bimodal but speckled on both sides of the
//! object boundary. Refinement turns it into a clean mask:
//!
//! 1. binarize the alpha at the threshold (strictly above → 255),
//! 2. open the binary mask to drop isolated foreground specks,
//! 3. close it to fill pinholes inside the object,
//! 4. zero the alpha wherever the cleaned mask is background,
//! 5. zero every alpha value still below the threshold,
//! 6. erode the alpha itself to pull the edge inwards again,
//! 7. blur the alpha for an anti-aliased falloff.
//!
//! Color channels are never touched.

use image::{Luma, Rgb, Rgba};
use imageproc::{
    definitions::Image,
    map::{map_colors, map_colors2},
};
use tracing::debug;

use crate::{
    config::RefineConfig,
    cutout::channels::{extract_alpha, PixelBuffer, ReplaceAlphaExt},
    error::CutoutError,
    utils::{
        gaussian::{gaussian_blur, GaussianKernel},
        morphology::{binary_close, binary_open, grayscale_erode},
    },
};

/// Trait for refining the alpha channel of a background-removed image
///
/// Images without an alpha channel are returned unchanged.
pub trait RefineAlphaExt {
    /// Cleans and softens the alpha channel
    ///
    /// This consumes the original image.
    ///
    /// # Errors
    ///
    /// * `CutoutError::InvalidParameter` - When `config` fails validation
    ///
    /// # Examples
    ///
    /// ```
    /// use imageops_cutout::{Image, RefineAlphaExt, RefineConfig};
    /// use image::Rgba;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let image: Image<Rgba<u8>> = Image::from_pixel(8, 8, Rgba([255, 0, 0, 255]));
    /// let refined = image.refine_alpha(&RefineConfig::default())?;
    /// assert!(refined.pixels().all(|p| p[3] == 255));
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    fn refine_alpha(self, config: &RefineConfig) -> Result<Self, CutoutError>
    where
        Self: Sized;
}

impl RefineAlphaExt for Image<Rgba<u8>> {
    fn refine_alpha(self, config: &RefineConfig) -> Result<Self, CutoutError> {
        let alpha = extract_alpha(&self);
        let refined = refine_alpha_mask(&alpha, config)?;
        self.replace_alpha(&refined)
    }
}

impl RefineAlphaExt for Image<Rgb<u8>> {
    fn refine_alpha(self, config: &RefineConfig) -> Result<Self, CutoutError> {
        config.validate()?;
        debug!("no alpha channel, skipping refinement");
        Ok(self)
    }
}

impl RefineAlphaExt for PixelBuffer {
    fn refine_alpha(self, config: &RefineConfig) -> Result<Self, CutoutError> {
        match self {
            Self::Rgb(image) => image.refine_alpha(config).map(Self::Rgb),
            Self::Rgba(image) => image.refine_alpha(config).map(Self::Rgba),
        }
    }
}

/// Runs the full refinement on a standalone alpha mask.
///
/// # Errors
///
/// * `CutoutError::InvalidParameter` - When `config` fails validation
pub fn refine_alpha_mask(
    alpha: &Image<Luma<u8>>,
    config: &RefineConfig,
) -> Result<Image<Luma<u8>>, CutoutError> {
    config.validate()?;
    let kernel = GaussianKernel::new(config.blur_kernel.size(), config.blur_sigma)?;
    if alpha.width() == 0 || alpha.height() == 0 {
        return Ok(alpha.clone());
    }

    let cleaned = clean_alpha_mask(alpha, config);
    let blurred = gaussian_blur(&cleaned, &kernel);

    debug!(
        width = alpha.width(),
        height = alpha.height(),
        kernel = config.blur_kernel.size(),
        "refined alpha matte"
    );
    Ok(blurred)
}

/// Steps 1 to 6 of the refinement: everything except the final blur.
///
/// Every value of the result is either 0 or at least `config.threshold`.
pub fn clean_alpha_mask(alpha: &Image<Luma<u8>>, config: &RefineConfig) -> Image<Luma<u8>> {
    let threshold = config.threshold;

    let binary = binarize(alpha, threshold);
    let opened = binary_open(&binary, config.open_iterations);
    let closed = binary_close(&opened, config.close_iterations);

    let cut = map_colors2(alpha, &closed, |Luma([value]), Luma([keep])| {
        if keep == 0 || value < threshold {
            Luma([0])
        } else {
            Luma([value])
        }
    });

    grayscale_erode(&cut, config.erode_iterations)
}

/// Maps values strictly above `threshold` to 255 and everything else to 0.
pub fn binarize(alpha: &Image<Luma<u8>>, threshold: u8) -> Image<Luma<u8>> {
    map_colors(alpha, |Luma([value])| {
        Luma([if value > threshold { u8::MAX } else { 0 }])
    })
}
