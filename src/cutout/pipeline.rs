use image::{DynamicImage, GenericImageView, Rgba};
use imageproc::definitions::Image;
use tracing::{debug, debug_span};

use crate::{
    config::CutoutConfig,
    cutout::{
        channels::PixelBuffer, erase_outline::EraseOutlineExt,
        flatten_background::FlattenBackgroundExt, refine_alpha::RefineAlphaExt,
        segmenter::Segmenter,
    },
    error::CutoutError,
    utils::validate_matching_dimensions,
};

/// Quality hint for writers that encode the flattened image as JPEG.
pub const JPEG_QUALITY: u8 = 95;

/// Refine → erase outline → (optionally) flatten, with one configuration
///
/// The pipeline holds no state besides its configuration, so a single
/// instance can be shared between threads.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CutoutPipeline {
    config: CutoutConfig,
}

impl CutoutPipeline {
    /// # Errors
    ///
    /// * `CutoutError::InvalidParameter` - When `config` fails validation
    pub fn new(config: CutoutConfig) -> Result<Self, CutoutError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CutoutConfig {
        &self.config
    }

    /// Refines the alpha channel and erases the silhouette outline.
    ///
    /// Images without alpha come back unchanged.
    ///
    /// # Errors
    ///
    /// * `CutoutError::InvalidParameter` - When the configuration is invalid
    ///
    /// # Examples
    ///
    /// ```
    /// use imageops_cutout::{CutoutPipeline, Image};
    /// use image::Rgba;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let pipeline = CutoutPipeline::default();
    /// let matte: Image<Rgba<u8>> = Image::from_pixel(32, 32, Rgba([0, 0, 0, 0]));
    ///
    /// let cutout = pipeline.process(matte)?;
    /// let opaque = pipeline.flatten(cutout)?;
    /// assert_eq!(opaque.dimensions(), (32, 32));
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    pub fn process<I>(&self, image: I) -> Result<I, CutoutError>
    where
        I: RefineAlphaExt + EraseOutlineExt,
    {
        let refined = image.refine_alpha(&self.config.refine)?;
        refined.erase_outline(&self.config.outline)
    }

    /// Composites onto the configured opaque background.
    ///
    /// # Errors
    ///
    /// * `CutoutError::InvalidParameter` - When the configuration is invalid
    pub fn flatten<I>(&self, image: I) -> Result<I::Output, CutoutError>
    where
        I: FlattenBackgroundExt,
    {
        image.flatten_background(&self.config.composite)
    }

    /// Segments `image` with the given collaborator and cleans the matte.
    ///
    /// # Errors
    ///
    /// * `CutoutError::Segmentation` - When the segmenter fails
    /// * `CutoutError::DimensionMismatch` - When the segmenter changes the
    ///   image size
    pub fn remove_background<S>(
        &self,
        segmenter: &S,
        image: &DynamicImage,
    ) -> Result<Image<Rgba<u8>>, CutoutError>
    where
        S: Segmenter + ?Sized,
    {
        let (width, height) = image.dimensions();
        let span = debug_span!("remove_background", width, height);
        let _enter = span.enter();

        let matte = segmenter
            .segment(image)
            .map_err(|e| CutoutError::Segmentation(e.to_string()))?;
        validate_matching_dimensions(image.dimensions(), matte.dimensions())?;
        debug!("segmentation finished");

        self.process(matte)
    }

    /// Runs [`process`](Self::process) on a dynamically typed image.
    ///
    /// # Errors
    ///
    /// * `CutoutError::InvalidSampleFormat` - When the image is not 8-bit
    ///   RGB or RGBA
    /// * `CutoutError::InvalidParameter` - When the configuration is invalid
    pub fn process_dynamic(&self, image: DynamicImage) -> Result<DynamicImage, CutoutError> {
        let buffer = PixelBuffer::try_from(image)?;
        self.process(buffer).map(DynamicImage::from)
    }

    /// Runs [`flatten`](Self::flatten) on a dynamically typed image.
    ///
    /// # Errors
    ///
    /// * `CutoutError::InvalidSampleFormat` - When the image is not 8-bit
    ///   RGB or RGBA
    /// * `CutoutError::InvalidParameter` - When the configuration is invalid
    pub fn flatten_dynamic(&self, image: DynamicImage) -> Result<DynamicImage, CutoutError> {
        let buffer = PixelBuffer::try_from(image)?;
        self.flatten(buffer).map(DynamicImage::ImageRgb8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutlineConfig, RefineConfig};
    use crate::cutout::segmenter::Passthrough;
    use crate::test_utils::{create_blob_rgba_image, create_test_rgb_image};

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = CutoutConfig {
            outline: OutlineConfig::default().with_stroke_thickness(0),
            ..CutoutConfig::default()
        };
        assert!(CutoutPipeline::new(config).is_err());
        assert!(CutoutPipeline::new(CutoutConfig::refined()).is_ok());
    }

    #[test]
    fn test_remove_background_with_passthrough() {
        let pipeline = CutoutPipeline::default();
        let image = DynamicImage::ImageRgba8(create_blob_rgba_image(32, 32, 8, 24));

        let cutout = pipeline.remove_background(&Passthrough, &image).unwrap();
        assert_eq!(cutout.dimensions(), (32, 32));
        assert_eq!(cutout.get_pixel(16, 16)[3], 255);
        assert_eq!(cutout.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_remove_background_rejects_resized_matte() {
        let pipeline = CutoutPipeline::default();
        let shrink = |image: &DynamicImage| -> Result<Image<Rgba<u8>>, String> {
            Ok(Image::new(image.width() / 2, image.height()))
        };
        let image = DynamicImage::new_rgb8(8, 4);

        assert_eq!(
            pipeline.remove_background(&shrink, &image),
            Err(CutoutError::DimensionMismatch {
                expected: (8, 4),
                actual: (4, 4),
            })
        );
    }

    #[test]
    fn test_remove_background_reports_segmenter_error() {
        let pipeline = CutoutPipeline::default();
        let broken = |_: &DynamicImage| -> Result<Image<Rgba<u8>>, String> {
            Err("session closed".to_string())
        };
        let image = DynamicImage::new_rgb8(2, 2);

        assert_eq!(
            pipeline.remove_background(&broken, &image),
            Err(CutoutError::Segmentation("session closed".to_string()))
        );
    }

    #[test]
    fn test_process_dynamic_dispatches_on_format() {
        let pipeline = CutoutPipeline::default();

        let rgb = DynamicImage::ImageRgb8(create_test_rgb_image());
        assert_eq!(pipeline.process_dynamic(rgb.clone()).unwrap(), rgb);

        let luma = DynamicImage::new_luma8(2, 2);
        assert!(matches!(
            pipeline.process_dynamic(luma),
            Err(CutoutError::InvalidSampleFormat(_))
        ));

        let rgba = DynamicImage::ImageRgba8(create_blob_rgba_image(8, 8, 2, 6));
        let processed = pipeline.process_dynamic(rgba).unwrap();
        assert!(processed.color().has_alpha());
    }

    #[test]
    fn test_flatten_dynamic_drops_alpha() {
        let pipeline = CutoutPipeline::new(CutoutConfig {
            refine: RefineConfig::refined(),
            ..CutoutConfig::default()
        })
        .unwrap();
        let rgba = DynamicImage::ImageRgba8(create_blob_rgba_image(8, 8, 2, 6));

        let flat = pipeline.flatten_dynamic(rgba).unwrap();
        assert!(!flat.color().has_alpha());
        assert_eq!(flat.to_rgb8().get_pixel(0, 0), &image::Rgb([255, 255, 255]));
    }
}
