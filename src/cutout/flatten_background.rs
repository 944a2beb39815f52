use image::{Rgb, Rgba};
use imageproc::{definitions::Image, map::map_colors};
use tracing::debug;

use crate::{
    config::CompositeConfig, cutout::channels::PixelBuffer, error::CutoutError,
    utils::saturate_u8,
};

/// Trait for flattening an image onto an opaque background color.
///
/// Used for export formats without an alpha channel. A pixel whose alpha is
/// strictly above the coverage threshold keeps its color, softened by a
/// fixed linear mix with the background:
/// - Red' = w × Red + (1 − w) × Background.red
/// - Green' = w × Green + (1 − w) × Background.green
/// - Blue' = w × Blue + (1 − w) × Background.blue
///
/// Every other pixel becomes the background color. The output has no alpha
/// channel.
pub trait FlattenBackgroundExt {
    type Output;

    /// Composites the image onto the configured background.
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
    /// use imageops_cutout::{CompositeConfig, FlattenBackgroundExt, Image};
    /// use image::{Rgb, Rgba};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut image: Image<Rgba<u8>> = Image::new(2, 1);
    /// image.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
    /// image.put_pixel(1, 0, Rgba([0, 0, 0, 10]));
    ///
    /// let flat = image.flatten_background(&CompositeConfig::default())?;
    /// assert_eq!(flat.get_pixel(0, 0), &Rgb([13, 13, 13]));
    /// assert_eq!(flat.get_pixel(1, 0), &Rgb([255, 255, 255]));
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    fn flatten_background(self, config: &CompositeConfig) -> Result<Self::Output, CutoutError>;
}

impl FlattenBackgroundExt for Image<Rgba<u8>> {
    type Output = Image<Rgb<u8>>;

    fn flatten_background(self, config: &CompositeConfig) -> Result<Self::Output, CutoutError> {
        config.validate()?;

        let threshold = config.coverage_threshold;
        let background = Rgb(config.background);
        let blend = blend_with(config);

        let result = map_colors(&self, |Rgba([red, green, blue, alpha])| {
            if alpha > threshold {
                blend(Rgb([red, green, blue]))
            } else {
                background
            }
        });

        debug!(
            width = result.width(),
            height = result.height(),
            "flattened onto opaque background"
        );
        Ok(result)
    }
}

impl FlattenBackgroundExt for Image<Rgb<u8>> {
    type Output = Self;

    fn flatten_background(self, config: &CompositeConfig) -> Result<Self::Output, CutoutError> {
        config.validate()?;
        debug!("no alpha channel, already opaque");
        Ok(self)
    }
}

impl FlattenBackgroundExt for PixelBuffer {
    type Output = Image<Rgb<u8>>;

    fn flatten_background(self, config: &CompositeConfig) -> Result<Self::Output, CutoutError> {
        match self {
            Self::Rgb(image) => image.flatten_background(config),
            Self::Rgba(image) => image.flatten_background(config),
        }
    }
}

/// Per-pixel linear mix of a color with the configured background.
fn blend_with(config: &CompositeConfig) -> impl Fn(Rgb<u8>) -> Rgb<u8> {
    let weight = config.blend_weight;
    let [bg_red, bg_green, bg_blue] = config.background.map(|c| (1.0 - weight) * f32::from(c));
    move |Rgb([red, green, blue])| {
        Rgb([
            saturate_u8(weight * f32::from(red) + bg_red),
            saturate_u8(weight * f32::from(green) + bg_green),
            saturate_u8(weight * f32::from(blue) + bg_blue),
        ])
    }
}
