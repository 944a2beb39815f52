use image::{DynamicImage, Luma, Rgb, Rgba};
use imageproc::{
    definitions::Image,
    map::{map_colors, map_colors2},
};

use crate::{error::CutoutError, utils::validate_matching_dimensions};

/// An 8-bit pixel grid with or without an alpha channel
///
/// Every cutout stage accepts both layouts. A buffer without alpha passes
/// through each stage unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelBuffer {
    /// Three color channels
    Rgb(Image<Rgb<u8>>),
    /// Three color channels and alpha
    Rgba(Image<Rgba<u8>>),
}

impl PixelBuffer {
    /// Wraps a row-major, interleaved sample vector.
    ///
    /// # Arguments
    ///
    /// * `width`, `height` - Grid size in pixels
    /// * `channels` - Samples per pixel, 3 (RGB) or 4 (RGBA)
    /// * `samples` - Exactly `width * height * channels` bytes
    ///
    /// # Errors
    ///
    /// * `CutoutError::InvalidSampleFormat` - When `channels` is not 3 or 4
    /// * `CutoutError::BufferSizeMismatch` - When `samples` has the wrong length
    ///
    /// # Examples
    ///
    /// ```
    /// use imageops_cutout::PixelBuffer;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let buffer = PixelBuffer::from_raw(2, 1, 4, vec![255, 0, 0, 255, 0, 255, 0, 0])?;
    /// assert!(buffer.has_alpha());
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: usize,
        samples: Vec<u8>,
    ) -> Result<Self, CutoutError> {
        if channels != 3 && channels != 4 {
            return Err(CutoutError::InvalidSampleFormat(format!(
                "{channels} channels per pixel, expected 3 or 4"
            )));
        }

        let expected = (width as usize) * (height as usize) * channels;
        let actual = samples.len();
        if expected != actual {
            return Err(CutoutError::BufferSizeMismatch { expected, actual });
        }

        let mismatch = CutoutError::BufferSizeMismatch { expected, actual };
        if channels == 4 {
            Image::from_raw(width, height, samples)
                .map(Self::Rgba)
                .ok_or(mismatch)
        } else {
            Image::from_raw(width, height, samples)
                .map(Self::Rgb)
                .ok_or(mismatch)
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Rgb(image) => image.dimensions(),
            Self::Rgba(image) => image.dimensions(),
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self, Self::Rgba(_))
    }

    pub fn channel_count(&self) -> usize {
        match self {
            Self::Rgb(_) => 3,
            Self::Rgba(_) => 4,
        }
    }

    /// Returns the interleaved samples.
    pub fn into_raw(self) -> Vec<u8> {
        match self {
            Self::Rgb(image) => image.into_raw(),
            Self::Rgba(image) => image.into_raw(),
        }
    }
}

impl From<Image<Rgb<u8>>> for PixelBuffer {
    fn from(image: Image<Rgb<u8>>) -> Self {
        Self::Rgb(image)
    }
}

impl From<Image<Rgba<u8>>> for PixelBuffer {
    fn from(image: Image<Rgba<u8>>) -> Self {
        Self::Rgba(image)
    }
}

impl TryFrom<DynamicImage> for PixelBuffer {
    type Error = CutoutError;

    /// Accepts 8-bit RGB and RGBA images only; nothing is converted.
    fn try_from(image: DynamicImage) -> Result<Self, Self::Error> {
        match image {
            DynamicImage::ImageRgb8(image) => Ok(Self::Rgb(image)),
            DynamicImage::ImageRgba8(image) => Ok(Self::Rgba(image)),
            other => Err(CutoutError::InvalidSampleFormat(format!(
                "{:?}, expected Rgb8 or Rgba8",
                other.color()
            ))),
        }
    }
}

impl From<PixelBuffer> for DynamicImage {
    fn from(buffer: PixelBuffer) -> Self {
        match buffer {
            PixelBuffer::Rgb(image) => Self::ImageRgb8(image),
            PixelBuffer::Rgba(image) => Self::ImageRgba8(image),
        }
    }
}

/// Copies the alpha channel into a single-channel mask.
pub fn extract_alpha(image: &Image<Rgba<u8>>) -> Image<Luma<u8>> {
    map_colors(image, |Rgba([_, _, _, alpha])| Luma([alpha]))
}

/// Separates an RGBA image into its color channels and its alpha mask.
pub fn split_alpha(image: &Image<Rgba<u8>>) -> (Image<Rgb<u8>>, Image<Luma<u8>>) {
    let color = map_colors(image, |Rgba([red, green, blue, _])| Rgb([red, green, blue]));
    (color, extract_alpha(image))
}

/// Joins color channels and an alpha mask into an RGBA image.
///
/// # Errors
///
/// * `CutoutError::DimensionMismatch` - When image and mask dimensions don't match
pub fn merge_alpha(
    color: &Image<Rgb<u8>>,
    alpha: &Image<Luma<u8>>,
) -> Result<Image<Rgba<u8>>, CutoutError> {
    validate_matching_dimensions(color.dimensions(), alpha.dimensions())?;

    Ok(map_colors2(
        color,
        alpha,
        |Rgb([red, green, blue]), Luma([alpha])| Rgba([red, green, blue, alpha]),
    ))
}

/// Trait for replacing the alpha channel of RGBA images
///
/// The color channels are preserved; only alpha changes.
pub trait ReplaceAlphaExt {
    /// Replaces the alpha channel with the provided mask
    ///
    /// This consumes the original image.
    ///
    /// # Errors
    ///
    /// * `CutoutError::DimensionMismatch` - When image and mask dimensions don't match
    ///
    /// # Examples
    ///
    /// ```
    /// use imageops_cutout::{Image, ReplaceAlphaExt};
    /// use image::{Luma, Rgba};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let rgba_image: Image<Rgba<u8>> = Image::new(10, 10);
    /// let new_mask: Image<Luma<u8>> = Image::new(10, 10);
    ///
    /// let updated = rgba_image.replace_alpha(&new_mask)?;
    /// # Ok(())
    /// # }
    /// ```
    fn replace_alpha(self, mask: &Image<Luma<u8>>) -> Result<Self, CutoutError>
    where
        Self: Sized;

    /// Replaces the alpha channel with the provided mask in-place
    ///
    /// # Errors
    ///
    /// * `CutoutError::DimensionMismatch` - When image and mask dimensions don't match
    fn replace_alpha_mut(&mut self, mask: &Image<Luma<u8>>) -> Result<&mut Self, CutoutError>;
}

impl ReplaceAlphaExt for Image<Rgba<u8>> {
    fn replace_alpha(mut self, mask: &Image<Luma<u8>>) -> Result<Self, CutoutError> {
        self.replace_alpha_mut(mask)?;
        Ok(self)
    }

    fn replace_alpha_mut(&mut self, mask: &Image<Luma<u8>>) -> Result<&mut Self, CutoutError> {
        validate_matching_dimensions(self.dimensions(), mask.dimensions())?;

        self.pixels_mut()
            .zip(mask.pixels())
            .for_each(|(pixel, Luma([alpha]))| pixel[3] = *alpha);

        Ok(self)
    }
}
