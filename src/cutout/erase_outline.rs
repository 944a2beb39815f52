//! Removal of the thin halo that survives along an object's silhouette.
//!
//! The silhouette is taken from the color channels rather than the alpha:
//! any pixel whose luminance is above the threshold counts as object. Only
//! the outermost contours of that mask are traced; holes are ignored. The
//! traced polylines are stroked with a square brush and alpha is zeroed
//! under the stroke.
//!
//! The square brush gives mitred joins: at a convex corner the band reaches
//! one diagonal pixel further than a round brush of the same width would.

use image::{Luma, Rgb, Rgba};
use imageproc::{
    contours::{find_contours, BorderType},
    definitions::Image,
    drawing::draw_line_segment_mut,
    map::map_colors,
    point::Point,
};
use tracing::debug;

use crate::{
    config::OutlineConfig,
    cutout::channels::PixelBuffer,
    error::CutoutError,
    utils::{luminance, morphology::binary_dilate},
};

/// Trait for erasing the outline band around an object's silhouette
///
/// Images without an alpha channel are returned unchanged.
pub trait EraseOutlineExt {
    /// Zeroes the alpha channel along the outer silhouette contour
    ///
    /// This consumes the original image. Alpha is only ever lowered, never
    /// raised, and the color channels are untouched.
    ///
    /// # Errors
    ///
    /// * `CutoutError::InvalidParameter` - When `config` fails validation
    fn erase_outline(self, config: &OutlineConfig) -> Result<Self, CutoutError>
    where
        Self: Sized;
}

impl EraseOutlineExt for Image<Rgba<u8>> {
    fn erase_outline(mut self, config: &OutlineConfig) -> Result<Self, CutoutError> {
        config.validate()?;
        if self.width() == 0 || self.height() == 0 {
            return Ok(self);
        }

        let silhouette = silhouette_mask(&self, config.luminance_threshold);
        let contours = external_contours(&silhouette);
        if contours.is_empty() {
            debug!("no silhouette contour found, alpha unchanged");
            return Ok(self);
        }

        let band = outline_band(self.dimensions(), &contours, config);
        self.pixels_mut()
            .zip(band.pixels())
            .filter(|(_, Luma([ink]))| *ink > 0)
            .for_each(|(pixel, _)| pixel[3] = 0);

        debug!(contours = contours.len(), "erased silhouette outline");
        Ok(self)
    }
}

impl EraseOutlineExt for Image<Rgb<u8>> {
    fn erase_outline(self, config: &OutlineConfig) -> Result<Self, CutoutError> {
        config.validate()?;
        debug!("no alpha channel, skipping outline erasure");
        Ok(self)
    }
}

impl EraseOutlineExt for PixelBuffer {
    fn erase_outline(self, config: &OutlineConfig) -> Result<Self, CutoutError> {
        match self {
            Self::Rgb(image) => image.erase_outline(config).map(Self::Rgb),
            Self::Rgba(image) => image.erase_outline(config).map(Self::Rgba),
        }
    }
}

/// Marks pixels whose color luminance is strictly above `threshold`.
///
/// Alpha is ignored; the result holds only 0 and 255.
pub fn silhouette_mask(image: &Image<Rgba<u8>>, threshold: u8) -> Image<Luma<u8>> {
    map_colors(image, |Rgba([red, green, blue, _])| {
        Luma([if luminance(red, green, blue) > threshold {
            u8::MAX
        } else {
            0
        }])
    })
}

/// Traces the outermost borders of a binary mask.
///
/// Borders of holes, and anything nested inside a hole, are skipped.
pub fn external_contours(mask: &Image<Luma<u8>>) -> Vec<Vec<Point<i32>>> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
        .map(|contour| contour.points)
        .collect()
}

/// Strokes closed polylines onto a blank canvas of the given size.
///
/// Each polyline is first drawn one pixel wide and then widened with a
/// square brush whose side is `config.stroke_thickness`.
pub fn outline_band(
    (width, height): (u32, u32),
    contours: &[Vec<Point<i32>>],
    config: &OutlineConfig,
) -> Image<Luma<u8>> {
    let mut canvas: Image<Luma<u8>> = Image::new(width, height);
    let ink = Luma([u8::MAX]);

    for points in contours {
        for point in points {
            if let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) {
                if x < width && y < height {
                    canvas.put_pixel(x, y, ink);
                }
            }
        }
        let closing = points.last().zip(points.first());
        let segments = points
            .windows(2)
            .map(|pair| (&pair[0], &pair[1]))
            .chain(closing);
        for (start, end) in segments {
            draw_line_segment_mut(
                &mut canvas,
                (start.x as f32, start.y as f32),
                (end.x as f32, end.y as f32),
                ink,
            );
        }
    }

    binary_dilate(&canvas, config.stroke_radius())
}
