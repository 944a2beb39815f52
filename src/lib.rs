//! Post-processing for background-removed images.
//!
//! A segmentation model leaves a noisy alpha matte: speckles in the
//! background, pinholes in the object and a faint halo along the
//! silhouette. This crate cleans such a matte in three stages:
//!
//! 1. [`RefineAlphaExt`] thresholds, morphologically cleans and softens the
//!    alpha channel,
//! 2. [`EraseOutlineExt`] zeroes a thin band along the outer silhouette,
//! 3. [`FlattenBackgroundExt`] composites the result onto an opaque
//!    background for formats without alpha.
//!
//! [`CutoutPipeline`] runs the stages with one [`CutoutConfig`].

mod config;
mod cutout;
mod error;
mod utils;

#[cfg(test)]
mod test_utils;

use image::{ImageBuffer, Pixel};

pub use config::{BlurKernel, CompositeConfig, CutoutConfig, OutlineConfig, RefineConfig};
pub use cutout::channels::{extract_alpha, merge_alpha, split_alpha, PixelBuffer, ReplaceAlphaExt};
pub use cutout::erase_outline::{external_contours, outline_band, silhouette_mask, EraseOutlineExt};
pub use cutout::flatten_background::FlattenBackgroundExt;
pub use cutout::pipeline::{CutoutPipeline, JPEG_QUALITY};
pub use cutout::refine_alpha::{binarize, clean_alpha_mask, refine_alpha_mask, RefineAlphaExt};
pub use cutout::segmenter::{Passthrough, Segmenter};
pub use error::CutoutError;
pub use utils::gaussian::GaussianKernel;
pub use utils::morphology::STRUCTURING_ELEMENT_RADIUS;

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
