//! Tunable parameters for the cutout stages.
//!
//! Every threshold is a default, not a fixed constant. The defaults
//! reproduce the behavior the pipeline was tuned with; callers that need a
//! different trade-off pass their own values explicitly.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::CutoutError;
use crate::utils::validate_odd_size;

/// Size of the Gaussian kernel used to soften the refined alpha edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BlurKernel {
    /// 7×7 kernel
    #[default]
    Standard,
    /// 11×11 kernel, a softer falloff
    Wide,
    /// Any odd kernel size
    Custom(u32),
}

impl BlurKernel {
    pub const fn size(self) -> u32 {
        match self {
            Self::Standard => 7,
            Self::Wide => 11,
            Self::Custom(size) => size,
        }
    }
}

/// Parameters of the alpha refinement stage
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RefineConfig {
    /// Alpha values strictly above this become foreground in the binary
    /// mask; alpha values strictly below it are cut to zero
    pub threshold: u8,
    /// Iterations of the 3×3 opening that removes foreground specks
    pub open_iterations: u8,
    /// Iterations of the 3×3 closing that fills holes in the object
    pub close_iterations: u8,
    /// Iterations of the 3×3 erosion applied to the alpha channel itself
    pub erode_iterations: u8,
    /// Gaussian kernel used to soften the final edge
    pub blur_kernel: BlurKernel,
    /// Gaussian standard deviation; zero or negative derives it from the
    /// kernel size
    pub blur_sigma: f32,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            threshold: 220,
            open_iterations: 2,
            close_iterations: 3,
            erode_iterations: 2,
            blur_kernel: BlurKernel::Standard,
            blur_sigma: 0.0,
        }
    }
}

impl RefineConfig {
    /// Defaults with the wider 11×11 blur kernel.
    pub fn refined() -> Self {
        Self {
            blur_kernel: BlurKernel::Wide,
            ..Self::default()
        }
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_iterations(mut self, open: u8, close: u8, erode: u8) -> Self {
        self.open_iterations = open;
        self.close_iterations = close;
        self.erode_iterations = erode;
        self
    }

    pub fn with_blur(mut self, kernel: BlurKernel, sigma: f32) -> Self {
        self.blur_kernel = kernel;
        self.blur_sigma = sigma;
        self
    }

    /// # Errors
    ///
    /// * `CutoutError::InvalidParameter` - When the blur kernel size is even
    ///   or zero, or the sigma is not finite
    pub fn validate(&self) -> Result<(), CutoutError> {
        validate_odd_size(self.blur_kernel.size(), "Blur kernel size")?;
        if !self.blur_sigma.is_finite() {
            return Err(CutoutError::InvalidParameter(format!(
                "Blur sigma must be finite, got {}",
                self.blur_sigma
            )));
        }
        Ok(())
    }
}

/// Parameters of the outline erasure stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OutlineConfig {
    /// Luminance strictly above this marks a pixel as part of the silhouette
    pub luminance_threshold: u8,
    /// Width in pixels of the band drawn along the silhouette
    pub stroke_thickness: u32,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            luminance_threshold: 1,
            stroke_thickness: 3,
        }
    }
}

impl OutlineConfig {
    pub fn with_luminance_threshold(mut self, threshold: u8) -> Self {
        self.luminance_threshold = threshold;
        self
    }

    pub fn with_stroke_thickness(mut self, thickness: u32) -> Self {
        self.stroke_thickness = thickness;
        self
    }

    /// # Errors
    ///
    /// * `CutoutError::InvalidParameter` - When the stroke thickness is even,
    ///   zero, or wider than 511 pixels
    pub fn validate(&self) -> Result<(), CutoutError> {
        validate_odd_size(self.stroke_thickness, "Stroke thickness")?;
        if self.stroke_thickness / 2 > u32::from(u8::MAX) {
            return Err(CutoutError::InvalidParameter(format!(
                "Stroke thickness must be at most 511, got {}",
                self.stroke_thickness
            )));
        }
        Ok(())
    }

    pub(crate) fn stroke_radius(&self) -> u8 {
        u8::try_from(self.stroke_thickness / 2).unwrap_or(u8::MAX)
    }
}

/// Parameters of the background flattening stage
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompositeConfig {
    /// Pixels with alpha strictly above this keep their (blended) color
    pub coverage_threshold: u8,
    /// Share of the original color in the blend; the rest is background
    pub blend_weight: f32,
    /// Opaque background color (RGB)
    pub background: [u8; 3],
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            coverage_threshold: 50,
            blend_weight: 0.95,
            background: [255, 255, 255],
        }
    }
}

impl CompositeConfig {
    pub fn with_coverage_threshold(mut self, threshold: u8) -> Self {
        self.coverage_threshold = threshold;
        self
    }

    pub fn with_blend_weight(mut self, weight: f32) -> Self {
        self.blend_weight = weight;
        self
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    /// # Errors
    ///
    /// * `CutoutError::InvalidParameter` - When the blend weight is outside
    ///   `[0, 1]` or not finite
    pub fn validate(&self) -> Result<(), CutoutError> {
        if !(0.0..=1.0).contains(&self.blend_weight) {
            return Err(CutoutError::InvalidParameter(format!(
                "Blend weight must be within [0, 1], got {}",
                self.blend_weight
            )));
        }
        Ok(())
    }
}

/// Configuration of the whole cutout pipeline
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CutoutConfig {
    pub refine: RefineConfig,
    pub outline: OutlineConfig,
    pub composite: CompositeConfig,
}

impl CutoutConfig {
    /// Defaults with the wider 11×11 blur kernel.
    pub fn refined() -> Self {
        Self {
            refine: RefineConfig::refined(),
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// * `CutoutError::InvalidParameter` - When any stage configuration is
    ///   invalid
    pub fn validate(&self) -> Result<(), CutoutError> {
        self.refine.validate()?;
        self.outline.validate()?;
        self.composite.validate()
    }
}
