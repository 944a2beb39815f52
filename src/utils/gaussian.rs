//! Separable Gaussian smoothing for single-channel 8-bit masks.
//!
//! Small kernels with an automatic sigma use the exact binomial weights, so
//! a constant mask stays bit-identical after blurring. Borders are reflected
//! without repeating the edge sample (`gfedcb|abcdefgh|gfedcba`).

use image::Luma;
use imageproc::definitions::Image;
use itertools::iproduct;

use crate::error::CutoutError;
use crate::utils::{saturate_u8, validate_odd_size};

const BINOMIAL_KERNELS: [&[f32]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[
        0.031_25, 0.109_375, 0.218_75, 0.281_25, 0.218_75, 0.109_375, 0.031_25,
    ],
];

/// One-dimensional, normalized Gaussian weights of odd length.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKernel {
    weights: Vec<f32>,
}

impl GaussianKernel {
    /// Builds a kernel of `size` taps.
    ///
    /// A `sigma` that is zero or negative is derived from the size as
    /// `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
    ///
    /// # Errors
    ///
    /// * `CutoutError::InvalidParameter` - When `size` is even or zero, or
    ///   `sigma` is not finite
    pub fn new(size: u32, sigma: f32) -> Result<Self, CutoutError> {
        validate_odd_size(size, "Gaussian kernel size")?;
        if !sigma.is_finite() {
            return Err(CutoutError::InvalidParameter(format!(
                "Gaussian sigma must be finite, got {sigma}"
            )));
        }

        let index = (size / 2) as usize;
        if sigma <= 0.0 && index < BINOMIAL_KERNELS.len() {
            return Ok(Self {
                weights: BINOMIAL_KERNELS[index].to_vec(),
            });
        }

        let sigma = if sigma > 0.0 {
            sigma
        } else {
            0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
        };
        let scale = -0.5 / (sigma * sigma);
        let center = (size as f32 - 1.0) * 0.5;
        let raw: Vec<f32> = (0..size)
            .map(|i| {
                let offset = i as f32 - center;
                (scale * offset * offset).exp()
            })
            .collect();
        let total: f32 = raw.iter().sum();

        Ok(Self {
            weights: raw.into_iter().map(|w| w / total).collect(),
        })
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn radius(&self) -> usize {
        self.weights.len() / 2
    }
}

/// Maps an out-of-range coordinate back into `0..len` by mirroring around
/// the edge samples.
#[inline]
fn reflect_101(index: i64, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let last = len as i64 - 1;
    let mut i = index;
    loop {
        if i < 0 {
            i = -i;
        } else if i > last {
            i = 2 * last - i;
        } else {
            return i as usize;
        }
    }
}

/// Blurs a mask with the same kernel horizontally and then vertically.
///
/// The intermediate row pass is kept in `f32`; the result is rounded to the
/// nearest integer and clamped to `[0, 255]`.
pub fn gaussian_blur(image: &Image<Luma<u8>>, kernel: &GaussianKernel) -> Image<Luma<u8>> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let (w, h) = (width as usize, height as usize);
    let radius = kernel.radius() as i64;
    let source = image.as_raw();

    let mut horizontal = vec![0.0f32; w * h];
    for (y, x) in iproduct!(0..h, 0..w) {
        let row = &source[y * w..(y + 1) * w];
        horizontal[y * w + x] = kernel
            .weights()
            .iter()
            .enumerate()
            .map(|(k, weight)| {
                let sx = reflect_101(x as i64 + k as i64 - radius, w);
                weight * f32::from(row[sx])
            })
            .sum();
    }

    Image::from_fn(width, height, |x, y| {
        let (x, y) = (x as usize, y as usize);
        let value: f32 = kernel
            .weights()
            .iter()
            .enumerate()
            .map(|(k, weight)| {
                let sy = reflect_101(y as i64 + k as i64 - radius, h);
                weight * horizontal[sy * w + x]
            })
            .sum();
        Luma([saturate_u8(value)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binomial_kernel_for_small_sizes() {
        let kernel = GaussianKernel::new(7, 0.0).unwrap();
        assert_eq!(
            kernel.weights(),
            &[0.031_25, 0.109_375, 0.218_75, 0.281_25, 0.218_75, 0.109_375, 0.031_25]
        );
        assert_eq!(kernel.radius(), 3);
        assert_eq!(GaussianKernel::new(1, 0.0).unwrap().weights(), &[1.0]);
    }

    #[test]
    fn test_sampled_kernel_is_normalized_and_symmetric() {
        let kernel = GaussianKernel::new(11, 0.0).unwrap();
        let weights = kernel.weights();
        assert_eq!(weights.len(), 11);
        let total: f32 = weights.iter().sum();
        assert!((total - 1.0).abs() < 1e-5);
        for i in 0..5 {
            assert!((weights[i] - weights[10 - i]).abs() < 1e-7);
            assert!(weights[i] < weights[i + 1]);
        }
    }

    #[test]
    fn test_explicit_sigma_overrides_table() {
        let auto = GaussianKernel::new(5, 0.0).unwrap();
        let wide = GaussianKernel::new(5, 10.0).unwrap();
        assert_ne!(auto, wide);
        // A very wide sigma tends towards a flat kernel.
        assert!(wide.weights().iter().all(|w| (w - 0.2).abs() < 0.01));
    }

    #[test]
    fn test_invalid_kernel_sizes() {
        assert!(GaussianKernel::new(0, 0.0).is_err());
        assert!(GaussianKernel::new(6, 0.0).is_err());
        assert!(GaussianKernel::new(5, f32::NAN).is_err());
    }

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(2, 5), 2);
        assert_eq!(reflect_101(-7, 2), 1);
        assert_eq!(reflect_101(-3, 1), 0);
    }

    #[test]
    fn test_blur_keeps_constant_mask() {
        for size in [7, 11] {
            let kernel = GaussianKernel::new(size, 0.0).unwrap();
            let mask: Image<Luma<u8>> = Image::from_pixel(4, 4, Luma([255]));
            let blurred = gaussian_blur(&mask, &kernel);
            assert!(blurred.pixels().all(|p| p[0] == 255), "kernel {size}");
        }
    }

    #[test]
    fn test_blur_softens_step_edge() {
        let kernel = GaussianKernel::new(7, 0.0).unwrap();
        let mask = Image::from_fn(16, 1, |x, _| Luma([if x < 8 { 0u8 } else { 255 }]));
        let blurred = gaussian_blur(&mask, &kernel);

        assert_eq!(blurred.get_pixel(0, 0)[0], 0);
        assert_eq!(blurred.get_pixel(15, 0)[0], 255);
        let row: Vec<u8> = blurred.pixels().map(|p| p[0]).collect();
        assert!(row.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(row[7] > 0 && row[8] < 255);
    }
}
