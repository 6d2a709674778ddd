//! Face region preprocessing into the classifier input tensor.

use crate::constants::{MODEL_INPUT_SIZE, NEUTRAL_TENSOR_VALUE, PIXEL_MAX};
use crate::utils::image_conversion::gray_to_array4_f32;
use crate::{Error, Result};
use image::imageops::{self, FilterType};
use image::GrayImage;
use log::warn;
use ndarray::Array4;

/// `(1, size, size, 1)` tensor of intensities in [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor {
    data: Array4<f32>,
}

impl NormalizedTensor {
    /// Every element set to the neutral gray value
    #[must_use]
    pub fn neutral(size: u32) -> Self {
        let side = size as usize;
        Self {
            data: Array4::from_elem((1, side, side, 1), NEUTRAL_TENSOR_VALUE),
        }
    }

    #[must_use]
    pub fn data(&self) -> &Array4<f32> {
        &self.data
    }

    #[must_use]
    pub fn into_inner(self) -> Array4<f32> {
        self.data
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Mean element value, 0 for an empty tensor
    #[must_use]
    pub fn mean(&self) -> f32 {
        self.data.mean().unwrap_or(0.0)
    }
}

/// Resizes and scales face regions to the classifier input format
#[derive(Debug, Clone)]
pub struct Preprocessor {
    input_size: u32,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(MODEL_INPUT_SIZE)
    }
}

impl Preprocessor {
    #[must_use]
    pub fn new(input_size: u32) -> Self {
        Self { input_size }
    }

    #[must_use]
    pub fn input_size(&self) -> u32 {
        self.input_size
    }

    /// Convert a face region into a tensor, never failing
    ///
    /// Any internal error yields [`NormalizedTensor::neutral`].
    #[must_use]
    pub fn preprocess(&self, face_region: &GrayImage) -> NormalizedTensor {
        match self.try_preprocess(face_region) {
            Ok(tensor) => tensor,
            Err(e) => {
                warn!("Preprocessing failed, using neutral tensor: {e}");
                NormalizedTensor::neutral(self.input_size)
            }
        }
    }

    /// Convert a face region into a tensor
    ///
    /// # Errors
    ///
    /// Returns an error if the region or the configured input size is empty
    pub fn try_preprocess(&self, face_region: &GrayImage) -> Result<NormalizedTensor> {
        if self.input_size == 0 {
            return Err(Error::PreprocessError("Input size must be greater than 0".to_string()));
        }
        let (width, height) = face_region.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::PreprocessError(format!(
                "Cannot preprocess a {width}x{height} face region"
            )));
        }

        let resized = if (width, height) == (self.input_size, self.input_size) {
            face_region.clone()
        } else {
            imageops::resize(face_region, self.input_size, self.input_size, FilterType::Triangle)
        };

        let data = gray_to_array4_f32(&resized, PIXEL_MAX)?;
        Ok(NormalizedTensor { data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use proptest::prelude::*;

    #[test]
    fn test_output_shape_and_range() {
        let region = GrayImage::from_fn(100, 80, |x, y| Luma([((x * 3 + y * 5) % 256) as u8]));
        let tensor = Preprocessor::default().preprocess(&region);

        assert_eq!(tensor.shape(), &[1, 48, 48, 1]);
        assert!(tensor.data().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_uniform_region_keeps_intensity() {
        let region = GrayImage::from_pixel(20, 20, Luma([255]));
        let tensor = Preprocessor::default().preprocess(&region);

        assert!(tensor.data().iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_empty_region_falls_back_to_neutral() {
        let tensor = Preprocessor::default().preprocess(&GrayImage::new(0, 0));

        assert_eq!(tensor, NormalizedTensor::neutral(48));
        assert!((tensor.mean() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_zero_input_size_falls_back() {
        let preprocessor = Preprocessor::new(0);
        assert!(preprocessor.try_preprocess(&GrayImage::new(4, 4)).is_err());
        assert_eq!(preprocessor.preprocess(&GrayImage::new(4, 4)).shape(), &[1, 0, 0, 1]);
    }

    proptest! {
        #[test]
        fn prop_preprocessing_is_deterministic(width in 1u32..120, height in 1u32..120, seed in any::<u8>()) {
            let region = GrayImage::from_fn(width, height, |x, y| {
                Luma([(x.wrapping_mul(31) ^ y.wrapping_mul(17) ^ u32::from(seed)) as u8])
            });
            let preprocessor = Preprocessor::default();

            prop_assert_eq!(preprocessor.preprocess(&region), preprocessor.preprocess(&region));
        }
    }
}
