//! Image conversion utilities between `image` buffers and `ndarray` tensors.

use crate::{Error, Result};
use image::{imageops, DynamicImage, GrayImage};
use imageproc::rect::Rect;
use ndarray::Array4;

use super::clamp_rect;

/// Convert a color or grayscale frame to an 8-bit grayscale image
///
/// # Errors
/// * Returns error if the frame has a zero dimension
pub fn frame_to_gray(frame: &DynamicImage) -> Result<GrayImage> {
    let (width, height) = (frame.width(), frame.height());
    if width == 0 || height == 0 {
        return Err(Error::InvalidInput(format!(
            "Invalid frame dimensions: {width}x{height}"
        )));
    }

    Ok(frame.to_luma8())
}

/// Crop a rectangle out of a grayscale image
///
/// The rectangle is clamped to the image bounds first.
///
/// # Errors
/// * Returns error if the rectangle does not overlap the image
pub fn crop_gray(gray: &GrayImage, rect: Rect) -> Result<GrayImage> {
    let clamped = clamp_rect(rect, gray.width(), gray.height()).ok_or_else(|| {
        Error::DetectionError(format!(
            "Face box {}x{} at ({}, {}) lies outside the {}x{} frame",
            rect.width(),
            rect.height(),
            rect.left(),
            rect.top(),
            gray.width(),
            gray.height()
        ))
    })?;

    let (x, y) = (
        super::safe_cast::i32_to_u32_saturating(clamped.left()),
        super::safe_cast::i32_to_u32_saturating(clamped.top()),
    );
    Ok(imageops::crop_imm(gray, x, y, clamped.width(), clamped.height()).to_image())
}

/// Convert a grayscale image into a `(1, height, width, 1)` tensor scaled by `1 / max_value`
///
/// # Errors
/// * Returns error if the image is empty or the shape cannot be built
pub fn gray_to_array4_f32(gray: &GrayImage, max_value: f32) -> Result<Array4<f32>> {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::InvalidInput(format!(
            "Invalid image dimensions: {width}x{height}"
        )));
    }
    if !(max_value.is_finite() && max_value > 0.0) {
        return Err(Error::InvalidInput(format!("Invalid scale divisor: {max_value}")));
    }

    let data: Vec<f32> = gray
        .as_raw()
        .iter()
        .map(|&pixel| f32::from(pixel) / max_value)
        .collect();

    Array4::from_shape_vec((1, height as usize, width as usize, 1), data)
        .map_err(|e| Error::InvalidInput(format!("Failed to create array from image: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    #[test]
    fn test_frame_to_gray_color() {
        let rgb = RgbImage::from_pixel(4, 3, Rgb([100, 100, 100]));
        let gray = frame_to_gray(&DynamicImage::ImageRgb8(rgb)).unwrap();

        assert_eq!(gray.dimensions(), (4, 3));
        assert_eq!(gray.get_pixel(0, 0)[0], 100);
    }

    #[test]
    fn test_frame_to_gray_empty() {
        let empty = DynamicImage::ImageLuma8(GrayImage::new(0, 10));
        assert!(matches!(frame_to_gray(&empty), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_crop_gray_clamps() {
        let gray = GrayImage::from_fn(10, 10, |x, y| Luma([(x + y * 10) as u8]));
        let crop = crop_gray(&gray, Rect::at(6, 6).of_size(10, 10)).unwrap();

        assert_eq!(crop.dimensions(), (4, 4));
        assert_eq!(crop.get_pixel(0, 0)[0], 66);
    }

    #[test]
    fn test_crop_gray_outside() {
        let gray = GrayImage::new(10, 10);
        assert!(crop_gray(&gray, Rect::at(20, 20).of_size(5, 5)).is_err());
    }

    #[test]
    fn test_gray_to_array4_f32() {
        let gray = GrayImage::from_fn(3, 2, |x, _| Luma([if x == 0 { 0 } else { 255 }]));
        let array = gray_to_array4_f32(&gray, 255.0).unwrap();

        assert_eq!(array.shape(), &[1, 2, 3, 1]);
        assert_eq!(array[[0, 1, 0, 0]], 0.0);
        assert_eq!(array[[0, 1, 2, 0]], 1.0);
    }

    #[test]
    fn test_gray_to_array4_rejects_bad_divisor() {
        let gray = GrayImage::new(2, 2);
        assert!(gray_to_array4_f32(&gray, 0.0).is_err());
        assert!(gray_to_array4_f32(&gray, f32::NAN).is_err());
    }
}
