//! Safe casting utilities for pixel coordinates and window sizes

use crate::{Error, Result};

/// Safely convert u32 to i32 with overflow checking
///
/// # Errors
///
/// Returns an error if the value exceeds i32::MAX
pub fn u32_to_i32(value: u32) -> Result<i32> {
    value
        .try_into()
        .map_err(|_| Error::InvalidInput(format!("Value {value} too large to fit in i32")))
}

/// Convert i32 to u32, mapping negative values to zero
#[must_use]
#[allow(clippy::cast_sign_loss)] // Negative values are clamped first
pub fn i32_to_u32_saturating(value: i32) -> u32 {
    value.max(0) as u32
}

/// Clamp and convert f32 to u32 for pixel coordinates
#[must_use]
#[allow(clippy::cast_precision_loss)] // Acceptable for clamping bounds
#[allow(clippy::cast_possible_truncation)] // Clamping ensures safe truncation
#[allow(clippy::cast_sign_loss)] // Clamped to a non-negative range
pub fn f32_to_u32_clamp(value: f32, min: u32, max: u32) -> u32 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if !value.is_finite() {
        return min;
    }

    let clamped = value.round().clamp(min as f32, max as f32);
    (clamped as u32).clamp(min, max)
}
