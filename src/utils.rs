//! Utility functions for image conversion and bounding box arithmetic.

pub mod image_conversion;
pub mod safe_cast;

use imageproc::rect::Rect;

/// Clamp a bounding box to the image boundaries
///
/// Returns `None` when nothing of the box is left inside the image.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Bounded by the image dimensions
#[allow(clippy::cast_sign_loss)] // right > left and bottom > top are checked
pub fn clamp_rect(rect: Rect, max_width: u32, max_height: u32) -> Option<Rect> {
    let left = i64::from(rect.left()).max(0);
    let top = i64::from(rect.top()).max(0);
    let right = (i64::from(rect.left()) + i64::from(rect.width())).min(i64::from(max_width));
    let bottom = (i64::from(rect.top()) + i64::from(rect.height())).min(i64::from(max_height));

    if right <= left || bottom <= top {
        return None;
    }

    Some(Rect::at(left as i32, top as i32).of_size((right - left) as u32, (bottom - top) as u32))
}

/// Pixel area of a bounding box
#[must_use]
pub fn rect_area(rect: &Rect) -> u64 {
    u64::from(rect.width()) * u64::from(rect.height())
}

/// Intersection area divided by the area of the smaller box
///
/// Catches nested boxes as well as near-duplicates, which plain IoU
/// underrates when the sizes differ a lot.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Areas are far below f32 precision limits
pub fn overlap_ratio(a: &Rect, b: &Rect) -> f32 {
    let smaller = rect_area(a).min(rect_area(b));
    if smaller == 0 {
        return 0.0;
    }

    a.intersect(*b)
        .map_or(0.0, |inter| rect_area(&inter) as f32 / smaller as f32)
}
