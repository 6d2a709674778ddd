//! Face localisation: a Viola-Jones style cascade detector and the single-face policy.
//!
//! The detector slides a square window over the grayscale frame at growing
//! scales, evaluates boosted stages of weighted-rectangle features on an
//! integral image (rejecting early), and merges the surviving windows into
//! face boxes by neighbour grouping.

use crate::config::{FaceDetectionConfig, LocatorMode};
use crate::constants::{DETECTION_OVERLAP_THRESHOLD, DETECTION_STEP_FRACTION, FALLBACK_CROP_FRACTION};
use crate::utils::image_conversion::crop_gray;
use crate::utils::safe_cast::{f32_to_u32_clamp, u32_to_i32};
use crate::utils::{overlap_ratio, rect_area};
use crate::validation::{ValidationOutcome, ValidationReason};
use crate::{Error, Result};
use image::GrayImage;
use imageproc::rect::Rect;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Rectangle in window-relative coordinates, each component in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl UnitRect {
    /// The whole detection window
    pub const FULL: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// A Haar-like feature: weighted rectangle means followed by a decision stump
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HaarFeature {
    /// Rectangles and their weights
    pub rects: Vec<(UnitRect, f32)>,
    /// Response threshold for the stump
    pub threshold: f32,
    /// Vote if the response is below the threshold
    pub left_val: f32,
    /// Vote if the response is at or above the threshold
    pub right_val: f32,
}

impl HaarFeature {
    /// Votes 1 when `bright` is at least `threshold` intensity levels above `dark`
    #[must_use]
    pub fn contrast(bright: UnitRect, dark: UnitRect, threshold: f32) -> Self {
        Self {
            rects: vec![(bright, 1.0), (dark, -1.0)],
            threshold,
            left_val: 0.0,
            right_val: 1.0,
        }
    }

    fn evaluate(&self, integral: &IntegralImage, x: u32, y: u32, size: u32) -> f32 {
        self.rects
            .iter()
            .map(|(rect, weight)| integral.unit_rect_mean(x, y, size, rect) * weight)
            .sum()
    }

    fn vote(&self, integral: &IntegralImage, x: u32, y: u32, size: u32) -> f32 {
        if self.evaluate(integral, x, y, size) < self.threshold {
            self.left_val
        } else {
            self.right_val
        }
    }
}

/// One boosted stage; a window survives if the summed votes reach the threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeStage {
    pub threshold: f32,
    pub features: Vec<HaarFeature>,
}

/// Ordered list of stages evaluated with early rejection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceCascade {
    pub stages: Vec<CascadeStage>,
}

impl Default for FaceCascade {
    fn default() -> Self {
        Self::frontal_contrast()
    }
}

impl FaceCascade {
    /// Built-in contrast cascade
    ///
    /// 1. the central region is brighter than the window as a whole,
    /// 2. every quadrant of the central region is,
    /// 3. the central region is brighter than each of the four border strips.
    #[must_use]
    pub fn frontal_contrast() -> Self {
        let core = UnitRect::new(0.2, 0.2, 0.6, 0.6);
        let quadrants = [
            UnitRect::new(0.2, 0.2, 0.3, 0.3),
            UnitRect::new(0.5, 0.2, 0.3, 0.3),
            UnitRect::new(0.2, 0.5, 0.3, 0.3),
            UnitRect::new(0.5, 0.5, 0.3, 0.3),
        ];
        let borders = [
            UnitRect::new(0.0, 0.0, 1.0, 0.2),
            UnitRect::new(0.0, 0.8, 1.0, 0.2),
            UnitRect::new(0.0, 0.0, 0.2, 1.0),
            UnitRect::new(0.8, 0.0, 0.2, 1.0),
        ];

        Self {
            stages: vec![
                CascadeStage {
                    threshold: 1.0,
                    features: vec![HaarFeature::contrast(core, UnitRect::FULL, 16.0)],
                },
                CascadeStage {
                    threshold: 4.0,
                    features: quadrants
                        .iter()
                        .map(|&q| HaarFeature::contrast(q, UnitRect::FULL, 16.0))
                        .collect(),
                },
                CascadeStage {
                    threshold: 4.0,
                    features: borders
                        .iter()
                        .map(|&b| HaarFeature::contrast(core, b, 12.0))
                        .collect(),
                },
            ],
        }
    }

    fn evaluate_window(&self, integral: &IntegralImage, x: u32, y: u32, size: u32) -> bool {
        self.stages.iter().all(|stage| {
            let votes: f32 = stage
                .features
                .iter()
                .map(|feature| feature.vote(integral, x, y, size))
                .sum();
            votes >= stage.threshold
        })
    }
}

/// Summed-area table with one padding row and column
struct IntegralImage {
    stride: usize,
    data: Vec<u64>,
}

impl IntegralImage {
    fn new(gray: &GrayImage) -> Self {
        let (width, height) = (gray.width() as usize, gray.height() as usize);
        let stride = width + 1;
        let mut data = vec![0u64; stride * (height + 1)];
        let raw = gray.as_raw();

        for y in 0..height {
            let mut row_sum = 0u64;
            for x in 0..width {
                row_sum += u64::from(raw[y * width + x]);
                let idx = (y + 1) * stride + (x + 1);
                data[idx] = data[idx - stride] + row_sum;
            }
        }

        Self { stride, data }
    }

    fn rect_sum(&self, x: u32, y: u32, w: u32, h: u32) -> u64 {
        let (x0, y0) = (x as usize, y as usize);
        let (x1, y1) = (x0 + w as usize, y0 + h as usize);
        let s = self.stride;

        (self.data[y1 * s + x1] + self.data[y0 * s + x0]) - (self.data[y1 * s + x0] + self.data[y0 * s + x1])
    }

    #[allow(clippy::cast_precision_loss)] // Window sums stay far below f32 precision limits
    fn unit_rect_mean(&self, x: u32, y: u32, size: u32, rect: &UnitRect) -> f32 {
        let scale = size as f32;
        let rx = f32_to_u32_clamp(rect.x * scale, 0, size - 1);
        let ry = f32_to_u32_clamp(rect.y * scale, 0, size - 1);
        let rw = f32_to_u32_clamp(rect.w * scale, 1, size - rx);
        let rh = f32_to_u32_clamp(rect.h * scale, 1, size - ry);

        self.rect_sum(x + rx, y + ry, rw, rh) as f32 / (u64::from(rw) * u64::from(rh)) as f32
    }
}

/// Multi-scale cascade detector
#[derive(Debug, Clone)]
pub struct CascadeDetector {
    cascade: FaceCascade,
    min_face_size: u32,
    scale_factor: f32,
    min_neighbors: usize,
    grouping_eps: f32,
}

impl CascadeDetector {
    /// Create a detector with the built-in cascade
    ///
    /// # Errors
    ///
    /// Returns an error if the scan parameters are unusable
    pub fn new(config: &FaceDetectionConfig) -> Result<Self> {
        Self::with_cascade(FaceCascade::default(), config)
    }

    /// Create a detector with caller-supplied stages
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The cascade has no stages
    /// - The minimum face size is zero
    /// - The scale factor is not greater than 1
    /// - The minimum neighbour count is zero
    /// - The grouping tolerance is outside (0, 1)
    pub fn with_cascade(cascade: FaceCascade, config: &FaceDetectionConfig) -> Result<Self> {
        if cascade.stages.is_empty() {
            return Err(Error::DetectionError("Cascade has no stages".to_string()));
        }
        if config.min_face_size == 0 {
            return Err(Error::DetectionError("Minimum face size must be greater than 0".to_string()));
        }
        if !(config.scale_factor.is_finite() && config.scale_factor > 1.0) {
            return Err(Error::DetectionError(format!(
                "Scale factor must be greater than 1, got {}",
                config.scale_factor
            )));
        }
        if config.min_neighbors == 0 {
            return Err(Error::DetectionError("Minimum neighbours must be at least 1".to_string()));
        }
        if !(config.grouping_eps > 0.0 && config.grouping_eps < 1.0) {
            return Err(Error::DetectionError(format!(
                "Grouping eps must be in (0, 1), got {}",
                config.grouping_eps
            )));
        }

        Ok(Self {
            cascade,
            min_face_size: config.min_face_size,
            scale_factor: config.scale_factor,
            min_neighbors: config.min_neighbors,
            grouping_eps: config.grouping_eps,
        })
    }

    /// Detect faces in a grayscale image
    ///
    /// # Errors
    ///
    /// Returns an error if the image is empty or too large for pixel coordinates
    #[allow(clippy::cast_precision_loss)] // Window sizes are small integers
    pub fn detect(&self, gray: &GrayImage) -> Result<Vec<Rect>> {
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::DetectionError(format!(
                "Cannot run detection on a {width}x{height} image"
            )));
        }

        let max_size = width.min(height);
        if max_size < self.min_face_size {
            return Ok(Vec::new());
        }

        let integral = IntegralImage::new(gray);
        let mut candidates = Vec::new();
        let mut window = self.min_face_size as f32;
        let mut last_size = 0;

        loop {
            let size = f32_to_u32_clamp(window, self.min_face_size, u32::MAX);
            if size > max_size {
                break;
            }
            window *= self.scale_factor;
            if size == last_size {
                continue;
            }
            last_size = size;

            let step = f32_to_u32_clamp(size as f32 * DETECTION_STEP_FRACTION, 1, size) as usize;
            for y in (0..=height - size).step_by(step) {
                for x in (0..=width - size).step_by(step) {
                    if self.cascade.evaluate_window(&integral, x, y, size) {
                        candidates.push(Rect::at(u32_to_i32(x)?, u32_to_i32(y)?).of_size(size, size));
                    }
                }
            }
        }

        let faces = group_rectangles(&candidates, self.min_neighbors, self.grouping_eps);
        debug!(
            "Cascade accepted {} windows, grouped into {} faces",
            candidates.len(),
            faces.len()
        );

        Ok(faces)
    }
}

/// Whether two windows are close enough to describe the same object
#[must_use]
#[allow(clippy::cast_precision_loss)] // Pixel coordinates are small
pub fn similar_rects(a: &Rect, b: &Rect, eps: f32) -> bool {
    let delta = eps * (a.width().min(b.width()) + a.height().min(b.height())) as f32 * 0.5;
    let close = |p: i64, q: i64| (p - q).abs() as f32 <= delta;

    let (al, at) = (i64::from(a.left()), i64::from(a.top()));
    let (bl, bt) = (i64::from(b.left()), i64::from(b.top()));

    close(al, bl)
        && close(at, bt)
        && close(al + i64::from(a.width()), bl + i64::from(b.width()))
        && close(at + i64::from(a.height()), bt + i64::from(b.height()))
}

/// Merge raw detection windows into face boxes
///
/// Windows are partitioned into equivalence classes of [`similar_rects`];
/// classes with fewer than `min_neighbors` members are dropped and the rest
/// are averaged. Averaged boxes that overlap a better supported box are
/// suppressed.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Group sizes and coordinates are small
#[allow(clippy::cast_possible_truncation)] // Averages of i32 coordinates fit in i32
pub fn group_rectangles(rects: &[Rect], min_neighbors: usize, eps: f32) -> Vec<Rect> {
    let labels = partition(rects, |a, b| similar_rects(a, b, eps));
    let n_groups = labels.iter().copied().max().map_or(0, |m| m + 1);

    let mut sums = vec![(0usize, 0.0f64, 0.0f64, 0.0f64, 0.0f64); n_groups];
    for (rect, &label) in rects.iter().zip(&labels) {
        let entry = &mut sums[label];
        entry.0 += 1;
        entry.1 += f64::from(rect.left());
        entry.2 += f64::from(rect.top());
        entry.3 += f64::from(rect.width());
        entry.4 += f64::from(rect.height());
    }

    let mut groups: Vec<(Rect, usize)> = sums
        .into_iter()
        .filter(|&(count, ..)| count > 0 && count >= min_neighbors)
        .map(|(count, x, y, w, h)| {
            let n = count as f64;
            let rect = Rect::at((x / n).round() as i32, (y / n).round() as i32).of_size(
                f32_to_u32_clamp((w / n) as f32, 1, u32::MAX),
                f32_to_u32_clamp((h / n) as f32, 1, u32::MAX),
            );
            (rect, count)
        })
        .collect();

    groups.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| rect_area(&b.0).cmp(&rect_area(&a.0))));

    let mut keep: Vec<Rect> = Vec::with_capacity(groups.len());
    for (rect, _) in groups {
        if keep
            .iter()
            .all(|kept| overlap_ratio(kept, &rect) <= DETECTION_OVERLAP_THRESHOLD)
        {
            keep.push(rect);
        }
    }

    keep
}

/// Label every item with the index of its equivalence class (union-find)
fn partition<F>(items: &[Rect], predicate: F) -> Vec<usize>
where
    F: Fn(&Rect, &Rect) -> bool,
{
    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    let mut parent: Vec<usize> = (0..items.len()).collect();
    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            if predicate(&items[i], &items[j]) {
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                if ri != rj {
                    parent[rj] = ri;
                }
            }
        }
    }

    let mut class_of_root = vec![usize::MAX; items.len()];
    let mut next = 0;
    (0..items.len())
        .map(|i| {
            let root = find(&mut parent, i);
            if class_of_root[root] == usize::MAX {
                class_of_root[root] = next;
                next += 1;
            }
            class_of_root[root]
        })
        .collect()
}

/// Largest box by area
#[must_use]
pub fn largest_face(boxes: &[Rect]) -> Option<Rect> {
    boxes.iter().copied().max_by_key(rect_area)
}

/// Upper-middle square used as a face proxy when no detector is in use
#[must_use]
#[allow(clippy::cast_precision_loss)] // Frame dimensions are small
pub fn center_crop_box(width: u32, height: u32) -> Option<Rect> {
    if width == 0 || height == 0 {
        return None;
    }

    let short_side = width.min(height);
    let side = f32_to_u32_clamp(short_side as f32 * FALLBACK_CROP_FRACTION, 1, short_side);
    let x = (width - side) / 2;
    let y = (height - side) / 3;

    Some(Rect::at(u32_to_i32(x).ok()?, u32_to_i32(y).ok()?).of_size(side, side))
}

/// Apply the exactly-one-face policy to detector output
#[must_use]
pub fn enforce_single_face(gray: &GrayImage, boxes: &[Rect]) -> ValidationOutcome {
    match boxes.len() {
        0 => ValidationOutcome::rejected(ValidationReason::NoFace, 0),
        1 => {
            let Some(face) = largest_face(boxes) else {
                return ValidationOutcome::rejected(ValidationReason::ExtractionFailed, 1);
            };
            match crop_gray(gray, face) {
                Ok(region) => ValidationOutcome::with_face(region, 1),
                Err(e) => {
                    warn!("Face extraction failed: {e}");
                    ValidationOutcome::rejected(ValidationReason::ExtractionFailed, 1)
                }
            }
        }
        count => ValidationOutcome::rejected(ValidationReason::MultipleFaces, count),
    }
}

/// Finds the face region in a frame that already passed the quality gate
#[derive(Debug, Clone)]
pub enum FaceLocator {
    /// Cascade detection with the single-face policy
    Cascade(CascadeDetector),
    /// Fixed upper-middle crop; never reports `no_face` or `multiple_faces`
    CenterCrop,
}

impl FaceLocator {
    /// Build the locator selected in the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the cascade detector parameters are invalid
    pub fn from_config(config: &FaceDetectionConfig) -> Result<Self> {
        match config.locator {
            LocatorMode::Cascade => Ok(Self::Cascade(CascadeDetector::new(config)?)),
            LocatorMode::CenterCrop => Ok(Self::CenterCrop),
        }
    }

    #[must_use]
    pub fn mode(&self) -> LocatorMode {
        match self {
            Self::Cascade(_) => LocatorMode::Cascade,
            Self::CenterCrop => LocatorMode::CenterCrop,
        }
    }

    /// Candidate face boxes without applying any policy
    ///
    /// # Errors
    ///
    /// Returns an error if detection fails on a malformed image
    pub fn locate(&self, gray: &GrayImage) -> Result<Vec<Rect>> {
        match self {
            Self::Cascade(detector) => detector.detect(gray),
            Self::CenterCrop => Ok(center_crop_box(gray.width(), gray.height()).into_iter().collect()),
        }
    }

    /// Locate and crop the face, turning every failure into an outcome
    #[must_use]
    pub fn extract(&self, gray: &GrayImage) -> ValidationOutcome {
        match self {
            Self::Cascade(detector) => match detector.detect(gray) {
                Ok(boxes) => enforce_single_face(gray, &boxes),
                Err(e) => {
                    warn!("Face detection failed: {e}");
                    ValidationOutcome::rejected(ValidationReason::ExtractionFailed, 0)
                }
            },
            Self::CenterCrop => {
                let region = center_crop_box(gray.width(), gray.height())
                    .ok_or_else(|| Error::DetectionError("Frame too small for a fallback crop".to_string()))
                    .and_then(|face| crop_gray(gray, face));
                match region {
                    Ok(region) => ValidationOutcome::with_face(region, 1),
                    Err(e) => {
                        warn!("Fallback crop failed: {e}");
                        ValidationOutcome::rejected(ValidationReason::ExtractionFailed, 0)
                    }
                }
            }
        }
    }
}
