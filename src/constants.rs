//! Constants used throughout the library

/// Mean grayscale intensity below which a frame is too dark
pub const BRIGHTNESS_THRESHOLD_LOW: f64 = 30.0;

/// Mean grayscale intensity above which a frame is washed out
pub const BRIGHTNESS_THRESHOLD_HIGH: f64 = 220.0;

/// Laplacian variance below which a frame counts as blurred
pub const BLUR_THRESHOLD: f64 = 100.0;

/// Smallest face window scanned by the detector, in pixels
pub const FACE_MIN_SIZE: u32 = 48;

/// Window growth per detector scale step
pub const DETECTION_SCALE_FACTOR: f32 = 1.1;

/// Raw window hits a group needs before it counts as a face
pub const DETECTION_MIN_NEIGHBORS: usize = 3;

/// Relative tolerance for grouping similar detection windows
pub const DETECTION_GROUPING_EPS: f32 = 0.2;

/// Sliding window stride as a fraction of the window size
pub const DETECTION_STEP_FRACTION: f32 = 0.05;

/// Overlap (intersection over smaller area) above which two groups are the same face
pub const DETECTION_OVERLAP_THRESHOLD: f32 = 0.5;

/// Side of the fallback crop relative to the shorter frame side
pub const FALLBACK_CROP_FRACTION: f32 = 0.6;

/// Classifier input height and width
pub const MODEL_INPUT_SIZE: u32 = 48;

/// Maximum representable 8-bit intensity
pub const PIXEL_MAX: f32 = 255.0;

/// Value of every element in the neutral fallback tensor
pub const NEUTRAL_TENSOR_VALUE: f32 = 0.5;

/// A vector whose sum is this close to 1 is already a distribution
pub const NORMALIZATION_TOLERANCE: f32 = 1e-3;

/// Number of recent probability vectors averaged by the smoother
pub const DEFAULT_SMOOTHING_WINDOW: usize = 5;

/// Consecutive identical decisions that trigger diversification
pub const DEFAULT_DIVERSIFICATION_THRESHOLD: u32 = 4;

/// Heuristic brightness bands (normalized mean intensity)
pub const HEURISTIC_DARK_MEAN: f32 = 0.35;
pub const HEURISTIC_BRIGHT_MEAN: f32 = 0.65;

/// Probability mass the heuristic assigns to its first and second choice
pub const HEURISTIC_PRIMARY_MASS: f32 = 0.6;
pub const HEURISTIC_SECONDARY_MASS: f32 = 0.25;
