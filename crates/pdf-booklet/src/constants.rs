//! Shared constants for booklet imposition
//!
//! This module centralizes magic numbers and constants used throughout
//! the imposition and optimization process.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

// =============================================================================
// Default Page Dimensions
// =============================================================================

/// Source page size assumed when a page carries no usable MediaBox (US Letter)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (612.0, 792.0);

// =============================================================================
// Booklet Layout
// =============================================================================

/// Pages per folded sheet; every signature is a multiple of this
pub const PAGES_PER_SHEET: usize = 4;

/// Pages placed on one spread
pub const PAGES_PER_SPREAD: usize = 2;

// =============================================================================
// Crop Marks
// =============================================================================

/// Length of a crop mark in millimeters
pub const CROP_MARK_LENGTH_MM: f32 = 10.0;

/// Stroke width of a crop mark in millimeters
pub const CROP_MARK_WIDTH_MM: f32 = 0.2;

// =============================================================================
// Optimization Thresholds
// =============================================================================

/// Output/original ratio above which embedded images are re-encoded
pub const IMAGE_PASS_RATIO: f64 = 2.0;

/// Output/original ratio above which the aggressive structural pass runs
pub const AGGRESSIVE_PASS_RATIO: f64 = 3.0;

/// Ratio at or above which the output is reported as large
pub const LARGE_OUTPUT_RATIO: f64 = 3.0;

/// Valid JPEG quality range for image re-encoding
pub const MIN_IMAGE_QUALITY: u8 = 25;
pub const MAX_IMAGE_QUALITY: u8 = 100;

/// Highest stream decode level
pub const MAX_COMPRESSION_LEVEL: u8 = 4;
