//! Shared constants for page composition
//!
//! This module centralizes the fixed dimensions and factors used by
//! layout, geometry and export.

// =============================================================================
// Page Canvas
// =============================================================================

/// Page canvas width in pixels (A4 at 96 dpi)
pub const CANVAS_WIDTH_PX: f32 = 794.0;

/// Page canvas height in pixels (A4 at 96 dpi)
pub const CANVAS_HEIGHT_PX: f32 = 1123.0;

/// Line height as a multiple of the font size
pub const LINE_HEIGHT_FACTOR: f32 = 1.4;

// =============================================================================
// Font Size
// =============================================================================

pub const DEFAULT_FONT_SIZE: f32 = 16.0;
pub const MIN_FONT_SIZE: f32 = 10.0;
pub const MAX_FONT_SIZE: f32 = 40.0;

// =============================================================================
// Content Region
// =============================================================================

/// Allowed range for the per-axis minimum region size
pub const MIN_REGION_RANGE: (f32, f32) = (100.0, 120.0);

// =============================================================================
// Export
// =============================================================================

/// Output page dimensions in millimeters (A4 portrait)
pub const OUTPUT_PAGE_MM: (f32, f32) = (210.0, 297.0);

/// Raster scale factor applied to the canvas when capturing a page
pub const CAPTURE_SCALE: f32 = 2.0;

/// Delay between entering export mode and the first capture
pub const SETTLE_INTERVAL_MS: u64 = 200;

pub const DEFAULT_EXPORT_FILENAME: &str = "document.pdf";
