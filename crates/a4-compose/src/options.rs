use crate::constants::*;
use crate::types::*;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Export settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExportSettings {
    /// Raster scale relative to the page canvas
    pub capture_scale: f32,
    /// Physical output page size (width, height) in millimeters
    pub page_size_mm: (f32, f32),
    /// Pause after hiding interactive decorations, before the first capture
    pub settle_ms: u64,
    /// File name used when downloading
    pub default_filename: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            capture_scale: CAPTURE_SCALE,
            page_size_mm: OUTPUT_PAGE_MM,
            settle_ms: SETTLE_INTERVAL_MS,
            default_filename: DEFAULT_EXPORT_FILENAME.to_string(),
        }
    }
}

impl ExportSettings {
    pub fn settle_interval(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Composer configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ComposerOptions {
    // Typography
    pub font_size: f32,
    pub font_size_range: (f32, f32),

    // Content region
    pub default_box: GeometryBox,
    pub min_region: MinSize,

    // Page canvas in pixels
    pub canvas_size: (f32, f32),

    // Output
    pub export: ExportSettings,

    // Background gallery
    pub templates: Vec<Template>,
}

impl Default for ComposerOptions {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            font_size_range: (MIN_FONT_SIZE, MAX_FONT_SIZE),
            default_box: GeometryBox::default(),
            min_region: MinSize::default(),
            canvas_size: (CANVAS_WIDTH_PX, CANVAS_HEIGHT_PX),
            export: ExportSettings::default(),
            templates: default_templates(),
        }
    }
}

fn default_templates() -> Vec<Template> {
    (1..=5)
        .map(|n| Template::new(format!("Template {n}"), format!("templates/template{n}.png")))
        .collect()
}

impl ComposerOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options: Self = serde_json::from_slice(&bytes)
            .map_err(|e| ComposeError::Config(format!("Failed to parse config: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ComposeError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Clamp a font size into the configured range
    pub fn clamp_font_size(&self, size: f32) -> f32 {
        size.clamp(self.font_size_range.0, self.font_size_range.1)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        let (min_font, max_font) = self.font_size_range;
        if !(min_font > 0.0 && min_font <= max_font) {
            return Err(ComposeError::Config(format!(
                "Invalid font size range {}..{}",
                min_font, max_font
            )));
        }
        if !(min_font..=max_font).contains(&self.font_size) {
            return Err(ComposeError::Config(format!(
                "Font size {} outside {}..{}",
                self.font_size, min_font, max_font
            )));
        }

        let (lo, hi) = MIN_REGION_RANGE;
        for (axis, value) in [("width", self.min_region.width), ("height", self.min_region.height)]
        {
            if !(lo..=hi).contains(&value) {
                return Err(ComposeError::Config(format!(
                    "Minimum region {} {} must be between {} and {}",
                    axis, value, lo, hi
                )));
            }
        }

        if self.default_box.width < self.min_region.width
            || self.default_box.height < self.min_region.height
        {
            return Err(ComposeError::Config(
                "Default region is smaller than the minimum region".to_string(),
            ));
        }

        if self.canvas_size.0 <= 0.0 || self.canvas_size.1 <= 0.0 {
            return Err(ComposeError::Config(
                "Canvas dimensions must be positive".to_string(),
            ));
        }

        if self.export.capture_scale <= 0.0 {
            return Err(ComposeError::Config(
                "Capture scale must be positive".to_string(),
            ));
        }
        if self.export.page_size_mm.0 <= 0.0 || self.export.page_size_mm.1 <= 0.0 {
            return Err(ComposeError::Config(
                "Output page size must be positive".to_string(),
            ));
        }
        if self.export.default_filename.trim().is_empty() {
            return Err(ComposeError::Config(
                "Default export file name is empty".to_string(),
            ));
        }

        Ok(())
    }
}
