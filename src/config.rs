//! Tunable limits of the palette tool.
//!
//! Defaults match what the browser front end ships with; a host (or the CLI's
//! `--config` flag) may override any subset of fields with a JSON object.

use serde::{Deserialize, Serialize};

use crate::error::PaletteError;

pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;
pub const MAX_IMAGE_WIDTH: u32 = 800;
pub const DEBOUNCE_DELAY_MS: u64 = 300;
pub const NOTIFICATION_MS: u64 = 3000;

/// Media types accepted by the file validator.
pub const ACCEPTED_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Largest accepted upload, in bytes.
    pub max_file_size: u64,
    /// Preview width cap; narrower images are never upscaled.
    pub max_image_width: u32,
    /// Quiet period before a palette-size change re-runs extraction.
    pub debounce_ms: u64,
    /// How long a notification stays visible.
    pub notification_ms: u64,
    pub default_color_count: usize,
    pub min_color_count: usize,
    pub max_color_count: usize,
    pub accepted_types: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            max_image_width: MAX_IMAGE_WIDTH,
            debounce_ms: DEBOUNCE_DELAY_MS,
            notification_ms: NOTIFICATION_MS,
            default_color_count: 6,
            min_color_count: 2,
            max_color_count: 20,
            accepted_types: ACCEPTED_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl AppConfig {
    /// Parse a (possibly partial) JSON override on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self, PaletteError> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PaletteError> {
        if self.max_image_width == 0 {
            return Err(PaletteError::Config("max_image_width must be positive".into()));
        }
        if self.min_color_count == 0 || self.min_color_count > self.max_color_count {
            return Err(PaletteError::Config(format!(
                "invalid color count range {}..={}",
                self.min_color_count, self.max_color_count
            )));
        }
        if !(self.min_color_count..=self.max_color_count).contains(&self.default_color_count) {
            return Err(PaletteError::Config(format!(
                "default_color_count {} outside {}..={}",
                self.default_color_count, self.min_color_count, self.max_color_count
            )));
        }
        if self.accepted_types.is_empty() {
            return Err(PaletteError::Config("accepted_types is empty".into()));
        }
        Ok(())
    }

    /// Bring a raw slider value into the accepted range.
    pub fn clamp_color_count(&self, count: usize) -> usize {
        count.clamp(self.min_color_count, self.max_color_count)
    }
}
