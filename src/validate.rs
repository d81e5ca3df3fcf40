use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::PaletteError;

/// A file offered through the picker or the drop zone, before any bytes are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFile {
    pub name: String,
    /// Media type as declared by the host (e.g. `image/png`).
    pub media_type: String,
    pub size: u64,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size,
        }
    }
}

/// Gate a candidate file on its declared type and size.
///
/// The type check runs first, so an oversized PDF reports the type problem.
pub fn validate_file(media_type: &str, size: u64, config: &AppConfig) -> Result<(), PaletteError> {
    if !config.accepted_types.iter().any(|t| t == media_type) {
        return Err(PaletteError::InvalidFileType {
            media_type: media_type.to_string(),
        });
    }

    if size > config.max_file_size {
        return Err(PaletteError::FileTooLarge {
            size,
            limit: config.max_file_size,
        });
    }

    Ok(())
}
