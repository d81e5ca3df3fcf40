//! Error type shared by every stage of the palette pipeline.
//!
//! The `Display` text of each variant is the message shown to the user, so a
//! caller can surface any error through the notifier without mapping it.

/// Everything that can go wrong between picking a file and copying a color.
#[derive(Debug, thiserror::Error)]
pub enum PaletteError {
    /// The declared media type is not one of the accepted image types.
    #[error("Please upload an image file (JPG, PNG, or GIF)")]
    InvalidFileType { media_type: String },

    /// The file is larger than the configured limit.
    #[error("Please upload an image smaller than 5MB")]
    FileTooLarge { size: u64, limit: u64 },

    /// The bytes could not be decoded (or re-encoded) as an image.
    #[error("Failed to load image. Please try another one.")]
    DecodeFailure(String),

    /// The color-extraction collaborator rejected the image.
    #[error("Failed to extract colors. Please try another image.")]
    ExtractionFailure(String),

    /// The host could not write to the clipboard.
    #[error("Failed to copy color code. Please try again.")]
    ClipboardFailure,

    /// Anything else, e.g. the host failed to read a file.
    #[error("An error occurred. Please try again.")]
    GenericFailure(String),

    /// Configuration supplied by the host or the CLI is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<image::ImageError> for PaletteError {
    fn from(error: image::ImageError) -> Self {
        PaletteError::DecodeFailure(error.to_string())
    }
}

impl From<serde_json::Error> for PaletteError {
    fn from(error: serde_json::Error) -> Self {
        PaletteError::Config(error.to_string())
    }
}
