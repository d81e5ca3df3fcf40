//! Decoding and downscaling of uploaded images.
//!
//! Uploads are decoded with the `image` crate, shrunk to the preview width
//! (never enlarged) and kept as RGBA for the extractor. The preview itself is
//! re-encoded as JPEG for the host, the same thing a canvas `toDataURL` would
//! produce.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, RgbaImage};

use crate::error::PaletteError;

/// `min(1, max_width / width)`. Zero-width input is left alone.
pub fn scale_factor(width: u32, max_width: u32) -> f32 {
    if width == 0 {
        return 1.0;
    }
    (max_width as f32 / width as f32).min(1.0)
}

/// Preview dimensions for a source image, aspect ratio preserved.
///
/// Wide images come out exactly `max_width` wide. The height is truncated like
/// a canvas size assignment, but never collapses below one pixel.
pub fn scaled_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width {
        return (width, height);
    }
    let h = (u64::from(height) * u64::from(max_width) / u64::from(width)).max(1);
    (max_width, h as u32)
}

/// A decoded upload, already scaled to preview size.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pixels: RgbaImage,
    source_width: u32,
    source_height: u32,
}

impl UploadedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn source_dimensions(&self) -> (u32, u32) {
        (self.source_width, self.source_height)
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn aria_label(&self) -> String {
        format!(
            "Preview of uploaded image, {}x{} pixels",
            self.width(),
            self.height()
        )
    }

    /// JPEG bytes of the scaled preview. JPEG has no alpha, so it is dropped.
    pub fn encode_preview(&self) -> Result<Vec<u8>, PaletteError> {
        let rgb = DynamicImage::ImageRgba8(self.pixels.clone()).to_rgb8();
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(rgb)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
            .map_err(|e| PaletteError::DecodeFailure(format!("JPEG encode error: {e}")))?;
        Ok(buf)
    }
}

/// Decode `bytes` and scale the result to at most `max_width` pixels wide.
pub fn decode_scaled(bytes: &[u8], max_width: u32) -> Result<UploadedImage, PaletteError> {
    let img = image::load_from_memory(bytes)?;
    let (source_width, source_height) = img.dimensions();
    if source_width == 0 || source_height == 0 {
        return Err(PaletteError::DecodeFailure("image has no pixels".into()));
    }

    let (w, h) = scaled_dimensions(source_width, source_height, max_width);
    let pixels = if (w, h) == (source_width, source_height) {
        img.to_rgba8()
    } else {
        image::imageops::resize(&img, w, h, FilterType::Triangle)
    };

    log::info!(
        "decoded {}x{} image, preview {}x{}",
        source_width,
        source_height,
        w,
        h
    );

    Ok(UploadedImage {
        pixels,
        source_width,
        source_height,
    })
}

/// What the preview surface is showing. Exactly one of the two is visible.
#[derive(Debug, Clone, Default)]
pub enum Preview {
    #[default]
    Placeholder,
    Image(UploadedImage),
}

impl Preview {
    pub fn image(&self) -> Option<&UploadedImage> {
        match self {
            Preview::Placeholder => None,
            Preview::Image(img) => Some(img),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Preview::Placeholder)
    }

    /// Replace whatever is shown with a freshly decoded upload.
    pub fn show(&mut self, image: UploadedImage) {
        *self = Preview::Image(image);
    }
}
