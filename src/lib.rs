use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;

pub mod app;
pub mod color;
pub mod config;
pub mod debounce;
pub mod dragdrop;
pub mod error;
pub mod extract;
pub mod listeners;
pub mod loader;
pub mod notify;
pub mod render;
pub mod theme;
pub mod validate;
pub mod web;

pub use app::{Effect, Event, PaletteApp, UploadTicket};
pub use color::{Color, ColorFormat};
pub use config::AppConfig;
pub use error::PaletteError;
pub use extract::{KMeansExtractor, PaletteSource};
pub use loader::UploadedImage;

/// Decode an image, scale it to preview width and extract its palette.
///
/// Steps performed:
/// 1. Decode `input` (any format the `image` crate recognises).
/// 2. Down-scale to at most `max_width` pixels wide, keeping the aspect ratio.
/// 3. Run the k-means extractor for up to `n_colors` colors.
///
/// Unlike the interactive controller this reports extraction failures as errors.
pub fn extract_palette_bytes(
    input: &[u8],
    n_colors: usize,
    max_width: u32,
) -> Result<(UploadedImage, Vec<Color>), PaletteError> {
    let image = loader::decode_scaled(input, max_width)?;
    let mut colors = KMeansExtractor::default().palette(image.pixels(), n_colors)?;
    colors.truncate(n_colors);
    Ok((image, colors))
}

/// One-shot extraction for hosts that do not need the interactive controller.
///
/// Returns an array of `{ r, g, b, label }` objects, most dominant first,
/// labelled in `format` (`"hex"` when omitted).
#[wasm_bindgen(js_name = extractPalette)]
pub fn extract_palette_js(
    input: Vec<u8>,
    n_colors: usize,
    format: Option<String>,
) -> Result<Array, JsValue> {
    let format: ColorFormat = match format {
        Some(f) => f.parse().map_err(|e: PaletteError| JsValue::from_str(&e.to_string()))?,
        None => ColorFormat::Hex,
    };
    let (_, colors) = extract_palette_bytes(&input, n_colors, config::MAX_IMAGE_WIDTH)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let out = Array::new();
    for color in colors {
        let entry = Object::new();
        Reflect::set(&entry, &JsValue::from_str("r"), &JsValue::from(color.r))?;
        Reflect::set(&entry, &JsValue::from_str("g"), &JsValue::from(color.g))?;
        Reflect::set(&entry, &JsValue::from_str("b"), &JsValue::from(color.b))?;
        Reflect::set(&entry, &JsValue::from_str("label"), &JsValue::from_str(&color.format(format)))?;
        out.push(&entry);
    }
    Ok(out)
}
