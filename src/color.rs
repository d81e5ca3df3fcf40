use std::fmt;
use std::str::FromStr;

use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

use crate::error::PaletteError;

/// One extracted color. Labels are always derived from this triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`, lowercase and zero padded.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_rgb_string(self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    /// Integer HSL: hue in `0..360`, saturation and lightness in `0..=100`.
    pub fn to_hsl(self) -> (u16, u8, u8) {
        let rgb: Srgb<f32> = Srgb::new(self.r, self.g, self.b).into_format();
        let hsl: Hsl = rgb.into_color();

        let hue = hsl.hue.into_positive_degrees().round() as u16 % 360;
        let saturation = (hsl.saturation * 100.0).round().clamp(0.0, 100.0) as u8;
        let lightness = (hsl.lightness * 100.0).round().clamp(0.0, 100.0) as u8;
        (hue, saturation, lightness)
    }

    pub fn to_hsl_string(self) -> String {
        let (h, s, l) = self.to_hsl();
        format!("hsl({h}, {s}%, {l}%)")
    }

    /// Swatch background fill. Independent of the selected label format.
    pub fn css_fill(self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }

    pub fn format(self, format: ColorFormat) -> String {
        match format {
            ColorFormat::Hex => self.to_hex(),
            ColorFormat::Rgb => self.to_rgb_string(),
            ColorFormat::Hsl => self.to_hsl_string(),
        }
    }

    /// Parse `#rrggbb` or `rrggbb` (either case).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Srgb<u8>> for Color {
    fn from(c: Srgb<u8>) -> Self {
        Self::new(c.red, c.green, c.blue)
    }
}

/// Textual representation used for swatch labels and clipboard text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorFormat {
    #[default]
    Hex,
    Rgb,
    Hsl,
}

impl ColorFormat {
    pub const ALL: [ColorFormat; 3] = [ColorFormat::Hex, ColorFormat::Rgb, ColorFormat::Hsl];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hex => "hex",
            Self::Rgb => "rgb",
            Self::Hsl => "hsl",
        }
    }
}

impl fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorFormat {
    type Err = PaletteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hex" => Ok(Self::Hex),
            "rgb" => Ok(Self::Rgb),
            "hsl" => Ok(Self::Hsl),
            other => Err(PaletteError::Config(format!(
                "unknown color format: {other} (expected hex, rgb or hsl)"
            ))),
        }
    }
}
