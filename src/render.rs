//! Swatch model for the palette container.
//!
//! Swatches keep the raw [`Color`] they were rendered from, so changing the
//! label format is an in-place relabel and never needs a new extraction.

use serde::Serialize;

use crate::color::{Color, ColorFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SwatchId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Swatch {
    pub id: SwatchId,
    pub color: Color,
    /// Background fill, always `rgb(r,g,b)` whatever the label format.
    pub fill: String,
    pub label: String,
    pub aria_label: String,
}

impl Swatch {
    fn new(id: SwatchId, color: Color, format: ColorFormat) -> Self {
        let mut swatch = Self {
            id,
            color,
            fill: color.css_fill(),
            label: String::new(),
            aria_label: String::new(),
        };
        swatch.relabel(format);
        swatch
    }

    fn relabel(&mut self, format: ColorFormat) {
        self.label = self.color.format(format);
        self.aria_label = format!("Color {}. Click to copy", self.label);
    }
}

/// How a swatch was triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Click,
    /// A key press while the swatch has focus, as reported by the host (`KeyboardEvent.key`).
    Key(String),
}

impl Activation {
    /// Click, Enter and Space activate; any other key is ignored.
    pub fn activates(&self) -> bool {
        match self {
            Activation::Click => true,
            Activation::Key(key) => key == "Enter" || key == " ",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PaletteView {
    swatches: Vec<Swatch>,
    next_id: u64,
}

impl PaletteView {
    /// Replace every swatch with one per color, in palette order.
    pub fn render(&mut self, palette: &[Color], format: ColorFormat) {
        let mut swatches = Vec::with_capacity(palette.len());
        for &color in palette {
            let id = SwatchId(self.next_id);
            self.next_id += 1;
            swatches.push(Swatch::new(id, color, format));
        }
        self.swatches = swatches;
    }

    /// Re-derive labels from the stored colors.
    pub fn relabel(&mut self, format: ColorFormat) {
        for swatch in &mut self.swatches {
            swatch.relabel(format);
        }
    }

    /// The text to copy for an activation, if it activates a known swatch.
    pub fn activate(&self, id: SwatchId, activation: &Activation, format: ColorFormat) -> Option<String> {
        if !activation.activates() {
            return None;
        }
        self.swatches
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.color.format(format))
    }

    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    pub fn colors(&self) -> Vec<Color> {
        self.swatches.iter().map(|s| s.color).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORANGE: Color = Color::new(255, 165, 0);
    const NAVY: Color = Color::new(0, 0, 128);

    #[test]
    fn render_builds_one_swatch_per_color() {
        let mut view = PaletteView::default();
        view.render(&[ORANGE, NAVY], ColorFormat::Hex);

        let swatches = view.swatches();
        assert_eq!(swatches.len(), 2);
        assert_eq!(swatches[0].label, "#ffa500");
        assert_eq!(swatches[0].fill, "rgb(255,165,0)");
        assert_eq!(swatches[0].aria_label, "Color #ffa500. Click to copy");
        assert_eq!(swatches[1].color, NAVY);
    }

    #[test]
    fn relabel_keeps_ids_and_fill() {
        let mut view = PaletteView::default();
        view.render(&[ORANGE], ColorFormat::Hex);
        let id = view.swatches()[0].id;

        view.relabel(ColorFormat::Hsl);
        let swatch = &view.swatches()[0];
        assert_eq!(swatch.id, id);
        assert_eq!(swatch.label, "hsl(39, 100%, 50%)");
        assert_eq!(swatch.fill, "rgb(255,165,0)");
    }

    #[test]
    fn rerender_replaces_ids() {
        let mut view = PaletteView::default();
        view.render(&[ORANGE], ColorFormat::Hex);
        let old = view.swatches()[0].id;
        view.render(&[ORANGE], ColorFormat::Hex);
        assert_ne!(view.swatches()[0].id, old);
        assert_eq!(view.activate(old, &Activation::Click, ColorFormat::Hex), None);
    }

    #[test]
    fn only_enter_space_and_click_activate() {
        let mut view = PaletteView::default();
        view.render(&[NAVY], ColorFormat::Rgb);
        let id = view.swatches()[0].id;

        assert_eq!(
            view.activate(id, &Activation::Click, ColorFormat::Rgb).as_deref(),
            Some("rgb(0, 0, 128)")
        );
        assert!(view.activate(id, &Activation::Key("Enter".into()), ColorFormat::Rgb).is_some());
        assert!(view.activate(id, &Activation::Key(" ".into()), ColorFormat::Rgb).is_some());
        assert!(view.activate(id, &Activation::Key("a".into()), ColorFormat::Rgb).is_none());
    }
}
