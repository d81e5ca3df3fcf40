//! Dominant-color extraction.
//!
//! The controller only sees [`PaletteSource`]: give it an image and a color
//! count, get back colors ordered from most to least dominant. The crate's own
//! source, [`KMeansExtractor`], clusters sampled pixels in Lab space.

use std::collections::HashMap;

use image::RgbaImage;
use kmeans_colors::{Sort, get_kmeans};
use palette::{IntoColor, Lab, Srgb};

use crate::color::Color;
use crate::debounce::Millis;
use crate::error::PaletteError;
use crate::loader::UploadedImage;
use crate::notify::Notifier;

/// Largest palette the extractor will produce.
pub const MAX_PALETTE_SIZE: usize = 20;

/// Pixels more transparent than this are not sampled.
const MIN_ALPHA: u8 = 125;

/// The external color-extraction collaborator.
pub trait PaletteSource {
    /// Up to `count` colors, most dominant first.
    fn palette(&self, image: &RgbaImage, count: usize) -> Result<Vec<Color>, PaletteError>;
}

/// k-means clustering over a strided sample of the image.
#[derive(Debug, Clone)]
pub struct KMeansExtractor {
    /// Sample every `quality`-th pixel. 1 samples everything.
    pub quality: usize,
    pub max_iter: usize,
    pub converge: f32,
    pub seed: u64,
}

impl Default for KMeansExtractor {
    fn default() -> Self {
        Self {
            quality: 10,
            max_iter: 20,
            converge: 1e-4,
            seed: 0,
        }
    }
}

impl PaletteSource for KMeansExtractor {
    fn palette(&self, image: &RgbaImage, count: usize) -> Result<Vec<Color>, PaletteError> {
        let count = count.clamp(1, MAX_PALETTE_SIZE);

        // ----------------------
        // 1. Sample opaque pixels
        // ----------------------
        let mut histogram: HashMap<[u8; 3], u32> = HashMap::new();
        let mut lab_pixels: Vec<Lab> = Vec::new();
        for pixel in image.pixels().step_by(self.quality.max(1)) {
            let [r, g, b, a] = pixel.0;
            if a < MIN_ALPHA {
                continue;
            }
            *histogram.entry([r, g, b]).or_insert(0) += 1;
            let srgb = Srgb::<u8>::new(r, g, b);
            lab_pixels.push(srgb.into_linear().into_color());
        }

        if lab_pixels.is_empty() {
            return Err(PaletteError::ExtractionFailure(format!(
                "no opaque pixels in {}x{} image",
                image.width(),
                image.height()
            )));
        }

        // ----------------------
        // 2. Few distinct colors: the histogram is the palette
        // ----------------------
        if histogram.len() <= count {
            let mut entries: Vec<([u8; 3], u32)> = histogram.into_iter().collect();
            entries.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
            return Ok(entries.into_iter().map(|(rgb, _)| Color::from(rgb)).collect());
        }

        // ----------------------
        // 3. Cluster and order by share
        // ----------------------
        let kmeans = get_kmeans(count, self.max_iter, self.converge, false, &lab_pixels, self.seed);
        let mut shares = Lab::sort_indexed_colors(&kmeans.centroids, &kmeans.indices);
        shares.sort_unstable_by(|a, b| b.percentage.total_cmp(&a.percentage));

        let mut colors: Vec<Color> = Vec::with_capacity(shares.len());
        for share in shares {
            let rgb_f32: Srgb<f32> = Srgb::from_linear(share.centroid.into_color());
            let color = Color::from(rgb_f32.into_format::<u8>());
            // Clusters can converge onto the same color once rounded to u8.
            if !colors.contains(&color) {
                colors.push(color);
            }
        }
        Ok(colors)
    }
}

/// Run `source` on a ready image without letting a failure escape.
///
/// On error the extraction-failure message is shown and the palette is empty;
/// callers treat an empty palette as "nothing to show".
pub fn extract_palette<S: PaletteSource + ?Sized>(
    source: &S,
    image: &UploadedImage,
    count: usize,
    notifier: &mut Notifier,
    now: Millis,
) -> Vec<Color> {
    match source.palette(image.pixels(), count) {
        Ok(mut colors) => {
            colors.truncate(count);
            log::info!("extracted {} of {} requested colors", colors.len(), count);
            colors
        }
        Err(e) => {
            log::warn!("color extraction failed: {e:?}");
            notifier.notify(PaletteError::ExtractionFailure(String::new()).to_string(), now);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn halves(left: [u8; 4], right: [u8; 4]) -> RgbaImage {
        RgbaImage::from_fn(40, 20, |x, _| if x < 30 { Rgba(left) } else { Rgba(right) })
    }

    #[test]
    fn solid_image_yields_one_color() {
        let img = RgbaImage::from_pixel(16, 16, Rgba([12, 200, 99, 255]));
        let colors = KMeansExtractor::default().palette(&img, 5).unwrap();
        assert_eq!(colors, vec![Color::new(12, 200, 99)]);
    }

    #[test]
    fn few_colors_are_ordered_by_dominance() {
        let img = halves([255, 0, 0, 255], [0, 0, 255, 255]);
        let extractor = KMeansExtractor { quality: 1, ..Default::default() };
        let colors = extractor.palette(&img, 4).unwrap();
        assert_eq!(colors, vec![Color::new(255, 0, 0), Color::new(0, 0, 255)]);
    }

    #[test]
    fn transparent_pixels_are_skipped() {
        let img = halves([255, 0, 0, 255], [0, 255, 0, 0]);
        let extractor = KMeansExtractor { quality: 1, ..Default::default() };
        assert_eq!(extractor.palette(&img, 4).unwrap(), vec![Color::new(255, 0, 0)]);
    }

    #[test]
    fn fully_transparent_image_fails() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0]));
        let err = KMeansExtractor::default().palette(&img, 3).unwrap_err();
        assert!(matches!(err, PaletteError::ExtractionFailure(_)));
    }

    #[test]
    fn clustering_never_exceeds_count() {
        let img = RgbaImage::from_fn(64, 64, |x, y| Rgba([(x * 4) as u8, (y * 4) as u8, 128, 255]));
        let extractor = KMeansExtractor { quality: 1, ..Default::default() };
        let colors = extractor.palette(&img, 5).unwrap();
        assert!(!colors.is_empty());
        assert!(colors.len() <= 5);
    }

    struct Broken;

    impl PaletteSource for Broken {
        fn palette(&self, _: &RgbaImage, _: usize) -> Result<Vec<Color>, PaletteError> {
            Err(PaletteError::ExtractionFailure("canvas has zero size".into()))
        }
    }

    struct Generous;

    impl PaletteSource for Generous {
        fn palette(&self, _: &RgbaImage, _: usize) -> Result<Vec<Color>, PaletteError> {
            Ok((0..10).map(|v| Color::new(v, v, v)).collect())
        }
    }

    fn uploaded() -> UploadedImage {
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255])))
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        crate::loader::decode_scaled(&buf, 800).unwrap()
    }

    #[test]
    fn failure_becomes_empty_palette_and_alert() {
        let mut notifier = Notifier::new(3000);
        let colors = extract_palette(&Broken, &uploaded(), 5, &mut notifier, 0);
        assert!(colors.is_empty());
        let shown = notifier.visible().unwrap();
        assert_eq!(shown.message, "Failed to extract colors. Please try another image.");
        assert_eq!(shown.severity, crate::notify::Severity::Alert);
    }

    #[test]
    fn oversized_results_are_truncated() {
        let mut notifier = Notifier::new(3000);
        let colors = extract_palette(&Generous, &uploaded(), 3, &mut notifier, 0);
        assert_eq!(colors.len(), 3);
        assert!(notifier.visible().is_none());
    }
}
