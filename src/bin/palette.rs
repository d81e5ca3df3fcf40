use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use image::ImageFormat;
use palette_extractor_wasm::{AppConfig, Color, ColorFormat, KMeansExtractor};
use palette_extractor_wasm::extract::PaletteSource;
use palette_extractor_wasm::loader::decode_scaled;
use palette_extractor_wasm::validate::validate_file;
use serde::Serialize;

/// Extract dominant-color palettes from images.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths (JPEG, PNG or GIF)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Number of colors to extract
    #[arg(short = 'k', long)]
    n_colors: Option<usize>,

    /// Label format: hex, rgb or hsl
    #[arg(short, long, default_value = "hex", value_parser = parse_format)]
    format: ColorFormat,

    /// Preview width cap before extraction
    #[arg(short = 'w', long)]
    max_width: Option<u32>,

    /// Write the scaled JPEG preview of each input into this directory
    #[arg(short = 'p', long)]
    preview_dir: Option<PathBuf>,

    /// JSON file overriding the default limits
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print one JSON object per input instead of plain labels
    #[arg(long)]
    json: bool,
}

fn parse_format(s: &str) -> Result<ColorFormat, String> {
    s.parse().map_err(|e: palette_extractor_wasm::PaletteError| e.to_string())
}

#[derive(Serialize)]
struct Report<'a> {
    input: &'a Path,
    width: u32,
    height: u32,
    colors: Vec<SwatchReport>,
}

#[derive(Serialize)]
struct SwatchReport {
    rgb: [u8; 3],
    label: String,
}

fn media_type(path: &Path) -> &'static str {
    ImageFormat::from_path(path)
        .map(|f| f.to_mime_type())
        .unwrap_or("application/octet-stream")
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            AppConfig::from_json(&json)?
        }
        None => AppConfig::default(),
    };
    if let Some(width) = args.max_width {
        config.max_image_width = width;
    }
    config.validate()?;
    let n_colors = config.clamp_color_count(args.n_colors.unwrap_or(config.default_color_count));
    let extractor = KMeansExtractor::default();

    for input in &args.inputs {
        let size = fs::metadata(input)
            .with_context(|| format!("reading {}", input.display()))?
            .len();
        validate_file(media_type(input), size, &config)
            .with_context(|| format!("{} rejected", input.display()))?;

        let bytes = read_input(input)?;
        let image = decode_scaled(&bytes, config.max_image_width)
            .with_context(|| format!("decoding {}", input.display()))?;
        let mut colors: Vec<Color> = extractor
            .palette(image.pixels(), n_colors)
            .with_context(|| format!("extracting palette from {}", input.display()))?;
        colors.truncate(n_colors);

        if let Some(dir) = &args.preview_dir {
            fs::create_dir_all(dir)?;
            let stem = input.file_stem().unwrap_or_default().to_string_lossy();
            let out_path = dir.join(format!("{stem}.jpg"));
            fs::write(&out_path, image.encode_preview()?)?;
            log::info!("preview saved to {}", out_path.display());
        }

        if args.json {
            let report = Report {
                input,
                width: image.width(),
                height: image.height(),
                colors: colors
                    .iter()
                    .map(|c| SwatchReport { rgb: [c.r, c.g, c.b], label: c.format(args.format) })
                    .collect(),
            };
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!("{}:", input.display());
            for color in &colors {
                println!("  {}", color.format(args.format));
            }
        }
    }

    Ok(())
}
