use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{imageops, RgbImage};

use lumamark_core::{Field, WatermarkConfig};

#[derive(Parser)]
#[command(name = "lumamark", about = "Image watermarking tool", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Embed a text message into an image
    Embed {
        /// Input image file
        #[arg(short, long)]
        input: PathBuf,

        /// Output PNG file (default: "<input>-marked.png")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Message to embed (printable ASCII)
        #[arg(short, long)]
        message: String,

        /// Embedding strength
        #[arg(short, long, default_value = "10")]
        strength: i32,
    },
    /// Detect a message from an original/marked image pair
    Detect {
        /// Identifier used to name the result file
        #[arg(long)]
        id: String,

        /// Original (unmarked) image file
        #[arg(long)]
        original: PathBuf,

        /// Marked image file
        #[arg(long)]
        marked: PathBuf,

        /// Directory the result record is written to
        #[arg(long, default_value = "/tmp")]
        out_dir: PathBuf,

        /// Detection threshold on the peak-to-RMS ratio
        #[arg(long, default_value = "6.0")]
        threshold: f64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Embed {
            input,
            output,
            message,
            strength,
        } => {
            let config = WatermarkConfig::default();
            let img = image::open(&input)?.to_rgb8();
            let mut luma = luma_plane(&img);

            eprintln!(
                "Embedding {} character(s) into {} ({}x{})...",
                message.len(),
                input.display(),
                img.width(),
                img.height()
            );

            let summary = lumamark_core::embed(&mut luma, &message, strength as f64, &config)?;
            if message.len() > summary.prime / 8 {
                eprintln!(
                    "Warning: {} characters share one {}x{} spectrum region; long messages \
                     weaken each other at detection time.",
                    message.len(),
                    summary.prime,
                    summary.prime
                );
            }

            let marked = merge_luma(&img, &luma);
            let out_path = output.unwrap_or_else(|| marked_path(&input));
            write_png(&out_path, &marked)?;

            eprintln!("Marked image written to {}", out_path.display());
            println!(
                "Embedded {} character(s) at pattern size {}",
                summary.characters, summary.prime
            );
        }
        Command::Detect {
            id,
            original,
            marked,
            out_dir,
            threshold,
        } => {
            let config = WatermarkConfig {
                threshold,
                ..WatermarkConfig::default()
            };
            let original_img = image::open(&original)?.to_rgb8();
            let mut marked_img = image::open(&marked)?.to_rgb8();

            // Extraction needs pixel-exact correspondence; bring the
            // marked copy back onto the original's pixel grid.
            if marked_img.dimensions() != original_img.dimensions() {
                eprintln!(
                    "Warning: marked image is {}x{}, resizing to match original {}x{}.",
                    marked_img.width(),
                    marked_img.height(),
                    original_img.width(),
                    original_img.height()
                );
                marked_img = imageops::resize(
                    &marked_img,
                    original_img.width(),
                    original_img.height(),
                    imageops::FilterType::Lanczos3,
                );
            }

            eprintln!(
                "Detecting watermark in {} against {}...",
                marked.display(),
                original.display()
            );

            let original_luma = luma_plane(&original_img);
            let marked_luma = luma_plane(&marked_img);
            let report = lumamark_core::detect(&original_luma, &marked_luma, &config)?;

            for record in &report.accepted {
                eprintln!(
                    "  family {}: shift {} (peak {:.2} at {},{}; peak2rms {:.2})",
                    record.family,
                    record.shift,
                    record.peak,
                    record.peak_row,
                    record.peak_col,
                    record.peak_to_rms
                );
            }
            eprintln!(
                "  tested {} families, accepted {}",
                report.families_tested,
                report.accepted.len()
            );

            let result_path = out_dir.join(format!("{id}.json"));
            let json = serde_json::to_string_pretty(&report)?;
            std::fs::write(&result_path, json)?;
            eprintln!("Result record written to {}", result_path.display());

            println!("Message:    {}", report.message);
            if let Some(confidence) = report.confidence {
                println!("Confidence: {confidence:.4}");
            }
        }
    }

    Ok(())
}

fn marked_path(input: &std::path::Path) -> PathBuf {
    let mut name = input.file_stem().unwrap_or_default().to_os_string();
    name.push("-marked.png");
    input.with_file_name(name)
}

/// Normalized brightness plane of an image: the HSV value channel,
/// one cell per pixel in [0, 1].
fn luma_plane(img: &RgbImage) -> Field {
    let (width, height) = img.dimensions();
    let data = img
        .pixels()
        .map(|px| {
            let [r, g, b] = px.0;
            r.max(g).max(b) as f64 / 255.0
        })
        .collect();
    Field::from_vec(height as usize, width as usize, data).expect("pixel count matches dimensions")
}

/// Re-merge a (possibly modified) brightness plane into an image,
/// keeping each pixel's hue and saturation. Out-of-range brightness is
/// clamped back to the 8-bit range.
fn merge_luma(img: &RgbImage, luma: &Field) -> RgbImage {
    let (width, height) = img.dimensions();
    let mut out = RgbImage::new(width, height);
    for (x, y, px) in img.enumerate_pixels() {
        let [r, g, b] = px.0;
        let (h, s, _) = rgb_to_hsv(r, g, b);
        let v = (luma.get(y as usize, x as usize) * 255.0)
            .round()
            .clamp(0.0, 255.0);
        out.put_pixel(x, y, image::Rgb(hsv_to_rgb(h, s, v)));
    }
    out
}

/// RGB -> HSV with hue in degrees, saturation in [0, 1] and value on
/// the 8-bit scale.
fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = r as f64;
    let g = g as f64;
    let b = b as f64;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let s = if max == 0.0 { 0.0 } else { delta / max };
    (h, s, max)
}

fn hsv_to_rgb(h: f64, s: f64, v: f64) -> [u8; 3] {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    [
        (r + m).round().clamp(0.0, 255.0) as u8,
        (g + m).round().clamp(0.0, 255.0) as u8,
        (b + m).round().clamp(0.0, 255.0) as u8,
    ]
}

/// Write a lossless PNG at maximal compression effort.
fn write_png(path: &std::path::Path, img: &RgbImage) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(path)?;
    let encoder = PngEncoder::new_with_quality(
        BufWriter::new(file),
        CompressionType::Best,
        PngFilter::Adaptive,
    );
    img.write_with_encoder(encoder)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsv_round_trip_preserves_pixels() {
        for rgb in [[0u8, 0, 0], [255, 255, 255], [200, 30, 90], [17, 120, 250]] {
            let (h, s, v) = rgb_to_hsv(rgb[0], rgb[1], rgb[2]);
            assert_eq!(hsv_to_rgb(h, s, v), rgb, "round trip failed for {rgb:?}");
        }
    }

    #[test]
    fn value_channel_is_max_component() {
        let (_, _, v) = rgb_to_hsv(10, 200, 42);
        assert_eq!(v, 200.0);
    }

    #[test]
    fn luma_plane_matches_dimensions() {
        let img = RgbImage::from_fn(5, 3, |x, y| image::Rgb([(x * 40) as u8, (y * 70) as u8, 0]));
        let luma = luma_plane(&img);
        assert_eq!((luma.rows(), luma.cols()), (3, 5));
        assert!((luma.get(2, 4) - 160.0 / 255.0).abs() < 1e-12);
    }

    #[test]
    fn merge_with_unchanged_luma_is_identity() {
        let img = RgbImage::from_fn(4, 4, |x, y| {
            image::Rgb([(x * 60 + 10) as u8, (y * 50 + 5) as u8, 128])
        });
        let merged = merge_luma(&img, &luma_plane(&img));
        assert_eq!(img, merged);
    }

    #[test]
    fn default_output_name() {
        let out = marked_path(std::path::Path::new("/photos/cat.png"));
        assert_eq!(out, PathBuf::from("/photos/cat-marked.png"));
    }

    #[test]
    fn png_write_is_lossless() {
        let img = RgbImage::from_fn(8, 6, |x, y| {
            image::Rgb([(x * 30) as u8, (y * 40) as u8, ((x + y) * 17) as u8])
        });
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let path = dir.path().join("out.png");
        write_png(&path, &img).unwrap();
        let back = image::open(&path).unwrap().to_rgb8();
        assert_eq!(back, img);
    }
}
