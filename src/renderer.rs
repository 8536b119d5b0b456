//! Logo rasterization for every platform's icon and splash-screen sizes.
//! The source SVG is parsed once by `usvg`, rendered with `resvg` onto a
//! `tiny-skia` pixmap, then handed to the `image` crate for overlay
//! compositing and PNG encoding.

use crate::config::{Config, IosImageSize};
use crate::constants::WHITE;
use crate::error::{Error, Result};
use crate::fileops::FileOps;
use image::{imageops, ImageFormat, RgbaImage};
use log::{debug, error};
use resvg::tiny_skia::{Color, Pixmap, Transform};
use resvg::usvg;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Prefix of the generic image set when the caller has no better name.
pub const DEFAULT_IMAGE_PREFIX: &str = "logo_image_";

/// File name of the Android splash image inside each density bucket.
pub const DEFAULT_SPLASH_NAME: &str = "splashscreen_image.png";

/// The App Store marketing icon entry; rendered without background or overlay.
pub const MARKETING_ICON_SIZE: u32 = 1024;

/// One output file of a batch generator: its name and its square raster dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedImage {
    pub file_name: String,
    pub pixels: u32,
    /// Whether the platform's background and overlay apply to this image.
    pub decorated: bool,
}

/// Lists the files of a generic multi-resolution image set.
///
/// For each base size, one file per scale (only scale 1 for excluded sizes),
/// named `{prefix}[{size}][@{scale}x].png` and rendered at `size * scale`
/// rounded to whole pixels.
///
/// # Errors
/// * `Error::ConversionFailed` if a scaled size is not a positive pixel count
pub fn plan_image_set(
    base_sizes: &[u32],
    scales: &[f64],
    excluded_sizes: &[u32],
    prefix: &str,
    include_size_in_name: bool,
) -> Result<Vec<PlannedImage>> {
    let mut planned = Vec::new();
    for &base_size in base_sizes {
        let mut stem = prefix.to_string();
        if include_size_in_name {
            stem.push_str(&base_size.to_string());
        }

        let scales_to_use: &[f64] = if excluded_sizes.contains(&base_size) { &[1.0] } else { scales };

        for &scale in scales_to_use {
            planned.push(PlannedImage {
                file_name: scaled_file_name(&stem, scale),
                pixels: scaled_pixels(base_size, scale)?,
                decorated: false,
            });
        }
    }
    Ok(planned)
}

/// Lists the files of one iOS app icon set.
///
/// # Errors
/// * `Error::ConversionFailed` if `size * scale` does not fit in a pixel count
pub fn plan_ios_image_set(sizes: &[IosImageSize]) -> Result<Vec<PlannedImage>> {
    sizes
        .iter()
        .map(|&IosImageSize { size, scale }| {
            let pixels = size.checked_mul(scale).ok_or_else(|| {
                Error::ConversionFailed(format!("icon size {size} at scale {scale} is too large"))
            })?;
            let planned = if size == MARKETING_ICON_SIZE {
                PlannedImage {
                    file_name: format!("MarketingIcon{MARKETING_ICON_SIZE}.png"),
                    pixels,
                    decorated: false,
                }
            } else {
                PlannedImage { file_name: format!("Icon-{size}@{scale}x.png"), pixels, decorated: true }
            };
            Ok(planned)
        })
        .collect()
}

/// `{stem}.png` at scale 1, `{stem}@{scale}x.png` otherwise, with the scale
/// in its shortest form (`@2x`, `@1.5x`).
pub fn scaled_file_name(stem: &str, scale: f64) -> String {
    if scale == 1.0 {
        format!("{stem}.png")
    } else {
        format!("{stem}@{scale}x.png")
    }
}

fn scaled_pixels(base_size: u32, scale: f64) -> Result<u32> {
    let pixels = (f64::from(base_size) * scale).round();
    if !pixels.is_finite() || pixels < 1.0 || pixels > f64::from(u32::MAX) {
        return Err(Error::ConversionFailed(format!(
            "image size {base_size} at scale {scale} is not a valid pixel size"
        )));
    }
    Ok(pixels as u32)
}

/// Parses `#rgb` or `#rrggbb` into an opaque colour.
pub fn parse_hex_color(hex: &str) -> Result<Color> {
    let invalid = || Error::InvalidColor(hex.to_string());
    let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    let (r, g, b) = match digits.len() {
        3 => {
            let expand = |i: usize| channel(digits[i..i + 1].repeat(2).as_str());
            (expand(0)?, expand(1)?, expand(2)?)
        }
        6 => (channel(&digits[0..2])?, channel(&digits[2..4])?, channel(&digits[4..6])?),
        _ => return Err(invalid()),
    };
    Ok(Color::from_rgba8(r, g, b, 255))
}

/// Renders the shared logo for one preparation or update run.
pub struct ImageRenderer<'a> {
    config: &'a Config,
    fs: &'a FileOps,
    tree: usvg::Tree,
}

impl<'a> ImageRenderer<'a> {
    /// Loads and parses the source SVG.
    ///
    /// # Errors
    /// * `Error::FileNotFound` if `svg_path` is not a readable regular file
    /// * `Error::ConversionFailed` if the file is not a valid SVG
    pub fn new<P: AsRef<Path>>(config: &'a Config, fs: &'a FileOps, svg_path: P) -> Result<Self> {
        let svg_path = fs.guard().resolve(svg_path)?;
        let data = read_regular_file(&svg_path)?;

        let mut options = usvg::Options {
            resources_dir: svg_path.parent().map(Path::to_path_buf),
            ..usvg::Options::default()
        };
        Arc::make_mut(&mut options.fontdb).load_system_fonts();

        let tree = usvg::Tree::from_data(&data, &options)
            .map_err(|e| Error::ConversionFailed(e.to_string()))?;
        debug!("Loaded source image {}", svg_path.display());

        Ok(Self { config, fs, tree })
    }

    /// Rasterizes the logo at `size × size`.
    ///
    /// # Arguments
    /// * `size` - Width and height of the output in pixels
    /// * `background` - Hex colour to flatten transparency against
    /// * `overlay` - Raster image scaled to cover the same box and composited centred on top
    ///
    /// Non-square sources keep their aspect ratio: they are scaled to cover
    /// the square and the overflow is cropped evenly on both sides.
    pub fn convert(
        &self,
        size: u32,
        background: Option<&str>,
        overlay: Option<&Path>,
    ) -> Result<RgbaImage> {
        let mut pixmap = Pixmap::new(size, size)
            .ok_or_else(|| Error::ConversionFailed(format!("cannot allocate {size}x{size} image")))?;

        if let Some(hex) = background {
            pixmap.fill(parse_hex_color(hex)?);
        }

        // cover: scale uniformly to fill the square, crop the overflow evenly
        let svg_size = self.tree.size();
        let side = size as f32;
        let scale = side / svg_size.width().min(svg_size.height());
        let transform = Transform::from_row(
            scale,
            0.0,
            0.0,
            scale,
            (side - svg_size.width() * scale) / 2.0,
            (side - svg_size.height() * scale) / 2.0,
        );
        resvg::render(&self.tree, transform, &mut pixmap.as_mut());

        let mut raster = to_rgba_image(&pixmap)?;

        if let Some(overlay_path) = overlay {
            let overlay_path = self.fs.guard().resolve(overlay_path)?;
            let bytes = read_regular_file(&overlay_path)?;
            let overlay = image::load_from_memory(&bytes)
                .map_err(|e| Error::ConversionFailed(e.to_string()))?
                .resize_to_fill(size, size, imageops::FilterType::Lanczos3)
                .to_rgba8();

            let x = (i64::from(size) - i64::from(overlay.width())) / 2;
            let y = (i64::from(size) - i64::from(overlay.height())) / 2;
            imageops::overlay(&mut raster, &overlay, x, y);
        }

        Ok(raster)
    }

    /// Converts the logo and writes it as PNG, creating the output directory if needed.
    pub fn save_converted_svg<P: AsRef<Path>>(
        &self,
        output_path: P,
        size: u32,
        background: Option<&str>,
        overlay: Option<&Path>,
    ) -> Result<PathBuf> {
        let output_path = self.fs.guard().resolve(output_path)?;
        if let Some(parent) = output_path.parent() {
            if !self.fs.folder_exists(parent)? {
                self.fs.create_directory(parent)?;
            }
        }

        let raster = self.convert(size, background, overlay)?;
        save_png(&raster, &output_path)?;
        Ok(output_path)
    }

    /// Writes a generic multi-resolution image set into `output_path`.
    /// See [`plan_image_set`] for the naming rules.
    pub fn generate_image_set<P: AsRef<Path>>(
        &self,
        output_path: P,
        base_sizes: &[u32],
        scales: &[f64],
        excluded_sizes: &[u32],
        prefix: &str,
        include_size_in_name: bool,
    ) -> Result<Vec<PathBuf>> {
        let output_path = output_path.as_ref();
        self.ensure_dir(output_path)?;

        let planned =
            plan_image_set(base_sizes, scales, excluded_sizes, prefix, include_size_in_name)?;
        planned
            .iter()
            .map(|image| self.write_planned(output_path, image, None, None))
            .collect()
    }

    /// Writes one iOS app icon set, one file per configured `iosImageSizes` entry.
    ///
    /// Regular icons are flattened on white and get `overlay`; the marketing
    /// icon gets neither.
    pub fn generate_ios_image_set<P: AsRef<Path>>(
        &self,
        output_path: P,
        overlay: Option<&Path>,
    ) -> Result<Vec<PathBuf>> {
        let output_path = output_path.as_ref();
        self.ensure_dir(output_path)?;

        plan_ios_image_set(&self.config.ios.ios_image_sizes)?
            .iter()
            .map(|image| {
                if image.decorated {
                    self.write_planned(output_path, image, Some(WHITE), overlay)
                } else {
                    self.write_planned(output_path, image, None, None)
                }
            })
            .collect()
    }

    /// Writes one splash image per Android density bucket, each in its own
    /// `output_path/<bucket>/` directory.
    pub fn generate_android_image_set<P: AsRef<Path>>(
        &self,
        output_path: P,
        splash_image_name: &str,
    ) -> Result<Vec<PathBuf>> {
        let output_path = output_path.as_ref();
        self.ensure_dir(output_path)?;

        let mut written = Vec::new();
        for (bucket, &size) in &self.config.android.android_sizes {
            let bucket_path = output_path.join(bucket);
            self.ensure_dir(&bucket_path)?;

            let planned =
                PlannedImage { file_name: splash_image_name.to_string(), pixels: size, decorated: false };
            written.push(self.write_planned(&bucket_path, &planned, None, None)?);
        }
        Ok(written)
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !self.fs.folder_exists(path)? {
            self.fs.create_directory(path)?;
        }
        Ok(())
    }

    fn write_planned(
        &self,
        dir: &Path,
        planned: &PlannedImage,
        background: Option<&str>,
        overlay: Option<&Path>,
    ) -> Result<PathBuf> {
        let target = self.fs.guard().resolve(dir.join(&planned.file_name))?;
        let raster = self.convert(planned.pixels, background, overlay).map_err(|e| {
            error!("Failed to write file: {}. Error: {e}", planned.file_name);
            e
        })?;
        save_png(&raster, &target)?;
        Ok(target)
    }
}

fn read_regular_file(path: &Path) -> Result<Vec<u8>> {
    let not_found = || Error::FileNotFound { path: path.display().to_string() };
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => std::fs::read(path).map_err(|_| not_found()),
        _ => Err(not_found()),
    }
}

/// Converts tiny-skia's premultiplied pixels into a straight-alpha image.
fn to_rgba_image(pixmap: &Pixmap) -> Result<RgbaImage> {
    let data: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let color = pixel.demultiply();
            [color.red(), color.green(), color.blue(), color.alpha()]
        })
        .collect();

    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
        .ok_or_else(|| Error::ConversionFailed("pixel buffer size mismatch".to_string()))
}

fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| Error::ConversionFailed(e.to_string()))?;
    debug!("Wrote image {} ({}x{})", path.display(), image.width(), image.height());
    Ok(())
}
