use appforge::config::{parse_config, Config};
use appforge::error::Error;
use appforge::fileops::FileOps;
use appforge::renderer::{ImageRenderer, DEFAULT_SPLASH_NAME};
use image::{Rgba, RgbaImage};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A red disc on a transparent 100x100 canvas.
const LOGO: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100" viewBox="0 0 100 100">
  <circle cx="50" cy="50" r="30" fill="#ff0000"/>
</svg>"##;

/// A red circle centred on a 200x100 canvas, touching the top and bottom edges.
const WIDE_LOGO: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100" viewBox="0 0 200 100">
  <circle cx="100" cy="50" r="50" fill="#ff0000"/>
</svg>"##;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);

fn config() -> Config {
    let json = r#"{
        "clientName": "Acme",
        "react": {
            "targetConfigsPath": "rn",
            "imagesPath": "images",
            "imageBaseSizes": [48, 96],
            "imageScales": [1, 2]
        },
        "android": {
            "targetConfigsPath": "android",
            "androidSizes": { "drawable-mdpi": 24, "drawable-xhdpi": 48 }
        },
        "ios": {
            "targetConfigsPath": "ios",
            "splashScreenBaseImageSizes": [20],
            "splashScreenScales": [1, 2, 3],
            "iosImageSizes": [{ "size": 1024, "scale": 1 }, { "size": 60, "scale": 2 }]
        }
    }"#;
    parse_config(json, Path::new("config.json")).unwrap()
}

struct Assets {
    dir: TempDir,
    logo: PathBuf,
    overlay: PathBuf,
}

fn assets() -> Assets {
    let dir = TempDir::new().unwrap();
    let logo = dir.path().join("logo_image.svg");
    fs::write(&logo, LOGO).unwrap();

    let overlay = dir.path().join("aoverlay.png");
    RgbaImage::from_pixel(8, 8, BLUE).save(&overlay).unwrap();

    Assets { dir, logo, overlay }
}

fn file_names(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

fn open(path: &Path) -> RgbaImage {
    image::load_from_memory(&fs::read(path).unwrap()).unwrap().to_rgba8()
}

/// Resampled overlays may be off by a rounding step.
fn assert_close(actual: &Rgba<u8>, expected: Rgba<u8>) {
    for (a, e) in actual.0.iter().zip(expected.0) {
        assert!(a.abs_diff(e) <= 2, "expected {expected:?}, got {actual:?}");
    }
}

#[test]
fn test_missing_source_image() {
    let config = config();
    let fs_ops = FileOps::default();
    let result = ImageRenderer::new(&config, &fs_ops, "/definitely/not/here/logo.svg");
    assert!(matches!(result, Err(Error::FileNotFound { .. })));
}

#[test]
fn test_invalid_source_image() {
    let assets = assets();
    let broken = assets.dir.path().join("broken.svg");
    fs::write(&broken, "this is not svg").unwrap();

    let config = config();
    let fs_ops = FileOps::default();
    let result = ImageRenderer::new(&config, &fs_ops, &broken);
    assert!(matches!(result, Err(Error::ConversionFailed(_))));
}

#[test]
fn test_convert_plain_keeps_transparency() {
    let assets = assets();
    let config = config();
    let fs_ops = FileOps::default();
    let renderer = ImageRenderer::new(&config, &fs_ops, &assets.logo).unwrap();

    let raster = renderer.convert(64, None, None).unwrap();
    assert_eq!(raster.dimensions(), (64, 64));
    assert_eq!(raster.get_pixel(0, 0)[3], 0);
    assert_eq!(*raster.get_pixel(32, 32), RED);
}

#[test]
fn test_convert_flattens_on_background() {
    let assets = assets();
    let config = config();
    let fs_ops = FileOps::default();
    let renderer = ImageRenderer::new(&config, &fs_ops, &assets.logo).unwrap();

    let raster = renderer.convert(40, Some("#ffffff"), None).unwrap();
    assert_eq!(*raster.get_pixel(0, 0), WHITE);
    assert_eq!(*raster.get_pixel(20, 20), RED);
    assert!(raster.pixels().all(|p| p[3] == 255));

    assert!(matches!(
        renderer.convert(40, Some("white"), None),
        Err(Error::InvalidColor(_))
    ));
}

#[test]
fn test_convert_composites_overlay() {
    let assets = assets();
    let config = config();
    let fs_ops = FileOps::default();
    let renderer = ImageRenderer::new(&config, &fs_ops, &assets.logo).unwrap();

    let raster = renderer.convert(32, None, Some(assets.overlay.as_path())).unwrap();
    assert_eq!(raster.dimensions(), (32, 32));
    assert_close(raster.get_pixel(16, 16), BLUE);

    let missing = assets.dir.path().join("missing.png");
    assert!(matches!(
        renderer.convert(32, None, Some(missing.as_path())),
        Err(Error::FileNotFound { .. })
    ));
}

#[test]
fn test_save_converted_svg_creates_directory() {
    let assets = assets();
    let config = config();
    let fs_ops = FileOps::default();
    let renderer = ImageRenderer::new(&config, &fs_ops, &assets.logo).unwrap();

    let output = assets.dir.path().join("out/acme/iTunesArtwork");
    renderer.save_converted_svg(&output, 50, Some("#ffffff"), None).unwrap();

    let saved = open(&output);
    assert_eq!(saved.dimensions(), (50, 50));
    assert_eq!(*saved.get_pixel(0, 0), WHITE);
}

#[test]
fn test_generate_image_set_with_exclusions() {
    let assets = assets();
    let config = config();
    let fs_ops = FileOps::default();
    let renderer = ImageRenderer::new(&config, &fs_ops, &assets.logo).unwrap();

    let output = assets.dir.path().join("images");
    let written = renderer
        .generate_image_set(&output, &[48, 96], &[1.0, 2.0], &[96], "logo_", true)
        .unwrap();

    assert_eq!(written.len(), 3);
    let expected: BTreeSet<String> = ["logo_48.png", "logo_48@2x.png", "logo_96.png"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(file_names(&output), expected);

    assert_eq!(open(&output.join("logo_48.png")).dimensions(), (48, 48));
    assert_eq!(open(&output.join("logo_48@2x.png")).dimensions(), (96, 96));
    assert_eq!(open(&output.join("logo_96.png")).dimensions(), (96, 96));
}

#[test]
fn test_generate_ios_image_set() {
    let assets = assets();
    let config = config();
    let fs_ops = FileOps::default();
    let renderer = ImageRenderer::new(&config, &fs_ops, &assets.logo).unwrap();

    let output = assets.dir.path().join("AcmeAppIconsAlpha.appiconset");
    renderer.generate_ios_image_set(&output, Some(assets.overlay.as_path())).unwrap();

    let expected: BTreeSet<String> =
        ["MarketingIcon1024.png", "Icon-60@2x.png"].iter().map(|s| s.to_string()).collect();
    assert_eq!(file_names(&output), expected);

    // the marketing icon ignores background and overlay
    let marketing = open(&output.join("MarketingIcon1024.png"));
    assert_eq!(marketing.dimensions(), (1024, 1024));
    assert_eq!(marketing.get_pixel(0, 0)[3], 0);
    assert_eq!(*marketing.get_pixel(512, 512), RED);

    let icon = open(&output.join("Icon-60@2x.png"));
    assert_eq!(icon.dimensions(), (120, 120));
    assert_close(icon.get_pixel(60, 60), BLUE);
}

#[test]
fn test_generate_ios_image_set_without_overlay_is_opaque() {
    let assets = assets();
    let config = config();
    let fs_ops = FileOps::default();
    let renderer = ImageRenderer::new(&config, &fs_ops, &assets.logo).unwrap();

    let output = assets.dir.path().join("AcmeAppIcons.appiconset");
    renderer.generate_ios_image_set(&output, None).unwrap();

    let icon = open(&output.join("Icon-60@2x.png"));
    assert_eq!(*icon.get_pixel(0, 0), WHITE);
    assert_eq!(*icon.get_pixel(60, 60), RED);
}

#[test]
fn test_generate_android_image_set() {
    let assets = assets();
    let config = config();
    let fs_ops = FileOps::default();
    let renderer = ImageRenderer::new(&config, &fs_ops, &assets.logo).unwrap();

    let res = assets.dir.path().join("res");
    renderer.generate_android_image_set(&res, DEFAULT_SPLASH_NAME).unwrap();

    let buckets: BTreeSet<String> =
        ["drawable-mdpi", "drawable-xhdpi"].iter().map(|s| s.to_string()).collect();
    assert_eq!(file_names(&res), buckets);
    assert_eq!(open(&res.join("drawable-mdpi/splashscreen_image.png")).dimensions(), (24, 24));
    assert_eq!(open(&res.join("drawable-xhdpi/splashscreen_image.png")).dimensions(), (48, 48));
}

#[test]
fn test_convert_wide_logo_keeps_aspect_ratio() {
    let assets = assets();
    let wide = assets.dir.path().join("wide.svg");
    fs::write(&wide, WIDE_LOGO).unwrap();

    let config = config();
    let fs_ops = FileOps::default();
    let renderer = ImageRenderer::new(&config, &fs_ops, &wide).unwrap();

    // the circle fills the whole square once the empty sides are cropped away
    let raster = renderer.convert(100, None, None).unwrap();
    assert_eq!(raster.dimensions(), (100, 100));
    assert_eq!(*raster.get_pixel(10, 50), RED);
    assert_eq!(*raster.get_pixel(89, 50), RED);
    assert_eq!(*raster.get_pixel(50, 2), RED);
    assert_eq!(raster.get_pixel(1, 1)[3], 0);
    assert_eq!(raster.get_pixel(98, 98)[3], 0);
}

#[test]
fn test_convert_wide_overlay_is_cropped_not_squeezed() {
    let assets = assets();
    let config = config();
    let fs_ops = FileOps::default();
    let renderer = ImageRenderer::new(&config, &fs_ops, &assets.logo).unwrap();

    // 64x16 stripes: red, then a blue middle band, then green
    let overlay_path = assets.dir.path().join("stripes.png");
    let overlay = RgbaImage::from_fn(64, 16, |x, _| match x {
        0..=23 => RED,
        24..=39 => BLUE,
        _ => GREEN,
    });
    overlay.save(&overlay_path).unwrap();

    // covering 32x32 keeps only the middle band
    let raster = renderer.convert(32, None, Some(overlay_path.as_path())).unwrap();
    assert_close(raster.get_pixel(8, 16), BLUE);
    assert_close(raster.get_pixel(24, 16), BLUE);
}

#[test]
fn test_generate_image_set_fractional_scale() {
    let assets = assets();
    let config = config();
    let fs_ops = FileOps::default();
    let renderer = ImageRenderer::new(&config, &fs_ops, &assets.logo).unwrap();

    let output = assets.dir.path().join("images");
    renderer.generate_image_set(&output, &[48], &[1.0, 1.5], &[], "logo_", true).unwrap();

    let expected: BTreeSet<String> =
        ["logo_48.png", "logo_48@1.5x.png"].iter().map(|s| s.to_string()).collect();
    assert_eq!(file_names(&output), expected);
    assert_eq!(open(&output.join("logo_48@1.5x.png")).dimensions(), (72, 72));
}

#[test]
fn test_generate_image_set_rejects_overflowing_size() {
    let assets = assets();
    let config = config();
    let fs_ops = FileOps::default();
    let renderer = ImageRenderer::new(&config, &fs_ops, &assets.logo).unwrap();

    let output = assets.dir.path().join("images");
    let result = renderer.generate_image_set(&output, &[70000], &[70000.0], &[], "x", true);
    assert!(matches!(result, Err(Error::ConversionFailed(_))));
    assert!(file_names(&output).is_empty());
}
