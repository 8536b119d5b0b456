//! iOS target: patched Info.plist and launch storyboard, an asset catalog
//! with three app icon sets and a splash image set, and iTunes artwork.

use crate::constants::{IOS_TEMPLATE_NAME, WHITE};
use crate::error::Result;
use crate::renderer::{scaled_file_name, ImageRenderer};
use crate::targets::{Context, TargetPreparer};
use log::{debug, info};
use std::io;
use std::path::{Path, PathBuf};

/// Info.plist key naming the launch screen storyboard.
pub const LAUNCH_STORYBOARD_KEY: &str = "UILaunchStoryboardName";

const APP_CENTER_CONFIG: &str = "AppCenter-Config.plist";
const XCASSETS_CONTENTS: &str = "xCassetsContents.json";
const APP_ICONS_CONTENTS: &str = "AppIconsContents.json";

pub struct Ios;

/// One `.appiconset` of the asset catalog and the overlay it is branded with.
struct IconSet {
    name: String,
    overlay: Option<PathBuf>,
}

impl Ios {
    fn template_dir(ctx: &Context) -> PathBuf {
        ctx.assets_dir().join("ios").join("TargetTemplate")
    }

    fn xcassets_path(ctx: &Context, client_path: &Path) -> PathBuf {
        client_path.join(format!("{}Images.xcassets", ctx.client_name()))
    }

    fn splash_imageset_path(ctx: &Context, client_path: &Path) -> PathBuf {
        Self::xcassets_path(ctx, client_path)
            .join(format!("{}SplashScreenImage.imageset", ctx.client_name()))
    }

    fn icon_sets(ctx: &Context) -> Vec<IconSet> {
        let client = ctx.client_name();
        vec![
            IconSet { name: format!("{client}AppIcons.appiconset"), overlay: None },
            IconSet {
                name: format!("{client}AppIconsAlpha.appiconset"),
                overlay: Some(ctx.alpha_overlay()),
            },
            IconSet {
                name: format!("{client}AppIconsBeta.appiconset"),
                overlay: Some(ctx.beta_overlay()),
            },
        ]
    }

    /// Sets the launch storyboard in `<client>-Info.plist` and points the
    /// storyboard at the client's splash image.
    fn patch_templates(&self, ctx: &Context, client_path: &Path) -> Result<()> {
        let client = ctx.client_name();

        let info_plist = ctx.fs.guard().resolve(client_path.join(format!("{client}-Info.plist")))?;
        set_launch_storyboard(&info_plist, &format!("{client}LaunchScreen"))?;
        info!("Updated {LAUNCH_STORYBOARD_KEY} in {}", info_plist.display());

        let storyboard = ctx
            .fs
            .guard()
            .resolve(client_path.join(format!("{client}LaunchScreen.storyboard")))?;
        let content = std::fs::read_to_string(&storyboard)?;
        ctx.fs.write_file(&storyboard, &patch_storyboard(&content, client))?;
        info!("Updated image names in {}", storyboard.display());
        Ok(())
    }

    fn write_splash_contents(&self, ctx: &Context, client_path: &Path) -> Result<()> {
        let contents = splash_contents(ctx.client_name(), &ctx.config.ios.splash_screen_scales);
        let pretty = serde_json::to_string_pretty(&contents)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let path = ctx
            .fs
            .write_file(Self::splash_imageset_path(ctx, client_path).join("Contents.json"), &pretty)?;
        info!("Created Contents.json for splash screen at {}", path.display());
        Ok(())
    }

    fn generate_images(&self, ctx: &Context, client_path: &Path) -> Result<()> {
        let ios = &ctx.config.ios;
        let xcassets = Self::xcassets_path(ctx, client_path);
        let renderer = ImageRenderer::new(&ctx.config, &ctx.fs, ctx.logo_svg())?;

        info!("Generating iOS image assets");
        for icon_set in Self::icon_sets(ctx) {
            debug!("Generating iOS image set for {}", icon_set.name);
            renderer.generate_ios_image_set(xcassets.join(&icon_set.name), icon_set.overlay.as_deref())?;
        }

        debug!("Generating splash screen image set");
        renderer.generate_image_set(
            Self::splash_imageset_path(ctx, client_path),
            &ios.splash_screen_base_image_sizes,
            &ios.splash_screen_scales,
            &[],
            &format!("{}SplashScreenImage", ctx.client_name()),
            false,
        )?;

        debug!("Generating iTunesArtwork images");
        renderer.save_converted_svg(client_path.join("iTunesArtwork"), 512, Some(WHITE), None)?;
        renderer.save_converted_svg(client_path.join("iTunesArtwork@2x"), 1024, Some(WHITE), None)?;
        Ok(())
    }
}

impl TargetPreparer for Ios {
    fn name(&self) -> &'static str {
        "iOS"
    }

    fn client_path(&self, ctx: &Context) -> PathBuf {
        ctx.config.ios.target_configs_path.join(ctx.client_name())
    }

    fn create(&self, ctx: &Context, client_path: &Path) -> Result<()> {
        let client = ctx.client_name();
        let template_dir = Self::template_dir(ctx);

        info!("Creating target directory at {}", client_path.display());
        ctx.fs.create_directory(client_path)?;

        let files_to_copy = [
            (APP_CENTER_CONFIG.to_string(), APP_CENTER_CONFIG.to_string()),
            (format!("{IOS_TEMPLATE_NAME}-Info.plist"), format!("{client}-Info.plist")),
            (
                format!("{IOS_TEMPLATE_NAME}LaunchScreen.storyboard"),
                format!("{client}LaunchScreen.storyboard"),
            ),
        ];
        for (src, dest) in &files_to_copy {
            info!("Copying {src} to {dest}");
            ctx.fs.copy_file(template_dir.join(src), client_path.join(dest))?;
        }
        self.patch_templates(ctx, client_path)?;

        let xcassets = Self::xcassets_path(ctx, client_path);
        info!("Creating xcassets directory at {}", xcassets.display());
        ctx.fs.create_directory(&xcassets)?;
        ctx.fs.copy_file(template_dir.join(XCASSETS_CONTENTS), xcassets.join("Contents.json"))?;

        for icon_set in Self::icon_sets(ctx) {
            let icon_set_path = xcassets.join(&icon_set.name);
            info!("Creating app icons directory at {}", icon_set_path.display());
            ctx.fs.create_directory(&icon_set_path)?;
            ctx.fs
                .copy_file(template_dir.join(APP_ICONS_CONTENTS), icon_set_path.join("Contents.json"))?;
        }

        ctx.fs.create_directory(Self::splash_imageset_path(ctx, client_path))?;
        self.write_splash_contents(ctx, client_path)?;

        self.generate_images(ctx, client_path)
    }

    fn refresh(&self, ctx: &Context, client_path: &Path) -> Result<()> {
        let template_dir = Self::template_dir(ctx);
        let xcassets = Self::xcassets_path(ctx, client_path);

        info!("Updating Contents.json in {}", xcassets.display());
        ctx.fs.update_file(template_dir.join(XCASSETS_CONTENTS), xcassets.join("Contents.json"))?;
        for icon_set in Self::icon_sets(ctx) {
            ctx.fs.update_file(
                template_dir.join(APP_ICONS_CONTENTS),
                xcassets.join(&icon_set.name).join("Contents.json"),
            )?;
        }
        self.write_splash_contents(ctx, client_path)?;
        self.patch_templates(ctx, client_path)?;

        self.generate_images(ctx, client_path)
    }
}

/// Replaces every reference to the template's splash image with the client's.
pub fn patch_storyboard(content: &str, client_name: &str) -> String {
    content.replace(
        &format!("{IOS_TEMPLATE_NAME}SplashScreenImage"),
        &format!("{client_name}SplashScreenImage"),
    )
}

/// Builds the `Contents.json` manifest of the splash image set, one
/// universal entry per configured scale.
pub fn splash_contents(client_name: &str, scales: &[f64]) -> serde_json::Value {
    let stem = format!("{client_name}SplashScreenImage");
    let images: Vec<serde_json::Value> = scales
        .iter()
        .map(|&scale| {
            serde_json::json!({
                "filename": scaled_file_name(&stem, scale),
                "idiom": "universal",
                "scale": format!("{scale}x"),
            })
        })
        .collect();

    serde_json::json!({
        "images": images,
        "info": { "author": "xcode", "version": 1 },
    })
}

/// Rewrites the property list at `path` with [`LAUNCH_STORYBOARD_KEY`] set to `storyboard`.
pub fn set_launch_storyboard(path: &Path, storyboard: &str) -> Result<()> {
    let mut value = plist::Value::from_file(path)?;
    let dict = value.as_dictionary_mut().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{} does not contain a dictionary", path.display()),
        )
    })?;
    dict.insert(LAUNCH_STORYBOARD_KEY.to_string(), plist::Value::String(storyboard.to_string()));
    value.to_file_xml(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_patch_storyboard_replaces_all_occurrences() {
        let content = r#"<image name="NextAppSplashScreenImage"/><imageReference image="NextAppSplashScreenImage"/>"#;
        assert_eq!(
            patch_storyboard(content, "Acme"),
            r#"<image name="AcmeSplashScreenImage"/><imageReference image="AcmeSplashScreenImage"/>"#
        );
    }

    #[test]
    fn test_splash_contents() {
        let contents = splash_contents("Acme", &[1.0, 2.0, 3.0]);
        assert_eq!(contents["images"].as_array().unwrap().len(), 3);
        assert_eq!(contents["images"][0]["filename"], "AcmeSplashScreenImage.png");
        assert_eq!(contents["images"][2]["filename"], "AcmeSplashScreenImage@3x.png");
        assert_eq!(contents["images"][1]["scale"], "2x");
        assert_eq!(contents["images"][1]["idiom"], "universal");
        assert_eq!(contents["info"]["author"], "xcode");
        assert_eq!(contents["info"]["version"], 1);
    }

    #[test]
    fn test_splash_contents_fractional_scale() {
        let contents = splash_contents("Acme", &[1.0, 1.5]);
        assert_eq!(contents["images"][1]["filename"], "AcmeSplashScreenImage@1.5x.png");
        assert_eq!(contents["images"][1]["scale"], "1.5x");
    }

    #[test]
    fn test_set_launch_storyboard() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Acme-Info.plist");
        std::fs::write(
            &path,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>CFBundleName</key>
	<string>NextApp</string>
	<key>UILaunchStoryboardName</key>
	<string>NextAppLaunchScreen</string>
</dict>
</plist>
"#,
        )
        .unwrap();

        set_launch_storyboard(&path, "AcmeLaunchScreen").unwrap();

        let value = plist::Value::from_file(&path).unwrap();
        let dict = value.as_dictionary().unwrap();
        assert_eq!(
            dict.get(LAUNCH_STORYBOARD_KEY).and_then(|v| v.as_string()),
            Some("AcmeLaunchScreen")
        );
        assert_eq!(dict.get("CFBundleName").and_then(|v| v.as_string()), Some("NextApp"));
    }

    #[test]
    fn test_set_launch_storyboard_rejects_non_dictionary() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Broken-Info.plist");
        std::fs::write(
            &path,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<array><string>x</string></array>
</plist>
"#,
        )
        .unwrap();

        assert!(set_launch_storyboard(&path, "AcmeLaunchScreen").is_err());
    }
}
