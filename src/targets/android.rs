//! Android target: template copy, density-bucket splash images and store artwork.

use crate::constants::{ANDROID_TEMPLATE_DIR, LOGO_SVG, WHITE};
use crate::error::Result;
use crate::renderer::{ImageRenderer, DEFAULT_SPLASH_NAME};
use crate::targets::{Context, TargetPreparer};
use log::info;
use std::path::{Path, PathBuf};

/// Play Store listing icon, written at the workspace root.
pub const PLAYSTORE_ICON: &str = "ic_launcher-playstore.png";

pub struct Android;

impl Android {
    /// Directory receiving the store artwork for this client.
    pub fn extras_path(ctx: &Context) -> PathBuf {
        ctx.output_root().join(ctx.client_name().to_lowercase())
    }

    fn generate_images(&self, ctx: &Context, client_path: &Path) -> Result<()> {
        let renderer = ImageRenderer::new(&ctx.config, &ctx.fs, ctx.logo_svg())?;

        info!("Generating Android image assets");
        renderer.generate_android_image_set(client_path.join("res"), DEFAULT_SPLASH_NAME)?;
        renderer.save_converted_svg(client_path.join(PLAYSTORE_ICON), 512, Some(WHITE), None)?;

        let extras = Self::extras_path(ctx);
        info!("Writing store artwork to {}", extras.display());
        renderer.save_converted_svg(extras.join("logo_image_2046_wbg.png"), 2046, Some(WHITE), None)?;
        renderer.save_converted_svg(extras.join("logo_image_512_wbg.png"), 512, Some(WHITE), None)?;
        renderer.save_converted_svg(
            extras.join("logo_image_aoverlay.png"),
            512,
            None,
            Some(ctx.alpha_overlay().as_path()),
        )?;
        renderer.save_converted_svg(
            extras.join("logo_image_boverlay.png"),
            512,
            None,
            Some(ctx.beta_overlay().as_path()),
        )?;
        Ok(())
    }
}

impl TargetPreparer for Android {
    fn name(&self) -> &'static str {
        "Android"
    }

    fn client_path(&self, ctx: &Context) -> PathBuf {
        ctx.config.android.target_configs_path.join(ctx.client_name())
    }

    fn create(&self, ctx: &Context, client_path: &Path) -> Result<()> {
        let template = ctx.config.android.target_configs_path.join(ANDROID_TEMPLATE_DIR);
        info!("Copying template folder to {}", client_path.display());
        ctx.fs.copy_folder(&template, client_path)?;

        self.generate_images(ctx, client_path)
    }

    fn refresh(&self, ctx: &Context, client_path: &Path) -> Result<()> {
        ctx.fs.update_file(ctx.logo_svg(), client_path.join("res").join(LOGO_SVG))?;

        self.generate_images(ctx, client_path)
    }
}
