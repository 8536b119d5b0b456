//! React Native target: template copy, `.env` injection and the logo image set.

use crate::constants::{LOGO_SVG, REACT_TEMPLATE_DIR};
use crate::error::Result;
use crate::renderer::{ImageRenderer, DEFAULT_IMAGE_PREFIX};
use crate::targets::{Context, TargetPreparer};
use indexmap::IndexMap;
use log::{debug, info};
use std::path::{Path, PathBuf};

pub struct ReactNative;

impl ReactNative {
    fn generate_images(&self, ctx: &Context, client_path: &Path) -> Result<()> {
        let react = &ctx.config.react;
        let renderer = ImageRenderer::new(&ctx.config, &ctx.fs, ctx.logo_svg())?;

        info!("Generating React Native image assets");
        let written = renderer.generate_image_set(
            client_path.join(&react.images_path),
            &react.image_base_sizes,
            &react.image_scales,
            &react.excluded_from_scaling,
            DEFAULT_IMAGE_PREFIX,
            true,
        )?;
        debug!("Generated {} images", written.len());
        Ok(())
    }
}

impl TargetPreparer for ReactNative {
    fn name(&self) -> &'static str {
        "React Native"
    }

    /// React Native workspaces use the lower-cased client name.
    fn client_path(&self, ctx: &Context) -> PathBuf {
        ctx.config
            .react
            .target_configs_path
            .join(ctx.client_name().to_lowercase())
    }

    fn create(&self, ctx: &Context, client_path: &Path) -> Result<()> {
        let template = ctx.config.react.target_configs_path.join(REACT_TEMPLATE_DIR);
        info!("Copying template folder to {}", client_path.display());
        ctx.fs.copy_folder(&template, client_path)?;

        let env_path = client_path.join(".env");
        info!("Updating .env file at {}", env_path.display());
        update_env_file(ctx, &env_path, &ctx.config.env)?;

        let logo_dest = client_path.join(&ctx.config.react.images_path).join(LOGO_SVG);
        info!("Copying {LOGO_SVG} to {}", logo_dest.display());
        ctx.fs.copy_file(ctx.logo_svg(), &logo_dest)?;

        self.generate_images(ctx, client_path)
    }

    fn refresh(&self, ctx: &Context, client_path: &Path) -> Result<()> {
        let env_path = client_path.join(".env");
        info!("Updating .env file at {}", env_path.display());
        update_env_file(ctx, &env_path, &ctx.config.env)?;

        let logo_dest = client_path.join(&ctx.config.react.images_path).join(LOGO_SVG);
        ctx.fs.update_file(ctx.logo_svg(), &logo_dest)?;

        self.generate_images(ctx, client_path)
    }
}

fn update_env_file(ctx: &Context, env_path: &Path, env: &IndexMap<String, String>) -> Result<()> {
    let env_path = ctx.fs.guard().resolve(env_path)?;
    let content = std::fs::read_to_string(&env_path)?;
    let patched = patch_env(&content, env);
    ctx.fs.write_file(&env_path, &patched)?;
    debug!("Updated .env file with the following configuration:\n{patched}");
    Ok(())
}

/// Rewrites every `KEY=...` line whose key is configured to `KEY="value"`.
///
/// The key is the text before the first `=`, or the whole line when it has
/// none, and must match exactly. Other lines, including comments and unknown
/// keys, are kept as they are.
pub fn patch_env(content: &str, env: &IndexMap<String, String>) -> String {
    content
        .split('\n')
        .map(|line| {
            let (body, line_end) = match line.strip_suffix('\r') {
                Some(body) => (body, "\r"),
                None => (line, ""),
            };
            let key = body.split_once('=').map_or(body, |(key, _)| key);
            match env.get_key_value(key) {
                Some((key, value)) => format!("{key}=\"{value}\"{line_end}"),
                None => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> IndexMap<String, String> {
        let mut env = IndexMap::new();
        env.insert("APP_DISPLAY_NAME".to_string(), "Acme Mobile".to_string());
        env.insert("BASE_URL".to_string(), "https://acme.example".to_string());
        env
    }

    #[test]
    fn test_patch_env_replaces_known_keys() {
        let content = "APP_DISPLAY_NAME=Template\nBASE_URL=\"http://localhost\"\nDEBUG=true\n";
        assert_eq!(
            patch_env(content, &env()),
            "APP_DISPLAY_NAME=\"Acme Mobile\"\nBASE_URL=\"https://acme.example\"\nDEBUG=true\n"
        );
    }

    #[test]
    fn test_patch_env_keeps_comments_and_partial_matches() {
        let content = "# BASE_URL=commented\nBASE_URL_V2=keep\n APP_DISPLAY_NAME=spaced";
        assert_eq!(patch_env(content, &env()), content);
    }

    #[test]
    fn test_patch_env_fills_bare_keys() {
        let content = "APP_DISPLAY_NAME\nBASE_URL\r\nDEBUG\n";
        assert_eq!(
            patch_env(content, &env()),
            "APP_DISPLAY_NAME=\"Acme Mobile\"\nBASE_URL=\"https://acme.example\"\r\nDEBUG\n"
        );
    }

    #[test]
    fn test_patch_env_preserves_crlf() {
        let content = "BASE_URL=old\r\nOTHER=1\r\n";
        assert_eq!(
            patch_env(content, &env()),
            "BASE_URL=\"https://acme.example\"\r\nOTHER=1\r\n"
        );
    }
}
