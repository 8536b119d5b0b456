//! Configuration handling for appforge.
//! Loads the per-run client configuration from the install root.
//! Supports JSON and YAML formats (config.json, config.yml, config.yaml).

use crate::constants::CONFIG_FILES;
use crate::error::{Error, Result};
use crate::fileops::CopyMode;
use indexmap::IndexMap;
use log::{debug, info};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The whole configuration of one run. Read-only once loaded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Name of the client; drives destination folders and generated file names.
    pub client_name: String,
    /// Values injected into the React Native `.env` file.
    #[serde(default)]
    pub env: IndexMap<String, String>,
    pub react: ReactConfig,
    pub android: AndroidConfig,
    pub ios: IosConfig,
    /// When set, every path touched by the run must stay inside this directory.
    #[serde(default)]
    pub sandbox_root: Option<PathBuf>,
    #[serde(default)]
    pub copy_mode: CopyMode,
    /// Where Android store extras are written. Defaults to `<root>/out`.
    #[serde(default)]
    pub output_root: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactConfig {
    pub target_configs_path: PathBuf,
    pub images_path: PathBuf,
    pub image_base_sizes: Vec<u32>,
    /// Pixel density multipliers; fractional values such as `1.5` are allowed.
    pub image_scales: Vec<f64>,
    #[serde(default)]
    pub excluded_from_scaling: Vec<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidConfig {
    pub target_configs_path: PathBuf,
    /// Density bucket (e.g. `drawable-xhdpi`) to splash image pixel size.
    pub android_sizes: IndexMap<String, u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IosConfig {
    pub target_configs_path: PathBuf,
    pub splash_screen_base_image_sizes: Vec<u32>,
    pub splash_screen_scales: Vec<f64>,
    pub ios_image_sizes: Vec<IosImageSize>,
}

/// One app icon variant of the iOS asset catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct IosImageSize {
    pub size: u32,
    pub scale: u32,
}

/// Loads the configuration from the install root, trying multiple file formats.
///
/// # Arguments
/// * `root` - Directory containing the configuration file
///
/// # Errors
/// * `Error::ConfigReadFailed` if no config file exists or the first one found cannot be parsed
pub fn load_config<P: AsRef<Path>>(root: P) -> Result<Config> {
    let root = root.as_ref();
    for file in CONFIG_FILES {
        let config_path = root.join(file);
        if config_path.exists() {
            debug!("Loading configuration from {}", config_path.display());
            let content = std::fs::read_to_string(&config_path).map_err(|e| {
                Error::ConfigReadFailed {
                    path: config_path.display().to_string(),
                    reason: e.to_string(),
                }
            })?;
            let config = parse_config(&content, &config_path)?;
            info!("Read configuration from: {}", config_path.display());
            return Ok(config);
        }
    }

    Err(Error::ConfigReadFailed {
        path: root.display().to_string(),
        reason: format!("no configuration file found (tried: {})", CONFIG_FILES.join(", ")),
    })
}

/// Parses configuration content, choosing the format from the file extension.
///
/// # Errors
/// * `Error::ConfigReadFailed` if the content does not match the expected schema
pub fn parse_config(content: &str, path: &Path) -> Result<Config> {
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    );

    let parsed = if is_yaml {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(content).map_err(|e| e.to_string())
    };

    parsed.map_err(|reason| Error::ConfigReadFailed {
        path: path.display().to_string(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "clientName": "Acme",
        "env": { "APP_DISPLAY_NAME": "Acme", "BASE_URL": "https://acme.example" },
        "react": {
            "targetConfigsPath": "rn/clients",
            "imagesPath": "images",
            "imageBaseSizes": [48, 96],
            "imageScales": [1, 2, 3],
            "excludedFromScaling": [96]
        },
        "android": {
            "targetConfigsPath": "android/clients",
            "androidSizes": { "drawable-mdpi": 100, "drawable-hdpi": 150 }
        },
        "ios": {
            "targetConfigsPath": "ios/clients",
            "splashScreenBaseImageSizes": [200],
            "splashScreenScales": [1, 2, 3],
            "iosImageSizes": [{ "size": 1024, "scale": 1 }, { "size": 60, "scale": 2 }]
        }
    }"#;

    #[test]
    fn test_parse_json_config() {
        let config = parse_config(SAMPLE, Path::new("config.json")).unwrap();
        assert_eq!(config.client_name, "Acme");
        assert_eq!(config.react.image_scales, vec![1.0, 2.0, 3.0]);
        assert_eq!(config.react.excluded_from_scaling, vec![96]);
        assert_eq!(
            config.ios.ios_image_sizes[1],
            IosImageSize { size: 60, scale: 2 }
        );
        assert_eq!(config.copy_mode, CopyMode::Overwrite);
        assert!(config.sandbox_root.is_none());
        assert!(config.output_root.is_none());
    }

    #[test]
    fn test_env_and_buckets_keep_order() {
        let config = parse_config(SAMPLE, Path::new("config.json")).unwrap();
        let keys: Vec<_> = config.env.keys().cloned().collect();
        assert_eq!(keys, vec!["APP_DISPLAY_NAME", "BASE_URL"]);
        let buckets: Vec<_> = config.android.android_sizes.keys().cloned().collect();
        assert_eq!(buckets, vec!["drawable-mdpi", "drawable-hdpi"]);
    }

    #[test]
    fn test_parse_yaml_config() {
        let yaml = r#"
clientName: Acme
copyMode: exclusive
sandboxRoot: /srv/apps
react:
  targetConfigsPath: rn
  imagesPath: images
  imageBaseSizes: [48]
  imageScales: [1, 1.5]
android:
  targetConfigsPath: android
  androidSizes:
    drawable-mdpi: 100
ios:
  targetConfigsPath: ios
  splashScreenBaseImageSizes: [200]
  splashScreenScales: [1]
  iosImageSizes:
    - size: 60
      scale: 3
"#;
        let config = parse_config(yaml, Path::new("config.yaml")).unwrap();
        assert_eq!(config.copy_mode, CopyMode::Exclusive);
        assert_eq!(config.sandbox_root, Some(PathBuf::from("/srv/apps")));
        assert!(config.env.is_empty());
        assert_eq!(config.react.image_scales, vec![1.0, 1.5]);
    }

    #[test]
    fn test_invalid_config() {
        let result = parse_config(r#"{"clientName": "Acme"}"#, Path::new("config.json"));
        match result {
            Err(Error::ConfigReadFailed { path, .. }) => assert_eq!(path, "config.json"),
            other => panic!("Expected ConfigReadFailed, got {other:?}"),
        }
    }
}
