//! Common constants used throughout the appforge application.

/// Supported configuration file names, tried in order inside the install root
pub const CONFIG_FILES: [&str; 3] = ["config.json", "config.yml", "config.yaml"];

/// Directory under the install root holding the shared logo, overlays and iOS templates
pub const ASSETS_DIR: &str = "assets";

pub const LOGO_SVG: &str = "logo_image.svg";
pub const ALPHA_OVERLAY: &str = "aoverlay.png";
pub const BETA_OVERLAY: &str = "boverlay.png";

/// Default location of the Android store extras, relative to the install root
pub const DEFAULT_OUTPUT_DIR: &str = "out";

pub const WHITE: &str = "#ffffff";

pub const REACT_TEMPLATE_DIR: &str = "__template__";
pub const ANDROID_TEMPLATE_DIR: &str = "NextApp";

/// Placeholder app name used throughout the iOS template files
pub const IOS_TEMPLATE_NAME: &str = "NextApp";
