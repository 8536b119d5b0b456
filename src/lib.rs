//! appforge scaffolds and updates per-client mobile app configurations.
//! It copies React Native, Android and iOS templates for a named client,
//! patches the client-specific files and rasterizes a shared SVG logo into
//! every icon and splash-screen size the platforms require.

/// Command-line interface module for the appforge application
pub mod cli;

/// Per-run configuration loading
/// Supports JSON and YAML formats (config.json, config.yml, config.yaml)
pub mod config;

pub mod constants;

/// Error types and handling for the appforge application
pub mod error;

/// Guarded filesystem operations
pub mod fileops;

/// Path resolution with an optional sandbox root
pub mod guard;

pub mod logger;

/// SVG to PNG rendering and the batch image generators
pub mod renderer;

/// Platform preparers: React Native, Android and iOS
pub mod targets;
