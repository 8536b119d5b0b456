//! Platform targets and the orchestration they share.
//! Each platform implements [`TargetPreparer`]; the precondition checks,
//! progress logging and dispatch live once in the trait's provided methods.

use crate::config::Config;
use crate::constants::{ALPHA_OVERLAY, ASSETS_DIR, BETA_OVERLAY, DEFAULT_OUTPUT_DIR, LOGO_SVG};
use crate::error::{Error, Result};
use crate::fileops::FileOps;
use crate::guard::PathGuard;
use log::{error, info};
use std::path::{Path, PathBuf};

pub mod android;
pub mod ios;
pub mod react_native;

pub use android::Android;
pub use ios::Ios;
pub use react_native::ReactNative;

/// Whether a run creates new client workspaces or refreshes existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Create,
    Update,
}

/// Everything a target needs for one run: the configuration, the install
/// root holding the shared assets, and the guarded file operations.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub root: PathBuf,
    pub fs: FileOps,
    output_root: PathBuf,
}

impl Context {
    /// Builds the run context, deriving the path guard and copy mode from the config.
    ///
    /// # Arguments
    /// * `config` - Loaded configuration
    /// * `root` - Install root containing `assets/`
    pub fn new<P: AsRef<Path>>(config: Config, root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let fs = FileOps::new(PathGuard::new(config.sandbox_root.clone()), config.copy_mode);
        let output_root = match &config.output_root {
            Some(path) => path.clone(),
            None => root.join(DEFAULT_OUTPUT_DIR),
        };
        Self { config, root, fs, output_root }
    }

    pub fn client_name(&self) -> &str {
        &self.config.client_name
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join(ASSETS_DIR)
    }

    /// The shared source logo every image set is rendered from.
    pub fn logo_svg(&self) -> PathBuf {
        self.assets_dir().join(LOGO_SVG)
    }

    pub fn alpha_overlay(&self) -> PathBuf {
        self.assets_dir().join(ALPHA_OVERLAY)
    }

    pub fn beta_overlay(&self) -> PathBuf {
        self.assets_dir().join(BETA_OVERLAY)
    }

    /// Directory receiving artifacts that live outside the client workspaces.
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }
}

/// One mobile platform that can scaffold and refresh a client workspace.
pub trait TargetPreparer {
    /// Human readable platform name used in progress output.
    fn name(&self) -> &'static str;

    /// Location of the client workspace for this platform.
    fn client_path(&self, ctx: &Context) -> PathBuf;

    /// Materializes a new workspace at `client_path`, which does not exist yet.
    fn create(&self, ctx: &Context, client_path: &Path) -> Result<()>;

    /// Re-applies per-client patches and regenerates images in an existing workspace.
    fn refresh(&self, ctx: &Context, client_path: &Path) -> Result<()>;

    /// Creates the client workspace.
    ///
    /// # Errors
    /// * `Error::ClientAlreadyExists` if the workspace is already present
    /// * Any error of the platform's steps; partial output is left on disk
    fn prepare(&self, ctx: &Context) -> Result<()> {
        let client_path = ctx.fs.guard().resolve(self.client_path(ctx))?;
        if ctx.fs.folder_exists(&client_path)? {
            return Err(Error::ClientAlreadyExists {
                client: ctx.client_name().to_string(),
                path: client_path.display().to_string(),
            });
        }

        info!("=== Preparing {} target for {} ===", self.name(), ctx.client_name());
        self.create(ctx, &client_path).map_err(|e| {
            error!("Error preparing {} target: {e}", self.name());
            e
        })?;
        info!("{} target prepared successfully for {}", self.name(), ctx.client_name());
        Ok(())
    }

    /// Refreshes an existing client workspace.
    ///
    /// # Errors
    /// * `Error::ClientNotFound` if the workspace is missing; nothing is written in that case
    fn update(&self, ctx: &Context) -> Result<()> {
        let client_path = ctx.fs.guard().resolve(self.client_path(ctx))?;
        if !ctx.fs.folder_exists(&client_path)? {
            return Err(Error::ClientNotFound {
                client: ctx.client_name().to_string(),
                path: client_path.display().to_string(),
            });
        }

        info!("=== Updating {} target for {} ===", self.name(), ctx.client_name());
        self.refresh(ctx, &client_path).map_err(|e| {
            error!("Error updating {} target: {e}", self.name());
            e
        })?;
        info!("{} target updated successfully for {}", self.name(), ctx.client_name());
        Ok(())
    }

    fn run(&self, ctx: &Context, command: Command) -> Result<()> {
        match command {
            Command::Create => self.prepare(ctx),
            Command::Update => self.update(ctx),
        }
    }
}

/// All platforms in the order they are processed.
pub fn all_targets() -> Vec<Box<dyn TargetPreparer>> {
    vec![Box::new(ReactNative), Box::new(Android), Box::new(Ios)]
}

/// Runs `command` for every platform in sequence, stopping at the first failure.
pub fn run_all(ctx: &Context, command: Command) -> Result<()> {
    for target in all_targets() {
        target.run(ctx, command)?;
    }
    Ok(())
}
