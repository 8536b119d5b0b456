//! Command-line interface implementation for appforge.
//! Provides argument parsing using clap.

use crate::error::{default_error_handler, Error, Result};
use crate::targets::Command;
use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Command-line arguments structure for appforge.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "appforge: scaffold and update per-client React Native, Android and iOS configurations",
    long_about = None
)]
pub struct Args {
    /// Regenerate assets of an existing client instead of creating a new one
    #[arg(long)]
    pub update_client: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Install root holding the configuration file and the assets directory.
    /// Defaults to the directory of the executable.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

impl Args {
    pub fn mode(&self) -> Command {
        if self.update_client {
            Command::Update
        } else {
            Command::Create
        }
    }

    /// Returns the install root, falling back to the executable's directory.
    pub fn install_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        let exe = std::env::current_exe()?;
        exe.parent().map(PathBuf::from).ok_or_else(|| Error::FileNotFound {
            path: exe.display().to_string(),
        })
    }
}

/// Parses an argument list into [`Args`].
///
/// `--help` and `--version` print and exit with status 0 as usual.
///
/// # Errors
/// * `Error::InvalidArguments` for unknown flags, stray values or bad paths
pub fn parse_args<I, T>(args: I) -> Result<Args>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Args::try_parse_from(args).map_err(|err| match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
        _ => Error::InvalidArguments(err.to_string().trim_end().to_string()),
    })
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status 1 through [`default_error_handler`] for invalid arguments
pub fn get_args() -> Args {
    parse_args(std::env::args_os()).unwrap_or_else(|err| default_error_handler(err))
}
