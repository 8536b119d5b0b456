//! Error handling for the appforge application.
//! Defines the error taxonomy shared by every component and the top-level handler.

use std::io;
use thiserror::Error;

/// Custom error types for appforge operations.
///
/// Every component propagates these upwards unchanged; only the entry point
/// recovers from them (see [`default_error_handler`]).
#[derive(Error, Debug)]
pub enum Error {
    /// The client workspace is already present on a create run.
    #[error("Client \"{client}\" already exists at {path}.")]
    ClientAlreadyExists { client: String, path: String },

    /// The client workspace is missing on an update run.
    #[error("Client \"{client}\" does not exist at {path}.")]
    ClientNotFound { client: String, path: String },

    /// An input file (source vector, overlay) could not be found or read.
    #[error("File not found at path: {path}.")]
    FileNotFound { path: String },

    #[error("Source is not a file: {path}.")]
    SourceNotAFile { path: String },

    #[error("Source is not a directory: {path}.")]
    SourceNotADirectory { path: String },

    /// Raised by exclusive copies when the target is already present.
    #[error("Destination already exists: {path}.")]
    DestinationExists { path: String },

    /// Wraps failures of the rasterizer, the compositor or the PNG encoder.
    #[error("Failed to convert SVG to PNG: {0}.")]
    ConversionFailed(String),

    #[error("Invalid background color: '{0}'.")]
    InvalidColor(String),

    #[error("Could not read config file at path: {path}. {reason}.")]
    ConfigReadFailed { path: String, reason: String },

    /// The command line could not be parsed.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// A resolved path escapes the configured sandbox root.
    #[error("Access denied: '{path}' is outside of '{root}'.")]
    AccessDenied { path: String, root: String },

    #[error("Property list error: {0}.")]
    PlistError(#[from] plist::Error),

    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) -> ! {
    eprintln!("An error occurred: {err}");
    std::process::exit(1);
}
