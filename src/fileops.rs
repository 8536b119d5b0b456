//! Filesystem operations used to materialize client workspaces.
//! Every operation validates the type of its source before acting and
//! resolves all paths through the shared [`PathGuard`].

use crate::error::{Error, Result};
use crate::guard::PathGuard;
use log::{debug, error};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// How [`FileOps::copy_file`] treats an already existing destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyMode {
    /// Replace the destination.
    #[default]
    Overwrite,
    /// Fail with [`Error::DestinationExists`].
    Exclusive,
}

/// File and directory helpers bound to one [`PathGuard`] and [`CopyMode`].
#[derive(Debug, Clone, Default)]
pub struct FileOps {
    guard: PathGuard,
    copy_mode: CopyMode,
}

impl FileOps {
    pub fn new(guard: PathGuard, copy_mode: CopyMode) -> Self {
        Self { guard, copy_mode }
    }

    pub fn guard(&self) -> &PathGuard {
        &self.guard
    }

    pub fn copy_mode(&self) -> CopyMode {
        self.copy_mode
    }

    /// Returns whether `path` exists and is a directory. Symlinks are not followed.
    ///
    /// # Errors
    /// * Any stat failure other than a missing path
    pub fn folder_exists<P: AsRef<Path>>(&self, path: P) -> Result<bool> {
        let path = self.guard.resolve(path)?;
        match fs::symlink_metadata(&path) {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => {
                error!("Error checking folder existence: {e}");
                Err(Error::IoError(e))
            }
        }
    }

    /// Creates `path` and all missing parents. An existing directory is not an error.
    pub fn create_directory<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = self.guard.resolve(path)?;
        create_private_dir_all(&path).map_err(|e| {
            error!("Error creating directory: {e}");
            Error::IoError(e)
        })?;
        debug!("Created directory: {}", path.display());
        Ok(())
    }

    /// Recursively copies the contents of `src` into `dest`, overwriting
    /// conflicting entries and keeping file modification times.
    ///
    /// # Errors
    /// * `Error::SourceNotADirectory` if `src` is not a directory
    pub fn copy_folder<P: AsRef<Path>, Q: AsRef<Path>>(&self, src: P, dest: Q) -> Result<()> {
        let src = self.guard.resolve(src)?;
        let dest = self.guard.resolve(dest)?;
        if !is_dir(&src)? {
            error!("Error copying folder: source is not a directory");
            return Err(Error::SourceNotADirectory { path: src.display().to_string() });
        }

        for entry in WalkDir::new(&src).follow_links(true) {
            let entry = entry.map_err(|e| Error::IoError(e.into()))?;
            let relative = entry
                .path()
                .strip_prefix(&src)
                .map_err(|e| Error::IoError(io::Error::other(e)))?;
            let target = self.guard.resolve(dest.join(relative))?;

            if entry.file_type().is_dir() {
                create_private_dir_all(&target)?;
            } else {
                fs::copy(entry.path(), &target)?;
                preserve_modified(entry.path(), &target)?;
            }
        }
        debug!("Copied folder: {} -> {}", src.display(), dest.display());
        Ok(())
    }

    /// Copies a single regular file, creating the destination's parent directory.
    ///
    /// # Errors
    /// * `Error::SourceNotAFile` if `src` is not a regular file
    /// * `Error::DestinationExists` in [`CopyMode::Exclusive`] when `dest` is present
    pub fn copy_file<P: AsRef<Path>, Q: AsRef<Path>>(&self, src: P, dest: Q) -> Result<()> {
        let src = self.guard.resolve(src)?;
        let dest = self.guard.resolve(dest)?;
        if !is_file(&src)? {
            error!("Error copying file: source is not a file");
            return Err(Error::SourceNotAFile { path: src.display().to_string() });
        }
        ensure_parent(&dest)?;

        if self.copy_mode == CopyMode::Exclusive && fs::symlink_metadata(&dest).is_ok() {
            error!("Error copying file: destination already exists");
            return Err(Error::DestinationExists { path: dest.display().to_string() });
        }

        fs::copy(&src, &dest)?;
        debug!("Copied file: {} -> {}", src.display(), dest.display());
        Ok(())
    }

    /// Writes the text content of `src` to `dest`, replacing whatever was there.
    ///
    /// # Errors
    /// * `Error::SourceNotAFile` if `src` is not a regular file
    pub fn update_file<P: AsRef<Path>, Q: AsRef<Path>>(&self, src: P, dest: Q) -> Result<()> {
        let src = self.guard.resolve(src)?;
        let dest = self.guard.resolve(dest)?;
        if !is_file(&src)? {
            error!("Error updating file: source is not a file");
            return Err(Error::SourceNotAFile { path: src.display().to_string() });
        }
        ensure_parent(&dest)?;

        let content = fs::read_to_string(&src)?;
        fs::write(&dest, content)?;
        debug!("Updated file: {} -> {}", src.display(), dest.display());
        Ok(())
    }

    pub fn rename_folder<P: AsRef<Path>, Q: AsRef<Path>>(&self, from: P, to: Q) -> Result<()> {
        let from = self.guard.resolve(from)?;
        let to = self.guard.resolve(to)?;
        if !is_dir(&from)? {
            error!("Error renaming folder: old path is not a directory");
            return Err(Error::SourceNotADirectory { path: from.display().to_string() });
        }

        fs::rename(&from, &to)?;
        debug!("Renamed folder: {} -> {}", from.display(), to.display());
        Ok(())
    }

    pub fn rename_file<P: AsRef<Path>, Q: AsRef<Path>>(&self, from: P, to: Q) -> Result<()> {
        let from = self.guard.resolve(from)?;
        let to = self.guard.resolve(to)?;
        if !is_file(&from)? {
            error!("Error renaming file: old path is not a file");
            return Err(Error::SourceNotAFile { path: from.display().to_string() });
        }
        ensure_parent(&to)?;

        fs::rename(&from, &to)?;
        debug!("Renamed file: {} -> {}", from.display(), to.display());
        Ok(())
    }

    /// Writes `content` to `dest`, creating the parent directory first.
    pub fn write_file<P: AsRef<Path>>(&self, dest: P, content: &str) -> Result<PathBuf> {
        let dest = self.guard.resolve(dest)?;
        ensure_parent(&dest)?;
        fs::write(&dest, content)?;
        debug!("Wrote file: {}", dest.display());
        Ok(dest)
    }
}

fn is_dir(path: &Path) -> io::Result<bool> {
    fs::symlink_metadata(path).map(|m| m.is_dir())
}

fn is_file(path: &Path) -> io::Result<bool> {
    fs::symlink_metadata(path).map(|m| m.is_file())
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) => create_private_dir_all(parent),
        None => Ok(()),
    }
}

#[cfg(unix)]
fn create_private_dir_all(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(path)
}

#[cfg(not(unix))]
fn create_private_dir_all(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

fn preserve_modified(src: &Path, dest: &Path) -> io::Result<()> {
    let modified = fs::metadata(src)?.modified()?;
    fs::File::open(dest)?.set_modified(modified)
}
