//! Path resolution with an optional sandbox root.
//! Every filesystem operation in appforge resolves its paths through a [`PathGuard`],
//! so a malformed client name or config path cannot reach outside the sandbox.

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Resolves paths to absolute form and, when a root is configured,
/// rejects paths that escape it.
#[derive(Debug, Clone, Default)]
pub struct PathGuard {
    root: Option<PathBuf>,
}

impl PathGuard {
    /// Creates a guard. `None` disables the sandbox check entirely.
    ///
    /// A relative root is resolved against the current directory on each [`resolve`](Self::resolve).
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    /// Guard without a sandbox root.
    pub fn unrestricted() -> Self {
        Self { root: None }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Normalizes `path` to an absolute path.
    ///
    /// # Errors
    /// * `Error::AccessDenied` if a sandbox root is set and the resolved path lies outside it
    /// * `Error::IoError` if a relative path is given and the current directory is unavailable
    pub fn resolve<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf> {
        let resolved = absolutize(path.as_ref())?;
        if let Some(root) = &self.root {
            let root = absolutize(root)?;
            if !resolved.starts_with(&root) {
                return Err(Error::AccessDenied {
                    path: resolved.display().to_string(),
                    root: root.display().to_string(),
                });
            }
        }
        Ok(resolved)
    }
}

/// Joins relative paths onto the current directory and folds `.` and `..`
/// lexically. The path does not need to exist.
fn absolutize(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}
