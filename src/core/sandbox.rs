//! Path containment for the agent's working directory.
//!
//! Every path the model hands to a tool is resolved against a single
//! [`WorkingRoot`]. Resolution is purely lexical: `.` and `..` are folded
//! without touching the filesystem, so a symlink inside the root that points
//! elsewhere is followed by the tools and is *not* detected here.

use std::path::{Component, Path, PathBuf};

use super::error::{Error, Result};

/// A path resolved to a location outside the working root.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{path}\" is outside the permitted working directory")]
pub struct ContainmentError {
    /// The path exactly as the caller supplied it.
    pub path: String,
}

/// The single directory all tool operations are confined to.
///
/// Fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingRoot {
    path: PathBuf,
}

impl WorkingRoot {
    /// Open an existing directory as the working root.
    ///
    /// Relative paths are made absolute against the current directory.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let absolute = normalize(&std::path::absolute(path)?);

        if !absolute.is_dir() {
            return Err(Error::NotADirectory(path.to_path_buf()));
        }

        Ok(Self { path: absolute })
    }

    /// Absolute, normalized path of the root.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve `relative` against the root, rejecting escapes.
    pub fn resolve(&self, relative: &str) -> std::result::Result<PathBuf, ContainmentError> {
        contain(&self.path, relative)
    }
}

fn contain(base: &Path, relative: &str) -> std::result::Result<PathBuf, ContainmentError> {
    let joined = normalize(&base.join(relative));

    if joined.starts_with(base) {
        Ok(joined)
    } else {
        Err(ContainmentError {
            path: relative.to_string(),
        })
    }
}

/// Fold `.` and `..` components without consulting the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            // Popping past the filesystem root is a no-op, as with `realpath -m`
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }

    out
}
