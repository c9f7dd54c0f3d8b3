//! Errors raised while setting up the working root.

use std::path::PathBuf;

/// Failure to open a directory as the working root.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("working directory {} does not exist or is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// The path could not be made absolute.
    #[error("cannot resolve working directory: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
