//! Tool errors.

use std::path::PathBuf;

use kc_core::error::GameError;
use thiserror::Error;

/// Result type alias using [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors raised by the command-line tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// File could not be read or written.
    #[error("{}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Campaign content or engine error.
    #[error(transparent)]
    Game(#[from] GameError),

    /// Command script failed to parse.
    #[error("Failed to parse script '{}': {message}", path.display())]
    Script {
        /// Script path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// Save file is corrupt or incomplete.
    #[error("No usable save in '{}'", .0.display())]
    InvalidSave(PathBuf),

    /// A command needs a character and none was given.
    #[error("No save to resume and no character to create")]
    NoCharacter,
}

/// Read a file to a string.
///
/// # Errors
///
/// Returns [`ToolError::Io`] with the path attached.
pub fn read_file(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a string to a file.
///
/// # Errors
///
/// Returns [`ToolError::Io`] with the path attached.
pub fn write_file(path: &std::path::Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })
}
