use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FixerError {
    // Root path errors
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Cannot read directory {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    // Rename errors
    #[error("Permission denied renaming {from} to {to}")]
    PermissionDenied { from: PathBuf, to: PathBuf },

    #[error("Failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("Metadata file already exists with different content: {target} (kept {sidecar})")]
    NameConflict { sidecar: PathBuf, target: PathBuf },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walker error: {0}")]
    Walk(#[from] walkdir::Error),

    // Rule errors
    #[error("Invalid rewrite pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    // Supplementary fixes
    #[error("Metadata file {expected} not found for edited photo {edited}")]
    MissingOriginal { edited: PathBuf, expected: PathBuf },

    #[error("Invalid date in filename: {0}")]
    InvalidDate(PathBuf),

    #[error("Unable to infer metadata for {0}")]
    Uninferable(PathBuf),

    #[error("Date formatting error: {0}")]
    DateFormat(#[from] time::error::Format),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FixerError {
    /// Whether this error was recorded because a rename target already existed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, FixerError::NameConflict { .. })
    }
}

/// Result type for takeout-fixer operations.
pub type Result<T> = std::result::Result<T, FixerError>;
