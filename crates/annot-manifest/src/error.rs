//! Manifest pipeline errors.

use std::path::PathBuf;

use annot_client::StoreError;
use annot_core::DocumentError;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The local tree could not be walked.
    #[error("cannot walk {path}: {reason}")]
    Walk { path: String, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// An annotation key source is not a `.json` document.
    #[error("annotation file {0} cannot be parsed, JSON format is required")]
    NotJson(String),

    /// An annotation key document could not be downloaded.
    #[error("cannot fetch annotation file {location}: {reason}")]
    Fetch { location: String, reason: String },

    #[error(transparent)]
    Document(#[from] DocumentError),

    /// A local directory has no remote counterpart and no mirrored parent.
    #[error("directory {} has no mirrored folder", .0.display())]
    Unmapped(PathBuf),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("manifest CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A manifest being read lacks one of the fixed columns.
    #[error("manifest is missing required column '{0}'")]
    MissingColumn(&'static str),

    /// A manifest row carries an unusable value.
    #[error("manifest row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
}
