//! Errors from the path and writer helpers. The transformations themselves
//! are infallible once a document has been parsed.

use annot_core::DocumentError;
use thiserror::Error;

/// Error loading or emitting a flattened schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema document could not be read.
    #[error("cannot read schema document '{path}': {source}")]
    Io {
        /// Path of the document.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The document was read but is malformed.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// The document path has no usable module name.
    #[error("cannot derive a module name from '{0}'")]
    ModuleName(String),

    /// Writing the flattened table failed.
    #[error("csv write error: {0}")]
    Csv(#[from] csv::Error),
}
