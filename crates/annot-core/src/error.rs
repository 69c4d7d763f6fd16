//! # Error Types
//!
//! Errors raised while turning raw bytes into domain values. Every variant
//! carries the module name and, where one exists, the zero-based index of
//! the offending field so the caller can correct the source document.

use thiserror::Error;

/// A defect in an annotation dictionary document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The bytes are not valid JSON.
    #[error("module '{module}': invalid JSON: {reason}")]
    InvalidJson {
        /// Module the document belongs to.
        module: String,
        /// Parser message.
        reason: String,
    },

    /// The top-level value is not an array of fields.
    #[error("module '{module}': document must be a JSON array of fields")]
    NotAnArray {
        /// Module the document belongs to.
        module: String,
    },

    /// A field entry is not a JSON object.
    #[error("module '{module}': field #{index} is not a JSON object")]
    NotAnObject {
        /// Module the document belongs to.
        module: String,
        /// Position of the field in the document.
        index: usize,
    },

    /// A required field attribute is absent.
    #[error("module '{module}': field #{index} is missing required attribute '{attribute}'")]
    MissingAttribute {
        /// Module the document belongs to.
        module: String,
        /// Position of the field in the document.
        index: usize,
        /// Name of the missing attribute.
        attribute: &'static str,
    },

    /// A field attribute is present but has the wrong JSON type.
    #[error("module '{module}': field #{index} attribute '{attribute}' must be {expected}")]
    InvalidAttribute {
        /// Module the document belongs to.
        module: String,
        /// Position of the field in the document.
        index: usize,
        /// Name of the attribute.
        attribute: &'static str,
        /// Description of the accepted JSON type.
        expected: &'static str,
    },

    /// An enumerated value entry lacks a required attribute or has the wrong type.
    #[error(
        "module '{module}': field #{index} enumValues[{entry}] attribute '{attribute}' is missing or not {expected}"
    )]
    InvalidEnumEntry {
        /// Module the document belongs to.
        module: String,
        /// Position of the field in the document.
        index: usize,
        /// Position of the entry in the field's `enumValues`.
        entry: usize,
        /// Name of the attribute.
        attribute: &'static str,
        /// Description of the accepted JSON type.
        expected: &'static str,
    },
}

/// An identifier string was rejected at construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind} '{value}': {reason}")]
pub struct IdentifierError {
    /// Identifier kind, e.g. "module name".
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
    /// Why it was rejected.
    pub reason: &'static str,
}

/// Error while materializing an [`ObservedTable`](crate::ObservedTable).
#[derive(Error, Debug)]
pub enum TableError {
    /// The CSV input could not be read.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// A column had a different number of cells than the others.
    #[error("column '{column}' has {actual} cells, expected {expected}")]
    RaggedColumn {
        /// Column name.
        column: String,
        /// Row count of the table.
        expected: usize,
        /// Cell count of the offending column.
        actual: usize,
    },

    /// Two columns share a name.
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    /// IO error opening the table source.
    #[error("io error reading '{path}': {source}")]
    Io {
        /// Path that failed to open.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
}
