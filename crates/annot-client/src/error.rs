//! Error types for sources and stores.

use annot_core::{DocumentError, EntityId, IdentifierError, TableError};

/// Errors from an [`AnnotationSource`](crate::AnnotationSource).
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The source could not be reached (transport failure, timeout, I/O).
    #[error("annotation source unavailable at {endpoint}: {reason}")]
    Unavailable {
        /// Endpoint or path that was being accessed.
        endpoint: String,
        /// Failure description.
        reason: String,
    },

    /// The source answered with a non-success status.
    #[error("annotation source {endpoint} returned {status}: {body}")]
    ApiError {
        /// Endpoint that was called.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response could not be decoded into the expected shape.
    #[error("failed to decode response from {endpoint}: {reason}")]
    Deserialization {
        /// Endpoint that was called.
        endpoint: String,
        /// Decoder message.
        reason: String,
    },

    /// The repository has no published releases.
    #[error("no releases published for {0}")]
    NoReleases(String),

    /// The requested release is not served by this source.
    #[error("release '{0}' is not available from this source")]
    UnknownRelease(String),

    /// The requested module is not published at the given release.
    #[error("module '{module}' not found at release '{version}'")]
    ModuleNotFound {
        /// Requested module.
        module: String,
        /// Release that was listed.
        version: String,
    },

    /// The module document was fetched but is malformed.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Source configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Errors from an [`EntityStore`](crate::EntityStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No entity with this id.
    #[error("entity {0} not found")]
    NotFound(EntityId),

    /// The entity exists but holds no table.
    #[error("entity {0} is not a table")]
    NotATable(EntityId),

    /// The parent of a new entity cannot contain children.
    #[error("entity {0} cannot contain children")]
    NotAContainer(EntityId),

    /// A table reference named an entity but no store was supplied.
    #[error("entity {0} requires a store to resolve")]
    NoStore(EntityId),

    /// An entity id was malformed.
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    /// A local table could not be read.
    #[error(transparent)]
    Table(#[from] TableError),

    /// The snapshot file could not be read or written.
    #[error("snapshot {path}: {source}")]
    Io {
        /// Snapshot path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The snapshot file is not valid.
    #[error("snapshot {path} is invalid: {reason}")]
    Snapshot {
        /// Snapshot path.
        path: String,
        /// Decoder message.
        reason: String,
    },
}
