//! # annot-client — Annotation Sources & Entity Store
//!
//! Adapters for everything the core transformations treat as external:
//!
//! - [`AnnotationSource`]: resolves a release version, lists the modules
//!   published at that version, and fetches one module's document.
//!   Implemented by [`GitHubAnnotationSource`] (the public dictionary
//!   repository) and [`DirectoryAnnotationSource`] (a local checkout).
//! - [`EntityStore`]: the remote data-sharing platform as far as the
//!   curator needs it: read a table, walk a folder hierarchy, create
//!   folders, store files. Implemented by [`InMemoryStore`] and the
//!   file-backed [`SnapshotStore`].
//! - [`SchemaCatalog`]: fetches and flattens many modules, isolating
//!   per-module failures.
//!
//! ## Policy
//!
//! - Sources and stores are injected by the caller; nothing here holds
//!   global session state.
//! - No retry logic. Transport failures surface as
//!   [`SourceError::Unavailable`] and the caller decides what to do.

pub mod catalog;
pub mod config;
pub mod directory;
pub mod error;
pub mod github;
pub mod memory;
pub mod source;
pub mod store;

pub use catalog::{CatalogReport, SchemaCatalog};
pub use config::{ConfigError, SourceConfig};
pub use directory::DirectoryAnnotationSource;
pub use error::{SourceError, StoreError};
pub use github::GitHubAnnotationSource;
pub use memory::{InMemoryStore, SnapshotStore};
pub use source::{AnnotationSource, ModuleLocator};
pub use store::{Entity, EntityKind, EntityStore, NewFile, TableRef};
