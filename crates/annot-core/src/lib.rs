//! # annot-core — Foundational Types for the Annotation Curator
//!
//! Defines the data model shared by every other crate in the workspace:
//!
//! - [`AnnotationField`] / [`EnumEntry`]: one module's annotation
//!   dictionary, as published in the remote annotation repository.
//! - [`parse_document`]: strict parser from raw JSON bytes into fields,
//!   reporting the module, field index and attribute of any defect.
//! - [`ObservedTable`]: a column-oriented dataset whose values are checked
//!   against a flattened dictionary.
//! - Identifier newtypes: [`ModuleName`], [`ReleaseVersion`], [`EntityId`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `annot-*` crates (this is the leaf of the DAG).
//! - No network access. Fetching documents belongs to `annot-client`.
//! - No `.unwrap()` outside tests.

pub mod error;
pub mod field;
pub mod identity;
pub mod table;

pub use error::{DocumentError, IdentifierError, TableError};
pub use field::{parse_document, parse_field_names, AnnotationField, EnumEntry};
pub use identity::{EntityId, ModuleName, ReleaseVersion, LOCAL_RELEASE};
pub use table::{delimiter_for_path, ObservedTable};
