//! # annot-schema — Dictionary Flattening & Validation
//!
//! The core of the curator. Two pure transformations:
//!
//! ## Flattening (`flatten`)
//!
//! [`flatten`] turns one module's field descriptors into a
//! [`FlattenedSchema`]: one row per permitted literal for enumerated fields,
//! one row with an empty `value` for free-form fields, every row carrying
//! its field's descriptive attributes and the owning module. Field-level
//! attributes are attached to each literal by field identity, so a literal
//! can never overwrite the field's own `name` or `description`.
//!
//! Alongside the rows, the schema keeps a per-key [`AllowedValues`] index
//! (`Unconstrained` or `Enumerated(set)`) so lookups during validation are
//! constant time rather than a table scan.
//!
//! ## Validation (`validate`)
//!
//! [`validate`] compares an [`ObservedTable`](annot_core::ObservedTable)
//! against a schema and returns a sparse [`ValidationReport`]: for each
//! column present in both, the observed values missing from the key's
//! allowed set. Comparison is exact on the literal text.
//!
//! ## Crate Policy
//!
//! - No I/O except the explicit path/writer helpers.
//! - Schemas are immutable once built; every `flatten` call rebuilds.

pub mod error;
pub mod flatten;
pub mod validate;

pub use error::SchemaError;
pub use flatten::{flatten, flatten_path, AllowedValues, FlattenedSchema, FlattenedSchemaRow};
pub use validate::{validate, ValidationReport};
