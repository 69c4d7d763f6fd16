//! # annot-manifest — Upload Manifests
//!
//! Prepares a local directory tree for upload to the entity store:
//!
//! 1. [`walk_local`] lists the directories to mirror (down to a depth) and
//!    every non-hidden file.
//! 2. [`mirror_hierarchy`] maps existing remote folders onto the local
//!    directories and creates the missing ones.
//! 3. [`annotation_keys`] collects the annotation columns from dictionary
//!    documents.
//! 4. [`build_manifest`] assigns every file its remote parent and name, and
//!    [`write_manifest`] emits the table for curators to fill in.
//! 5. [`read_manifest`] and [`upload_manifest`] store the filled-in
//!    manifest's files with their annotations.
//!
//! Files below the mirrored depth are placed in their deepest mirrored
//! ancestor, their intermediate directory names folded into the file name.

pub mod error;
pub mod keys;
pub mod manifest;
pub mod mirror;
pub mod walk;

pub use error::ManifestError;
pub use keys::{annotation_keys, PROVENANCE_KEYS};
pub use manifest::{
    build_manifest, read_manifest, upload_manifest, write_manifest, Manifest, ManifestRow,
    FIXED_COLUMNS, MANIFEST_FILE_NAME,
};
pub use mirror::{mirror_hierarchy, FolderMap};
pub use walk::{walk_local, LocalTree};
