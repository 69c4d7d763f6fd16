//! # Entity Store
//!
//! The slice of the remote data-sharing platform the curator touches:
//! entities arranged in a project/folder/file hierarchy, some of which are
//! tables. Only the operations below are needed; authentication and
//! session handling belong to whoever constructs the store.

use std::collections::BTreeMap;
use std::path::PathBuf;

use annot_core::{EntityId, ObservedTable};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// What an entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Project,
    Folder,
    File,
    Table,
}

impl EntityKind {
    /// Whether entities of this kind may have children.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Project | Self::Folder)
    }
}

/// One entity as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    /// `None` only for projects.
    pub parent: Option<EntityId>,
    pub kind: EntityKind,
}

/// A file to be stored, with the annotations to attach to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFile {
    /// Local path of the content.
    pub path: PathBuf,
    /// Display name in the store.
    pub name: String,
    /// Container to store it under.
    pub parent: EntityId,
    /// Annotation key/value pairs. Empty values are not sent.
    pub annotations: BTreeMap<String, String>,
}

/// Operations on the remote entity hierarchy.
///
/// Reads take `&self`; creations take `&mut self`. The trait is
/// object-safe so the CLI can hold a `Box<dyn EntityStore>`.
pub trait EntityStore: Send + Sync {
    /// Look up an entity.
    fn get(&self, id: &EntityId) -> Result<Entity, StoreError>;

    /// Read a table entity's content.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotATable`] if `id` exists but is not a table.
    fn read_table(&self, id: &EntityId) -> Result<ObservedTable, StoreError>;

    /// Container paths under `root`, depth-first with parents before
    /// children. Each path starts with the root's own name and uses `/` as
    /// separator, e.g. `("study/raw", syn2)`. The root itself is included.
    fn walk(&self, root: &EntityId) -> Result<Vec<(String, EntityId)>, StoreError>;

    /// Create a folder named `name` under `parent`.
    fn create_folder(&mut self, name: &str, parent: &EntityId) -> Result<EntityId, StoreError>;

    /// Store a file under its parent with its annotations.
    fn store_file(&mut self, file: NewFile) -> Result<EntityId, StoreError>;
}

/// A reference to an observed table, resolved lazily.
#[derive(Debug, Clone)]
pub enum TableRef {
    /// Already in memory.
    Loaded(ObservedTable),
    /// A local CSV/TSV file.
    Path(PathBuf),
    /// A table entity in a store.
    Entity(EntityId),
}

impl TableRef {
    /// Materialize the table.
    ///
    /// # Errors
    ///
    /// [`StoreError::NoStore`] if this is an entity reference and no store
    /// was supplied; otherwise whatever reading the table returns.
    pub fn resolve(self, store: Option<&dyn EntityStore>) -> Result<ObservedTable, StoreError> {
        match self {
            TableRef::Loaded(table) => Ok(table),
            TableRef::Path(path) => Ok(ObservedTable::from_csv_path(&path)?),
            TableRef::Entity(id) => match store {
                Some(store) => {
                    tracing::debug!(entity = %id, "reading table from store");
                    store.read_table(&id)
                }
                None => Err(StoreError::NoStore(id)),
            },
        }
    }
}

impl From<ObservedTable> for TableRef {
    fn from(table: ObservedTable) -> Self {
        TableRef::Loaded(table)
    }
}
