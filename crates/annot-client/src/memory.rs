//! In-process entity stores.
//!
//! [`InMemoryStore`] keeps the whole hierarchy in a map and hands out ids of
//! the form `mem<N>`. [`SnapshotStore`] is the same store loaded from and
//! saved back to a JSON file, which is what the CLI uses as its `--store`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use annot_core::{EntityId, ObservedTable};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::store::{Entity, EntityKind, EntityStore, NewFile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredEntity {
    #[serde(flatten)]
    entity: Entity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    table: Option<ObservedTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    annotations: BTreeMap<String, String>,
}

/// An entity hierarchy held in memory.
///
/// Creating a folder or file whose name already exists under the same
/// parent returns the existing entity (files get their path and
/// annotations replaced), matching how the remote platform treats a store
/// of an existing name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InMemoryStore {
    next_id: u64,
    entities: BTreeMap<EntityId, StoredEntity>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_id(&mut self) -> Result<EntityId, StoreError> {
        self.next_id += 1;
        Ok(EntityId::new(format!("mem{}", self.next_id))?)
    }

    fn insert(
        &mut self,
        name: &str,
        parent: Option<&EntityId>,
        kind: EntityKind,
    ) -> Result<EntityId, StoreError> {
        if let Some(parent) = parent {
            let container = self.stored(parent)?;
            if !container.entity.kind.is_container() {
                return Err(StoreError::NotAContainer(parent.clone()));
            }
            if let Some(existing) = self.child_named(parent, name, kind) {
                return Ok(existing);
            }
        }
        let id = self.fresh_id()?;
        self.entities.insert(
            id.clone(),
            StoredEntity {
                entity: Entity {
                    id: id.clone(),
                    name: name.to_string(),
                    parent: parent.cloned(),
                    kind,
                },
                table: None,
                path: None,
                annotations: BTreeMap::new(),
            },
        );
        Ok(id)
    }

    fn stored(&self, id: &EntityId) -> Result<&StoredEntity, StoreError> {
        self.entities
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn child_named(&self, parent: &EntityId, name: &str, kind: EntityKind) -> Option<EntityId> {
        self.entities
            .values()
            .find(|s| {
                s.entity.parent.as_ref() == Some(parent)
                    && s.entity.name == name
                    && s.entity.kind == kind
            })
            .map(|s| s.entity.id.clone())
    }

    /// Add a top-level project.
    pub fn add_project(&mut self, name: &str) -> Result<EntityId, StoreError> {
        self.insert(name, None, EntityKind::Project)
    }

    /// Add a table entity holding `table`.
    pub fn add_table(
        &mut self,
        name: &str,
        parent: &EntityId,
        table: ObservedTable,
    ) -> Result<EntityId, StoreError> {
        let id = self.insert(name, Some(parent), EntityKind::Table)?;
        if let Some(stored) = self.entities.get_mut(&id) {
            stored.table = Some(table);
        }
        Ok(id)
    }

    /// Annotations attached to a file.
    pub fn annotations(&self, id: &EntityId) -> Result<&BTreeMap<String, String>, StoreError> {
        Ok(&self.stored(id)?.annotations)
    }

    /// Direct children of `parent`, sorted by name.
    pub fn children(&self, parent: &EntityId) -> Vec<&Entity> {
        let mut children: Vec<&Entity> = self
            .entities
            .values()
            .map(|s| &s.entity)
            .filter(|e| e.parent.as_ref() == Some(parent))
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        children
    }

    /// Number of entities of all kinds.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl EntityStore for InMemoryStore {
    fn get(&self, id: &EntityId) -> Result<Entity, StoreError> {
        Ok(self.stored(id)?.entity.clone())
    }

    fn read_table(&self, id: &EntityId) -> Result<ObservedTable, StoreError> {
        self.stored(id)?
            .table
            .clone()
            .ok_or_else(|| StoreError::NotATable(id.clone()))
    }

    fn walk(&self, root: &EntityId) -> Result<Vec<(String, EntityId)>, StoreError> {
        let root_entity = &self.stored(root)?.entity;
        if !root_entity.kind.is_container() {
            return Err(StoreError::NotAContainer(root.clone()));
        }

        let mut out = Vec::new();
        let mut stack = vec![(root_entity.name.clone(), root.clone())];
        while let Some((path, id)) = stack.pop() {
            let children: Vec<(String, EntityId)> = self
                .children(&id)
                .into_iter()
                .filter(|e| e.kind.is_container())
                .map(|e| (format!("{path}/{}", e.name), e.id.clone()))
                .collect();
            out.push((path, id));
            // Reversed so the lexically first child is visited first.
            stack.extend(children.into_iter().rev());
        }
        Ok(out)
    }

    fn create_folder(&mut self, name: &str, parent: &EntityId) -> Result<EntityId, StoreError> {
        let id = self.insert(name, Some(parent), EntityKind::Folder)?;
        tracing::debug!(folder = %id, %parent, name, "folder created");
        Ok(id)
    }

    fn store_file(&mut self, file: NewFile) -> Result<EntityId, StoreError> {
        let id = self.insert(&file.name, Some(&file.parent), EntityKind::File)?;
        if let Some(stored) = self.entities.get_mut(&id) {
            stored.path = Some(file.path);
            stored.annotations = file
                .annotations
                .into_iter()
                .filter(|(_, v)| !v.is_empty())
                .collect();
        }
        tracing::debug!(file = %id, parent = %file.parent, "file stored");
        Ok(id)
    }
}

/// An [`InMemoryStore`] persisted as a JSON snapshot file.
///
/// Changes are held in memory until [`save`](Self::save) is called.
#[derive(Debug)]
pub struct SnapshotStore {
    path: PathBuf,
    inner: InMemoryStore,
}

impl SnapshotStore {
    /// Load a snapshot. A missing file opens as an empty store that will be
    /// created on save.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] if the file exists but cannot be read,
    /// [`StoreError::Snapshot`] if it is not a valid snapshot.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let inner = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| StoreError::Snapshot {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "snapshot not found, starting empty");
                InMemoryStore::new()
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        Ok(Self { path, inner })
    }

    /// Write the current state back to the snapshot file.
    pub fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(&self.inner).map_err(|e| StoreError::Snapshot {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        std::fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), entities = self.inner.len(), "snapshot saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut InMemoryStore {
        &mut self.inner
    }
}

impl EntityStore for SnapshotStore {
    fn get(&self, id: &EntityId) -> Result<Entity, StoreError> {
        self.inner.get(id)
    }

    fn read_table(&self, id: &EntityId) -> Result<ObservedTable, StoreError> {
        self.inner.read_table(id)
    }

    fn walk(&self, root: &EntityId) -> Result<Vec<(String, EntityId)>, StoreError> {
        self.inner.walk(root)
    }

    fn create_folder(&mut self, name: &str, parent: &EntityId) -> Result<EntityId, StoreError> {
        self.inner.create_folder(name, parent)
    }

    fn store_file(&mut self, file: NewFile) -> Result<EntityId, StoreError> {
        self.inner.store_file(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hierarchy() -> (InMemoryStore, EntityId) {
        let mut store = InMemoryStore::new();
        let project = store.add_project("study").unwrap();
        let raw = store.create_folder("raw", &project).unwrap();
        store.create_folder("rna", &raw).unwrap();
        store.create_folder("derived", &project).unwrap();
        (store, project)
    }

    #[test]
    fn ids_are_sequential() {
        let mut store = InMemoryStore::new();
        assert_eq!(store.add_project("a").unwrap().as_str(), "mem1");
        assert_eq!(store.add_project("b").unwrap().as_str(), "mem2");
    }

    #[test]
    fn walk_lists_parents_before_children() {
        let (store, project) = hierarchy();
        let paths: Vec<String> = store.walk(&project).unwrap().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, ["study", "study/derived", "study/raw", "study/raw/rna"]);
    }

    #[test]
    fn walk_skips_files_and_tables() {
        let (mut store, project) = hierarchy();
        store
            .store_file(NewFile {
                path: PathBuf::from("/tmp/a.txt"),
                name: "a.txt".to_string(),
                parent: project.clone(),
                annotations: BTreeMap::new(),
            })
            .unwrap();
        let table = ObservedTable::from_str_columns([("x", vec!["1"])]).unwrap();
        store.add_table("t", &project, table).unwrap();
        assert_eq!(store.walk(&project).unwrap().len(), 4);
    }

    #[test]
    fn create_folder_is_idempotent_by_name() {
        let (mut store, project) = hierarchy();
        let before = store.len();
        let again = store.create_folder("raw", &project).unwrap();
        assert_eq!(store.len(), before);
        assert_eq!(store.get(&again).unwrap().name, "raw");
    }

    #[test]
    fn create_under_file_is_rejected() {
        let (mut store, project) = hierarchy();
        let file = store
            .store_file(NewFile {
                path: PathBuf::from("/tmp/a.txt"),
                name: "a.txt".to_string(),
                parent: project,
                annotations: BTreeMap::new(),
            })
            .unwrap();
        let err = store.create_folder("x", &file).unwrap_err();
        assert!(matches!(err, StoreError::NotAContainer(_)));
    }

    #[test]
    fn missing_parent_is_not_found() {
        let mut store = InMemoryStore::new();
        let err = store
            .create_folder("x", &EntityId::new("syn404").unwrap())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn store_file_drops_empty_annotations() {
        let (mut store, project) = hierarchy();
        let mut annotations = BTreeMap::new();
        annotations.insert("assay".to_string(), "rnaSeq".to_string());
        annotations.insert("species".to_string(), String::new());
        let id = store
            .store_file(NewFile {
                path: PathBuf::from("/data/s1.fastq"),
                name: "s1.fastq".to_string(),
                parent: project,
                annotations,
            })
            .unwrap();
        let stored = store.annotations(&id).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored["assay"], "rnaSeq");
        assert_eq!(store.get(&id).unwrap().kind, EntityKind::File);
    }

    #[test]
    fn read_table_on_folder_is_rejected() {
        let (store, project) = hierarchy();
        assert!(matches!(
            store.read_table(&project).unwrap_err(),
            StoreError::NotATable(_)
        ));
    }

    #[test]
    fn snapshot_survives_save_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut snapshot = SnapshotStore::open(&path).unwrap();
        assert!(snapshot.inner().is_empty());
        let project = snapshot.inner_mut().add_project("study").unwrap();
        let table = ObservedTable::from_str_columns([("assay", vec!["rnaSeq"])]).unwrap();
        let table_id = snapshot
            .inner_mut()
            .add_table("samples", &project, table.clone())
            .unwrap();
        snapshot.create_folder("raw", &project).unwrap();
        snapshot.save().unwrap();

        let reopened = SnapshotStore::open(&path).unwrap();
        assert_eq!(reopened.inner(), snapshot.inner());
        assert_eq!(reopened.read_table(&table_id).unwrap(), table);

        // Ids keep counting after a reload.
        let mut reopened = reopened;
        let next = reopened.create_folder("derived", &project).unwrap();
        assert_eq!(next.as_str(), "mem4");
    }

    #[test]
    fn invalid_snapshot_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            SnapshotStore::open(&path).unwrap_err(),
            StoreError::Snapshot { .. }
        ));
    }
}
