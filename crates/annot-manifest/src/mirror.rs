//! Mirror a local directory hierarchy onto the entity store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use annot_client::EntityStore;
use annot_core::EntityId;

use crate::error::ManifestError;

/// Local absolute directory -> remote folder id.
pub type FolderMap = BTreeMap<PathBuf, EntityId>;

/// Map the remote hierarchy under `root_id` onto `local_root` and create a
/// folder for every directory in `dirs` that has no remote counterpart.
///
/// Remote paths start with the root entity's name; that first component is
/// replaced by `local_root`, so `study/raw` under a local root `/data/x`
/// maps to `/data/x/raw`. Missing folders are created parents first.
///
/// # Errors
///
/// [`ManifestError::Unmapped`] if a directory's parent is neither remote
/// nor in `dirs`; store errors as they occur.
pub fn mirror_hierarchy(
    store: &mut dyn EntityStore,
    root_id: &EntityId,
    local_root: &Path,
    dirs: &[PathBuf],
) -> Result<FolderMap, ManifestError> {
    let mut folders = FolderMap::new();
    for (remote_path, id) in store.walk(root_id)? {
        let relative = remote_path.split_once('/').map_or("", |(_, rest)| rest);
        let local = if relative.is_empty() {
            local_root.to_path_buf()
        } else {
            local_root.join(relative)
        };
        folders.insert(local, id);
    }

    let mut pending: Vec<&PathBuf> = dirs.iter().filter(|d| !folders.contains_key(*d)).collect();
    // Path ordering compares components, so a parent sorts before its children.
    pending.sort();

    let mut created = 0usize;
    for dir in pending {
        let parent_id = dir
            .parent()
            .and_then(|p| folders.get(p))
            .cloned()
            .ok_or_else(|| ManifestError::Unmapped(dir.clone()))?;
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ManifestError::Unmapped(dir.clone()))?;
        let id = store.create_folder(&name, &parent_id)?;
        tracing::info!(dir = %dir.display(), folder = %id, "created remote folder");
        folders.insert(dir.clone(), id);
        created += 1;
    }

    tracing::debug!(mapped = folders.len(), created, "hierarchy mirrored");
    Ok(folders)
}
