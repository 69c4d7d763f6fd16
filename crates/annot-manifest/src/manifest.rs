//! The upload manifest: one row per local file, with the remote parent it
//! will be stored under and one column per annotation key.

use std::collections::{BTreeMap, HashSet};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use annot_client::{EntityStore, NewFile};
use annot_core::EntityId;

use crate::error::ManifestError;
use crate::mirror::FolderMap;

/// Default output file of `annot manifest`.
pub const MANIFEST_FILE_NAME: &str = "annotations_manifest.csv";

/// Columns every manifest starts with.
pub const FIXED_COLUMNS: [&str; 3] = ["path", "name", "parent"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRow {
    pub path: PathBuf,
    pub name: String,
    pub parent: EntityId,
    /// Filled annotation cells only; absent keys are empty in the output.
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub keys: Vec<String>,
    pub rows: Vec<ManifestRow>,
}

/// Build a manifest for `files` against the mirrored `folders`.
///
/// Each file is placed under its deepest mirrored ancestor. Its name is
/// its path below that ancestor with components joined by `_`, which is
/// the plain file name when its own directory is mirrored.
///
/// # Errors
///
/// [`ManifestError::Unmapped`] if a file has no mirrored ancestor.
pub fn build_manifest(
    files: &[PathBuf],
    keys: &[String],
    folders: &FolderMap,
) -> Result<Manifest, ManifestError> {
    let mut seen = HashSet::new();
    let keys: Vec<String> = keys
        .iter()
        .filter(|k| !FIXED_COLUMNS.contains(&k.as_str()) && seen.insert(k.as_str()))
        .cloned()
        .collect();

    let rows = files
        .iter()
        .map(|file| -> Result<ManifestRow, ManifestError> {
            let (ancestor, parent) = file
                .ancestors()
                .skip(1)
                .find_map(|dir| folders.get(dir).map(|id| (dir, id.clone())))
                .ok_or_else(|| ManifestError::Unmapped(file.clone()))?;
            Ok(ManifestRow {
                path: file.clone(),
                name: collapsed_name(file, ancestor),
                parent,
                annotations: BTreeMap::new(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(rows = rows.len(), keys = keys.len(), "manifest built");
    Ok(Manifest { keys, rows })
}

fn collapsed_name(file: &Path, ancestor: &Path) -> String {
    let relative = file.strip_prefix(ancestor).unwrap_or(file);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("_")
}

/// Write `manifest` as delimited text with a header row.
pub fn write_manifest<W: Write>(
    manifest: &Manifest,
    writer: W,
    delimiter: u8,
) -> Result<(), ManifestError> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    out.write_record(FIXED_COLUMNS.iter().copied().chain(manifest.keys.iter().map(String::as_str)))?;
    for row in &manifest.rows {
        let path = row.path.to_string_lossy();
        let mut record: Vec<&str> = vec![&*path, row.name.as_str(), row.parent.as_str()];
        record.extend(
            manifest
                .keys
                .iter()
                .map(|k| row.annotations.get(k).map_or("", String::as_str)),
        );
        out.write_record(&record)?;
    }
    out.flush().map_err(|source| ManifestError::Io {
        path: "manifest".to_string(),
        source,
    })?;
    Ok(())
}

/// Read a manifest written by [`write_manifest`] and then filled in.
///
/// Columns other than `path`, `name` and `parent` are annotation keys.
/// Empty cells are not annotations.
///
/// # Errors
///
/// [`ManifestError::MissingColumn`] for an absent fixed column,
/// [`ManifestError::InvalidRow`] for an empty path or a bad parent id.
pub fn read_manifest<R: Read>(reader: R, delimiter: u8) -> Result<Manifest, ManifestError> {
    let mut input = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(reader);
    let headers = input.headers()?.clone();

    let position = |column: &'static str| {
        headers
            .iter()
            .position(|h| h == column)
            .ok_or(ManifestError::MissingColumn(column))
    };
    let (path_at, name_at, parent_at) = (position("path")?, position("name")?, position("parent")?);

    let key_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !FIXED_COLUMNS.contains(h))
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    let mut manifest = Manifest {
        keys: key_columns.iter().map(|(_, k)| k.clone()).collect(),
        rows: Vec::new(),
    };

    for (index, record) in input.records().enumerate() {
        let record = record?;
        let row = index + 1;
        let cell = |i: usize| record.get(i).unwrap_or_default();

        let path = cell(path_at);
        if path.is_empty() {
            return Err(ManifestError::InvalidRow {
                row,
                reason: "empty path".to_string(),
            });
        }
        let parent = EntityId::new(cell(parent_at)).map_err(|e| ManifestError::InvalidRow {
            row,
            reason: e.to_string(),
        })?;
        let name = match cell(name_at) {
            "" => Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            name => name.to_string(),
        };
        let annotations = key_columns
            .iter()
            .filter_map(|(i, key)| {
                let value = cell(*i);
                (!value.is_empty()).then(|| (key.clone(), value.to_string()))
            })
            .collect();

        manifest.rows.push(ManifestRow {
            path: PathBuf::from(path),
            name,
            parent,
            annotations,
        });
    }
    Ok(manifest)
}

/// Store every manifest row's file under its parent with its annotations.
///
/// Stops at the first failure; rows before it remain stored.
pub fn upload_manifest(
    store: &mut dyn EntityStore,
    manifest: &Manifest,
) -> Result<Vec<EntityId>, ManifestError> {
    let mut stored = Vec::with_capacity(manifest.rows.len());
    for row in &manifest.rows {
        let id = store.store_file(NewFile {
            path: row.path.clone(),
            name: row.name.clone(),
            parent: row.parent.clone(),
            annotations: row.annotations.clone(),
        })?;
        tracing::debug!(file = %id, path = %row.path.display(), "uploaded");
        stored.push(id);
    }
    tracing::info!(files = stored.len(), "manifest uploaded");
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use annot_client::InMemoryStore;

    fn id(s: &str) -> EntityId {
        EntityId::new(s).unwrap()
    }

    fn folders() -> FolderMap {
        let mut folders = FolderMap::new();
        folders.insert(PathBuf::from("/data"), id("syn1"));
        folders.insert(PathBuf::from("/data/raw"), id("syn2"));
        folders
    }

    fn keys() -> Vec<String> {
        ["used", "executed", "assay"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn files_go_under_deepest_mirrored_ancestor() {
        let files = vec![
            PathBuf::from("/data/README.md"),
            PathBuf::from("/data/raw/s1.fastq"),
            PathBuf::from("/data/raw/rna/batch1/s2.fastq"),
        ];
        let manifest = build_manifest(&files, &keys(), &folders()).unwrap();

        let placed: Vec<(&str, &str)> = manifest
            .rows
            .iter()
            .map(|r| (r.name.as_str(), r.parent.as_str()))
            .collect();
        assert_eq!(
            placed,
            [
                ("README.md", "syn1"),
                ("s1.fastq", "syn2"),
                ("rna_batch1_s2.fastq", "syn2"),
            ]
        );
    }

    #[test]
    fn file_outside_root_is_unmapped() {
        let err = build_manifest(&[PathBuf::from("/other/x.txt")], &keys(), &folders()).unwrap_err();
        assert!(matches!(err, ManifestError::Unmapped(_)));
    }

    #[test]
    fn fixed_and_duplicate_keys_are_dropped() {
        let keys: Vec<String> = ["used", "name", "assay", "used"].iter().map(|s| s.to_string()).collect();
        let manifest = build_manifest(&[], &keys, &folders()).unwrap();
        assert_eq!(manifest.keys, ["used", "assay"]);
    }

    #[test]
    fn writes_header_and_empty_key_cells() {
        let files = vec![PathBuf::from("/data/raw/s1.fastq")];
        let manifest = build_manifest(&files, &keys(), &folders()).unwrap();

        let mut out = Vec::new();
        write_manifest(&manifest, &mut out, b',').unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "path,name,parent,used,executed,assay\n/data/raw/s1.fastq,s1.fastq,syn2,,,\n"
        );

        let mut out = Vec::new();
        write_manifest(&manifest, &mut out, b'\t').unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("path\tname\tparent\tused"));
    }

    #[test]
    fn reads_filled_manifest() {
        let text = "path,name,parent,used,assay\n\
                    /data/raw/s1.fastq,s1.fastq,syn2,,rnaSeq\n\
                    /data/README.md,,syn1,,\n";
        let manifest = read_manifest(text.as_bytes(), b',').unwrap();

        assert_eq!(manifest.keys, ["used", "assay"]);
        assert_eq!(manifest.rows.len(), 2);
        assert_eq!(manifest.rows[0].annotations.len(), 1);
        assert_eq!(manifest.rows[0].annotations["assay"], "rnaSeq");
        assert_eq!(manifest.rows[1].name, "README.md");
        assert!(manifest.rows[1].annotations.is_empty());
    }

    #[test]
    fn read_requires_fixed_columns() {
        let err = read_manifest("path,name\n/a,a\n".as_bytes(), b',').unwrap_err();
        assert!(matches!(err, ManifestError::MissingColumn("parent")));
    }

    #[test]
    fn read_rejects_bad_parent() {
        let err = read_manifest("path,name,parent\n/a,a,\n".as_bytes(), b',').unwrap_err();
        assert!(matches!(err, ManifestError::InvalidRow { row: 1, .. }));
    }

    #[test]
    fn upload_stores_rows_with_annotations() {
        let mut store = InMemoryStore::new();
        let project = store.add_project("study").unwrap();
        let mut annotations = BTreeMap::new();
        annotations.insert("assay".to_string(), "rnaSeq".to_string());
        let manifest = Manifest {
            keys: vec!["assay".to_string()],
            rows: vec![ManifestRow {
                path: PathBuf::from("/data/s1.fastq"),
                name: "s1.fastq".to_string(),
                parent: project.clone(),
                annotations,
            }],
        };

        let ids = upload_manifest(&mut store, &manifest).unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(store.get(&ids[0]).unwrap().parent, Some(project));
        assert_eq!(store.annotations(&ids[0]).unwrap()["assay"], "rnaSeq");
    }

    #[test]
    fn upload_to_missing_parent_fails() {
        let mut store = InMemoryStore::new();
        let manifest = Manifest {
            keys: Vec::new(),
            rows: vec![ManifestRow {
                path: PathBuf::from("/data/s1.fastq"),
                name: "s1.fastq".to_string(),
                parent: id("syn404"),
                annotations: BTreeMap::new(),
            }],
        };
        assert!(matches!(
            upload_manifest(&mut store, &manifest).unwrap_err(),
            ManifestError::Store(_)
        ));
    }
}
