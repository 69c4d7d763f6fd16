//! `annot manifest` and `annot upload`.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use annot_client::{EntityStore, SnapshotStore};
use annot_core::{delimiter_for_path, EntityId};
use annot_manifest::{
    annotation_keys, build_manifest, mirror_hierarchy, read_manifest, upload_manifest,
    walk_local, write_manifest, MANIFEST_FILE_NAME,
};

/// Arguments of `annot manifest`.
#[derive(Args, Debug)]
pub struct ManifestArgs {
    /// Local directory whose hierarchy is mirrored in the store.
    #[arg(short = 'd', long)]
    pub directory: PathBuf,

    /// Project or folder id that receives the hierarchy.
    #[arg(long)]
    pub id: String,

    /// Snapshot store to mirror into.
    #[arg(long)]
    pub store: PathBuf,

    /// Dictionary documents (paths or URLs) whose field names become columns.
    #[arg(short = 'f', long = "files", num_args = 1..)]
    pub files: Vec<String>,

    /// Number of directory levels to mirror; deeper files are folded into
    /// the deepest mirrored folder.
    #[arg(short = 'n', long = "depth", value_parser = clap::value_parser!(u32).range(1..))]
    pub depth: Option<u32>,

    /// Write a tab-separated manifest to stdout instead of
    /// `annotations_manifest.csv`.
    #[arg(long)]
    pub tab: bool,
}

/// Arguments of `annot upload`.
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Filled-in manifest (`.csv`, or `.tsv` for tab-separated).
    pub manifest: PathBuf,

    /// Snapshot store to upload into.
    #[arg(long)]
    pub store: PathBuf,
}

/// Mirror the directory, then write the manifest.
pub fn run_manifest(args: &ManifestArgs) -> Result<u8> {
    let root_id = EntityId::new(args.id.as_str())?;
    let tree = walk_local(&args.directory, args.depth.map(|d| d as usize))?;

    let mut store = SnapshotStore::open(&args.store)?;
    store
        .get(&root_id)
        .with_context(|| format!("cannot mirror into {root_id}"))?;
    let folders = mirror_hierarchy(&mut store, &root_id, &tree.root, &tree.dirs)?;
    store.save()?;

    let keys = annotation_keys(&args.files)?;
    let manifest = build_manifest(&tree.files, &keys, &folders)?;

    if args.tab {
        let stdout = std::io::stdout();
        write_manifest(&manifest, stdout.lock(), b'\t')?;
    } else {
        let file = File::create(MANIFEST_FILE_NAME)
            .with_context(|| format!("cannot create {MANIFEST_FILE_NAME}"))?;
        write_manifest(&manifest, file, b',')?;
        eprintln!("Manifest has been created: {MANIFEST_FILE_NAME}");
    }
    Ok(0)
}

/// Store the manifest's files with their annotations.
pub fn run_upload(args: &UploadArgs) -> Result<u8> {
    let manifest = read_manifest_file(&args.manifest)?;
    let mut store = SnapshotStore::open(&args.store)?;
    let stored = upload_manifest(&mut store, &manifest)?;
    store.save()?;
    println!("uploaded {} files", stored.len());
    Ok(0)
}

fn read_manifest_file(path: &Path) -> Result<annot_manifest::Manifest> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    read_manifest(file, delimiter_for_path(path))
        .with_context(|| format!("invalid manifest {}", path.display()))
}
