//! `annot validate`: check a table's values against the dictionary.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use annot_client::{EntityStore, SchemaCatalog, SnapshotStore, TableRef};
use annot_core::{EntityId, ModuleName};
use annot_schema::{flatten_path, validate, FlattenedSchema, ValidationReport};

use crate::{open_source, resolve_release, EXIT_MALFORMED};

/// Arguments of `annot validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// CSV/TSV path, or an entity id when `--store` is given.
    pub table: String,

    /// Module to validate against; repeatable (default: all modules).
    #[arg(long = "module")]
    pub modules: Vec<String>,

    /// Release tag (default: latest).
    #[arg(long, conflicts_with = "schema_file")]
    pub release: Option<String>,

    /// Validate against local dictionary documents instead of the source;
    /// repeatable.
    #[arg(long = "schema-file", conflicts_with = "modules")]
    pub schema_file: Vec<PathBuf>,

    /// Snapshot store holding the table entity.
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Validate and print the malformed values per column.
///
/// Returns [`EXIT_MALFORMED`] when any column has malformed values.
pub fn run_validate(args: &ValidateArgs, source_dir: Option<&Path>) -> Result<u8> {
    let schema = load_schema(args, source_dir)?;

    let table = match &args.store {
        Some(path) => {
            let store = SnapshotStore::open(path)?;
            TableRef::Entity(EntityId::new(args.table.as_str())?)
                .resolve(Some(&store as &dyn EntityStore))
        }
        None => TableRef::Path(PathBuf::from(&args.table)).resolve(None),
    }
    .with_context(|| format!("cannot read table {}", args.table))?;

    let report = validate(&table, &schema);
    let stdout = std::io::stdout();
    write_report(&report, args.json, stdout.lock())?;

    if report.is_clean() {
        Ok(0)
    } else {
        Ok(EXIT_MALFORMED)
    }
}

fn load_schema(args: &ValidateArgs, source_dir: Option<&Path>) -> Result<FlattenedSchema> {
    if !args.schema_file.is_empty() {
        let schemas = args
            .schema_file
            .iter()
            .map(|path| {
                let module = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .and_then(|n| ModuleName::from_file_name(n).ok());
                flatten_path(path, module.as_ref())
                    .with_context(|| format!("cannot flatten {}", path.display()))
            })
            .collect::<Result<Vec<_>>>()?;
        return Ok(FlattenedSchema::concat(schemas));
    }

    let modules = args
        .modules
        .iter()
        .map(|m| ModuleName::new(m.as_str()))
        .collect::<Result<Vec<_>, _>>()?;
    let source = open_source(source_dir)?;
    let release = resolve_release(source.as_ref(), args.release.as_deref())?;
    let catalog = SchemaCatalog::load(source.as_ref(), &release, &modules)?;

    for (module, error) in &catalog.failures {
        tracing::warn!(%module, "skipping module: {error}");
    }
    if catalog.schemas.is_empty() {
        bail!("no annotation modules could be loaded at {release}");
    }
    Ok(catalog.into_combined())
}

/// Write the report: one `column: value, value` line per malformed column,
/// or JSON.
pub fn write_report<W: Write>(report: &ValidationReport, json: bool, mut out: W) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut out, report)?;
        writeln!(out)?;
        return Ok(());
    }
    for (column, values) in report.malformed() {
        let values: Vec<&str> = values.iter().map(String::as_str).collect();
        writeln!(out, "{column}: {}", values.join(", "))?;
    }
    if report.is_clean() {
        tracing::info!(checked = report.checked().len(), "no malformed values");
    }
    Ok(())
}
