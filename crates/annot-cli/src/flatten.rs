//! `annot flatten`: print one module as a flattened table.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use annot_core::ModuleName;
use annot_schema::{flatten, flatten_path, FlattenedSchema};

use crate::{open_source, resolve_release};

/// Output format of a flattened table.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

/// Arguments of `annot flatten`.
#[derive(Args, Debug)]
pub struct FlattenArgs {
    /// Module to fetch from the annotation source.
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub module: Option<String>,

    /// Release tag (default: latest).
    #[arg(long, conflicts_with = "file")]
    pub release: Option<String>,

    /// Flatten a local dictionary document instead.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Module label for rows of a local document (default: file stem).
    #[arg(long = "module", requires = "file")]
    pub module_label: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,
}

/// Flatten the requested module and write it to stdout.
pub fn run_flatten(args: &FlattenArgs, source_dir: Option<&Path>) -> Result<u8> {
    let schema = load(args, source_dir)?;
    let stdout = std::io::stdout();
    write_schema(&schema, args.format, stdout.lock())?;
    Ok(0)
}

fn load(args: &FlattenArgs, source_dir: Option<&Path>) -> Result<FlattenedSchema> {
    if let Some(file) = &args.file {
        let label = match &args.module_label {
            Some(label) => Some(ModuleName::new(label.as_str())?),
            None => file
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| ModuleName::from_file_name(n).ok()),
        };
        return flatten_path(file, label.as_ref())
            .with_context(|| format!("cannot flatten {}", file.display()));
    }

    let module = ModuleName::new(args.module.as_deref().unwrap_or_default())?;
    let source = open_source(source_dir)?;
    let release = resolve_release(source.as_ref(), args.release.as_deref())?;
    let fields = source
        .fetch_module(&release, &module)
        .with_context(|| format!("cannot fetch module {module} at {release}"))?;
    Ok(flatten(&fields, Some(&module)))
}

/// Write `schema` in `format`.
pub fn write_schema<W: Write>(schema: &FlattenedSchema, format: OutputFormat, mut out: W) -> Result<()> {
    match format {
        OutputFormat::Csv => schema.write_csv(out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, schema)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
