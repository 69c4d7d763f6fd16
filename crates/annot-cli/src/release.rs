//! `annot release` and `annot modules`.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use crate::{open_source, resolve_release};

/// Arguments of `annot modules`.
#[derive(Args, Debug)]
pub struct ModulesArgs {
    /// Release tag to list (default: latest).
    #[arg(long)]
    pub release: Option<String>,
}

/// Print the latest release tag.
pub fn run_release(source_dir: Option<&Path>) -> Result<u8> {
    let source = open_source(source_dir)?;
    let release = resolve_release(source.as_ref(), None)?;
    println!("{release}");
    Ok(0)
}

/// Print the module names published at a release, one per line.
pub fn run_modules(args: &ModulesArgs, source_dir: Option<&Path>) -> Result<u8> {
    let source = open_source(source_dir)?;
    let release = resolve_release(source.as_ref(), args.release.as_deref())?;
    let modules = source
        .list_modules(&release)
        .with_context(|| format!("cannot list modules at {release}"))?;

    for module in modules.keys() {
        println!("{module}");
    }
    tracing::info!(%release, count = modules.len(), "listed modules");
    Ok(0)
}
