//! # annot-cli — The `annot` Command
//!
//! ## Subcommands
//!
//! - `annot release` / `annot modules`: inspect the dictionary.
//! - `annot flatten`: print one module as a flattened table.
//! - `annot validate`: check a table's values against the dictionary.
//! - `annot manifest` / `annot upload`: prepare and upload annotated files.
//!
//! ```bash
//! annot modules --release v7.2.0
//! annot flatten neuro --format json
//! annot validate samples.csv --module neuro --module experimentalData
//! annot manifest -d ./study --id mem1 --store store.json -f neuro.json -n 2
//! ```
//!
//! Handlers return the process exit code: 0 on success, 2 when validation
//! found malformed values. Errors propagate as `anyhow::Error` and exit 1.

pub mod flatten;
pub mod manifest;
pub mod release;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};

use annot_client::{
    AnnotationSource, DirectoryAnnotationSource, GitHubAnnotationSource, SourceConfig,
};
use annot_core::ReleaseVersion;

/// Exit code when validation reports malformed values.
pub const EXIT_MALFORMED: u8 = 2;

/// Open the annotation source: a local directory when given, otherwise
/// GitHub configured from the environment.
pub fn open_source(source_dir: Option<&Path>) -> Result<Box<dyn AnnotationSource>> {
    match source_dir {
        Some(dir) => {
            tracing::debug!(dir = %dir.display(), "using local annotation source");
            Ok(Box::new(DirectoryAnnotationSource::new(dir)))
        }
        None => {
            let config = SourceConfig::from_env().context("invalid annotation source configuration")?;
            tracing::debug!(?config, "using GitHub annotation source");
            Ok(Box::new(GitHubAnnotationSource::new(config)?))
        }
    }
}

/// The requested release, or the source's latest when none is given.
pub fn resolve_release(
    source: &dyn AnnotationSource,
    release: Option<&str>,
) -> Result<ReleaseVersion> {
    match release {
        Some(tag) => Ok(ReleaseVersion::new(tag)?),
        None => Ok(source
            .latest_release()
            .context("cannot resolve latest release")?),
    }
}
