//! # annot CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use annot_cli::flatten::{run_flatten, FlattenArgs};
use annot_cli::manifest::{run_manifest, run_upload, ManifestArgs, UploadArgs};
use annot_cli::release::{run_modules, run_release, ModulesArgs};
use annot_cli::validate::{run_validate, ValidateArgs};

/// Annotation curator for a data-sharing platform.
///
/// Reads the versioned annotation dictionary, flattens its modules into
/// key/value tables, validates dataset tables against it, and prepares
/// annotated uploads.
#[derive(Parser, Debug)]
#[command(name = "annot", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Read dictionary modules from a local directory instead of GitHub.
    #[arg(long, global = true)]
    source_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the latest dictionary release tag.
    Release,

    /// List the modules published at a release.
    Modules(ModulesArgs),

    /// Print one module as a flattened key/value table.
    Flatten(FlattenArgs),

    /// Report table values not permitted by the dictionary.
    Validate(ValidateArgs),

    /// Mirror a local directory into the store and write an upload manifest.
    Manifest(ManifestArgs),

    /// Store the files of a filled-in manifest with their annotations.
    Upload(UploadArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Logs go to stderr so that stdout stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "annot starting");

    let source_dir = cli.source_dir.as_deref();
    let result = match cli.command {
        Commands::Release => run_release(source_dir),
        Commands::Modules(args) => run_modules(&args, source_dir),
        Commands::Flatten(args) => run_flatten(&args, source_dir),
        Commands::Validate(args) => run_validate(&args, source_dir),
        Commands::Manifest(args) => run_manifest(&args),
        Commands::Upload(args) => run_upload(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
