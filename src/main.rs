use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use udtsync::config::{CONFIG_FILE_NAME, UdtSyncConfig};
use udtsync::inspect::{self, InspectArgs};
use udtsync::sync_cmd::{self, DiffArgs, SyncArgs};
use udtsync::telemetry;

/// Synchronize UDT definitions across tag exports
///
/// Reads two or more JSON tag exports, finds every UDT definition in them,
/// reports which definitions are missing or differ between files, and
/// writes one merged definition tree.
///
/// The first file is the reference: when definitions conflict, its version
/// wins unless a union merge is requested and the variants differ only by
/// missing properties.
///
/// QUICK START:
///
///   udt-sync diff plant-a.json plant-b.json
///   udt-sync sync plant-a.json plant-b.json -o merged.json --union-all
#[derive(Parser)]
#[command(name = "udt-sync")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'udt-sync <command> --help' for more information on a specific command.")]
struct Cli {
    /// Configuration file.
    #[arg(
        long,
        global = true,
        env = "UDT_SYNC_CONFIG",
        value_name = "PATH",
        default_value = CONFIG_FILE_NAME
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge exports into one definition tree
    ///
    /// Writes the merged tree to stdout (report on stderr), or to the -o
    /// path (report on stdout).
    ///
    /// Examples:
    ///   udt-sync sync plant-a.json plant-b.json -o merged.json
    ///   udt-sync sync 'exports/*.json' --union Motor --report report.json
    ///   udt-sync sync a.json b.json --union-all --reference b.json
    #[command(verbatim_doc_comment)]
    Sync(SyncArgs),

    /// Report missing and differing definitions
    ///
    /// Exit status: 0 when every file agrees, 1 when any definition is
    /// missing or differs, 2 when the run itself fails (unreadable file,
    /// invalid JSON, bad config).
    ///
    /// Examples:
    ///   udt-sync diff plant-a.json plant-b.json
    ///   udt-sync diff 'exports/*.json' --format json
    #[command(verbatim_doc_comment)]
    Diff(DiffArgs),

    /// List the definitions found in one export
    ///
    /// Prints each definition's name, signature digest and path.
    ///
    /// Examples:
    ///   udt-sync inspect plant-a.json --format json
    #[command(verbatim_doc_comment)]
    Inspect(InspectArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init();

    run(&cli).unwrap_or_else(|e| {
        eprintln!("Error: {e:?}");
        ExitCode::from(sync_cmd::EXIT_FAILURE)
    })
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config = UdtSyncConfig::load(&cli.config)?;

    match &cli.command {
        Commands::Sync(args) => sync_cmd::run_sync(args, &config),
        Commands::Diff(args) => sync_cmd::run_diff(args, &config),
        Commands::Inspect(args) => inspect::run(args, &config),
    }
}
