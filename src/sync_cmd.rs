//! `udt-sync sync` and `udt-sync diff`.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;
use udt_core::model::types::{ParsedFile, SyncResult};

use crate::config::UdtSyncConfig;
use crate::files::{expand_patterns, load_files, promote_reference, write_atomic};
use crate::format::OutputFormat;
use crate::report::SyncReport;

/// Exit status of `diff` when any definition is missing or differs.
pub const EXIT_DIFFERENCES: u8 = 1;

/// Exit status of any command that fails to run (I/O, parse, config).
pub const EXIT_FAILURE: u8 = 2;

/// Arguments shared by every command that reads a set of exports.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Tag export files or glob patterns (the first file is the reference).
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<String>,

    /// Use this file as the reference instead of the first one.
    #[arg(long, value_name = "FILE")]
    pub reference: Option<PathBuf>,

    /// Report format (default from config, else text).
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Include each variant's normalized definition in the report.
    #[arg(long)]
    pub show_definitions: bool,
}

impl InputArgs {
    fn load(&self, config: &UdtSyncConfig) -> Result<Vec<ParsedFile>> {
        let mut paths = expand_patterns(&self.files)?;
        if let Some(reference) = &self.reference {
            promote_reference(&mut paths, reference)?;
        }
        load_files(&paths, &config.policy)
    }

    fn format(&self, config: &UdtSyncConfig) -> OutputFormat {
        OutputFormat::resolve(self.format, config.output.format)
    }
}

/// Arguments for `udt-sync sync`.
#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Write the merged tree here instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Also write the JSON report to this path.
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Union-merge this definition (repeatable). Ignored unless its
    /// variants differ only by missing paths.
    #[arg(long = "union", value_name = "NAME")]
    pub union: Vec<String>,

    /// Union-merge every eligible definition.
    #[arg(long, conflicts_with = "union")]
    pub union_all: bool,
}

/// Arguments for `udt-sync diff`.
#[derive(Args, Debug, Clone)]
pub struct DiffArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

// ---------------------------------------------------------------------------
// sync
// ---------------------------------------------------------------------------

pub fn run_sync(args: &SyncArgs, config: &UdtSyncConfig) -> Result<ExitCode> {
    let files = args.input.load(config)?;
    let policy = &config.policy;

    let mut selections: BTreeSet<String> = args.union.iter().cloned().collect();
    let mut result = udt_core::synchronize(&files, &selections, policy)?;
    if args.union_all {
        selections = SyncReport::from_result(&result, false)
            .eligible_names()
            .into_iter()
            .collect();
        if !selections.is_empty() {
            result = udt_core::synchronize(&files, &selections, policy)?;
        }
    }

    let merged = render_tree(&result, config.output.pretty)?;
    let report = SyncReport::from_result(&result, args.input.show_definitions);

    if let Some(path) = &args.report {
        write_atomic(path, &OutputFormat::to_json(&report)?)?;
        info!(path = %path.display(), "wrote report");
    }

    let rendered = render_report(&report, args.input.format(config))?;
    match &args.output {
        Some(path) => {
            write_atomic(path, &merged)?;
            info!(path = %path.display(), definitions = result.merged_count(), "wrote merged tree");
            print!("{rendered}");
        }
        None => {
            // stdout carries the tree, so the report goes to stderr.
            println!("{merged}");
            eprint!("{rendered}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn render_tree(result: &SyncResult, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(&result.merged_tree)
    } else {
        serde_json::to_string(&result.merged_tree)
    };
    text.context("could not serialize merged tree")
}

fn render_report(report: &SyncReport, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => report.render_text(),
        OutputFormat::Json => format!("{}\n", OutputFormat::to_json(report)?),
    })
}

// ---------------------------------------------------------------------------
// diff
// ---------------------------------------------------------------------------

pub fn run_diff(args: &DiffArgs, config: &UdtSyncConfig) -> Result<ExitCode> {
    let files = args.input.load(config)?;
    let result = udt_core::synchronize(&files, &BTreeSet::new(), &config.policy)?;
    let report = SyncReport::from_result(&result, args.input.show_definitions);

    print!("{}", render_report(&report, args.input.format(config))?);
    Ok(if report.has_differences() {
        ExitCode::from(EXIT_DIFFERENCES)
    } else {
        ExitCode::SUCCESS
    })
}
