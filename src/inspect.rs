//! `udt-sync inspect`: list the definitions found in one export.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use udt_core::model::canonical::signature_digest;
use udt_core::model::types::ParsedFile;

use crate::config::UdtSyncConfig;
use crate::files::load_files;
use crate::format::OutputFormat;

/// Arguments for `udt-sync inspect`.
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Tag export file.
    pub file: PathBuf,

    /// Output format (default from config, else text).
    #[arg(long)]
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Serialize)]
struct InspectOutput {
    file: String,
    root_name: Option<String>,
    definitions: Vec<DefinitionEntry>,
}

#[derive(Debug, Serialize)]
struct DefinitionEntry {
    name: String,
    path: String,
    signature: String,
}

impl From<&ParsedFile> for InspectOutput {
    fn from(parsed: &ParsedFile) -> Self {
        Self {
            file: parsed.file_name.clone(),
            root_name: parsed.root_name.clone(),
            definitions: parsed
                .occurrences
                .iter()
                .map(|o| DefinitionEntry {
                    name: o.name().to_owned(),
                    path: o.display_path(),
                    signature: signature_digest(o.signature()),
                })
                .collect(),
        }
    }
}

pub fn run(args: &InspectArgs, config: &UdtSyncConfig) -> Result<ExitCode> {
    let parsed = load_files(std::slice::from_ref(&args.file), &config.policy)?;
    let Some(parsed) = parsed.first() else {
        return Ok(ExitCode::SUCCESS);
    };
    let output = InspectOutput::from(parsed);

    match OutputFormat::resolve(args.format, config.output.format) {
        OutputFormat::Json => println!("{}", OutputFormat::to_json(&output)?),
        OutputFormat::Text => {
            println!(
                "{} (root: {}, {} definitions)",
                output.file,
                output.root_name.as_deref().unwrap_or("-"),
                output.definitions.len()
            );
            let width = output
                .definitions
                .iter()
                .map(|d| d.name.len())
                .max()
                .unwrap_or(0);
            for def in &output.definitions {
                println!("  {:<width$}  {}  {}", def.name, def.signature, def.path);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
