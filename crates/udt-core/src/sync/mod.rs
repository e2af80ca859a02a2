//! Deterministic N-way UDT synchronization.
//!
//! Implements the extract → classify → analyze → build pipeline. Each phase
//! is a separate module:
//!
//! - **extract**: walk one document and capture every definition as an
//!   [`Occurrence`](crate::model::types::Occurrence).
//! - **classify**: group occurrences by name, find missing files, partition
//!   into variants by canonical signature.
//! - **analyze**: for names with 2+ variants, attribute every differing path
//!   as missing or unequal.
//! - **build**: pick one definition per name (optionally union-merged),
//!   place it in one folder and assemble the merged tree.
//!
//! # Determinism guarantee
//!
//! The same files in the same order with the same union selections always
//! produce the same [`SyncResult`]. Key and array order inside the inputs do
//! not affect which definitions are considered equal. Only file order
//! matters, because the first file is the reference.

pub mod analyze;
pub mod build;
pub mod classify;
pub mod extract;
pub mod placement;
pub mod union;


use std::collections::BTreeSet;

use tracing::{info, instrument};

use crate::error::SyncError;
use crate::model::types::{ParsedFile, SyncResult};
use crate::policy::SyncPolicy;

pub use extract::extract;

/// Parse `text` as JSON and extract its definitions.
///
/// # Errors
/// Returns [`SyncError::Parse`] naming `file_name` if `text` is not valid JSON.
pub fn parse_file(file_name: &str, text: &str, policy: &SyncPolicy) -> Result<ParsedFile, SyncError> {
    let root: serde_json::Value = serde_json::from_str(text).map_err(|source| {
        tracing::warn!(file = file_name, error = %source, "input is not valid JSON");
        SyncError::Parse {
            file: file_name.to_owned(),
            source,
        }
    })?;
    Ok(extract(file_name, &root, policy))
}

/// Run a full synchronization over `files`.
///
/// `files[0]` is the reference file. `union_selections` names the
/// differences whose variants should be union-merged; names that are not
/// missing-only mismatches are ignored.
///
/// # Errors
/// - [`SyncError::InsufficientInput`] if `files` is empty.
/// - [`SyncError::NoDefinitionsFound`] if no file contains a definition.
#[instrument(skip_all, fields(files = files.len(), selections = union_selections.len()))]
pub fn synchronize(
    files: &[ParsedFile],
    union_selections: &BTreeSet<String>,
    policy: &SyncPolicy,
) -> Result<SyncResult, SyncError> {
    if files.iter().all(ParsedFile::is_empty) {
        return Err(if files.is_empty() {
            SyncError::InsufficientInput
        } else {
            SyncError::NoDefinitionsFound
        });
    }

    let mut classification = classify::classify(files).ok_or(SyncError::InsufficientInput)?;
    for difference in &mut classification.differences {
        analyze::annotate(difference, policy);
    }

    let merge = build::build_merge(&classification, files, union_selections, policy);

    let result = SyncResult {
        reference_file: classification.reference_file.to_owned(),
        total_files: files.len(),
        total_unique_names: classification.unique_names(),
        mismatch_count: classification.mismatch_count(),
        missing_count: classification.missing_count(),
        merged_root_name: merge.root_name,
        parent_paths: merge.parent_paths,
        differences: classification.differences,
        merged_definitions: merge.definitions,
        union_merged: merge.union_merged,
        merged_tree: merge.tree,
    };

    info!(
        unique = result.total_unique_names,
        mismatches = result.mismatch_count,
        missing = result.missing_count,
        union_merged = result.union_merged.len(),
        "synchronization complete"
    );

    Ok(result)
}
