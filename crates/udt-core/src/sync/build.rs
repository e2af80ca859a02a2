//! BUILD step: choose one definition per name and assemble the merged tree.
//!
//! # Algorithm
//!
//! 1. Start from each name's chosen definition (reference file first, else
//!    first upload).
//! 2. For every union-merge selection, re-run the analyzer on that name's
//!    variants. Only a missing-only mismatch is widened; anything else keeps
//!    the chosen definition and is logged.
//! 3. Place each definition in one folder (see [`super::placement`]).
//! 4. Walk names in lexicographic order, creating or reusing folder nodes
//!    along each parent path, and emit every folder's children sorted
//!    folders first, then by name.
//!
//! # Determinism
//!
//! Names, folders and children are all visited through ordered maps, so the
//! same inputs and selections always produce a byte-identical tree.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::model::types::{Difference, ParsedFile};
use crate::policy::SyncPolicy;

use super::analyze::annotate;
use super::classify::Classification;
use super::placement::{merged_root_name, resolve_parent_path};
use super::union::union_definitions;

// ---------------------------------------------------------------------------
// MergeOutput
// ---------------------------------------------------------------------------

/// Output of the build step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeOutput {
    /// Name of the merged root folder.
    pub root_name: String,
    /// Folder path below the root for each merged definition.
    pub parent_paths: BTreeMap<String, Vec<String>>,
    /// One merged definition per name.
    pub definitions: BTreeMap<String, Value>,
    /// Names that were union-merged.
    pub union_merged: Vec<String>,
    /// The assembled document.
    pub tree: Value,
}

// ---------------------------------------------------------------------------
// build_merge
// ---------------------------------------------------------------------------

/// Resolve one definition per name and assemble the merged tree.
///
/// `files` must be the same slice `classification` was built from.
#[must_use]
pub fn build_merge(
    classification: &Classification<'_>,
    files: &[ParsedFile],
    union_selections: &BTreeSet<String>,
    policy: &SyncPolicy,
) -> MergeOutput {
    let mut definitions: BTreeMap<String, Value> = classification
        .chosen
        .iter()
        .map(|(name, occurrence)| (name.clone(), occurrence.definition().clone()))
        .collect();

    let mut union_merged = Vec::new();
    for name in union_selections {
        let Some(difference) = classification.differences.iter().find(|d| &d.name == name) else {
            warn!(name = %name, "union merge selected for a definition with no mismatch; ignoring");
            continue;
        };
        let merged = match union_if_eligible(difference, definitions.get(name), policy) {
            Ok(merged) => merged,
            Err(reason) => {
                warn!(
                    name = %name,
                    reason = %reason,
                    "union merge selected but not applicable; keeping reference definition"
                );
                continue;
            }
        };
        definitions.insert(name.clone(), merged);
        union_merged.push(name.clone());
    }

    let root_name = files
        .first()
        .map_or_else(|| policy.default_root_name.clone(), |f| merged_root_name(f, policy));

    let parent_paths: BTreeMap<String, Vec<String>> = classification
        .groups
        .iter()
        .map(|(name, occurrences)| {
            (
                name.clone(),
                resolve_parent_path(occurrences, &root_name, classification.reference_file),
            )
        })
        .collect();

    let tree = assemble_tree(&root_name, &definitions, &parent_paths, policy);

    debug!(
        root = %root_name,
        definitions = definitions.len(),
        union_merged = union_merged.len(),
        "assembled merged tree"
    );

    MergeOutput {
        root_name,
        parent_paths,
        definitions,
        union_merged,
        tree,
    }
}

/// Why a union-merge selection was not applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Ineligible {
    /// One variant only; the name is merely missing from some files.
    NotAMismatch,
    /// Variants differ in a value they share.
    UnequalValues,
    /// Variants differ, but no path is attributed as missing.
    NoMissingPaths,
}

impl fmt::Display for Ineligible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotAMismatch => "all files that have it agree; it is only missing from some",
            Self::UnequalValues => "variants disagree on values",
            Self::NoMissingPaths => "variants differ but no path is missing",
        })
    }
}

/// Union all examples of `difference` if, and only if, a fresh analysis
/// finds a missing-only mismatch.
///
/// The analysis stored on `difference` is not trusted: it is recomputed from
/// the variant examples themselves.
fn union_if_eligible(
    difference: &Difference,
    chosen: Option<&Value>,
    policy: &SyncPolicy,
) -> Result<Value, Ineligible> {
    if !difference.is_mismatch() {
        return Err(Ineligible::NotAMismatch);
    }
    let mut fresh = difference.clone();
    annotate(&mut fresh, policy);
    if fresh.unequal_value_count() > 0 {
        return Err(Ineligible::UnequalValues);
    }
    if fresh.missing_property_count() == 0 {
        return Err(Ineligible::NoMissingPaths);
    }

    let mut inputs: Vec<&Value> = Vec::new();
    inputs.extend(chosen);
    inputs.extend(
        difference
            .variants
            .iter()
            .flat_map(|v| v.examples.iter().map(|e| &e.definition)),
    );
    Ok(union_definitions(&inputs, policy))
}

// ---------------------------------------------------------------------------
// Tree assembly
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct FolderNode {
    folders: BTreeMap<String, FolderNode>,
    definitions: Vec<(String, Value)>,
}

impl FolderNode {
    fn folder_mut(&mut self, path: &[String]) -> &mut Self {
        path.iter()
            .fold(self, |node, segment| node.folders.entry(segment.clone()).or_default())
    }

    fn into_value(self, name: &str, policy: &SyncPolicy) -> Value {
        let mut definitions = self.definitions;
        definitions.sort_by(|a, b| a.0.cmp(&b.0));

        let children: Vec<Value> = self
            .folders
            .into_iter()
            .map(|(child_name, child)| child.into_value(&child_name, policy))
            .chain(definitions.into_iter().map(|(_, def)| def))
            .collect();

        let mut node = Map::new();
        node.insert(policy.name_field.clone(), Value::from(name));
        node.insert(policy.type_field.clone(), Value::from(policy.folder_tag.as_str()));
        node.insert(policy.children_field.clone(), Value::Array(children));
        Value::Object(node)
    }
}

/// Build the merged document from resolved definitions and placements.
///
/// Every definition is emitted exactly once, under `root_name` followed by
/// its parent path. Folders with the same name at the same level are shared.
#[must_use]
pub fn assemble_tree(
    root_name: &str,
    definitions: &BTreeMap<String, Value>,
    parent_paths: &BTreeMap<String, Vec<String>>,
    policy: &SyncPolicy,
) -> Value {
    let mut root = FolderNode::default();
    for (name, definition) in definitions {
        let parent = parent_paths.get(name).map_or(&[][..], Vec::as_slice);
        root.folder_mut(parent)
            .definitions
            .push((name.clone(), definition.clone()));
    }
    root.into_value(root_name, policy)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
