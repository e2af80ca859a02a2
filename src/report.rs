//! Machine- and human-readable views of a [`SyncResult`].
//!
//! [`SyncReport`] is the stable JSON shape written by `--report` and printed
//! by `--format json`. [`SyncReport::render_text`] is the terminal summary.

use std::fmt::Write as _;

use serde::Serialize;
use serde_json::Value;
use udt_core::model::canonical::normalize_for_display;
use udt_core::model::types::{Difference, PathRecord, SyncResult, Variant};

/// Summary of one synchronization run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub reference_file: String,
    pub files: usize,
    pub unique_names: usize,
    pub mismatch_count: usize,
    pub missing_count: usize,
    pub merged_count: usize,
    pub merged_root_name: String,
    pub union_merged: Vec<String>,
    pub differences: Vec<DifferenceReport>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DifferenceReport {
    pub name: String,
    pub missing_in: Vec<String>,
    pub union_merge_eligible: bool,
    pub variants: Vec<VariantReport>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VariantReport {
    pub files: Vec<String>,
    /// Slash-joined paths at which this variant was seen.
    pub paths: Vec<String>,
    /// Short digest of the canonical signature.
    pub signature: String,
    pub missing_properties: Vec<PathEntry>,
    pub unequal_values: Vec<PathEntry>,
    /// Normalized representative definition, only with `--show-definitions`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<Value>,
}

/// One attributed path (`Root/seg/seg`) and the variants it is compared to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PathEntry {
    pub path: String,
    pub other_variants: Vec<usize>,
}

impl From<&PathRecord> for PathEntry {
    fn from(record: &PathRecord) -> Self {
        Self {
            path: record.label.clone(),
            other_variants: record.other_variants.clone(),
        }
    }
}

impl VariantReport {
    fn from_variant(variant: &Variant, show_definitions: bool) -> Self {
        Self {
            files: variant.files.clone(),
            paths: variant.paths.iter().map(|p| p.join("/")).collect(),
            signature: variant.digest(),
            missing_properties: variant.missing_properties.iter().map(PathEntry::from).collect(),
            unequal_values: variant.unequal_values.iter().map(PathEntry::from).collect(),
            definition: if show_definitions {
                variant.representative().map(normalize_for_display)
            } else {
                None
            },
        }
    }
}

impl DifferenceReport {
    fn from_difference(difference: &Difference, show_definitions: bool) -> Self {
        Self {
            name: difference.name.clone(),
            missing_in: difference.missing_in.clone(),
            union_merge_eligible: difference.union_merge_eligible(),
            variants: difference
                .variants
                .iter()
                .map(|v| VariantReport::from_variant(v, show_definitions))
                .collect(),
        }
    }
}

impl SyncReport {
    /// Build a report from a finished run.
    #[must_use]
    pub fn from_result(result: &SyncResult, show_definitions: bool) -> Self {
        Self {
            reference_file: result.reference_file.clone(),
            files: result.total_files,
            unique_names: result.total_unique_names,
            mismatch_count: result.mismatch_count,
            missing_count: result.missing_count,
            merged_count: result.merged_count(),
            merged_root_name: result.merged_root_name.clone(),
            union_merged: result.union_merged.clone(),
            differences: result
                .differences
                .iter()
                .map(|d| DifferenceReport::from_difference(d, show_definitions))
                .collect(),
        }
    }

    /// Returns `true` if any name is missing somewhere or has 2+ variants.
    #[must_use]
    pub fn has_differences(&self) -> bool {
        !self.differences.is_empty()
    }

    /// Names a union merge would apply to.
    #[must_use]
    pub fn eligible_names(&self) -> Vec<String> {
        self.differences
            .iter()
            .filter(|d| d.union_merge_eligible)
            .map(|d| d.name.clone())
            .collect()
    }

    /// Terminal summary.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Reference: {}", self.reference_file);
        let _ = writeln!(
            out,
            "Files: {}  Unique: {}  Mismatched: {}  Missing: {}  Merged: {}",
            self.files,
            self.unique_names,
            self.mismatch_count,
            self.missing_count,
            self.merged_count
        );
        let _ = writeln!(out, "Root: {}", self.merged_root_name);
        if !self.union_merged.is_empty() {
            let _ = writeln!(out, "Union-merged: {}", self.union_merged.join(", "));
        }

        if self.differences.is_empty() {
            let _ = writeln!(out, "\nAll definitions are identical across files.");
            return out;
        }

        for diff in &self.differences {
            let mut tags = Vec::new();
            if diff.variants.len() > 1 {
                tags.push(format!("{} variants", diff.variants.len()));
            }
            if !diff.missing_in.is_empty() {
                tags.push(format!("missing in {}", diff.missing_in.join(", ")));
            }
            if diff.union_merge_eligible {
                tags.push("union-merge eligible".to_owned());
            }
            let _ = writeln!(out, "\n{} ({})", diff.name, tags.join("; "));

            if diff.variants.len() < 2 {
                continue;
            }
            for (index, variant) in diff.variants.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "  [{index}] {}  {}",
                    variant.signature,
                    variant.files.join(", ")
                );
                for entry in &variant.missing_properties {
                    let _ = writeln!(
                        out,
                        "      missing  {}  (has: {})",
                        entry.path,
                        join_indexes(&entry.other_variants)
                    );
                }
                for entry in &variant.unequal_values {
                    let _ = writeln!(
                        out,
                        "      unequal  {}  (vs: {})",
                        entry.path,
                        join_indexes(&entry.other_variants)
                    );
                }
                if let Some(def) = &variant.definition {
                    let pretty = serde_json::to_string_pretty(def).unwrap_or_default();
                    for line in pretty.lines() {
                        let _ = writeln!(out, "      | {line}");
                    }
                }
            }
        }
        out
    }
}

fn join_indexes(indexes: &[usize]) -> String {
    indexes
        .iter()
        .map(|i| format!("[{i}]"))
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
