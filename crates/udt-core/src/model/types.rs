//! Core types that flow through the extract → classify → analyze → build
//! pipeline.
//!
//! Everything here is plain owned data. An [`Occurrence`] owns its own deep
//! copy of the definition it was extracted from, so nothing produced by a
//! run aliases the caller's input or another part of the result.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::canonical::{canonicalize, signature_digest};

// ---------------------------------------------------------------------------
// Occurrence
// ---------------------------------------------------------------------------

/// One sighting of a UDT definition in one file, at one path.
///
/// Created once by the walker and never mutated. The canonical signature is
/// computed at construction and cannot drift from `definition` because the
/// fields that feed it are only reachable by shared reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occurrence {
    name: String,
    path_segments: Vec<String>,
    source_file: String,
    definition: Value,
    signature: String,
}

impl Occurrence {
    /// Capture an occurrence, computing its canonical signature.
    ///
    /// `path_segments` runs from the document root (synthetic markers
    /// already stripped) down to and including the definition's own name.
    #[must_use]
    pub fn new(
        name: String,
        path_segments: Vec<String>,
        source_file: String,
        definition: Value,
    ) -> Self {
        let signature = canonicalize(&definition);
        Self {
            name,
            path_segments,
            source_file,
            definition,
            signature,
        }
    }

    /// The definition's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path from the document root, including the leaf name.
    #[must_use]
    pub fn path_segments(&self) -> &[String] {
        &self.path_segments
    }

    /// Path of the folder holding this definition (leaf name removed).
    #[must_use]
    pub fn parent_segments(&self) -> &[String] {
        match self.path_segments.split_last() {
            Some((leaf, parent)) if *leaf == self.name => parent,
            _ => &self.path_segments,
        }
    }

    /// The file this occurrence was extracted from.
    #[must_use]
    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    /// The captured definition.
    #[must_use]
    pub const fn definition(&self) -> &Value {
        &self.definition
    }

    /// Canonical, order-independent serialization of the definition.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// `/`-joined path, for display.
    #[must_use]
    pub fn display_path(&self) -> String {
        self.path_segments.join("/")
    }
}

// ---------------------------------------------------------------------------
// ParsedFile
// ---------------------------------------------------------------------------

/// Every occurrence found in one uploaded document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedFile {
    /// The file name as supplied by the caller.
    pub file_name: String,
    /// The document's top-level node name, `None` if absent or synthetic.
    pub root_name: Option<String>,
    /// Occurrences in document (depth-first) order.
    pub occurrences: Vec<Occurrence>,
}

impl ParsedFile {
    /// Returns `true` if the walker found no definitions in this file.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }
}

// ---------------------------------------------------------------------------
// PathRecord
// ---------------------------------------------------------------------------

/// A structural path attributed to one variant, with the variants it is
/// compared against.
///
/// On a variant's `missing_properties`, `other_variants` lists the variants
/// that *do* have the path. On `unequal_values`, it lists the variants whose
/// value differs from this variant's.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PathRecord {
    /// Path segments below the definition root.
    pub path: Vec<String>,
    /// Human-readable path, prefixed with the definition's root label.
    pub label: String,
    /// Indexes into the owning difference's `variants`.
    pub other_variants: Vec<usize>,
}

impl fmt::Display for PathRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

// ---------------------------------------------------------------------------
// Variant
// ---------------------------------------------------------------------------

/// One representative definition from one contributing file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantExample {
    /// Contributing file.
    pub file: String,
    /// That file's first occurrence of the definition.
    pub definition: Value,
}

/// Occurrences of one definition name that share a canonical signature.
///
/// All examples within a variant are canonically identical; no two variants
/// of the same name are.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variant {
    /// The canonical signature shared by every example.
    pub signature: String,
    /// Contributing files, in upload order, without duplicates.
    pub files: Vec<String>,
    /// Every path at which this variant was seen, in upload order.
    pub paths: Vec<Vec<String>>,
    /// One example per contributing file (first occurrence wins).
    pub examples: Vec<VariantExample>,
    /// Paths this variant lacks but other variants have.
    pub missing_properties: Vec<PathRecord>,
    /// Paths where this variant's value differs from another variant's.
    pub unequal_values: Vec<PathRecord>,
}

impl Variant {
    /// The definition used to compare this variant against others.
    ///
    /// Every example is canonically identical, so the first one stands for
    /// all of them.
    #[must_use]
    pub fn representative(&self) -> Option<&Value> {
        self.examples.first().map(|e| &e.definition)
    }

    /// Short digest of the signature, for display.
    #[must_use]
    pub fn digest(&self) -> String {
        signature_digest(&self.signature)
    }

    /// Sort key: contributing file names joined in upload order.
    #[must_use]
    pub fn file_key(&self) -> String {
        self.files.join(",")
    }
}

// ---------------------------------------------------------------------------
// Difference
// ---------------------------------------------------------------------------

/// A definition name that is missing from some files, differs across files,
/// or both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Difference {
    /// The definition name.
    pub name: String,
    /// Files that contain no occurrence of the name, in upload order.
    pub missing_in: Vec<String>,
    /// Distinct variants, sorted by [`Variant::file_key`].
    pub variants: Vec<Variant>,
}

impl Difference {
    /// Two or more canonically distinct variants exist.
    #[must_use]
    pub fn is_mismatch(&self) -> bool {
        self.variants.len() > 1
    }

    /// At least one file lacks the name entirely.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        !self.missing_in.is_empty()
    }

    /// Total missing-path records across all variants.
    #[must_use]
    pub fn missing_property_count(&self) -> usize {
        self.variants.iter().map(|v| v.missing_properties.len()).sum()
    }

    /// Total unequal-path records across all variants.
    #[must_use]
    pub fn unequal_value_count(&self) -> usize {
        self.variants.iter().map(|v| v.unequal_values.len()).sum()
    }

    /// Variants differ only by presence of paths, never by value.
    ///
    /// Computed from the recorded path analysis. The merge step recomputes
    /// the analysis itself before acting on it.
    #[must_use]
    pub fn union_merge_eligible(&self) -> bool {
        self.is_mismatch() && self.missing_property_count() > 0 && self.unequal_value_count() == 0
    }
}

// ---------------------------------------------------------------------------
// SyncResult
// ---------------------------------------------------------------------------

/// Everything a synchronization run produces.
///
/// Built fresh per run and independently owned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncResult {
    /// The first input file; default source of truth for conflicts.
    pub reference_file: String,
    /// Number of input files.
    pub total_files: usize,
    /// Number of distinct definition names across every file.
    pub total_unique_names: usize,
    /// Names with two or more variants.
    pub mismatch_count: usize,
    /// Names absent from at least one file.
    pub missing_count: usize,
    /// Name of the merged tree's root folder.
    pub merged_root_name: String,
    /// Folder path (below the merged root) each merged definition was placed in.
    pub parent_paths: BTreeMap<String, Vec<String>>,
    /// Difference records, sorted by name.
    pub differences: Vec<Difference>,
    /// Exactly one merged definition per unique name.
    pub merged_definitions: BTreeMap<String, Value>,
    /// Names whose merged definition came from a union merge.
    pub union_merged: Vec<String>,
    /// The assembled output document.
    pub merged_tree: Value,
}

impl SyncResult {
    /// Number of definitions in the merged output.
    #[must_use]
    pub fn merged_count(&self) -> usize {
        self.merged_definitions.len()
    }

    /// Look up the difference record for `name`, if any.
    #[must_use]
    pub fn difference(&self, name: &str) -> Option<&Difference> {
        self.differences
            .binary_search_by(|d| d.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.differences[i])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
