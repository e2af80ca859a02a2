//! CLASSIFY step: group occurrences by definition name across files.
//!
//! Builds an index from name → every occurrence of that name (upload order),
//! then for each name works out which files lack it and partitions its
//! occurrences into [`Variant`]s by canonical signature.
//!
//! # Example
//!
//! ```text
//! a.json: Motor(sig 1), Pump(sig 2)
//! b.json: Motor(sig 3)
//! c.json: Motor(sig 1), Pump(sig 2)
//!
//! Motor → variants [{a, c}: sig 1, {b}: sig 3], missing_in []   → mismatch
//! Pump  → variants [{a, c}: sig 2],             missing_in [b]  → missing
//! ```
//!
//! Names are processed in lexicographic order; variants are sorted by the
//! joined names of their contributing files.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::model::types::{Difference, Occurrence, ParsedFile, Variant, VariantExample};

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// The result of classifying a set of parsed files.
#[derive(Clone, Debug)]
pub struct Classification<'a> {
    /// The reference file (first input).
    pub reference_file: &'a str,
    /// Every occurrence of each name, in upload order.
    pub groups: BTreeMap<String, Vec<&'a Occurrence>>,
    /// The occurrence chosen as each name's merged definition.
    pub chosen: BTreeMap<String, &'a Occurrence>,
    /// One record per name that is missing somewhere or has 2+ variants.
    pub differences: Vec<Difference>,
}

impl Classification<'_> {
    /// Number of distinct definition names.
    #[must_use]
    pub fn unique_names(&self) -> usize {
        self.groups.len()
    }

    /// Names with two or more variants.
    #[must_use]
    pub fn mismatch_count(&self) -> usize {
        self.differences.iter().filter(|d| d.is_mismatch()).count()
    }

    /// Names absent from at least one file.
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.differences.iter().filter(|d| d.is_missing()).count()
    }
}

// ---------------------------------------------------------------------------
// classify
// ---------------------------------------------------------------------------

/// Classify every definition name across `files`.
///
/// `files[0]` is the reference file: when it contains a name, its first
/// occurrence is that name's merged definition; otherwise the first
/// occurrence in upload order is used. Returns `None` when `files` is empty.
#[must_use]
pub fn classify(files: &[ParsedFile]) -> Option<Classification<'_>> {
    let reference = files.first()?;
    let all_files: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();

    let mut groups: BTreeMap<String, Vec<&Occurrence>> = BTreeMap::new();
    for file in files {
        for occurrence in &file.occurrences {
            groups
                .entry(occurrence.name().to_owned())
                .or_default()
                .push(occurrence);
        }
    }

    let mut chosen = BTreeMap::new();
    let mut differences = Vec::new();

    for (name, occurrences) in &groups {
        let pick = occurrences
            .iter()
            .find(|o| o.source_file() == reference.file_name)
            .or_else(|| occurrences.first());
        if let Some(pick) = pick {
            chosen.insert(name.clone(), *pick);
        }

        let present: BTreeSet<&str> = occurrences.iter().map(|o| o.source_file()).collect();
        let missing_in: Vec<String> = all_files
            .iter()
            .filter(|f| !present.contains(*f))
            .map(|f| (*f).to_owned())
            .collect();

        let variants = partition_variants(name, occurrences);

        if !missing_in.is_empty() || variants.len() > 1 {
            differences.push(Difference {
                name: name.clone(),
                missing_in,
                variants,
            });
        }
    }

    // BTreeMap iteration already yields names in order.
    debug!(
        names = groups.len(),
        differences = differences.len(),
        "classified definitions"
    );

    Some(Classification {
        reference_file: &reference.file_name,
        groups,
        chosen,
        differences,
    })
}

/// Partition one name's occurrences into variants by canonical signature.
fn partition_variants(name: &str, occurrences: &[&Occurrence]) -> Vec<Variant> {
    let mut by_signature: BTreeMap<&str, Variant> = BTreeMap::new();
    let mut seen_in_file: BTreeSet<&str> = BTreeSet::new();

    for occurrence in occurrences {
        let file = occurrence.source_file();
        if !seen_in_file.insert(file) {
            warn!(
                name,
                file,
                path = %occurrence.display_path(),
                "definition appears more than once in one file; first occurrence wins"
            );
        }

        let variant = by_signature
            .entry(occurrence.signature())
            .or_insert_with(|| Variant {
                signature: occurrence.signature().to_owned(),
                files: Vec::new(),
                paths: Vec::new(),
                examples: Vec::new(),
                missing_properties: Vec::new(),
                unequal_values: Vec::new(),
            });

        variant.paths.push(occurrence.path_segments().to_vec());
        if !variant.files.iter().any(|f| f == file) {
            variant.files.push(file.to_owned());
            variant.examples.push(VariantExample {
                file: file.to_owned(),
                definition: occurrence.definition().clone(),
            });
        }
    }

    let mut variants: Vec<Variant> = by_signature.into_values().collect();
    variants.sort_by(|a, b| a.file_key().cmp(&b.file_key()));
    variants
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
