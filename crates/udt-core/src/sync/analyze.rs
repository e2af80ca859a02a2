//! ANALYZE step: attribute structural differences between variants to paths.
//!
//! Given the representative definition of every variant of one name, walks
//! all of them in lock-step and records, per variant:
//!
//! - **missing** paths: present on some variants but absent on this one,
//!   attributed to the variants that have it;
//! - **unequal** paths: present on several variants with canonically
//!   different values, attributed to the variants that disagree with it.
//!
//! # Path rules
//!
//! - Object keys are visited in lexicographic order and extend the path by
//!   the key name, except the children field (`tags`): its elements are
//!   labelled as if they were properties of the parent. A member and a
//!   plain property with the same name therefore share a path: `Motor/enabled`
//!   may be either. Member records usually continue one level deeper
//!   (`Motor/enabled/value`), plain properties do not.
//! - A definition root without a children field compares as if it had an
//!   empty one. A nested node without it, where other variants have it, is
//!   recorded as missing at the node's own path.
//! - Arrays are aligned by the first policy matching key (`name`, `eventid`,
//!   ...) that is present and unique in every element of every compared
//!   array. Elements are then paired by key value, so reordering does not
//!   produce differences.
//! - Arrays with no qualifying key fall back to positional pairing (`[0]`,
//!   `[1]`, ...). This is a heuristic: two arrays holding the same unkeyed
//!   elements in a different order will report spurious unequal paths.
//! - Anything else (scalars, or values of different shapes) is compared by
//!   canonical signature at that path.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::model::canonical::canonicalize;
use crate::model::types::{Difference, PathRecord, Variant};
use crate::policy::SyncPolicy;

/// Stand-in for a children field a present node omits.
static NO_CHILDREN: Value = Value::Array(Vec::new());

/// Label used when no compared definition carries a name.
const UNNAMED_ROOT: &str = "(root)";

// ---------------------------------------------------------------------------
// VariantPaths
// ---------------------------------------------------------------------------

/// Path records attributed to one variant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VariantPaths {
    /// Paths this variant lacks; `other_variants` are the ones that have it.
    pub missing: Vec<PathRecord>,
    /// Paths where this variant's value differs from `other_variants`.
    pub unequal: Vec<PathRecord>,
}

// ---------------------------------------------------------------------------
// analyze_variants
// ---------------------------------------------------------------------------

/// Compare `definitions` (one per variant) and attribute every differing path.
///
/// The output has one entry per input, in the same order, each holding two
/// sorted lists.
#[must_use]
pub fn analyze_variants(definitions: &[&Value], policy: &SyncPolicy) -> Vec<VariantPaths> {
    let mut analyzer = Analyzer {
        policy,
        root_label: root_label(definitions, policy),
        out: vec![VariantPaths::default(); definitions.len()],
    };

    let values: Vec<Option<&Value>> = definitions.iter().map(|d| Some(*d)).collect();
    analyzer.compare(&mut Vec::new(), &values);

    for paths in &mut analyzer.out {
        paths.missing.sort();
        paths.missing.dedup();
        paths.unequal.sort();
        paths.unequal.dedup();
    }
    analyzer.out
}

/// Run [`analyze_variants`] over a difference's variants and store the
/// records on each variant. Differences with a single variant are cleared.
pub fn annotate(difference: &mut Difference, policy: &SyncPolicy) {
    let results = if difference.is_mismatch() {
        let representatives: Option<Vec<&Value>> = difference
            .variants
            .iter()
            .map(Variant::representative)
            .collect();
        representatives.map(|defs| analyze_variants(&defs, policy))
    } else {
        None
    };

    match results {
        Some(results) => {
            for (variant, paths) in difference.variants.iter_mut().zip(results) {
                variant.missing_properties = paths.missing;
                variant.unequal_values = paths.unequal;
            }
        }
        None => {
            for variant in &mut difference.variants {
                variant.missing_properties.clear();
                variant.unequal_values.clear();
            }
        }
    }
}

/// The most frequent `name` among `definitions`, ties broken lexicographically.
fn root_label(definitions: &[&Value], policy: &SyncPolicy) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for def in definitions {
        if let Some(name) = def.get(&policy.name_field).and_then(Value::as_str) {
            *counts.entry(name).or_default() += 1;
        }
    }
    // max_by_key keeps the last maximum, so iterate in reverse to prefer the
    // lexicographically smallest name.
    counts
        .into_iter()
        .rev()
        .max_by_key(|(_, count)| *count)
        .map_or_else(|| UNNAMED_ROOT.to_owned(), |(name, _)| name.to_owned())
}

/// Choose the array alignment key, if any qualifies for every array.
pub(crate) fn matching_key<'p>(arrays: &[&Vec<Value>], policy: &'p SyncPolicy) -> Option<&'p str> {
    policy
        .matching_keys
        .iter()
        .find(|key| {
            arrays.iter().all(|items| {
                let mut seen = BTreeSet::new();
                items.iter().all(|item| {
                    item.get(key.as_str())
                        .is_some_and(|v| seen.insert(canonicalize(v)))
                })
            })
        })
        .map(String::as_str)
}

/// Path segment for an element aligned by key value.
pub(crate) fn key_segment(value: &Value) -> String {
    value
        .as_str()
        .map_or_else(|| canonicalize(value), str::to_owned)
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

struct Analyzer<'p> {
    policy: &'p SyncPolicy,
    root_label: String,
    out: Vec<VariantPaths>,
}

impl Analyzer<'_> {
    fn record(&self, path: &[String], other_variants: Vec<usize>) -> PathRecord {
        let mut label = self.root_label.clone();
        for segment in path {
            label.push('/');
            label.push_str(segment);
        }
        PathRecord {
            path: path.to_vec(),
            label,
            other_variants,
        }
    }

    fn compare(&mut self, path: &mut Vec<String>, values: &[Option<&Value>]) {
        let present: Vec<usize> = values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|_| i))
            .collect();
        if present.is_empty() {
            return;
        }

        if !path.is_empty() && present.len() < values.len() {
            for (i, value) in values.iter().enumerate() {
                if value.is_none() {
                    let record = self.record(path, present.clone());
                    self.out[i].missing.push(record);
                }
            }
            return;
        }

        let present_values: Vec<&Value> = values.iter().flatten().copied().collect();

        if present_values.iter().all(|v| v.is_object()) {
            self.compare_objects(path, values);
        } else if present_values.iter().all(|v| v.is_array()) {
            self.compare_arrays(path, values);
        } else {
            self.compare_leaves(path, values);
        }
    }

    fn compare_objects(&mut self, path: &mut Vec<String>, values: &[Option<&Value>]) {
        let keys: BTreeSet<&str> = values
            .iter()
            .flatten()
            .filter_map(|v| v.as_object())
            .flat_map(|map| map.keys().map(String::as_str))
            .collect();

        for key in keys {
            if key == self.policy.children_field {
                // Only the definition root may omit its children field; below
                // it, an absent field is missing at the owning node's path.
                let children: Vec<Option<&Value>> = if path.is_empty() {
                    values
                        .iter()
                        .map(|v| v.map(|v| v.get(key).unwrap_or(&NO_CHILDREN)))
                        .collect()
                } else {
                    values.iter().map(|v| v.and_then(|v| v.get(key))).collect()
                };
                self.compare(path, &children);
            } else {
                let children: Vec<Option<&Value>> =
                    values.iter().map(|v| v.and_then(|v| v.get(key))).collect();
                path.push(key.to_owned());
                self.compare(path, &children);
                path.pop();
            }
        }
    }

    fn compare_arrays(&mut self, path: &mut Vec<String>, values: &[Option<&Value>]) {
        let arrays: Vec<Option<&Vec<Value>>> =
            values.iter().map(|v| v.and_then(Value::as_array)).collect();
        let present: Vec<&Vec<Value>> = arrays.iter().flatten().copied().collect();

        if let Some(key) = matching_key(&present, self.policy) {
            let mut key_values: BTreeMap<String, String> = BTreeMap::new();
            for item in present.iter().flat_map(|items| items.iter()) {
                if let Some(k) = item.get(key) {
                    key_values
                        .entry(canonicalize(k))
                        .or_insert_with(|| key_segment(k));
                }
            }

            for (signature, segment) in key_values {
                let elements: Vec<Option<&Value>> = arrays
                    .iter()
                    .map(|items| {
                        items.and_then(|items| {
                            items
                                .iter()
                                .find(|item| item.get(key).is_some_and(|k| canonicalize(k) == signature))
                        })
                    })
                    .collect();
                path.push(segment);
                self.compare(path, &elements);
                path.pop();
            }
        } else {
            let longest = present.iter().map(|items| items.len()).max().unwrap_or(0);
            for index in 0..longest {
                let elements: Vec<Option<&Value>> = arrays
                    .iter()
                    .map(|items| items.and_then(|items| items.get(index)))
                    .collect();
                path.push(format!("[{index}]"));
                self.compare(path, &elements);
                path.pop();
            }
        }
    }

    fn compare_leaves(&mut self, path: &[String], values: &[Option<&Value>]) {
        let signatures: Vec<(usize, String)> = values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i, canonicalize(v))))
            .collect();

        for (i, signature) in &signatures {
            let others: Vec<usize> = signatures
                .iter()
                .filter(|(_, other)| other != signature)
                .map(|(j, _)| *j)
                .collect();
            if !others.is_empty() {
                let record = self.record(path, others);
                self.out[*i].unequal.push(record);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
