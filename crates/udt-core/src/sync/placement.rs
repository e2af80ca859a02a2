//! Folder placement for merged definitions.
//!
//! The same definition may live in different folders in different exports.
//! Each merged definition is placed in exactly one folder, chosen from the
//! parent paths of all its occurrences by, in order:
//!
//! 1. most path segments (deepest),
//! 2. most occurrences at that path,
//! 3. an occurrence from the reference file at that path,
//! 4. lexicographically smallest `/`-joined path.

use std::collections::BTreeMap;

use crate::model::types::{Occurrence, ParsedFile};
use crate::policy::SyncPolicy;

/// Name of the merged tree's root folder.
///
/// The reference file's root name, provided every one of the reference
/// file's own definitions sits below it; otherwise the policy default.
#[must_use]
pub fn merged_root_name(reference: &ParsedFile, policy: &SyncPolicy) -> String {
    match &reference.root_name {
        Some(root)
            if reference
                .occurrences
                .iter()
                .all(|o| o.path_segments().first() == Some(root)) =>
        {
            root.clone()
        }
        _ => policy.default_root_name.clone(),
    }
}

#[derive(Debug, Default)]
struct Candidate {
    count: usize,
    from_reference: bool,
}

/// Pick the parent folder path (below the merged root) for one name.
///
/// `occurrences` must be non-empty for a meaningful answer; an empty slice
/// places the definition directly under the root.
#[must_use]
pub fn resolve_parent_path(
    occurrences: &[&Occurrence],
    root_name: &str,
    reference_file: &str,
) -> Vec<String> {
    let mut candidates: BTreeMap<Vec<String>, Candidate> = BTreeMap::new();

    for occurrence in occurrences {
        let parent = occurrence.parent_segments();
        let parent = match parent.split_first() {
            Some((first, rest)) if first == root_name => rest,
            _ => parent,
        };
        let candidate = candidates.entry(parent.to_vec()).or_default();
        candidate.count += 1;
        candidate.from_reference |= occurrence.source_file() == reference_file;
    }

    // BTreeMap order is lexicographic by segment, which can disagree with the
    // joined-string order ("a-b" vs "a/b"), so compare joined paths directly.
    candidates
        .into_iter()
        .map(|(path, candidate)| {
            let joined = path.join("/");
            (path, joined, candidate)
        })
        .max_by(|(a_path, a_joined, a), (b_path, b_joined, b)| {
            a_path
                .len()
                .cmp(&b_path.len())
                .then(a.count.cmp(&b.count))
                .then(a.from_reference.cmp(&b.from_reference))
                .then_with(|| b_joined.cmp(a_joined))
        })
        .map(|(path, _, _)| path)
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
