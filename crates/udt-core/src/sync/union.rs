//! UNION step: widen a definition with every property any variant carries.
//!
//! Only ever applied to missing-only mismatches (see
//! [`Difference::union_merge_eligible`](crate::model::types::Difference::union_merge_eligible)),
//! so variants never disagree on a value they share, and the union only adds
//! paths.
//!
//! - Objects: union of keys, each key's values unioned recursively.
//! - Arrays: elements grouped by the same matching key the analyzer uses and
//!   unioned per group; without a qualifying key, whole elements are
//!   deduplicated by canonical signature. Either way the result is sorted by
//!   signature of the key (or element).
//! - Scalars: the first value, which is the reference definition's when
//!   the caller puts it first.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use crate::model::canonical::canonicalize;
use crate::policy::SyncPolicy;

use super::analyze::matching_key;

/// Deep structural union of `definitions`.
///
/// Returns a new value; none of the inputs are modified. Returns `Null` for
/// an empty slice.
#[must_use]
pub fn union_definitions(definitions: &[&Value], policy: &SyncPolicy) -> Value {
    union_values(definitions, policy)
}

fn union_values(values: &[&Value], policy: &SyncPolicy) -> Value {
    let Some(first) = values.first() else {
        return Value::Null;
    };

    if values.iter().all(|v| v.is_object()) {
        let keys: BTreeSet<&str> = values
            .iter()
            .filter_map(|v| v.as_object())
            .flat_map(|map| map.keys().map(String::as_str))
            .collect();

        let mut out = Map::new();
        for key in keys {
            let children: Vec<&Value> = values.iter().filter_map(|v| v.get(key)).collect();
            out.insert(key.to_owned(), union_values(&children, policy));
        }
        return Value::Object(out);
    }

    if values.iter().all(|v| v.is_array()) {
        let arrays: Vec<&Vec<Value>> = values.iter().filter_map(|v| v.as_array()).collect();
        return Value::Array(union_arrays(&arrays, policy));
    }

    (*first).clone()
}

fn union_arrays(arrays: &[&Vec<Value>], policy: &SyncPolicy) -> Vec<Value> {
    let items = arrays.iter().flat_map(|items| items.iter());

    if let Some(key) = matching_key(arrays, policy) {
        let mut groups: BTreeMap<String, Vec<&Value>> = BTreeMap::new();
        for item in items {
            if let Some(k) = item.get(key) {
                groups.entry(canonicalize(k)).or_default().push(item);
            }
        }
        groups
            .into_values()
            .map(|group| union_values(&group, policy))
            .collect()
    } else {
        let mut unique: BTreeMap<String, &Value> = BTreeMap::new();
        for item in items {
            unique.entry(canonicalize(item)).or_insert(item);
        }
        unique.into_values().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
