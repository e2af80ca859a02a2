//! Literal field names and markers the engine keys on.
//!
//! Export formats differ between platform versions, so none of these are
//! hard-coded in the walker or differ. The root crate deserializes a
//! [`SyncPolicy`] from the `[policy]` table of `udt-sync.toml`.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// SyncPolicy
// ---------------------------------------------------------------------------

/// Field names, discriminator values and heuristics used by a run.
///
/// Missing fields use the defaults of a standard tag export.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SyncPolicy {
    /// Field carrying a node's name (default: `"name"`).
    pub name_field: String,

    /// Field carrying a node's discriminator (default: `"tagType"`).
    pub type_field: String,

    /// Discriminator value marking a UDT definition (default: `"UdtType"`).
    pub type_tag: String,

    /// Discriminator value for folder nodes in the merged tree (default: `"Folder"`).
    pub folder_tag: String,

    /// Field holding a node's child array (default: `"tags"`).
    pub children_field: String,

    /// Root folder names that carry no meaning and are stripped from the
    /// front of every path. Compared case-insensitively.
    pub synthetic_roots: Vec<String>,

    /// Ordered candidate keys for aligning array elements by identity
    /// instead of position. The first key that is present and unique in
    /// every element of every compared array wins.
    pub matching_keys: Vec<String>,

    /// Merged root folder name used when the reference file's root name
    /// cannot be trusted.
    pub default_root_name: String,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            name_field: "name".to_owned(),
            type_field: "tagType".to_owned(),
            type_tag: "UdtType".to_owned(),
            folder_tag: "Folder".to_owned(),
            children_field: "tags".to_owned(),
            synthetic_roots: vec!["_types_".to_owned(), "types".to_owned()],
            matching_keys: ["name", "eventid", "eventId", "id", "key"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            default_root_name: "_types_".to_owned(),
        }
    }
}

impl SyncPolicy {
    /// Returns `true` if `segment` is one of the synthetic root markers.
    #[must_use]
    pub fn is_synthetic_root(&self, segment: &str) -> bool {
        self.synthetic_roots
            .iter()
            .any(|marker| marker.eq_ignore_ascii_case(segment))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
