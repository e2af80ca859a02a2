//! EXTRACT step: walk one parsed document and collect every UDT definition.
//!
//! The walk descends only through each node's children array (`tags` by
//! default). A node is a definition when its discriminator equals the policy's
//! type tag *and* it has a non-empty name. Definitions are captured whole and
//! their own children are not scanned for further definitions.
//!
//! # Example
//!
//! ```text
//! { name: "",        tagType: "Provider", tags: [           ← unnamed: no segment
//!   { name: "_types_", tagType: "Folder",   tags: [         ← synthetic: stripped
//!     { name: "Motors", tagType: "Folder",  tags: [
//!       { name: "Motor", tagType: "UdtType", ... } ]}]}]}
//!
//! occurrence: name = "Motor", path = ["Motors", "Motor"]
//! ```

use serde_json::Value;
use tracing::debug;

use crate::model::types::{Occurrence, ParsedFile};
use crate::policy::SyncPolicy;

/// Extract every definition occurrence from `root`.
///
/// `root` may be a single node or an array of independent root nodes. Shapes
/// the walker does not understand simply yield no occurrences.
#[must_use]
pub fn extract(file_name: &str, root: &Value, policy: &SyncPolicy) -> ParsedFile {
    let mut walker = Walker {
        file_name,
        policy,
        ancestors: Vec::new(),
        occurrences: Vec::new(),
    };

    let root_name = match root {
        Value::Object(_) => {
            walker.walk(root);
            root_name_of(root, policy)
        }
        Value::Array(roots) => {
            for node in roots {
                walker.walk(node);
            }
            match roots.as_slice() {
                [only] => root_name_of(only, policy),
                _ => None,
            }
        }
        _ => None,
    };

    debug!(
        file = file_name,
        occurrences = walker.occurrences.len(),
        root = root_name.as_deref().unwrap_or("-"),
        "extracted definitions"
    );

    ParsedFile {
        file_name: file_name.to_owned(),
        root_name,
        occurrences: walker.occurrences,
    }
}

fn node_name<'v>(node: &'v Value, policy: &SyncPolicy) -> Option<&'v str> {
    node.get(&policy.name_field)
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
}

fn root_name_of(node: &Value, policy: &SyncPolicy) -> Option<String> {
    node_name(node, policy)
        .filter(|name| !policy.is_synthetic_root(name))
        .map(str::to_owned)
}

struct Walker<'a> {
    file_name: &'a str,
    policy: &'a SyncPolicy,
    ancestors: Vec<String>,
    occurrences: Vec<Occurrence>,
}

impl Walker<'_> {
    fn walk(&mut self, node: &Value) {
        if !node.is_object() {
            return;
        }

        let name = node_name(node, self.policy);
        if let Some(name) = name {
            self.ancestors.push(name.to_owned());
        }

        let is_definition = name.is_some()
            && node.get(&self.policy.type_field).and_then(Value::as_str)
                == Some(self.policy.type_tag.as_str());

        if is_definition {
            self.record(name.unwrap_or_default(), node);
        } else if let Some(children) = node
            .get(&self.policy.children_field)
            .and_then(Value::as_array)
        {
            for child in children {
                self.walk(child);
            }
        }

        if name.is_some() {
            self.ancestors.pop();
        }
    }

    fn record(&mut self, name: &str, node: &Value) {
        let path: Vec<String> = self
            .ancestors
            .iter()
            .skip_while(|segment| self.policy.is_synthetic_root(segment))
            .cloned()
            .collect();

        self.occurrences.push(Occurrence::new(
            name.to_owned(),
            path,
            self.file_name.to_owned(),
            node.clone(),
        ));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
