//! Error types for synchronization runs.
//!
//! [`SyncError`] is the single error type returned by the engine. Every
//! variant is terminal for the run that raised it: no partial
//! [`SyncResult`](crate::model::types::SyncResult) is ever produced.

use thiserror::Error;

/// Errors returned by [`parse_file`](crate::sync::parse_file) and
/// [`synchronize`](crate::sync::synchronize).
#[derive(Debug, Error)]
pub enum SyncError {
    /// A supplied document is not valid JSON.
    ///
    /// File-scoped: the caller decides whether to keep processing the other
    /// documents or stop.
    #[error(
        "could not parse '{file}' as JSON: {source}\n  To fix: re-export the tags from the project and upload the file again."
    )]
    Parse {
        /// The file name as supplied by the caller.
        file: String,
        /// The underlying JSON error (carries line and column).
        #[source]
        source: serde_json::Error,
    },

    /// The run was invoked with no documents at all.
    #[error("no input files supplied.\n  To fix: provide at least one JSON tag export.")]
    InsufficientInput,

    /// Every document parsed, but none of them contains a UDT definition.
    #[error(
        "no UDT definitions found in any input file.\n  To fix: export the UDT definitions folder (not tag instances) and retry."
    )]
    NoDefinitionsFound,
}

impl SyncError {
    /// The file this error is scoped to, if any.
    #[must_use]
    pub fn file(&self) -> Option<&str> {
        match self {
            Self::Parse { file, .. } => Some(file),
            Self::InsufficientInput | Self::NoDefinitionsFound => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
