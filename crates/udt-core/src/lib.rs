//! udt-core — the UDT definition synchronization engine.
//!
//! Takes parsed JSON tag exports (one per uploaded file), finds every UDT
//! definition inside them, classifies how same-named definitions differ
//! across files, and assembles one merged definition tree.
//!
//! The engine is a pure function of its inputs: no I/O, no shared state
//! between runs. Callers read files themselves and hand the text (or an
//! already-parsed [`serde_json::Value`]) to [`sync::extract`].
//!
//! ```text
//! extract ──► classify ──► analyze (per mismatch) ──► union / placement ──► build
//!                 ▲                   ▲                       ▲
//!                 └──────── model::canonical (shared) ────────┘
//! ```

pub mod error;
pub mod model;
pub mod policy;
pub mod sync;

pub use error::SyncError;
pub use policy::SyncPolicy;
pub use sync::{parse_file, synchronize};
