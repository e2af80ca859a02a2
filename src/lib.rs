//! udt-sync library crate: re-exports for the binary and integration tests.
//!
//! The primary interface is the `udt-sync` binary. The engine itself lives
//! in `udt-core`; this crate adds configuration, file handling, reporting
//! and the command implementations.

pub mod config;
pub mod files;
pub mod format;
pub mod inspect;
pub mod report;
pub mod sync_cmd;
pub mod telemetry;

pub use udt_core;
