//! Data model for synchronization runs — core types and the canonicalizer.

pub mod canonical;
pub mod types;
