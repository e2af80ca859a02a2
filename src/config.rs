//! udt-sync configuration (`udt-sync.toml`).
//!
//! Defines the typed configuration for the CLI: the engine policy (field
//! names, type tags, array matching keys) and output defaults.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use udt_core::SyncPolicy;

use crate::format::OutputFormat;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "udt-sync.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level udt-sync configuration.
///
/// Missing fields use sensible defaults. Missing file → all defaults (no error).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UdtSyncConfig {
    /// Engine policy: what counts as a definition and how arrays align.
    #[serde(default)]
    pub policy: SyncPolicy,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// OutputConfig
// ---------------------------------------------------------------------------

/// Output settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Pretty-print the merged JSON document (default: `true`).
    #[serde(default = "default_pretty")]
    pub pretty: bool,

    /// Default report format when `--format` is not given.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
            format: OutputFormat::default(),
        }
    }
}

const fn default_pretty() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Error loading a udt-sync configuration file.
#[derive(Debug)]
pub struct ConfigError {
    /// The path that was being loaded (if available).
    pub path: Option<PathBuf>,
    /// Human-readable message with line-level detail when possible.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.path {
            write!(f, "{}: {}", p.display(), self.message)
        } else {
            write!(f, "config error: {}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

impl UdtSyncConfig {
    /// Load configuration from a TOML file.
    ///
    /// - If the file does not exist, returns all defaults (not an error).
    /// - If the file exists but contains invalid TOML or unknown fields,
    ///   returns a [`ConfigError`] with line-level detail.
    ///
    /// # Errors
    /// Returns `ConfigError` on I/O errors (other than not-found) or parse errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    message: format!("could not read file: {e}"),
                });
            }
        };
        Self::parse(&contents).map_err(|mut e| {
            e.path = Some(path.to_owned());
            e
        })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError` on invalid TOML or unknown fields.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start]
                    .chars()
                    .filter(|&c| c == '\n')
                    .count()
                    + 1;
                message = format!("line {line}: {message}");
            }
            ConfigError {
                path: None,
                message,
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_all_fields() {
        let cfg = UdtSyncConfig::default();
        assert_eq!(cfg.policy, SyncPolicy::default());
        assert!(cfg.output.pretty);
        assert_eq!(cfg.output.format, OutputFormat::Text);
    }

    #[test]
    fn parse_empty_string() {
        let cfg = UdtSyncConfig::parse("").unwrap();
        assert_eq!(cfg, UdtSyncConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[policy]
type_tag = "UdtType"
children_field = "tags"
synthetic_roots = ["_types_"]
matching_keys = ["name", "id"]
default_root_name = "MergedTypes"

[output]
pretty = false
format = "json"
"#;
        let cfg = UdtSyncConfig::parse(toml).unwrap();
        assert_eq!(cfg.policy.matching_keys, vec!["name".to_owned(), "id".to_owned()]);
        assert_eq!(cfg.policy.default_root_name, "MergedTypes");
        assert_eq!(cfg.policy.folder_tag, "Folder");
        assert!(!cfg.output.pretty);
        assert_eq!(cfg.output.format, OutputFormat::Json);
    }

    #[test]
    fn unknown_field_reports_line() {
        let toml = "[output]\npretty = true\ncolour = \"red\"\n";
        let err = UdtSyncConfig::parse(toml).unwrap_err();
        assert!(err.message.contains("line 3"), "message was: {}", err.message);
    }

    #[test]
    fn unknown_section_rejected() {
        assert!(UdtSyncConfig::parse("[merge]\nx = 1\n").is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = UdtSyncConfig::load(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(cfg, UdtSyncConfig::default());
    }

    #[test]
    fn load_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[policy]\ntype_tag = 3\n").unwrap();
        let err = UdtSyncConfig::load(&path).unwrap_err();
        assert_eq!(err.path.as_deref(), Some(path.as_path()));
        assert!(err.to_string().contains("udt-sync.toml"));
    }
}
