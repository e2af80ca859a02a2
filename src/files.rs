//! Input expansion, loading and atomic output writes.
//!
//! The engine never touches the filesystem. This module turns command-line
//! arguments into an ordered list of [`ParsedFile`]s and writes results back
//! out.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;
use udt_core::SyncPolicy;
use udt_core::model::types::ParsedFile;

/// Returns `true` if `pattern` contains glob metacharacters.
fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Expand command-line file arguments into concrete paths, preserving order.
///
/// Plain paths pass through unchanged (a missing file is reported when it is
/// read). Glob patterns expand to their matches in sorted order and must
/// match at least one file. A path named twice is only kept the first time.
///
/// # Errors
/// Returns an error for an invalid pattern or a pattern with no matches.
pub fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        if !is_glob(pattern) {
            push_unique(&mut paths, PathBuf::from(pattern));
            continue;
        }
        let mut matched: Vec<PathBuf> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern '{pattern}'"))?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();
        if matched.is_empty() {
            bail!("pattern '{pattern}' matched no files");
        }
        matched.sort();
        for path in matched {
            push_unique(&mut paths, path);
        }
    }
    Ok(paths)
}

fn push_unique(paths: &mut Vec<PathBuf>, path: PathBuf) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}

/// Move `reference` to the front of `paths`.
///
/// # Errors
/// Returns an error if `reference` is not one of `paths`.
pub fn promote_reference(paths: &mut Vec<PathBuf>, reference: &Path) -> Result<()> {
    let Some(index) = paths.iter().position(|p| p == reference) else {
        bail!(
            "reference file '{}' is not among the input files\n  \
             To fix: pass it as one of the FILES arguments.",
            reference.display()
        );
    };
    let path = paths.remove(index);
    paths.insert(0, path);
    Ok(())
}

/// Read and extract every file in order.
///
/// Each file is identified by its path exactly as given.
///
/// # Errors
/// Returns an error naming the file if it cannot be read or is not valid JSON.
pub fn load_files(paths: &[PathBuf], policy: &SyncPolicy) -> Result<Vec<ParsedFile>> {
    paths
        .iter()
        .map(|path| -> Result<ParsedFile> {
            let name = path.display().to_string();
            let text =
                fs::read_to_string(path).with_context(|| format!("could not read '{name}'"))?;
            let parsed = udt_core::parse_file(&name, &text, policy)?;
            debug!(file = %name, definitions = parsed.occurrences.len(), "loaded");
            Ok(parsed)
        })
        .collect()
}

/// Write `contents` to `path` atomically (temp file in the same directory,
/// fsync, rename).
///
/// # Errors
/// Returns an error on any I/O failure.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .with_context(|| format!("no file name in {}", path.display()))?;
    let tmp_path = dir.join(format!(".{}.tmp", file_name.to_string_lossy()));

    let mut file = fs::File::create(&tmp_path)
        .with_context(|| format!("create {}", tmp_path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("write {}", tmp_path.display()))?;
    file.sync_all()
        .with_context(|| format!("fsync {}", tmp_path.display()))?;
    drop(file);

    fs::rename(&tmp_path, path)
        .with_context(|| format!("rename {} → {}", tmp_path.display(), path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn plain_paths_keep_order_and_dedupe() {
        let args = vec!["b.json".to_owned(), "a.json".to_owned(), "b.json".to_owned()];
        let paths = expand_patterns(&args).unwrap();
        assert_eq!(paths, vec![PathBuf::from("b.json"), PathBuf::from("a.json")]);
    }

    #[test]
    fn glob_expands_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.json", "a.json", "b.txt"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        let pattern = format!("{}/*.json", dir.path().display());
        let paths = expand_patterns(&[pattern]).unwrap();
        assert_eq!(names(&paths), vec!["a.json", "c.json"]);
    }

    #[test]
    fn glob_without_matches_fails() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.json", dir.path().display());
        let err = expand_patterns(&[pattern]).unwrap_err();
        assert!(err.to_string().contains("matched no files"));
    }

    #[test]
    fn reference_moves_to_front() {
        let mut paths = vec![PathBuf::from("a"), PathBuf::from("b"), PathBuf::from("c")];
        promote_reference(&mut paths, Path::new("c")).unwrap();
        assert_eq!(paths, vec![PathBuf::from("c"), PathBuf::from("a"), PathBuf::from("b")]);
        assert!(promote_reference(&mut paths, Path::new("z")).is_err());
    }

    #[test]
    fn load_reports_bad_json_with_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_files(&[path], &SyncPolicy::default()).unwrap_err();
        assert!(format!("{err:#}").contains("broken.json"));
    }

    #[test]
    fn write_atomic_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged.json");
        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!dir.path().join(".merged.json.tmp").exists());
    }
}
