//! Asset fingerprinting.
//!
//! A fingerprint is the SHA-256 over every file below the asset path,
//! visited in sorted order. Each file contributes its relative path (with
//! `/` separators), its length and its contents, so renaming, moving or
//! editing a file all change the fingerprint while timestamps and
//! permissions do not.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tripstack_core::assets::AssetSource;

use crate::error::{CliError, Result};

/// Fingerprints the file or directory at `path`.
pub fn fingerprint(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(CliError::AssetNotFound(path.to_path_buf()));
    }

    let mut files = Vec::new();
    if path.is_file() {
        files.push(path.to_path_buf());
    } else {
        collect_files(path, &mut files)?;
    }
    files.sort();

    let mut hasher = Sha256::new();
    for file in &files {
        let relative = relative_name(path, file);
        let contents = fs::read(file)?;
        hasher.update(relative.as_bytes());
        hasher.update([0u8]);
        hasher.update((contents.len() as u64).to_le_bytes());
        hasher.update(&contents);
    }

    let fingerprint = hex::encode(hasher.finalize());
    tracing::debug!(
        path = %path.display(),
        files = files.len(),
        %fingerprint,
        "fingerprinted asset"
    );
    Ok(fingerprint)
}

/// Fingerprints `path` and wraps it as an asset source.
pub fn asset_source(path: &Path) -> Result<AssetSource> {
    let fingerprint = fingerprint(path)?;
    Ok(AssetSource::new(path.display().to_string(), fingerprint))
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

fn relative_name(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    if relative.as_os_str().is_empty() {
        // `root` is the file itself.
        return file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn asset_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, contents).unwrap();
        }
        dir
    }

    fn hash(dir: &TempDir) -> String {
        fingerprint(dir.path()).unwrap()
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let dir = asset_dir(&[("get-trips.js", "a"), ("lib/db.js", "b")]);
        let first = fingerprint(dir.path()).unwrap();
        let second = fingerprint(dir.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_fingerprint_ignores_location() {
        let a = asset_dir(&[("get-trips.js", "a"), ("lib/db.js", "b")]);
        let b = asset_dir(&[("lib/db.js", "b"), ("get-trips.js", "a")]);
        assert_eq!(hash(&a), hash(&b));
    }

    #[test]
    fn test_fingerprint_changes_with_contents() {
        let a = asset_dir(&[("get-trips.js", "a")]);
        let b = asset_dir(&[("get-trips.js", "b")]);
        assert_ne!(hash(&a), hash(&b));
    }

    #[test]
    fn test_fingerprint_changes_with_file_names() {
        let a = asset_dir(&[("get-trips.js", "a")]);
        let b = asset_dir(&[("get-trip.js", "a")]);
        assert_ne!(hash(&a), hash(&b));
    }

    #[test]
    fn test_file_boundaries_matter() {
        let a = asset_dir(&[("a.js", "ab"), ("b.js", "c")]);
        let b = asset_dir(&[("a.js", "a"), ("b.js", "bc")]);
        assert_ne!(hash(&a), hash(&b));
    }

    #[test]
    fn test_missing_asset_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("lambda");
        assert!(matches!(
            fingerprint(&missing),
            Err(CliError::AssetNotFound(path)) if path == missing
        ));
    }

    #[test]
    fn test_single_file_asset() {
        let dir = asset_dir(&[("handler.js", "a")]);
        let source = asset_source(&dir.path().join("handler.js")).unwrap();
        assert_eq!(source.fingerprint.len(), 64);
        assert!(source.path.ends_with("handler.js"));
    }
}
