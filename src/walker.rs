//! Source tree discovery and path helpers

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Enumerate every file under `root`, depth-unbounded.
///
/// Directories are excluded; entries come back in deterministic (sorted)
/// order so repeated runs dispatch the same batch. A traversal error (e.g. an
/// unreadable directory) aborts discovery; unlike per-file upload failures,
/// not being able to read the source tree is fatal.
pub fn discover_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Slash-agnostic path segments of `file` relative to `root`.
///
/// Each component is returned as its own string, so callers can join with
/// `/` for URLs regardless of the platform separator.
pub fn root_relative_segments(root: &Path, file: &Path) -> Result<Vec<String>> {
    let relative = file
        .strip_prefix(root)
        .map_err(|_| Error::SourceOutsideRoot {
            path: file.to_path_buf(),
            root: root.to_path_buf(),
        })?;
    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect())
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_nested_files_and_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("com/example/artifact/1.0.0")).unwrap();
        std::fs::create_dir_all(root.join("empty/dir")).unwrap();
        std::fs::write(root.join("top.txt"), b"x").unwrap();
        std::fs::write(
            root.join("com/example/artifact/1.0.0/artifact-1.0.0.jar"),
            b"jar",
        )
        .unwrap();

        let files = discover_files(root).unwrap();
        assert_eq!(files.len(), 2, "directories must not be listed");
        assert!(files.iter().all(|f| f.is_file()));
    }

    #[test]
    fn discovery_order_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for name in ["b.bin", "a.bin", "c.bin"] {
            std::fs::write(root.join(name), b"x").unwrap();
        }

        let first = discover_files(root).unwrap();
        let second = discover_files(root).unwrap();
        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| w[0] <= w[1]), "sorted order");
    }

    #[test]
    fn relative_segments_are_split_per_component() {
        let segments = root_relative_segments(
            Path::new("/data/repo"),
            Path::new("/data/repo/com/example/a.jar"),
        )
        .unwrap();
        assert_eq!(segments, vec!["com", "example", "a.jar"]);
    }

    #[test]
    fn file_outside_root_is_rejected() {
        let err = root_relative_segments(Path::new("/data/repo"), Path::new("/tmp/a.jar"))
            .unwrap_err();
        assert!(matches!(err, Error::SourceOutsideRoot { .. }));
    }
}
