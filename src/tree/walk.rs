//! Uncached directory enumeration.
//!
//! Every function re-reads the directory tree. Missing or unreadable
//! directories produce empty results; absence is a normal state.

use std::path::{Path, PathBuf};

/// Returns true if the path has a markdown-like extension.
#[must_use]
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Dir,
}

/// Read the immediate, non-hidden entries of a directory, sorted by name.
///
/// Symlinked directories are reported as neither files nor directories so
/// walks never follow them.
async fn read_entries(dir: &Path) -> Vec<(String, EntryKind)> {
    let mut reader = match tokio::fs::read_dir(dir).await {
        Ok(reader) => reader,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(dir = %dir.display(), error = %e, "Cannot read directory");
            }
            return Vec::new();
        }
    };

    let mut entries = Vec::new();
    loop {
        let entry = match reader.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "Directory read interrupted");
                break;
            }
        };

        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }

        let Ok(file_type) = entry.file_type().await else {
            continue;
        };
        let kind = if file_type.is_dir() {
            EntryKind::Dir
        } else if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_symlink() {
            // Symlinked files count; reads still go through the sandbox check.
            match tokio::fs::metadata(entry.path()).await {
                Ok(meta) if meta.is_file() => EntryKind::File,
                _ => continue,
            }
        } else {
            continue;
        };

        entries.push((name, kind));
    }

    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}

/// Non-recursive, sorted list of markdown filenames in `dir`.
pub async fn list_markdown(dir: &Path) -> Vec<String> {
    read_entries(dir)
        .await
        .into_iter()
        .filter(|(name, kind)| *kind == EntryKind::File && is_markdown(Path::new(name)))
        .map(|(name, _)| name)
        .collect()
}

/// Non-recursive, sorted list of subdirectory names in `dir`.
pub async fn list_subdirs(dir: &Path) -> Vec<String> {
    read_entries(dir)
        .await
        .into_iter()
        .filter(|(_, kind)| *kind == EntryKind::Dir)
        .map(|(name, _)| name)
        .collect()
}

/// Recursive, sorted list of markdown files under `dir`, relative to `dir`.
pub async fn walk_markdown(dir: &Path) -> Vec<PathBuf> {
    walk_markdown_skipping(dir, &[]).await
}

/// Like [`walk_markdown`], but does not descend into the given
/// subdirectories (relative to `dir`).
pub async fn walk_markdown_skipping(dir: &Path, skip: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![PathBuf::new()];

    while let Some(relative) = pending.pop() {
        for (name, kind) in read_entries(&dir.join(&relative)).await {
            let child = relative.join(&name);
            match kind {
                EntryKind::Dir => {
                    if !skip.contains(&child) {
                        pending.push(child);
                    }
                }
                EntryKind::File => {
                    if is_markdown(&child) {
                        files.push(child);
                    }
                }
            }
        }
    }

    files.sort();
    files
}

/// Recursive count of markdown files under `dir`.
pub async fn count_markdown(dir: &Path) -> usize {
    walk_markdown(dir).await.len()
}

/// Recursive count of markdown files under `dir`, skipping subdirectories.
pub async fn count_markdown_skipping(dir: &Path, skip: &[PathBuf]) -> usize {
    walk_markdown_skipping(dir, skip).await.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_is_markdown() {
        assert!(is_markdown(Path::new("a.md")));
        assert!(is_markdown(Path::new("A.MD")));
        assert!(is_markdown(Path::new("notes.markdown")));
        assert!(!is_markdown(Path::new("a.txt")));
        assert!(!is_markdown(Path::new("md")));
    }

    #[tokio::test]
    async fn test_missing_dir_is_empty() {
        let dir = Path::new("/nonexistent/svk-tree-12345");
        assert_eq!(count_markdown(dir).await, 0);
        assert!(list_markdown(dir).await.is_empty());
        assert!(list_subdirs(dir).await.is_empty());
    }

    #[tokio::test]
    async fn test_list_markdown_is_flat_and_sorted() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "b.md");
        touch(temp_dir.path(), "a.md");
        touch(temp_dir.path(), "notes.txt");
        touch(temp_dir.path(), "sub/c.md");

        assert_eq!(list_markdown(temp_dir.path()).await, vec!["a.md", "b.md"]);
        assert_eq!(list_subdirs(temp_dir.path()).await, vec!["sub"]);
    }

    #[tokio::test]
    async fn test_count_is_recursive() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "a.md");
        touch(temp_dir.path(), "x/b.md");
        touch(temp_dir.path(), "x/y/c.md");
        touch(temp_dir.path(), "x/y/d.json");

        assert_eq!(count_markdown(temp_dir.path()).await, 3);
    }

    #[tokio::test]
    async fn test_hidden_entries_skipped() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), ".draft.md");
        touch(temp_dir.path(), ".cache/a.md");
        touch(temp_dir.path(), "real.md");

        assert_eq!(count_markdown(temp_dir.path()).await, 1);
        assert!(list_subdirs(temp_dir.path()).await.is_empty());
    }

    #[tokio::test]
    async fn test_walk_skipping() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "guide.md");
        touch(temp_dir.path(), "decisions/adr-1.md");
        touch(temp_dir.path(), "api/ref.md");

        let files = walk_markdown_skipping(temp_dir.path(), &[PathBuf::from("decisions")]).await;
        assert_eq!(
            files,
            vec![PathBuf::from("api/ref.md"), PathBuf::from("guide.md")]
        );
    }

    #[tokio::test]
    async fn test_repeated_walks_are_identical() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "z/1.md");
        touch(temp_dir.path(), "a/2.md");
        touch(temp_dir.path(), "m.md");

        let first = walk_markdown(temp_dir.path()).await;
        let second = walk_markdown(temp_dir.path()).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_walk_reflects_new_files() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "a.md");
        assert_eq!(count_markdown(temp_dir.path()).await, 1);

        touch(temp_dir.path(), "b.md");
        assert_eq!(count_markdown(temp_dir.path()).await, 2);
    }
}
