//! Loading markdown artifacts through a sandbox.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::access::{display_relative, AccessError, SafeRoot};
use crate::tree::{document_title, Frontmatter};

/// A markdown artifact read from a sandboxed root.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Path relative to the root, `/`-separated.
    pub path: String,
    pub frontmatter: Frontmatter,
    pub title: String,
    pub content: String,
    pub modified: Option<DateTime<Utc>>,
}

impl Artifact {
    /// File stem of the artifact.
    #[must_use]
    pub fn stem(&self) -> &str {
        Path::new(&self.path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.path)
    }
}

/// Read one artifact.
///
/// # Errors
///
/// Propagates [`AccessError`] from the sandboxed read.
pub async fn load(root: &SafeRoot, relative: &Path) -> Result<Artifact, AccessError> {
    let path = display_relative(relative);
    let (content, metadata) = root.read_with_metadata(&path).await?;
    let modified = metadata.modified().ok().map(DateTime::<Utc>::from);

    let stem = relative
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    let (frontmatter, body) = Frontmatter::split(&content);
    let title = document_title(&frontmatter, body, &stem);

    Ok(Artifact {
        path,
        frontmatter,
        title,
        content,
        modified,
    })
}

/// Read every listed artifact, skipping the ones that cannot be read.
pub async fn load_all(root: &SafeRoot, files: &[PathBuf]) -> Vec<Artifact> {
    let mut artifacts = Vec::with_capacity(files.len());
    for file in files {
        match load(root, file).await {
            Ok(artifact) => artifacts.push(artifact),
            Err(e) => {
                tracing::warn!(
                    root = %root.base().display(),
                    path = %file.display(),
                    error = %e,
                    "Skipping unreadable artifact"
                );
            }
        }
    }
    artifacts
}

/// Case-insensitive substring test. `needle` must already be lower-case.
#[must_use]
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
