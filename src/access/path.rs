//! Sandboxed path resolution and reads.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::error::AccessError;

/// Lexically normalize a caller-supplied relative path.
///
/// Backslashes are treated as separators and empty or `.` segments are
/// dropped. Absolute paths, `..` segments anywhere, NUL bytes and paths
/// that normalize to nothing are rejected. Never touches the filesystem.
///
/// # Errors
///
/// Returns [`AccessError::InvalidPath`] for any of the rejected forms.
///
/// # Examples
///
/// ```
/// use svk_registry::access::normalize_relative;
///
/// assert_eq!(
///     normalize_relative("./alpha//a.md").unwrap(),
///     std::path::PathBuf::from("alpha/a.md")
/// );
/// assert!(normalize_relative("../../etc/passwd").is_err());
/// assert!(normalize_relative("alpha/../../secret").is_err());
/// ```
pub fn normalize_relative(raw: &str) -> Result<PathBuf, AccessError> {
    let unified = raw.replace('\\', "/");
    if unified.starts_with('/') || unified.contains('\0') {
        return Err(AccessError::InvalidPath);
    }

    let mut normalized = PathBuf::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(AccessError::InvalidPath),
            other => normalized.push(other),
        }
    }

    // Catches platform prefixes such as `C:` that survive the split.
    if normalized.as_os_str().is_empty() || normalized.is_absolute() || normalized.has_root() {
        return Err(AccessError::InvalidPath);
    }

    Ok(normalized)
}

/// Render a relative path with `/` separators for responses.
#[must_use]
pub fn display_relative(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// A directory that reads are confined to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeRoot {
    base: PathBuf,
}

impl SafeRoot {
    /// Create a root for the given base directory.
    ///
    /// The directory does not need to exist yet.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self { base: base.into() }
    }

    /// Returns the base directory.
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Resolve a relative path to a canonical absolute path inside the root.
    ///
    /// # Errors
    ///
    /// - [`AccessError::InvalidPath`] if the path fails the lexical check or
    ///   resolves (through symlinks) to the root itself or outside it.
    /// - [`AccessError::NotFound`] if nothing exists at the location.
    /// - [`AccessError::Io`] for other filesystem failures.
    pub async fn resolve(&self, raw: &str) -> Result<PathBuf, AccessError> {
        let relative = normalize_relative(raw)?;
        let joined = self.base.join(&relative);

        let target = match tokio::fs::canonicalize(&joined).await {
            Ok(path) => path,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AccessError::NotFound(relative));
            }
            Err(e) => return Err(e.into()),
        };
        let base = match tokio::fs::canonicalize(&self.base).await {
            Ok(path) => path,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AccessError::NotFound(relative));
            }
            Err(e) => return Err(e.into()),
        };

        if target == base || !target.starts_with(&base) {
            tracing::warn!(
                root = %self.base.display(),
                requested = %relative.display(),
                "Resolved path escapes sandbox root"
            );
            return Err(AccessError::InvalidPath);
        }

        Ok(target)
    }

    /// Read a UTF-8 file inside the root.
    ///
    /// # Errors
    ///
    /// Everything [`SafeRoot::resolve`] returns, plus
    /// [`AccessError::NotFound`] when the target is a directory and
    /// [`AccessError::Unreadable`] when the content is not valid UTF-8.
    pub async fn read_to_string(&self, raw: &str) -> Result<String, AccessError> {
        self.read_with_metadata(raw).await.map(|(content, _)| content)
    }

    /// Read a UTF-8 file inside the root along with the metadata of the
    /// resolved target.
    ///
    /// # Errors
    ///
    /// Same as [`SafeRoot::read_to_string`].
    pub async fn read_with_metadata(
        &self,
        raw: &str,
    ) -> Result<(String, std::fs::Metadata), AccessError> {
        let target = self.resolve(raw).await?;

        let metadata = tokio::fs::metadata(&target).await?;
        if !metadata.is_file() {
            return Err(AccessError::NotFound(normalize_relative(raw)?));
        }

        let bytes = tokio::fs::read(&target).await?;
        match String::from_utf8(bytes) {
            Ok(content) => Ok((content, metadata)),
            Err(_) => {
                tracing::debug!(path = %target.display(), "File is not valid UTF-8");
                Err(AccessError::Unreadable(normalize_relative(raw)?))
            }
        }
    }
}
