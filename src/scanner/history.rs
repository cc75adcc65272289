//! Dated history directory counting.

use std::path::Path;

use regex::Regex;

use crate::tree;

/// Default pattern for dated history entries (`YYYY-MM-DD...`).
pub const DEFAULT_HISTORY_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}";

/// Counts dated subdirectories under a set of history roots.
#[derive(Debug, Clone)]
pub struct HistoryCounter {
    roots: Vec<String>,
    pattern: Regex,
}

impl HistoryCounter {
    /// Create a counter for roots relative to the project root.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regex.
    pub fn new(roots: Vec<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            roots,
            pattern: Regex::new(pattern)?,
        })
    }

    /// The configured history roots.
    #[must_use]
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Returns true if a directory name counts as a history entry.
    #[must_use]
    pub fn is_entry(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }

    /// Sum of dated subdirectories across all roots. Missing roots count zero.
    pub async fn count(&self, project_root: &Path) -> usize {
        let mut total = 0;
        for root in &self.roots {
            let dir = project_root.join(root);
            let count = tree::list_subdirs(&dir)
                .await
                .iter()
                .filter(|name| self.is_entry(name))
                .count();
            tracing::trace!(root = %root, count, "Counted history entries");
            total += count;
        }
        total
    }
}
