//! Resolved project tree conventions.

use std::path::{Path, PathBuf};

use crate::access::{normalize_relative, SafeRoot};
use crate::config::{ConfigError, LayoutConfig};
use crate::scanner::{ConventionScanner, HistoryCounter};

/// Where producer output lives inside one project root.
#[derive(Debug, Clone)]
pub struct Layout {
    project_root: PathBuf,
    docs_dir: PathBuf,
    decisions_dir: PathBuf,
    audits_dir: PathBuf,
    scanner: ConventionScanner,
}

fn relative_dir(field: &'static str, value: &str) -> Result<PathBuf, ConfigError> {
    normalize_relative(value).map_err(|_| ConfigError::InvalidLayoutPath {
        field,
        path: value.to_string(),
    })
}

impl Layout {
    /// Validate a layout against a project root.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or file name is absolute or contains
    /// `..`, the marker field is empty, or the history pattern does not compile.
    pub fn new(project_root: impl Into<PathBuf>, config: &LayoutConfig) -> Result<Self, ConfigError> {
        let docs_dir = relative_dir("docs_dir", &config.docs_dir)?;
        let decisions_dir = relative_dir("decisions_dir", &config.decisions_dir)?;
        let audits_dir = relative_dir("audits_dir", &config.audits_dir)?;
        relative_dir("state_file", &config.state_file)?;
        for root in &config.history_roots {
            relative_dir("history_roots", root)?;
        }
        if config.marker_field.trim().is_empty() {
            return Err(ConfigError::InvalidLayoutPath {
                field: "marker_field",
                path: config.marker_field.clone(),
            });
        }

        let history = HistoryCounter::new(config.history_roots.clone(), &config.history_pattern)?;
        let scanner = ConventionScanner::new(
            config.state_file.clone(),
            config.marker_field.clone(),
            history,
        );

        Ok(Self {
            project_root: project_root.into(),
            docs_dir,
            decisions_dir,
            audits_dir,
            scanner,
        })
    }

    /// The project root.
    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Convention scanner for this project.
    #[must_use]
    pub fn scanner(&self) -> &ConventionScanner {
        &self.scanner
    }

    /// Sandbox over generated documents.
    #[must_use]
    pub fn docs_root(&self) -> SafeRoot {
        SafeRoot::new(self.project_root.join(&self.docs_dir))
    }

    /// Sandbox over decision records.
    #[must_use]
    pub fn decisions_root(&self) -> SafeRoot {
        SafeRoot::new(self.project_root.join(&self.decisions_dir))
    }

    /// Sandbox over audit runs.
    #[must_use]
    pub fn audits_root(&self) -> SafeRoot {
        SafeRoot::new(self.project_root.join(&self.audits_dir))
    }

    /// Subdirectories of the docs tree owned by other artifact kinds.
    #[must_use]
    pub fn docs_exclusions(&self) -> Vec<PathBuf> {
        [&self.decisions_dir, &self.audits_dir]
            .into_iter()
            .filter_map(|dir| dir.strip_prefix(&self.docs_dir).ok())
            .filter(|rel| !rel.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .collect()
    }
}
