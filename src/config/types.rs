//! Configuration types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ipc::DEFAULT_SOCKET_PATH;
use crate::registry::Source;
use crate::scanner::{DEFAULT_HISTORY_PATTERN, DEFAULT_MARKER_FIELD, DEFAULT_STATE_FILE};

/// Top-level registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegistryConfig {
    /// Project tree written by producers.
    pub project_root: PathBuf,
    /// Knowledge tree the sources live in. Defaults to `<project_root>/knowledge`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_root: Option<PathBuf>,
    /// Project tree conventions.
    pub layout: LayoutConfig,
    /// Search limits.
    pub search: SearchConfig,
    /// IPC settings.
    pub ipc: IpcConfig,
    /// Source table. Empty means the built-in table.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            knowledge_root: None,
            layout: LayoutConfig::default(),
            search: SearchConfig::default(),
            ipc: IpcConfig::default(),
            sources: Vec::new(),
        }
    }
}

impl RegistryConfig {
    /// Resolved knowledge root.
    #[must_use]
    pub fn knowledge_root(&self) -> PathBuf {
        self.knowledge_root
            .clone()
            .unwrap_or_else(|| self.project_root.join("knowledge"))
    }

    /// Project root.
    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }
}

/// Where producers put their output inside the project tree.
///
/// All directories are relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Generated documents.
    pub docs_dir: String,
    /// Decision records.
    pub decisions_dir: String,
    /// Audit runs, one subdirectory per run.
    pub audits_dir: String,
    /// Directories whose dated subdirectories count as history.
    pub history_roots: Vec<String>,
    /// Regex a history directory name must match.
    pub history_pattern: String,
    /// State file name inside each hidden producer directory.
    pub state_file: String,
    /// Field a state file must carry to be recognised.
    pub marker_field: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            docs_dir: "docs".to_string(),
            decisions_dir: "docs/decisions".to_string(),
            audits_dir: "audits".to_string(),
            history_roots: vec![".svk/history".to_string(), "audits".to_string()],
            history_pattern: DEFAULT_HISTORY_PATTERN.to_string(),
            state_file: DEFAULT_STATE_FILE.to_string(),
            marker_field: DEFAULT_MARKER_FIELD.to_string(),
        }
    }
}

/// Limits applied to full-text search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum matches returned per query.
    pub max_results: usize,
    /// Maximum characters per excerpt.
    pub excerpt_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 50,
            excerpt_chars: 200,
        }
    }
}

/// IPC server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IpcConfig {
    /// Unix socket the server listens on.
    pub socket_path: PathBuf,
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
        }
    }
}
