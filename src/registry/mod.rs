//! Source registry for the knowledge tree.
//!
//! The registry is an immutable table of [`Source`] declarations resolved
//! against one knowledge root. It is built once at startup and shared by
//! reference; nothing about a source's contents is cached.

mod describe;
mod error;
mod source;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub use describe::{
    discover_domain_packs, Category, DetailContents, DomainPack, OverviewContents, SourceDetail,
    SourceOverview, DOMAIN_PACKS_DIR, PACK_INDEX_FILE,
};
pub use error::RegistryError;
pub use source::{default_sources, Source, SourceKind};

use crate::access::{normalize_relative, SafeRoot};

/// Immutable table of knowledge sources.
#[derive(Debug, Clone)]
pub struct Registry {
    root: PathBuf,
    sources: Vec<Source>,
}

impl Registry {
    /// Build a registry, validating every declaration.
    ///
    /// # Errors
    ///
    /// Returns an error if an id is empty or duplicated, a base path is
    /// absolute or contains `..`, or an index/allow-listed file would leave
    /// its source.
    pub fn new<P: Into<PathBuf>>(root: P, sources: Vec<Source>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for source in &sources {
            if source.id.trim().is_empty() {
                return Err(RegistryError::EmptyId);
            }
            if !seen.insert(source.id.as_str()) {
                return Err(RegistryError::DuplicateId(source.id.clone()));
            }
            if !is_root_path(&source.base_path) && normalize_relative(&source.base_path).is_err() {
                return Err(RegistryError::InvalidBasePath {
                    id: source.id.clone(),
                    path: source.base_path.clone(),
                });
            }
            for file in source.index.iter().chain(source.static_files()) {
                if normalize_relative(file).is_err() {
                    return Err(RegistryError::InvalidFile {
                        id: source.id.clone(),
                        file: file.clone(),
                    });
                }
            }
        }

        let root = root.into();
        tracing::debug!(root = %root.display(), count = sources.len(), "Registry built");
        Ok(Self { root, sources })
    }

    /// Build a registry with the default SVK source table.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in table; see [`Registry::new`].
    pub fn with_default_sources<P: Into<PathBuf>>(root: P) -> Result<Self, RegistryError> {
        Self::new(root, default_sources())
    }

    /// The knowledge root all base paths are resolved against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All declarations, in declaration order.
    #[must_use]
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// All registered ids, in declaration order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.id.clone()).collect()
    }

    /// Look up a source by id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownSource`] listing every valid id.
    pub fn get(&self, id: &str) -> Result<&Source, RegistryError> {
        self.sources
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| RegistryError::UnknownSource {
                id: id.to_string(),
                available: self.ids(),
            })
    }

    /// Absolute directory of a source.
    #[must_use]
    pub fn source_dir(&self, source: &Source) -> PathBuf {
        if is_root_path(&source.base_path) {
            self.root.clone()
        } else {
            self.root.join(&source.base_path)
        }
    }

    /// Sandbox for reads from a source.
    #[must_use]
    pub fn source_root(&self, source: &Source) -> SafeRoot {
        SafeRoot::new(self.source_dir(source))
    }

    /// Overview of every registered source.
    pub async fn overview_all(&self) -> Vec<SourceOverview> {
        let mut overviews = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            overviews.push(describe::overview(&self.source_dir(source), source).await);
        }
        overviews
    }

    /// Overview of one source.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownSource`] for an unregistered id.
    pub async fn overview(&self, id: &str) -> Result<SourceOverview, RegistryError> {
        let source = self.get(id)?;
        Ok(describe::overview(&self.source_dir(source), source).await)
    }

    /// Detailed per-category description of one source.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownSource`] for an unregistered id.
    pub async fn detail(&self, id: &str) -> Result<SourceDetail, RegistryError> {
        let source = self.get(id)?;
        Ok(describe::detail(&self.source_dir(source), source).await)
    }
}

fn is_root_path(base_path: &str) -> bool {
    matches!(base_path.trim(), "." | "./")
}
