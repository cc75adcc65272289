//! Overview and detailed descriptions of sources.
//!
//! Both are recomputed from disk on every call.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::source::Source;
use crate::tree;

/// Conventional directory holding domain packs inside a dynamic source.
pub const DOMAIN_PACKS_DIR: &str = "domain-packs";

/// Index file that marks a domain pack as self-describing.
pub const PACK_INDEX_FILE: &str = "INDEX.md";

/// Lightweight summary of a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceOverview {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(flatten)]
    pub contents: OverviewContents,
}

/// Overview body, by source kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OverviewContents {
    Dynamic {
        categories: Vec<String>,
        file_count: usize,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        domain_packs: Vec<String>,
    },
    Static {
        files: Vec<String>,
        file_count: usize,
    },
}

/// Per-category breakdown of a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDetail {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(flatten)]
    pub contents: DetailContents,
}

/// Detail body, by source kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DetailContents {
    Dynamic {
        categories: BTreeMap<String, Category>,
        file_count: usize,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        domain_packs: Vec<DomainPack>,
    },
    Static {
        files: Vec<String>,
        file_count: usize,
    },
}

/// A first-level subdirectory of a dynamic source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Category {
    /// The category is further subdivided.
    Nested {
        subcategories: Vec<String>,
        file_count: usize,
    },
    /// The category holds reference documents directly.
    Flat { files: Vec<String>, file_count: usize },
}

impl Category {
    /// Recursive markdown count for the category.
    #[must_use]
    pub fn file_count(&self) -> usize {
        match self {
            Self::Nested { file_count, .. } | Self::Flat { file_count, .. } => *file_count,
        }
    }
}

/// A discovered grouping under `domain-packs/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainPack {
    pub name: String,
    pub file_count: usize,
    pub has_index: bool,
}

/// Category directory names, excluding the domain-pack container.
async fn category_names(dir: &Path) -> Vec<String> {
    tree::list_subdirs(dir)
        .await
        .into_iter()
        .filter(|name| name != DOMAIN_PACKS_DIR)
        .collect()
}

/// Allow-listed files of a static source that currently exist.
async fn existing_static_files(dir: &Path, source: &Source) -> Vec<String> {
    let mut existing = Vec::new();
    for file in source.static_files() {
        match tokio::fs::metadata(dir.join(file)).await {
            Ok(meta) if meta.is_file() => existing.push(file.clone()),
            _ => tracing::trace!(source = %source.id, file = %file, "Static file absent"),
        }
    }
    existing
}

/// Discover domain packs under `<dir>/domain-packs`.
pub async fn discover_domain_packs(dir: &Path) -> Vec<DomainPack> {
    let packs_dir = dir.join(DOMAIN_PACKS_DIR);
    let mut packs = Vec::new();

    for name in tree::list_subdirs(&packs_dir).await {
        let pack_dir = packs_dir.join(&name);
        let has_index = tokio::fs::metadata(pack_dir.join(PACK_INDEX_FILE))
            .await
            .is_ok_and(|meta| meta.is_file());
        packs.push(DomainPack {
            file_count: tree::count_markdown(&pack_dir).await,
            name,
            has_index,
        });
    }

    packs
}

/// Build the overview of a source rooted at `dir`.
pub async fn overview(dir: &Path, source: &Source) -> SourceOverview {
    let contents = if source.is_dynamic() {
        let skip = [PathBuf::from(DOMAIN_PACKS_DIR)];
        OverviewContents::Dynamic {
            categories: category_names(dir).await,
            file_count: tree::count_markdown_skipping(dir, &skip).await,
            domain_packs: tree::list_subdirs(&dir.join(DOMAIN_PACKS_DIR)).await,
        }
    } else {
        let files = existing_static_files(dir, source).await;
        OverviewContents::Static {
            file_count: files.len(),
            files,
        }
    };

    SourceOverview {
        id: source.id.clone(),
        name: source.name.clone(),
        description: source.description.clone(),
        index: source.index.clone(),
        contents,
    }
}

/// Build the detailed description of a source rooted at `dir`.
pub async fn detail(dir: &Path, source: &Source) -> SourceDetail {
    let contents = if source.is_dynamic() {
        let mut categories = BTreeMap::new();
        for name in category_names(dir).await {
            let category_dir = dir.join(&name);
            let subcategories = tree::list_subdirs(&category_dir).await;
            let category = if subcategories.is_empty() {
                let files = tree::list_markdown(&category_dir).await;
                Category::Flat {
                    file_count: files.len(),
                    files,
                }
            } else {
                Category::Nested {
                    subcategories,
                    file_count: tree::count_markdown(&category_dir).await,
                }
            };
            categories.insert(name, category);
        }

        let skip = [PathBuf::from(DOMAIN_PACKS_DIR)];
        DetailContents::Dynamic {
            categories,
            file_count: tree::count_markdown_skipping(dir, &skip).await,
            domain_packs: discover_domain_packs(dir).await,
        }
    } else {
        let files = existing_static_files(dir, source).await;
        DetailContents::Static {
            file_count: files.len(),
            files,
        }
    };

    SourceDetail {
        id: source.id.clone(),
        name: source.name.clone(),
        description: source.description.clone(),
        index: source.index.clone(),
        contents,
    }
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

    #[tokio::test]
    async fn test_domain_packs_discovered() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "domain-packs/fintech/INDEX.md");
        touch(temp_dir.path(), "domain-packs/fintech/ledger/a.md");
        touch(temp_dir.path(), "domain-packs/health/b.md");

        let packs = discover_domain_packs(temp_dir.path()).await;
        assert_eq!(
            packs,
            vec![
                DomainPack {
                    name: "fintech".to_string(),
                    file_count: 2,
                    has_index: true,
                },
                DomainPack {
                    name: "health".to_string(),
                    file_count: 1,
                    has_index: false,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_no_domain_packs_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(discover_domain_packs(temp_dir.path()).await.is_empty());
    }

    #[tokio::test]
    async fn test_domain_packs_not_a_category() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "alpha/a.md");
        touch(temp_dir.path(), "domain-packs/fintech/b.md");

        let source = Source::dynamic("p", "P", "", "p", None);
        let summary = overview(temp_dir.path(), &source).await;
        assert_eq!(
            summary.contents,
            OverviewContents::Dynamic {
                categories: vec!["alpha".to_string()],
                file_count: 1,
                domain_packs: vec!["fintech".to_string()],
            }
        );
    }

    #[tokio::test]
    async fn test_static_overview_lists_existing_only() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "security.md");
        touch(temp_dir.path(), "unlisted.md");

        let source = Source::fixed("c", "C", "", "c", &["security.md", "release.md"]);
        let summary = overview(temp_dir.path(), &source).await;
        assert_eq!(
            summary.contents,
            OverviewContents::Static {
                files: vec!["security.md".to_string()],
                file_count: 1,
            }
        );
    }

    #[test]
    fn test_category_serializes_untagged() {
        let flat = Category::Flat {
            files: vec!["a.md".to_string()],
            file_count: 1,
        };
        assert_eq!(
            serde_json::to_value(&flat).unwrap(),
            serde_json::json!({"files": ["a.md"], "file_count": 1})
        );
    }
}
