//! Line-oriented, case-insensitive search across artifact trees.
//!
//! There is no index: every search walks its scope and reads each file
//! through the same sandbox as direct reads.

use std::path::PathBuf;

use super::layout::Layout;
use super::types::{ErrorResponse, SearchMatch, SearchResponse};
use crate::access::{display_relative, AccessError, SafeRoot};
use crate::config::SearchConfig;
use crate::registry::Registry;
use crate::tree;

/// What a search covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Docs,
    Decisions,
    Audits,
    Knowledge,
    All,
}

impl SearchScope {
    /// Accepted scope names.
    pub const NAMES: &'static [&'static str] = &["docs", "decisions", "audits", "knowledge", "all"];

    /// Parse a scope name (case-insensitive).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "docs" | "documents" => Some(Self::Docs),
            "decisions" => Some(Self::Decisions),
            "audits" | "audit" => Some(Self::Audits),
            "knowledge" => Some(Self::Knowledge),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    /// Canonical name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Docs => "docs",
            Self::Decisions => "decisions",
            Self::Audits => "audits",
            Self::Knowledge => "knowledge",
            Self::All => "all",
        }
    }

    fn includes(self, other: Self) -> bool {
        self == Self::All || self == other
    }
}

/// A labelled tree to search.
struct Target {
    label: String,
    root: SafeRoot,
    files: Vec<PathBuf>,
}

/// Safely truncate a string at a character boundary.
fn safe_truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn excerpt(line: &str, max_chars: usize) -> String {
    let trimmed = line.trim();
    if trimmed.chars().count() > max_chars {
        format!("{}...", safe_truncate(trimmed, max_chars))
    } else {
        trimmed.to_string()
    }
}

async fn targets(layout: &Layout, registry: &Registry, scope: SearchScope) -> Vec<Target> {
    let mut targets = Vec::new();

    if scope.includes(SearchScope::Docs) {
        let root = layout.docs_root();
        let files = tree::walk_markdown_skipping(root.base(), &layout.docs_exclusions()).await;
        targets.push(Target {
            label: "docs".to_string(),
            root,
            files,
        });
    }
    if scope.includes(SearchScope::Decisions) {
        let root = layout.decisions_root();
        let files = tree::walk_markdown(root.base()).await;
        targets.push(Target {
            label: "decisions".to_string(),
            root,
            files,
        });
    }
    if scope.includes(SearchScope::Audits) {
        let root = layout.audits_root();
        let files = tree::walk_markdown(root.base()).await;
        targets.push(Target {
            label: "audits".to_string(),
            root,
            files,
        });
    }
    if scope.includes(SearchScope::Knowledge) {
        for source in registry.sources() {
            let root = registry.source_root(source);
            let files = if source.is_dynamic() {
                tree::walk_markdown(root.base()).await
            } else {
                source.static_files().iter().map(PathBuf::from).collect()
            };
            targets.push(Target {
                label: format!("knowledge:{}", source.id),
                root,
                files,
            });
        }
    }

    targets
}

/// Search `scope` for lines containing `query`.
///
/// Matches are ordered by target (docs, decisions, audits, then knowledge
/// sources in registry order), then path, then line number.
pub async fn search(
    layout: &Layout,
    registry: &Registry,
    limits: SearchConfig,
    query: &str,
    scope: Option<&str>,
) -> Result<SearchResponse, ErrorResponse> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Err(ErrorResponse::new("Query must not be empty")
            .with_hint("Pass the text to search for in 'query'"));
    }

    let scope = match scope.map(str::trim).filter(|s| !s.is_empty()) {
        None => SearchScope::All,
        Some(name) => SearchScope::parse(name).ok_or_else(|| {
            ErrorResponse::new(format!("Invalid scope: {name}")).with_valid(SearchScope::NAMES)
        })?,
    };

    let mut matches = Vec::new();
    let mut truncated = false;

    'targets: for target in targets(layout, registry, scope).await {
        for file in &target.files {
            let path = display_relative(file);
            let content = match target.root.read_to_string(&path).await {
                Ok(content) => content,
                Err(AccessError::NotFound(_)) => continue,
                Err(e) => {
                    tracing::warn!(source = %target.label, path = %path, error = %e, "Skipping file in search");
                    continue;
                }
            };

            for (index, line) in content.lines().enumerate() {
                if !line.to_lowercase().contains(&needle) {
                    continue;
                }
                if matches.len() == limits.max_results {
                    truncated = true;
                    break 'targets;
                }
                matches.push(SearchMatch {
                    source: target.label.clone(),
                    path: path.clone(),
                    line: index + 1,
                    excerpt: excerpt(line, limits.excerpt_chars),
                });
            }
        }
    }

    tracing::debug!(query = %query, scope = scope.as_str(), matches = matches.len(), truncated, "Search complete");
    Ok(SearchResponse {
        query: query.to_string(),
        scope: scope.as_str().to_string(),
        matches,
        truncated,
    })
}
