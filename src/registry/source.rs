//! Knowledge source declarations.

use serde::{Deserialize, Serialize};

/// How a source's contents are discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceKind {
    /// Categories are enumerated from disk on every query.
    Dynamic,
    /// A closed allow-list of files, with no subdirectory structure.
    Static {
        /// Allow-listed filenames, relative to the base path.
        files: Vec<String>,
    },
}

/// A named root of knowledge artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Stable identifier used in queries.
    pub id: String,
    /// Display name.
    pub name: String,
    /// What the source contains.
    #[serde(default)]
    pub description: String,
    /// Base path relative to the knowledge root.
    pub base_path: String,
    /// Primary index document, relative to the base path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(flatten)]
    pub kind: SourceKind,
}

impl Source {
    /// Declare a dynamic source.
    #[must_use]
    pub fn dynamic(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        base_path: impl Into<String>,
        index: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            base_path: base_path.into(),
            index: index.map(str::to_string),
            kind: SourceKind::Dynamic,
        }
    }

    /// Declare a static source with an allow-list of files.
    #[must_use]
    pub fn fixed(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        base_path: impl Into<String>,
        files: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            base_path: base_path.into(),
            index: None,
            kind: SourceKind::Static {
                files: files.iter().map(|f| (*f).to_string()).collect(),
            },
        }
    }

    /// Returns true for sources enumerated from disk.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, SourceKind::Dynamic)
    }

    /// The allow-list of a static source; empty for dynamic sources.
    #[must_use]
    pub fn static_files(&self) -> &[String] {
        match &self.kind {
            SourceKind::Static { files } => files,
            SourceKind::Dynamic => &[],
        }
    }
}

/// The SVK knowledge base layout.
#[must_use]
pub fn default_sources() -> Vec<Source> {
    vec![
        Source::dynamic(
            "patterns",
            "Design Patterns",
            "Reusable architecture and implementation patterns, grouped by category and domain pack",
            "patterns",
            Some("INDEX.md"),
        ),
        Source::dynamic(
            "standards",
            "Engineering Standards",
            "Coding, testing and documentation standards",
            "standards",
            Some("README.md"),
        ),
        Source::dynamic(
            "playbooks",
            "Playbooks",
            "Step-by-step procedures for recurring engineering work",
            "playbooks",
            Some("INDEX.md"),
        ),
        Source::fixed(
            "checklists",
            "Checklists",
            "Review and release checklists",
            "checklists",
            &["security.md", "release.md", "code-review.md", "onboarding.md"],
        ),
        Source::fixed(
            "glossary",
            "Glossary",
            "Shared terminology",
            ".",
            &["GLOSSARY.md", "ACRONYMS.md"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ids_are_unique() {
        let sources = default_sources();
        let mut ids: Vec<_> = sources.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), sources.len());
    }

    #[test]
    fn test_static_files_accessor() {
        let source = Source::fixed("c", "C", "", "c", &["a.md"]);
        assert!(!source.is_dynamic());
        assert_eq!(source.static_files(), ["a.md".to_string()]);

        let source = Source::dynamic("d", "D", "", "d", None);
        assert!(source.is_dynamic());
        assert!(source.static_files().is_empty());
    }

    #[test]
    fn test_source_toml_shapes() {
        let toml_str = r#"
            [[sources]]
            id = "demo"
            name = "Demo"
            base_path = "kb/demo"
            index = "INDEX.md"
            kind = "dynamic"

            [[sources]]
            id = "refs"
            name = "References"
            base_path = "refs"
            kind = "static"
            files = ["a.md", "b.md"]
        "#;

        #[derive(Deserialize)]
        struct Wrapper {
            sources: Vec<Source>,
        }

        let wrapper: Wrapper = toml::from_str(toml_str).unwrap();
        assert_eq!(wrapper.sources[0].kind, SourceKind::Dynamic);
        assert_eq!(wrapper.sources[0].index.as_deref(), Some("INDEX.md"));
        assert_eq!(wrapper.sources[1].static_files().len(), 2);
        assert!(wrapper.sources[1].description.is_empty());
    }
}
