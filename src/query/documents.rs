//! `get_doc` and `get_decisions` over the project's generated artifacts.

use serde_json::Value;

use super::artifact::{self, contains_ci, Artifact};
use super::layout::Layout;
use super::to_value;
use super::types::{
    DecisionRecord, DecisionsResponse, DocumentBody, DocumentListing, DocumentMatches,
    DocumentSummary, ErrorResponse,
};
use crate::tree;

/// Frontmatter keys a decision topic is matched against.
const DECISION_TOPIC_KEYS: &[&str] = &["topic", "tags", "status"];

async fn load_documents(layout: &Layout) -> Vec<Artifact> {
    let root = layout.docs_root();
    let files = tree::walk_markdown_skipping(root.base(), &layout.docs_exclusions()).await;
    artifact::load_all(&root, &files).await
}

/// List all documents, or return the ones whose path or title contains `name`.
pub async fn get_doc(layout: &Layout, name: Option<&str>) -> Result<Value, ErrorResponse> {
    let documents = load_documents(layout).await;

    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        let documents: Vec<_> = documents
            .into_iter()
            .map(|doc| DocumentSummary {
                path: doc.path,
                title: doc.title,
                modified: doc.modified,
            })
            .collect();
        return to_value(&DocumentListing {
            count: documents.len(),
            documents,
        });
    };

    let needle = name.to_lowercase();
    let (matching, others): (Vec<_>, Vec<_>) = documents
        .into_iter()
        .partition(|doc| contains_ci(&doc.path, &needle) || contains_ci(&doc.title, &needle));

    if matching.is_empty() {
        return Err(ErrorResponse::new(format!("No document matching '{name}'"))
            .with_hint("Call get_doc without a name to list documents")
            .with_available(others.into_iter().map(|doc| doc.path).collect()));
    }

    to_value(&DocumentMatches {
        matches: matching
            .into_iter()
            .map(|doc| DocumentBody {
                path: doc.path,
                title: doc.title,
                content: doc.content,
            })
            .collect(),
    })
}

fn decision_matches(record: &Artifact, needle: &str) -> bool {
    contains_ci(&record.path, needle)
        || contains_ci(&record.title, needle)
        || DECISION_TOPIC_KEYS
            .iter()
            .filter_map(|key| record.frontmatter.get(key))
            .any(|value| contains_ci(value, needle))
}

/// Decision records, optionally narrowed to a topic.
pub async fn get_decisions(layout: &Layout, topic: Option<&str>) -> DecisionsResponse {
    let root = layout.decisions_root();
    let files = tree::walk_markdown(root.base()).await;
    let records = artifact::load_all(&root, &files).await;

    let needle = topic
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    let decisions: Vec<_> = records
        .into_iter()
        .filter(|record| needle.as_deref().map_or(true, |n| decision_matches(record, n)))
        .map(|record| DecisionRecord {
            status: record.frontmatter.get("status").map(str::to_string),
            date: record.frontmatter.get("date").map(str::to_string),
            path: record.path,
            title: record.title,
            content: record.content,
        })
        .collect();

    DecisionsResponse {
        count: decisions.len(),
        decisions,
    }
}
