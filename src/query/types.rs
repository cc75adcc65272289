//! Query and response types.
//!
//! Every primitive returns a JSON-serializable value. Failures are
//! [`ErrorResponse`] values rather than errors crossing the boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::registry::{RegistryError, SourceOverview};
use crate::scanner::SkillState;

/// A single query against the registry.
///
/// Serialized with an `op` tag, e.g. `{"op": "search", "query": "auth"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Query {
    /// Discovered producer states and history count.
    Status,
    /// Overview of all sources, or detail of one.
    ListKnowledge {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },
    /// Read a file from a knowledge source.
    ReadKnowledge {
        source: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
    /// Generated documents.
    GetDoc {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// Decision records.
    GetDecisions {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        topic: Option<String>,
    },
    /// Audit artifacts.
    GetAudit {
        #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
        artifact_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subsystem: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        severity: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        audit: Option<String>,
    },
    /// Case-insensitive full-text search.
    Search {
        query: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scope: Option<String>,
    },
}

impl Query {
    /// Short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::ListKnowledge { .. } => "list_knowledge",
            Self::ReadKnowledge { .. } => "read_knowledge",
            Self::GetDoc { .. } => "get_doc",
            Self::GetDecisions { .. } => "get_decisions",
            Self::GetAudit { .. } => "get_audit",
            Self::Search { .. } => "search",
        }
    }
}

/// Inline error returned instead of a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Valid identifiers or paths the caller can retry with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<Vec<String>>,
    /// Valid values for an enumerated argument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid: Option<Vec<String>>,
    /// Source-relative path the error refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            hint: None,
            available: None,
            valid: None,
            path: None,
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    #[must_use]
    pub fn with_available(mut self, available: Vec<String>) -> Self {
        self.available = Some(available);
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_valid(mut self, valid: &[&str]) -> Self {
        self.valid = Some(valid.iter().map(|v| (*v).to_string()).collect());
        self
    }

    /// The uninformative traversal rejection.
    #[must_use]
    pub fn invalid_path() -> Self {
        Self::new("Invalid path")
    }
}

impl From<RegistryError> for ErrorResponse {
    fn from(err: RegistryError) -> Self {
        let message = err.to_string();
        match err {
            RegistryError::UnknownSource { available, .. } => {
                Self::new(message).with_available(available)
            }
            _ => Self::new(message),
        }
    }
}

/// Result of `status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusResponse {
    pub states: Vec<SkillState>,
    #[serde(rename = "historyCount")]
    pub history_count: usize,
}

/// Result of `list_knowledge` without a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnowledgeListing {
    pub sources: Vec<SourceOverview>,
}

/// A file read from a knowledge source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileContent {
    pub source: String,
    pub path: String,
    pub content: String,
}

/// A document in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub path: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

/// Result of `get_doc` without a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentListing {
    pub documents: Vec<DocumentSummary>,
    pub count: usize,
}

/// A document with its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentBody {
    pub path: String,
    pub title: String,
    pub content: String,
}

/// Result of `get_doc` with a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMatches {
    pub matches: Vec<DocumentBody>,
}

/// A decision record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionRecord {
    pub path: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub content: String,
}

/// Result of `get_decisions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionsResponse {
    pub decisions: Vec<DecisionRecord>,
    pub count: usize,
}

/// An artifact from an audit run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditArtifact {
    pub audit: String,
    pub path: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsystem: Option<String>,
    pub content: String,
}

/// Result of `get_audit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditResponse {
    /// Audit runs the artifacts were drawn from.
    pub audits: Vec<String>,
    pub artifacts: Vec<AuditArtifact>,
}

/// One line matching a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    pub source: String,
    pub path: String,
    pub line: usize,
    pub excerpt: String,
}

/// Result of `search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub scope: String,
    pub matches: Vec<SearchMatch>,
    pub truncated: bool,
}
