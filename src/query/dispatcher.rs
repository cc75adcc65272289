//! Single entry point for all query primitives.

use serde_json::Value;

use super::audit::{self, AuditFilter};
use super::documents;
use super::knowledge;
use super::layout::Layout;
use super::search;
use super::types::{ErrorResponse, Query, StatusResponse};
use super::to_value;
use crate::config::{ConfigError, RegistryConfig, SearchConfig};
use crate::registry::Registry;

/// Turns [`Query`] values into structured JSON responses.
///
/// Holds only immutable configuration; every call re-reads the filesystem.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Registry,
    layout: Layout,
    search: SearchConfig,
}

impl Dispatcher {
    /// Create a dispatcher from already-validated parts.
    #[must_use]
    pub fn new(registry: Registry, layout: Layout, search: SearchConfig) -> Self {
        Self {
            registry,
            layout,
            search,
        }
    }

    /// Build the registry and layout described by a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the source table or layout is invalid.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, ConfigError> {
        let knowledge_root = config.knowledge_root();
        let registry = if config.sources.is_empty() {
            Registry::with_default_sources(knowledge_root)?
        } else {
            Registry::new(knowledge_root, config.sources.clone())?
        };
        let layout = Layout::new(config.project_root.clone(), &config.layout)?;

        tracing::info!(
            project_root = %layout.project_root().display(),
            knowledge_root = %registry.root().display(),
            sources = registry.sources().len(),
            "Dispatcher ready"
        );
        Ok(Self::new(registry, layout, config.search))
    }

    /// The source registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The project layout.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Handle one query. Always returns a value; failures are inline
    /// error objects.
    pub async fn dispatch(&self, query: &Query) -> Value {
        tracing::debug!(op = query.name(), "Dispatching query");

        let result = match query {
            Query::Status => to_value(&self.status().await),
            Query::ListKnowledge { source } => {
                knowledge::list_knowledge(&self.registry, source.as_deref()).await
            }
            Query::ReadKnowledge { source, path } => {
                knowledge::read_knowledge(&self.registry, source, path.as_deref())
                    .await
                    .and_then(|file| to_value(&file))
            }
            Query::GetDoc { name } => documents::get_doc(&self.layout, name.as_deref()).await,
            Query::GetDecisions { topic } => {
                to_value(&documents::get_decisions(&self.layout, topic.as_deref()).await)
            }
            Query::GetAudit {
                artifact_type,
                subsystem,
                severity,
                audit,
            } => {
                let filter = AuditFilter {
                    artifact_type: artifact_type.as_deref(),
                    subsystem: subsystem.as_deref(),
                    severity: severity.as_deref(),
                    audit: audit.as_deref(),
                };
                audit::get_audit(&self.layout, filter)
                    .await
                    .and_then(|response| to_value(&response))
            }
            Query::Search { query, scope } => search::search(
                &self.layout,
                &self.registry,
                self.search,
                query,
                scope.as_deref(),
            )
            .await
            .and_then(|response| to_value(&response)),
        };

        match result {
            Ok(value) => value,
            Err(error) => {
                tracing::debug!(op = query.name(), error = %error.error, "Query returned error");
                to_value(&error).unwrap_or_else(|_| serde_json::json!({ "error": error.error }))
            }
        }
    }

    /// Parse a raw JSON request and handle it.
    ///
    /// Malformed requests produce an inline error naming the problem.
    pub async fn dispatch_json(&self, raw: &str) -> Value {
        match serde_json::from_str::<Query>(raw) {
            Ok(query) => self.dispatch(&query).await,
            Err(e) => {
                tracing::debug!(error = %e, "Invalid request");
                let error = ErrorResponse::new("Invalid request")
                    .with_hint(e.to_string())
                    .with_valid(QUERY_OPS);
                to_value(&error).unwrap_or_else(|_| serde_json::json!({ "error": "Invalid request" }))
            }
        }
    }

    async fn status(&self) -> StatusResponse {
        let root = self.layout.project_root();
        let scanner = self.layout.scanner();
        StatusResponse {
            states: scanner.scan_producer_states(root).await,
            history_count: scanner.count_history_entries(root).await,
        }
    }
}

/// Values accepted in the `op` field of a request.
pub const QUERY_OPS: &[&str] = &[
    "status",
    "list_knowledge",
    "read_knowledge",
    "get_doc",
    "get_decisions",
    "get_audit",
    "search",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use serde_json::json;
    use tempfile::TempDir;

    fn dispatcher(root: &std::path::Path) -> Dispatcher {
        let config = RegistryConfig {
            project_root: root.to_path_buf(),
            ..Default::default()
        };
        Dispatcher::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_status_empty_project() {
        let temp_dir = TempDir::new().unwrap();
        let value = dispatcher(temp_dir.path()).dispatch(&Query::Status).await;
        assert_eq!(value, json!({"states": [], "historyCount": 0}));
    }

    #[tokio::test]
    async fn test_dispatch_json_invalid_request() {
        let temp_dir = TempDir::new().unwrap();
        let d = dispatcher(temp_dir.path());

        let value = d.dispatch_json("not json").await;
        assert_eq!(value["error"], "Invalid request");
        assert!(value["hint"].is_string());

        let value = d.dispatch_json(r#"{"op": "explode"}"#).await;
        assert_eq!(value["error"], "Invalid request");
        assert_eq!(value["valid"].as_array().unwrap().len(), QUERY_OPS.len());
    }

    #[tokio::test]
    async fn test_dispatch_json_routes() {
        let temp_dir = TempDir::new().unwrap();
        let value = dispatcher(temp_dir.path())
            .dispatch_json(r#"{"op": "list_knowledge", "source": "nope"}"#)
            .await;
        assert_eq!(value["error"], "Unknown source: nope");
        assert_eq!(value["available"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_from_config_rejects_bad_layout() {
        let config = RegistryConfig {
            layout: LayoutConfig {
                audits_dir: "../../outside".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(Dispatcher::from_config(&config).is_err());
    }

    #[test]
    fn test_query_ops_cover_every_variant() {
        let queries = [
            Query::Status,
            Query::ListKnowledge { source: None },
            Query::ReadKnowledge {
                source: String::new(),
                path: None,
            },
            Query::GetDoc { name: None },
            Query::GetDecisions { topic: None },
            Query::GetAudit {
                artifact_type: None,
                subsystem: None,
                severity: None,
                audit: None,
            },
            Query::Search {
                query: String::new(),
                scope: None,
            },
        ];
        for query in &queries {
            assert!(QUERY_OPS.contains(&query.name()));
        }
        assert_eq!(queries.len(), QUERY_OPS.len());
    }
}
