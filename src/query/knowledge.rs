//! `list_knowledge` and `read_knowledge`.

use serde_json::Value;

use super::types::{ErrorResponse, FileContent, KnowledgeListing};
use super::to_value;
use crate::access::{display_relative, normalize_relative, AccessError};
use crate::registry::{Registry, Source};

/// Overview of every source, or the detailed breakdown of one.
pub async fn list_knowledge(
    registry: &Registry,
    source: Option<&str>,
) -> Result<Value, ErrorResponse> {
    match source {
        None => to_value(&KnowledgeListing {
            sources: registry.overview_all().await,
        }),
        Some(id) => to_value(&registry.detail(id).await?),
    }
}

/// Static sources serve only their allow-listed files and declared index.
fn is_allow_listed(source: &Source, relative: &str) -> bool {
    source
        .static_files()
        .iter()
        .chain(source.index.iter())
        .filter_map(|file| normalize_relative(file).ok())
        .any(|file| display_relative(&file) == relative)
}

/// Read a file from a source; no path means the source's primary index.
pub async fn read_knowledge(
    registry: &Registry,
    source_id: &str,
    path: Option<&str>,
) -> Result<FileContent, ErrorResponse> {
    let source = registry.get(source_id)?;

    let requested = match path.map(str::trim).filter(|p| !p.is_empty()) {
        Some(path) => path.to_string(),
        None => match &source.index {
            Some(index) => index.clone(),
            None => {
                let files = source.static_files().to_vec();
                let hint = if files.is_empty() {
                    "This source has no index; pass a path from list_knowledge".to_string()
                } else {
                    format!("Available files: {}", files.join(", "))
                };
                return Err(ErrorResponse::new(format!(
                    "No index for source {source_id}; specify a path"
                ))
                .with_hint(hint)
                .with_available(files));
            }
        },
    };

    let relative = match normalize_relative(&requested) {
        Ok(relative) => display_relative(&relative),
        Err(_) => {
            tracing::warn!(source = %source_id, "Rejected knowledge path");
            return Err(ErrorResponse::invalid_path());
        }
    };

    if !source.is_dynamic() && !is_allow_listed(source, &relative) {
        tracing::debug!(source = %source_id, path = %relative, "Path not in allow-list");
        let files = source.static_files().to_vec();
        return Err(ErrorResponse::new("File not found")
            .with_hint(format!("Available files: {}", files.join(", ")))
            .with_available(files));
    }

    let root = registry.source_root(source);
    match root.read_to_string(&relative).await {
        Ok(content) => {
            tracing::debug!(source = %source_id, path = %relative, "Read knowledge file");
            Ok(FileContent {
                source: source_id.to_string(),
                path: relative,
                content,
            })
        }
        Err(AccessError::InvalidPath) => {
            tracing::warn!(source = %source_id, "Rejected knowledge path");
            Err(ErrorResponse::invalid_path())
        }
        Err(AccessError::NotFound(_)) => Err(ErrorResponse::new("File not found").with_hint(
            format!("Use list_knowledge with source '{source_id}' to see available files"),
        )),
        Err(AccessError::Unreadable(_)) => {
            Err(ErrorResponse::new("Unreadable file").with_path(relative))
        }
        Err(AccessError::Io(e)) => {
            tracing::warn!(source = %source_id, error = %e, "Knowledge read failed");
            Err(ErrorResponse::new("File could not be read"))
        }
    }
}
