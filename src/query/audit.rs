//! `get_audit` over audit runs.
//!
//! Each immediate subdirectory of the audits directory is one run. Run
//! names sort chronologically when producers prefix them with a date, so
//! the greatest name is the latest run.

use std::path::Path;

use super::artifact::{self, contains_ci};
use super::layout::Layout;
use super::types::{AuditArtifact, AuditResponse, ErrorResponse};
use crate::tree::{self, Frontmatter};

/// Accepted values for the `type` filter.
pub const AUDIT_TYPES: &[&str] = &["finding", "summary", "plan", "report", "any"];

/// Accepted values for the `severity` filter.
pub const SEVERITIES: &[&str] = &["critical", "high", "medium", "low", "info"];

/// Filters for [`get_audit`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditFilter<'a> {
    pub artifact_type: Option<&'a str>,
    pub subsystem: Option<&'a str>,
    pub severity: Option<&'a str>,
    pub audit: Option<&'a str>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Lower-case a type name and fold the plural forms producers use.
fn normalize_type(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    match lower.as_str() {
        "findings" => "finding".to_string(),
        "summaries" => "summary".to_string(),
        "plans" => "plan".to_string(),
        "reports" => "report".to_string(),
        _ => lower,
    }
}

/// Classify an artifact by its metadata and its path within the run.
fn classify(frontmatter: &Frontmatter, relative: &str) -> String {
    if let Some(kind) = frontmatter.get("type") {
        return normalize_type(kind);
    }

    let path = Path::new(relative);
    if let Some(parent) = path.parent().and_then(|p| p.components().next()) {
        let kind = normalize_type(&parent.as_os_str().to_string_lossy());
        if AUDIT_TYPES.contains(&kind.as_str()) {
            return kind;
        }
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    ["summary", "plan", "finding"]
        .into_iter()
        .find(|kind| stem.contains(kind))
        .unwrap_or("report")
        .to_string()
}

/// Audit artifacts from the selected runs, narrowed by the filters.
pub async fn get_audit(
    layout: &Layout,
    filter: AuditFilter<'_>,
) -> Result<AuditResponse, ErrorResponse> {
    let wanted_type = match non_empty(filter.artifact_type).map(normalize_type) {
        Some(t) if t == "any" => None,
        Some(t) if AUDIT_TYPES.contains(&t.as_str()) => Some(t),
        Some(t) => {
            return Err(ErrorResponse::new(format!("Invalid audit type: {t}"))
                .with_valid(AUDIT_TYPES));
        }
        None => None,
    };
    let wanted_severity = match non_empty(filter.severity).map(str::to_lowercase) {
        Some(s) if SEVERITIES.contains(&s.as_str()) => Some(s),
        Some(s) => {
            return Err(ErrorResponse::new(format!("Invalid severity: {s}"))
                .with_valid(SEVERITIES));
        }
        None => None,
    };
    let wanted_subsystem = non_empty(filter.subsystem).map(str::to_lowercase);

    let root = layout.audits_root();
    let runs = tree::list_subdirs(root.base()).await;

    let selected: Vec<String> = match non_empty(filter.audit) {
        Some(audit) => {
            let needle = audit.to_lowercase();
            let selected: Vec<_> = runs
                .iter()
                .filter(|run| contains_ci(run, &needle))
                .cloned()
                .collect();
            if selected.is_empty() {
                return Err(ErrorResponse::new(format!("No audit matching '{audit}'"))
                    .with_available(runs));
            }
            selected
        }
        None => runs.last().cloned().into_iter().collect(),
    };

    let mut artifacts = Vec::new();
    for run in &selected {
        let files = tree::walk_markdown(&root.base().join(run)).await;
        let files: Vec<_> = files.into_iter().map(|f| Path::new(run).join(f)).collect();

        for loaded in artifact::load_all(&root, &files).await {
            // Paths are reported relative to the run.
            let relative = loaded
                .path
                .strip_prefix(&format!("{run}/"))
                .unwrap_or(&loaded.path)
                .to_string();
            let artifact_type = classify(&loaded.frontmatter, &relative);

            if wanted_type.as_ref().is_some_and(|t| *t != artifact_type) {
                continue;
            }

            let severity = loaded.frontmatter.get("severity").map(str::to_string);
            if let Some(wanted) = &wanted_severity {
                if !severity.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(wanted)) {
                    continue;
                }
            }

            let subsystem = loaded.frontmatter.get("subsystem").map(str::to_string);
            if let Some(wanted) = &wanted_subsystem {
                let in_meta = subsystem.as_deref().is_some_and(|s| contains_ci(s, wanted));
                if !in_meta && !contains_ci(&relative, wanted) {
                    continue;
                }
            }

            artifacts.push(AuditArtifact {
                audit: run.clone(),
                path: relative,
                artifact_type,
                title: loaded.title,
                severity,
                subsystem,
                content: loaded.content,
            });
        }
    }

    tracing::debug!(runs = selected.len(), artifacts = artifacts.len(), "Audit query");
    Ok(AuditResponse {
        audits: selected,
        artifacts,
    })
}
