//! Producer state discovery.
//!
//! Producers keep a JSON state file inside a hidden top-level directory of
//! the project. The registry only reads these; anything that does not look
//! like a state record is skipped without error.

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::access::{AccessError, SafeRoot};

/// A discovered producer state record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillState {
    /// Value of the marker field.
    pub skill: String,
    /// Hidden directory the record was found in, e.g. `.widget`.
    pub dir: String,
    /// The full record, producer fields included.
    pub state: Map<String, Value>,
}

/// Parse a state record, returning the marker value and the full object.
///
/// Returns `None` for malformed JSON, non-object JSON, or a missing or
/// non-string marker field.
#[must_use]
pub fn parse_state(content: &str, marker_field: &str) -> Option<(String, Map<String, Value>)> {
    let Value::Object(record) = serde_json::from_str::<Value>(content).ok()? else {
        return None;
    };
    let marker = record.get(marker_field)?.as_str()?.trim().to_string();
    if marker.is_empty() {
        return None;
    }
    Some((marker, record))
}

/// Hidden top-level directories of `root`, sorted by name.
async fn hidden_dirs(root: &Path) -> Vec<String> {
    let Ok(mut reader) = tokio::fs::read_dir(root).await else {
        tracing::debug!(root = %root.display(), "Project root not readable");
        return Vec::new();
    };

    let mut dirs = Vec::new();
    while let Ok(Some(entry)) = reader.next_entry().await {
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if !name.starts_with('.') || name == "." || name == ".." {
            continue;
        }
        if entry.file_type().await.is_ok_and(|ft| ft.is_dir()) {
            dirs.push(name);
        }
    }

    dirs.sort();
    dirs
}

/// Scan `root` for producer state files.
pub async fn scan_producer_states(
    root: &Path,
    state_file: &str,
    marker_field: &str,
) -> Vec<SkillState> {
    let sandbox = SafeRoot::new(root);
    let mut states = Vec::new();

    for dir in hidden_dirs(root).await {
        let relative = format!("{dir}/{state_file}");
        let content = match sandbox.read_to_string(&relative).await {
            Ok(content) => content,
            Err(AccessError::NotFound(_)) => continue,
            Err(e) => {
                tracing::debug!(dir = %dir, error = %e, "Skipping unreadable state file");
                continue;
            }
        };

        match parse_state(&content, marker_field) {
            Some((skill, state)) => {
                tracing::debug!(dir = %dir, skill = %skill, "Discovered producer state");
                states.push(SkillState { skill, dir, state });
            }
            None => {
                tracing::debug!(dir = %dir, "State file lacks marker field or is malformed");
            }
        }
    }

    states
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_parse_state_valid() {
        let (skill, record) = parse_state(r#"{"skill": "widget", "phase": "draft"}"#, "skill").unwrap();
        assert_eq!(skill, "widget");
        assert_eq!(record.get("phase"), Some(&json!("draft")));
    }

    #[test]
    fn test_parse_state_rejects() {
        assert!(parse_state("not json", "skill").is_none());
        assert!(parse_state("[1, 2]", "skill").is_none());
        assert!(parse_state(r#"{"phase": "draft"}"#, "skill").is_none());
        assert!(parse_state(r#"{"skill": 3}"#, "skill").is_none());
        assert!(parse_state(r#"{"skill": "  "}"#, "skill").is_none());
    }

    #[tokio::test]
    async fn test_scan_finds_marked_states() {
        let temp_dir = TempDir::new().unwrap();
        write(
            temp_dir.path(),
            ".widget/STATE.json",
            r#"{"skill": "widget", "phase": "draft"}"#,
        );
        write(temp_dir.path(), ".broken/STATE.json", "{not json");
        write(temp_dir.path(), ".unmarked/STATE.json", r#"{"phase": "x"}"#);
        write(temp_dir.path(), ".empty/other.json", "{}");
        write(temp_dir.path(), "visible/STATE.json", r#"{"skill": "visible"}"#);

        let states = scan_producer_states(temp_dir.path(), "STATE.json", "skill").await;
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].skill, "widget");
        assert_eq!(states[0].dir, ".widget");
        assert_eq!(states[0].state.get("phase"), Some(&json!("draft")));
    }

    #[tokio::test]
    async fn test_scan_sorted_by_dir() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), ".zeta/STATE.json", r#"{"skill": "zeta"}"#);
        write(temp_dir.path(), ".alpha/STATE.json", r#"{"skill": "alpha"}"#);

        let states = scan_producer_states(temp_dir.path(), "STATE.json", "skill").await;
        let dirs: Vec<_> = states.iter().map(|s| s.dir.as_str()).collect();
        assert_eq!(dirs, vec![".alpha", ".zeta"]);
    }

    #[tokio::test]
    async fn test_scan_missing_root() {
        let states =
            scan_producer_states(Path::new("/nonexistent/svk-scan-12345"), "STATE.json", "skill")
                .await;
        assert!(states.is_empty());
    }
}
