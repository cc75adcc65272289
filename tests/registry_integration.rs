//! End-to-end queries against on-disk project trees.

use std::path::Path;

use serde_json::json;
use svk_registry::config::RegistryConfig;
use svk_registry::query::{Dispatcher, Query};
use svk_registry::registry::Source;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn demo_dispatcher(root: &Path) -> Dispatcher {
    let config = RegistryConfig {
        project_root: root.to_path_buf(),
        knowledge_root: Some(root.to_path_buf()),
        sources: vec![
            Source::dynamic("demo", "Demo", "Demo knowledge", "kb/demo", None),
            Source::fixed("refs", "References", "", "kb/refs", &["glossary.md"]),
        ],
        ..Default::default()
    };
    Dispatcher::from_config(&config).unwrap()
}

fn demo_tree() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "kb/demo/alpha/a.md", "# A\n");
    write(root, "kb/demo/alpha/b.md", "# B\n");
    write(root, "kb/demo/beta/sub/c.md", "# C\nsee the widget\n");
    write(root, "kb/refs/glossary.md", "widget: a thing\n");
    temp_dir
}

#[tokio::test]
async fn test_detail_reports_flat_and_nested_categories() {
    let temp_dir = demo_tree();
    let dispatcher = demo_dispatcher(temp_dir.path());

    let value = dispatcher
        .dispatch(&Query::ListKnowledge {
            source: Some("demo".to_string()),
        })
        .await;

    assert_eq!(value["id"], "demo");
    assert_eq!(value["file_count"], 3);
    assert_eq!(
        value["categories"]["alpha"],
        json!({"files": ["a.md", "b.md"], "file_count": 2})
    );
    assert_eq!(
        value["categories"]["beta"],
        json!({"subcategories": ["sub"], "file_count": 1})
    );
}

#[tokio::test]
async fn test_overview_lists_every_source_in_order() {
    let temp_dir = demo_tree();
    let value = demo_dispatcher(temp_dir.path())
        .dispatch(&Query::ListKnowledge { source: None })
        .await;

    let ids: Vec<_> = value["sources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["demo", "refs"]);
}

#[tokio::test]
async fn test_traversal_never_returns_contents() {
    let temp_dir = demo_tree();
    write(temp_dir.path(), "secret.md", "top secret\n");
    let dispatcher = demo_dispatcher(temp_dir.path());

    for path in [
        "../../etc/passwd",
        "../../secret.md",
        "/etc/passwd",
        "alpha/../../../secret.md",
    ] {
        let value = dispatcher
            .dispatch(&Query::ReadKnowledge {
                source: "demo".to_string(),
                path: Some(path.to_string()),
            })
            .await;
        assert_eq!(value, json!({"error": "Invalid path"}), "path: {path}");
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_out_of_source_is_rejected() {
    let temp_dir = demo_tree();
    write(temp_dir.path(), "secret.md", "top secret\n");
    std::os::unix::fs::symlink(
        temp_dir.path().join("secret.md"),
        temp_dir.path().join("kb/demo/alpha/leak.md"),
    )
    .unwrap();

    let value = demo_dispatcher(temp_dir.path())
        .dispatch(&Query::ReadKnowledge {
            source: "demo".to_string(),
            path: Some("alpha/leak.md".to_string()),
        })
        .await;
    assert_eq!(value["error"], "Invalid path");
}

#[tokio::test]
async fn test_read_knowledge_returns_content() {
    let temp_dir = demo_tree();
    let value = demo_dispatcher(temp_dir.path())
        .dispatch(&Query::ReadKnowledge {
            source: "demo".to_string(),
            path: Some("beta/sub/c.md".to_string()),
        })
        .await;
    assert_eq!(value["source"], "demo");
    assert_eq!(value["path"], "beta/sub/c.md");
    assert!(value["content"].as_str().unwrap().starts_with("# C"));
}

#[tokio::test]
async fn test_static_source_serves_only_its_allow_list() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "glossary.md", "# Glossary\n\nwidget: a thing\n");
    write(root, "patterns/INDEX.md", "# Patterns\n");
    write(root, "private/notes.txt", "not for readers\n");

    let config = RegistryConfig {
        project_root: root.to_path_buf(),
        knowledge_root: Some(root.to_path_buf()),
        sources: vec![Source::fixed("glossary", "Glossary", "", ".", &["glossary.md"])],
        ..Default::default()
    };
    let dispatcher = Dispatcher::from_config(&config).unwrap();

    for path in ["patterns/INDEX.md", "private/notes.txt", "missing.md"] {
        let value = dispatcher
            .dispatch(&Query::ReadKnowledge {
                source: "glossary".to_string(),
                path: Some(path.to_string()),
            })
            .await;
        assert_eq!(value["error"], "File not found", "path: {path}");
        assert_eq!(value["available"], json!(["glossary.md"]), "path: {path}");
        assert!(value["hint"].as_str().unwrap().contains("glossary.md"));
        assert!(value.get("content").is_none());
    }

    let value = dispatcher
        .dispatch(&Query::ReadKnowledge {
            source: "glossary".to_string(),
            path: Some("./glossary.md".to_string()),
        })
        .await;
    assert_eq!(value["path"], "glossary.md");
    assert_eq!(value["content"], "# Glossary\n\nwidget: a thing\n");
}

#[tokio::test]
async fn test_allow_listed_file_is_returned_verbatim() {
    let temp_dir = demo_tree();
    let value = demo_dispatcher(temp_dir.path())
        .dispatch(&Query::ReadKnowledge {
            source: "refs".to_string(),
            path: Some("glossary.md".to_string()),
        })
        .await;
    assert_eq!(
        value,
        json!({"source": "refs", "path": "glossary.md", "content": "widget: a thing\n"})
    );
}

#[tokio::test]
async fn test_read_without_path_uses_index() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "kb/guides/INDEX.md", "# Guides\n\n- setup.md\n");
    write(root, "kb/guides/setup.md", "# Setup\n");

    let config = RegistryConfig {
        project_root: root.to_path_buf(),
        knowledge_root: Some(root.to_path_buf()),
        sources: vec![Source::dynamic(
            "guides",
            "Guides",
            "",
            "kb/guides",
            Some("INDEX.md"),
        )],
        ..Default::default()
    };
    let value = Dispatcher::from_config(&config)
        .unwrap()
        .dispatch(&Query::ReadKnowledge {
            source: "guides".to_string(),
            path: None,
        })
        .await;
    assert_eq!(value["path"], "INDEX.md");
    assert_eq!(value["content"], "# Guides\n\n- setup.md\n");
}

#[tokio::test]
async fn test_read_without_path_or_index_lists_allow_list() {
    let temp_dir = demo_tree();
    let value = demo_dispatcher(temp_dir.path())
        .dispatch(&Query::ReadKnowledge {
            source: "refs".to_string(),
            path: None,
        })
        .await;
    assert_eq!(value["error"], "No index for source refs; specify a path");
    assert_eq!(value["available"], json!(["glossary.md"]));
    assert!(value["hint"].as_str().unwrap().contains("glossary.md"));
}

#[tokio::test]
async fn test_non_utf8_file_reports_its_path() {
    let temp_dir = demo_tree();
    let path = temp_dir.path().join("kb/demo/alpha/raw.md");
    std::fs::write(path, [0xff, 0xfe, 0x00, 0x9f]).unwrap();

    let value = demo_dispatcher(temp_dir.path())
        .dispatch(&Query::ReadKnowledge {
            source: "demo".to_string(),
            path: Some("alpha/raw.md".to_string()),
        })
        .await;
    assert_eq!(
        value,
        json!({"error": "Unreadable file", "path": "alpha/raw.md"})
    );
}

#[tokio::test]
async fn test_status_finds_hidden_producer_state() {
    let temp_dir = TempDir::new().unwrap();
    write(
        temp_dir.path(),
        ".widget/STATE.json",
        r#"{"skill": "widget", "phase": "draft"}"#,
    );
    write(temp_dir.path(), ".broken/STATE.json", "{ not json");
    write(temp_dir.path(), "visible/STATE.json", r#"{"skill": "visible"}"#);
    std::fs::create_dir_all(temp_dir.path().join(".svk/history/2026-03-01-run")).unwrap();

    let value = demo_dispatcher(temp_dir.path())
        .dispatch(&Query::Status)
        .await;

    assert_eq!(
        value["states"],
        json!([{
            "skill": "widget",
            "dir": ".widget",
            "state": {"skill": "widget", "phase": "draft"}
        }])
    );
    assert_eq!(value["historyCount"], 1);
}

#[tokio::test]
async fn test_search_spans_knowledge_sources() {
    let temp_dir = demo_tree();
    let value = demo_dispatcher(temp_dir.path())
        .dispatch(&Query::Search {
            query: "Widget".to_string(),
            scope: Some("knowledge".to_string()),
        })
        .await;

    let matches = value["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0]["source"], "knowledge:demo");
    assert_eq!(matches[0]["path"], "beta/sub/c.md");
    assert_eq!(matches[0]["line"], 2);
    assert_eq!(matches[1]["source"], "knowledge:refs");
    assert_eq!(value["truncated"], false);
}

#[tokio::test]
async fn test_empty_project_answers_every_query() {
    let temp_dir = TempDir::new().unwrap();
    let config = RegistryConfig {
        project_root: temp_dir.path().to_path_buf(),
        ..Default::default()
    };
    let dispatcher = Dispatcher::from_config(&config).unwrap();

    let status = dispatcher.dispatch(&Query::Status).await;
    assert_eq!(status, json!({"states": [], "historyCount": 0}));

    let listing = dispatcher
        .dispatch(&Query::ListKnowledge { source: None })
        .await;
    assert_eq!(listing["sources"].as_array().unwrap().len(), 5);

    let decisions = dispatcher
        .dispatch(&Query::GetDecisions { topic: None })
        .await;
    assert_eq!(decisions["count"], 0);

    let audits = dispatcher
        .dispatch(&Query::GetAudit {
            artifact_type: None,
            subsystem: None,
            severity: None,
            audit: None,
        })
        .await;
    assert_eq!(audits["artifacts"], json!([]));

    let search = dispatcher
        .dispatch(&Query::Search {
            query: "anything".to_string(),
            scope: None,
        })
        .await;
    assert_eq!(search["matches"], json!([]));
}

#[tokio::test]
async fn test_unknown_source_lists_available() {
    let temp_dir = demo_tree();
    let value = demo_dispatcher(temp_dir.path())
        .dispatch_json(r#"{"op": "read_knowledge", "source": "nope", "path": "a.md"}"#)
        .await;
    assert_eq!(value["error"], "Unknown source: nope");
    assert_eq!(value["available"], json!(["demo", "refs"]));
}
