//! Leading metadata blocks and titles of markdown artifacts.
//!
//! Producers prefix some artifacts with a `---` delimited YAML block.
//! Scalars and sequences of scalars are flattened into a string bag keyed
//! by lower-cased field name; nested mappings are ignored. A block that is
//! not a YAML mapping carries no metadata.

use std::collections::BTreeMap;

use comrak::nodes::{AstNode, NodeValue};
use comrak::{parse_document, Arena, Options};
use serde_yaml::{Mapping, Value};

const DELIMITER: &str = "---";

/// Flat key/value metadata from the head of a markdown file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    fields: BTreeMap<String, String>,
}

impl Frontmatter {
    /// Split `content` into its metadata block and the remaining body.
    ///
    /// Content without a complete block yields empty metadata and the whole
    /// content as body. A complete block that does not parse yields empty
    /// metadata and the body after the block.
    #[must_use]
    pub fn split(content: &str) -> (Self, &str) {
        let text = content.strip_prefix('\u{feff}').unwrap_or(content);

        let Some(rest) = strip_delimiter_line(text) else {
            return (Self::default(), content);
        };

        let mut offset = 0;
        for line in rest.split_inclusive('\n') {
            let trimmed = line.trim();
            if trimmed == DELIMITER || trimmed == "..." {
                let block = &rest[..offset];
                let body = &rest[offset + line.len()..];
                return (Self::parse_block(block), body);
            }
            offset += line.len();
        }

        // Unterminated block: treat as plain content.
        (Self::default(), content)
    }

    fn parse_block(block: &str) -> Self {
        if block.trim().is_empty() {
            return Self::default();
        }

        let mapping = match serde_yaml::from_str::<Mapping>(block) {
            Ok(mapping) => mapping,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unparseable frontmatter");
                return Self::default();
            }
        };

        let fields = mapping
            .iter()
            .filter_map(|(key, value)| {
                let key = scalar_text(key)?.trim().to_lowercase();
                let value = flatten(value)?;
                (!key.is_empty()).then_some((key, value))
            })
            .collect();
        Self { fields }
    }

    /// Look up a key (keys are stored lower-cased).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(&key.to_lowercase())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Returns true if no fields were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over all fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn strip_delimiter_line(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(DELIMITER)?;
    let rest = rest.trim_start_matches([' ', '\t']);
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Scalars as text, sequences joined with `, `.
fn flatten(value: &Value) -> Option<String> {
    match value {
        Value::Sequence(items) => {
            let items: Vec<_> = items.iter().filter_map(scalar_text).collect();
            (!items.is_empty()).then(|| items.join(", "))
        }
        Value::Tagged(tagged) => flatten(&tagged.value),
        other => scalar_text(other),
    }
}

/// Text of the first heading in a markdown body.
#[must_use]
pub fn first_heading(body: &str) -> Option<String> {
    let arena = Arena::new();
    let options = Options::default();
    let root = parse_document(&arena, body, &options);

    for node in root.children() {
        if matches!(node.data.borrow().value, NodeValue::Heading(_)) {
            let mut text = String::new();
            collect_text(node, &mut text);
            let text = text.trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn collect_text<'a>(node: &'a AstNode<'a>, out: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(t) => out.push_str(t),
        NodeValue::Code(c) => out.push_str(&c.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => out.push(' '),
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}

/// Title of an artifact: the `title` key, else the first heading, else `fallback`.
#[must_use]
pub fn document_title(frontmatter: &Frontmatter, body: &str, fallback: &str) -> String {
    frontmatter
        .get("title")
        .map(str::to_string)
        .or_else(|| first_heading(body))
        .unwrap_or_else(|| fallback.to_string())
}
