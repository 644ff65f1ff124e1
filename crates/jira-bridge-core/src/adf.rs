//! ADF (Atlassian Document Format) conversion.
//!
//! Jira Cloud stores descriptions and comments as a tree of nodes:
//! `doc` → block nodes (paragraph, heading, ...) → inline nodes (text, ...).
//! Conversion to ADF is lossy: paragraphs only, no marks.

use serde_json::{json, Value};

/// Inline node types. Siblings of these are concatenated without a separator.
const INLINE_NODES: &[&str] = &[
    "text",
    "hardBreak",
    "mention",
    "emoji",
    "date",
    "status",
    "inlineCard",
    "placeholder",
    "mediaInline",
];

/// Convert plain text to an ADF document.
///
/// Blank lines separate paragraphs. Single newlines inside a paragraph become
/// spaces, and empty paragraphs are dropped.
pub fn text_to_adf(text: &str) -> Value {
    let content: Vec<Value> = text
        .split("\n\n")
        .filter(|para| !para.is_empty())
        .map(|para| {
            json!({
                "type": "paragraph",
                "content": [{
                    "type": "text",
                    "text": para.replace('\n', " ")
                }]
            })
        })
        .collect();

    json!({
        "type": "doc",
        "version": 1,
        "content": content
    })
}

/// Extract plain text from an ADF document.
///
/// Absent or `null` input gives an empty string; a JSON string is returned
/// unchanged. Block siblings are joined with `\n`, inline siblings are
/// concatenated.
pub fn adf_to_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(node) => extract_text(node),
    }
}

/// True if the value looks like an ADF document root.
pub fn is_document(value: &Value) -> bool {
    value.get("type").and_then(Value::as_str) == Some("doc")
}

fn extract_text(node: &Value) -> String {
    if let Some(text) = node.get("text").and_then(Value::as_str) {
        if !text.is_empty() {
            return text.to_string();
        }
    }

    if node_type(node) == Some("hardBreak") {
        return "\n".to_string();
    }

    let Some(children) = node.get("content").and_then(Value::as_array) else {
        return String::new();
    };

    let separator = if children.iter().all(is_inline) {
        ""
    } else {
        "\n"
    };

    children
        .iter()
        .map(extract_text)
        .collect::<Vec<_>>()
        .join(separator)
}

fn node_type(node: &Value) -> Option<&str> {
    node.get("type").and_then(Value::as_str)
}

fn is_inline(node: &Value) -> bool {
    node_type(node).is_some_and(|t| INLINE_NODES.contains(&t))
}
