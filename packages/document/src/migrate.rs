//! # Migration / Reconciliation
//!
//! Decides at load time which persisted representation of a post to edit:
//! the Document Model (`editor_json`) or the legacy single-tree `content`.
//!
//! ```text
//! editor_json ok && (flow has blocks || legacy empty)  → EditorJson
//! legacy parses                                        → Legacy (no floating)
//! otherwise                                            → Empty
//! ```
//!
//! Every path normalizes node and mark names to the canonical set before the
//! tree is handed to the renderer or the editor. Nothing here fails: broken
//! input degrades to an empty document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::EditorDocument;
use crate::error::{DocumentError, DocumentResult};
use crate::flow::{FlowNode, Mark, MarkType, NodeType};
use crate::visitor::{walk_node_mut, VisitorMut};

/// How many times a string may wrap another JSON encoding
pub const MAX_ENCODING_DEPTH: usize = 3;

/// Post fields as returned by the persistence layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedPost {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_json: Option<Value>,
}

/// Which representation a reconciled document came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSource {
    EditorJson,
    Legacy,
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub document: EditorDocument,
    pub source: DocumentSource,
}

/// Pick the document to edit for a persisted post
pub fn reconcile(post: &PersistedPost) -> Reconciled {
    let editor_doc = post
        .editor_json
        .as_ref()
        .filter(|value| !value.is_null())
        .and_then(|value| match EditorDocument::from_value(value) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::debug!(error = %e, "discarding unreadable editor_json");
                None
            }
        });

    let legacy_flow = post
        .content
        .as_ref()
        .and_then(|value| match parse_flow(value) {
            Ok(flow) => Some(flow),
            Err(e) => {
                tracing::debug!(error = %e, "discarding unreadable legacy content");
                None
            }
        });

    let legacy_empty = legacy_flow.as_ref().map_or(true, |flow| !flow.has_children());

    if let Some(mut doc) = editor_doc {
        if doc.flow.has_children() || legacy_empty {
            normalize_node_names(&mut doc.flow);
            doc.clamp_floating();
            return Reconciled {
                document: doc,
                source: DocumentSource::EditorJson,
            };
        }
    }

    match legacy_flow {
        Some(mut flow) if flow.has_children() => {
            normalize_node_names(&mut flow);
            tracing::debug!("migrating legacy content into the document model");
            Reconciled {
                document: EditorDocument {
                    flow,
                    ..EditorDocument::default()
                },
                source: DocumentSource::Legacy,
            }
        }
        _ => Reconciled {
            document: EditorDocument::new(),
            source: DocumentSource::Empty,
        },
    }
}

/// Migrate legacy single-tree content into a document with no floating layer
///
/// Unparseable content yields an empty document.
pub fn migrate_legacy(content: &Value) -> EditorDocument {
    let mut flow = parse_flow(content).unwrap_or_default();
    normalize_node_names(&mut flow);
    EditorDocument {
        flow,
        ..EditorDocument::default()
    }
}

/// Unwrap JSON that was stored as a JSON-encoded string
pub fn decode_json_value(value: &Value) -> DocumentResult<Value> {
    let mut current = value.clone();
    for _ in 0..MAX_ENCODING_DEPTH {
        match current {
            Value::String(encoded) => {
                let trimmed = encoded.trim();
                if trimmed.is_empty() {
                    return Ok(Value::Null);
                }
                current = serde_json::from_str(trimmed)?;
            }
            decoded => return Ok(decoded),
        }
    }
    match current {
        Value::String(_) => Err(DocumentError::EncodingTooDeep {
            depth: MAX_ENCODING_DEPTH,
        }),
        decoded => Ok(decoded),
    }
}

/// Parse a flow tree from legacy or current content
///
/// Accepts a node object, a bare array of top-level nodes, or either of those
/// JSON-encoded inside a string. Names are normalized first, so legacy
/// `root` / `document` roots become the `doc` itself; other roots are wrapped
/// in a `doc`. Null or empty-string content is an empty document.
pub fn parse_flow(value: &Value) -> DocumentResult<FlowNode> {
    match decode_json_value(value)? {
        Value::Null => Ok(FlowNode::default()),
        Value::Array(nodes) => {
            let content: Vec<FlowNode> = serde_json::from_value(Value::Array(nodes))?;
            Ok(FlowNode::doc(content))
        }
        object @ Value::Object(_) => {
            if object.get("type").is_none() {
                return Err(DocumentError::malformed("flow node without a type"));
            }
            let mut node: FlowNode = serde_json::from_value(object)?;
            normalize_node_names(&mut node);
            Ok(node.into_doc())
        }
        other => Err(DocumentError::malformed(format!(
            "expected a flow node, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Rewrite legacy node and mark names to their canonical form, recursively
pub fn normalize_node_names(node: &mut FlowNode) {
    NameNormalizer.visit_node_mut(node);
}

struct NameNormalizer;

impl VisitorMut for NameNormalizer {
    fn visit_node_mut(&mut self, node: &mut FlowNode) {
        if let NodeType::Unknown(name) = &node.node_type {
            if let Some(canonical) = canonical_node_type(name, node) {
                node.node_type = canonical;
            }
        }
        walk_node_mut(self, node);
    }

    fn visit_mark_mut(&mut self, mark: &mut Mark) {
        if let MarkType::Unknown(name) = &mark.mark_type {
            if let Some(canonical) = canonical_mark_type(name) {
                mark.mark_type = canonical;
            }
        }
    }
}

/// Canonical node kind for a legacy name, if one exists
pub fn canonical_node_type(name: &str, node: &FlowNode) -> Option<NodeType> {
    let snake = to_snake_case(name);
    let resolved = match snake.as_str() {
        "root" | "document" => NodeType::Doc,
        "p" | "para" => NodeType::Paragraph,
        "h" | "title" => NodeType::Heading,
        "list" => {
            let ordered = node
                .attr("ordered")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if ordered {
                NodeType::OrderedList
            } else {
                NodeType::BulletList
            }
        }
        "ul" | "unordered_list" => NodeType::BulletList,
        "ol" | "numbered_list" => NodeType::OrderedList,
        "li" | "item" => NodeType::ListItem,
        "block_quote" | "quote" => NodeType::Blockquote,
        "code" | "pre" | "codeblock" => NodeType::CodeBlock,
        "hr" | "rule" | "divider" | "horizontal_line" => NodeType::HorizontalRule,
        "break" | "br" | "line_break" => NodeType::HardBreak,
        "img" | "inline_image" => NodeType::Image,
        other => NodeType::parse(other),
    };
    (!resolved.is_unknown()).then_some(resolved)
}

/// Canonical mark kind for a legacy name, if one exists
pub fn canonical_mark_type(name: &str) -> Option<MarkType> {
    let snake = to_snake_case(name);
    let resolved = match snake.as_str() {
        "strong" | "b" => MarkType::Bold,
        "em" | "i" | "emphasis" => MarkType::Italic,
        "u" => MarkType::Underline,
        "s" | "strikethrough" | "del" => MarkType::Strike,
        "a" | "anchor" => MarkType::Link,
        "color" | "text_style" | "font_color" => MarkType::TextColor,
        "highlight" | "bg_color" => MarkType::BackgroundColor,
        other => MarkType::parse(other),
    };
    (!matches!(resolved, MarkType::Unknown(_))).then_some(resolved)
}

/// `bulletList` / `bullet-list` / `Bullet List` → `bullet_list`
fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.trim().chars() {
        if ch == '-' || ch == ' ' || ch == '_' {
            if !out.ends_with('_') && !out.is_empty() {
                out.push('_');
            }
            prev_lower = false;
        } else if ch.is_uppercase() {
            if prev_lower && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}
