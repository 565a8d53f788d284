//! # Flow Layer
//!
//! The linear rich-text tree: paragraphs, headings, lists, quotes, code and
//! inline text runs carrying marks.
//!
//! Node and mark kinds are closed enums with an `Unknown` fallback that keeps
//! the original name, so documents written by newer editors still load and
//! round-trip.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::visitor::{walk_node, Visitor};

/// Kind of a flow node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    Doc,
    Paragraph,
    Heading,
    BulletList,
    OrderedList,
    ListItem,
    Blockquote,
    CodeBlock,
    HorizontalRule,
    HardBreak,
    Text,
    Image,
    /// Any node kind outside the canonical set (name preserved)
    Unknown(String),
}

impl NodeType {
    /// Resolve a canonical node name; everything else becomes `Unknown`
    pub fn parse(name: &str) -> Self {
        match name {
            "doc" => NodeType::Doc,
            "paragraph" => NodeType::Paragraph,
            "heading" => NodeType::Heading,
            "bullet_list" => NodeType::BulletList,
            "ordered_list" => NodeType::OrderedList,
            "list_item" => NodeType::ListItem,
            "blockquote" => NodeType::Blockquote,
            "code_block" => NodeType::CodeBlock,
            "horizontal_rule" => NodeType::HorizontalRule,
            "hard_break" => NodeType::HardBreak,
            "text" => NodeType::Text,
            "image" => NodeType::Image,
            other => NodeType::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Doc => "doc",
            NodeType::Paragraph => "paragraph",
            NodeType::Heading => "heading",
            NodeType::BulletList => "bullet_list",
            NodeType::OrderedList => "ordered_list",
            NodeType::ListItem => "list_item",
            NodeType::Blockquote => "blockquote",
            NodeType::CodeBlock => "code_block",
            NodeType::HorizontalRule => "horizontal_rule",
            NodeType::HardBreak => "hard_break",
            NodeType::Text => "text",
            NodeType::Image => "image",
            NodeType::Unknown(name) => name,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, NodeType::Unknown(_))
    }
}

impl From<String> for NodeType {
    fn from(name: String) -> Self {
        NodeType::parse(&name)
    }
}

impl From<NodeType> for String {
    fn from(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// Kind of an inline mark
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarkType {
    Bold,
    Italic,
    Underline,
    Strike,
    Code,
    Link,
    TextColor,
    BackgroundColor,
    Unknown(String),
}

impl MarkType {
    pub fn parse(name: &str) -> Self {
        match name {
            "bold" => MarkType::Bold,
            "italic" => MarkType::Italic,
            "underline" => MarkType::Underline,
            "strike" => MarkType::Strike,
            "code" => MarkType::Code,
            "link" => MarkType::Link,
            "text_color" => MarkType::TextColor,
            "background_color" => MarkType::BackgroundColor,
            other => MarkType::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MarkType::Bold => "bold",
            MarkType::Italic => "italic",
            MarkType::Underline => "underline",
            MarkType::Strike => "strike",
            MarkType::Code => "code",
            MarkType::Link => "link",
            MarkType::TextColor => "text_color",
            MarkType::BackgroundColor => "background_color",
            MarkType::Unknown(name) => name,
        }
    }
}

impl From<String> for MarkType {
    fn from(name: String) -> Self {
        MarkType::parse(&name)
    }
}

impl From<MarkType> for String {
    fn from(mark_type: MarkType) -> Self {
        match mark_type {
            MarkType::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// Inline formatting applied to a text node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MarkRepr")]
pub struct Mark {
    #[serde(rename = "type")]
    pub mark_type: MarkType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Map<String, Value>>,
}

/// Marks are accepted either as `{"type": ..}` objects or as bare names
#[derive(Deserialize)]
#[serde(untagged)]
enum MarkRepr {
    Name(String),
    Full {
        #[serde(rename = "type")]
        mark_type: MarkType,
        #[serde(default)]
        attrs: Option<Map<String, Value>>,
    },
}

impl From<MarkRepr> for Mark {
    fn from(repr: MarkRepr) -> Self {
        match repr {
            MarkRepr::Name(name) => Mark {
                mark_type: MarkType::from(name),
                attrs: None,
            },
            MarkRepr::Full { mark_type, attrs } => Mark { mark_type, attrs },
        }
    }
}

impl Mark {
    pub fn new(mark_type: MarkType) -> Self {
        Self {
            mark_type,
            attrs: None,
        }
    }

    pub fn link(href: impl Into<String>) -> Self {
        Self::new(MarkType::Link).with_attr("href", Value::String(href.into()))
    }

    pub fn text_color(color: impl Into<String>) -> Self {
        Self::new(MarkType::TextColor).with_attr("color", Value::String(color.into()))
    }

    pub fn background_color(color: impl Into<String>) -> Self {
        Self::new(MarkType::BackgroundColor).with_attr("color", Value::String(color.into()))
    }

    pub fn with_attr(mut self, key: &str, value: Value) -> Self {
        self.attrs
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value);
        self
    }

    /// String attribute lookup (`href`, `color`)
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.as_ref()?.get(key)?.as_str()
    }
}

/// Node of the flow tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    #[serde(rename = "type")]
    pub node_type: NodeType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<FlowNode>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<Mark>>,
}

impl Default for FlowNode {
    fn default() -> Self {
        FlowNode::doc(vec![])
    }
}

impl FlowNode {
    pub fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            attrs: None,
            content: None,
            text: None,
            marks: None,
        }
    }

    pub fn with_content(node_type: NodeType, content: Vec<FlowNode>) -> Self {
        Self {
            content: Some(content),
            ..Self::new(node_type)
        }
    }

    pub fn doc(content: Vec<FlowNode>) -> Self {
        Self::with_content(NodeType::Doc, content)
    }

    pub fn paragraph(content: Vec<FlowNode>) -> Self {
        Self::with_content(NodeType::Paragraph, content)
    }

    pub fn heading(level: u8, content: Vec<FlowNode>) -> Self {
        Self::with_content(NodeType::Heading, content).with_attr("level", Value::from(level))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(NodeType::Text)
        }
    }

    pub fn marked_text(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Self {
            marks: Some(marks),
            ..Self::text(text)
        }
    }

    pub fn image(src: impl Into<String>, alt: Option<&str>) -> Self {
        let node = Self::new(NodeType::Image).with_attr("src", Value::String(src.into()));
        match alt {
            Some(alt) => node.with_attr("alt", Value::String(alt.to_string())),
            None => node,
        }
    }

    pub fn with_attr(mut self, key: &str, value: Value) -> Self {
        self.attrs
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value);
        self
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.as_ref()?.get(key)
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attr(key)?.as_str()
    }

    pub fn attr_i64(&self, key: &str) -> Option<i64> {
        let value = self.attr(key)?;
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f as i64))
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
    }

    /// Child nodes (empty when `content` is absent)
    pub fn children(&self) -> &[FlowNode] {
        self.content.as_deref().unwrap_or(&[])
    }

    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    pub fn marks(&self) -> &[Mark] {
        self.marks.as_deref().unwrap_or(&[])
    }

    pub fn has_mark(&self, mark_type: &MarkType) -> bool {
        self.marks().iter().any(|m| &m.mark_type == mark_type)
    }

    /// Concatenated text of all descendant text nodes
    pub fn plain_text(&self) -> String {
        let mut collector = TextCollector::default();
        collector.visit_node(self);
        collector.buffer
    }

    /// Wrap a non-`doc` node so the tree always has a `doc` root
    pub fn into_doc(self) -> FlowNode {
        if self.node_type == NodeType::Doc {
            self
        } else {
            FlowNode::doc(vec![self])
        }
    }
}

#[derive(Default)]
struct TextCollector {
    buffer: String,
}

impl Visitor for TextCollector {
    fn visit_node(&mut self, node: &FlowNode) {
        match node.node_type {
            NodeType::Text => {
                if let Some(text) = &node.text {
                    self.buffer.push_str(text);
                }
            }
            NodeType::HardBreak => self.buffer.push('\n'),
            _ => walk_node(self, node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_type_round_trip_preserves_unknown_names() {
        let node: FlowNode = serde_json::from_value(json!({
            "type": "callout",
            "content": [{ "type": "text", "text": "hi" }]
        }))
        .unwrap();

        assert_eq!(node.node_type, NodeType::Unknown("callout".to_string()));
        let back = serde_json::to_value(&node).unwrap();
        assert_eq!(back["type"], "callout");
    }

    #[test]
    fn test_marks_accept_bare_names() {
        let node: FlowNode = serde_json::from_value(json!({
            "type": "text",
            "text": "x",
            "marks": ["bold", { "type": "link", "attrs": { "href": "https://a.b" } }]
        }))
        .unwrap();

        let marks = node.marks();
        assert_eq!(marks[0].mark_type, MarkType::Bold);
        assert_eq!(marks[1].attr_str("href"), Some("https://a.b"));
    }

    #[test]
    fn test_missing_type_is_an_error() {
        let result: Result<FlowNode, _> = serde_json::from_value(json!({ "content": [] }));
        assert!(result.is_err());
    }

    #[test]
    fn test_plain_text_walks_descendants() {
        let doc = FlowNode::doc(vec![
            FlowNode::paragraph(vec![FlowNode::text("Hello "), FlowNode::text("world")]),
            FlowNode::paragraph(vec![
                FlowNode::text("a"),
                FlowNode::new(NodeType::HardBreak),
                FlowNode::text("b"),
            ]),
        ]);

        assert_eq!(doc.plain_text(), "Hello worlda\nb");
    }

    #[test]
    fn test_attr_i64_accepts_numeric_strings() {
        let node = FlowNode::heading(2, vec![]).with_attr("start", json!("7"));
        assert_eq!(node.attr_i64("level"), Some(2));
        assert_eq!(node.attr_i64("start"), Some(7));
    }
}
