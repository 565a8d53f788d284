//! # Editor Document
//!
//! Canonical in-memory and on-disk shape: `{meta, flow, floating[]}`.
//!
//! ```text
//! {
//!   "meta": { "canvasWidth": 800, "canvasPadding": 40, "version": 1 },
//!   "flow": { "type": "doc", "content": [ ... ] },
//!   "floating": [ { "id": "..", "type": "image", "src": "..", ... } ]
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{DocumentError, DocumentResult};
use crate::floating::FloatingItem;
use crate::flow::{FlowNode, NodeType};
use crate::migrate::{decode_json_value, normalize_node_names};

pub const DOCUMENT_VERSION: u32 = 1;
pub const DEFAULT_CANVAS_WIDTH: f64 = 800.0;
pub const DEFAULT_CANVAS_PADDING: f64 = 40.0;

/// Smallest width (and directly driven height) a floating image may have
pub const MIN_IMAGE_WIDTH: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    #[serde(default = "default_canvas_width")]
    pub canvas_width: f64,

    #[serde(default = "default_canvas_padding")]
    pub canvas_padding: f64,

    #[serde(default = "default_version")]
    pub version: u32,
}

fn default_canvas_width() -> f64 {
    DEFAULT_CANVAS_WIDTH
}

fn default_canvas_padding() -> f64 {
    DEFAULT_CANVAS_PADDING
}

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

impl Default for DocumentMeta {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_padding: DEFAULT_CANVAS_PADDING,
            version: DOCUMENT_VERSION,
        }
    }
}

impl DocumentMeta {
    pub fn new(canvas_width: f64, canvas_padding: f64) -> Self {
        Self {
            canvas_width,
            canvas_padding,
            version: DOCUMENT_VERSION,
        }
    }

    /// Width available to floating items (`canvasWidth - 2 * canvasPadding`)
    pub fn canvas_inner_width(&self) -> f64 {
        let inner = self.canvas_width - 2.0 * self.canvas_padding.max(0.0);
        if inner.is_finite() {
            inner.max(MIN_IMAGE_WIDTH)
        } else {
            DEFAULT_CANVAS_WIDTH - 2.0 * DEFAULT_CANVAS_PADDING
        }
    }
}

/// Hybrid document: rich-text flow plus floating image layer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EditorDocument {
    #[serde(default)]
    pub meta: DocumentMeta,

    pub flow: FlowNode,

    #[serde(default, deserialize_with = "deserialize_floating")]
    pub floating: Vec<FloatingItem>,
}

/// Keep the floating items that parse, drop the rest
fn deserialize_floating<'de, D>(deserializer: D) -> Result<Vec<FloatingItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries,
        Value::Null => return Ok(Vec::new()),
        other => {
            tracing::debug!(value = %other, "dropping non-array floating layer");
            return Ok(Vec::new());
        }
    };

    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::debug!(error = %e, "dropping unreadable floating item");
                None
            }
        })
        .collect())
}

impl EditorDocument {
    /// Empty document with default canvas
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_meta(meta: DocumentMeta) -> Self {
        Self {
            meta,
            ..Self::default()
        }
    }

    /// Parse a persisted `editor_json` value (double-encoded strings included)
    pub fn from_value(value: &Value) -> DocumentResult<Self> {
        let value = decode_json_value(value)?;
        if !value.is_object() {
            return Err(DocumentError::malformed("editor_json is not an object"));
        }
        let mut doc: EditorDocument = serde_json::from_value(value)?;
        let mut flow = std::mem::take(&mut doc.flow);
        normalize_node_names(&mut flow);
        doc.flow = flow.into_doc();
        Ok(doc)
    }

    pub fn from_json_str(source: &str) -> DocumentResult<Self> {
        let value: Value = serde_json::from_str(source)?;
        Self::from_value(&value)
    }

    pub fn to_value(&self) -> Value {
        // Every field is a plain JSON type; serialization cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn canvas_inner_width(&self) -> f64 {
        self.meta.canvas_inner_width()
    }

    /// True when the flow has no blocks and there are no floating items
    pub fn is_empty(&self) -> bool {
        !self.flow.has_children() && self.floating.is_empty()
    }

    pub fn flow_is_empty(&self) -> bool {
        self.flow.node_type != NodeType::Doc || !self.flow.has_children()
    }

    pub fn find_item(&self, id: &str) -> Option<&FloatingItem> {
        self.floating.iter().find(|item| item.id == id)
    }

    pub fn find_item_mut(&mut self, id: &str) -> Option<&mut FloatingItem> {
        self.floating.iter_mut().find(|item| item.id == id)
    }

    pub fn item_index(&self, id: &str) -> Option<usize> {
        self.floating.iter().position(|item| item.id == id)
    }

    /// Largest z-index on the layer, 0 when the layer is empty
    pub fn max_z_index(&self) -> i64 {
        self.floating
            .iter()
            .map(|item| item.z_index)
            .max()
            .unwrap_or(0)
            .max(0)
    }

    /// Smallest z-index on the layer, 1 when the layer is empty
    pub fn min_z_index(&self) -> i64 {
        self.floating
            .iter()
            .map(|item| item.z_index)
            .min()
            .unwrap_or(1)
    }

    /// Items ordered bottom to top (z-index, then insertion order)
    pub fn stacking_order(&self) -> Vec<&FloatingItem> {
        let mut items: Vec<(usize, &FloatingItem)> = self.floating.iter().enumerate().collect();
        items.sort_by_key(|(index, item)| (item.z_index, *index));
        items.into_iter().map(|(_, item)| item).collect()
    }

    /// Re-impose canvas bounds on every floating item
    pub fn clamp_floating(&mut self) {
        let inner = self.canvas_inner_width();
        for item in &mut self.floating {
            let rect = item.rect().clamp_within(inner);
            item.set_rect(rect);
        }
    }
}
