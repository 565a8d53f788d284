//! # Public Snapshot
//!
//! Static, sanitized view of a document: the flow rendered in public mode and
//! the floating items that survive URL validation, bottom to top.
//!
//! The public view host only places these on the page; every value in a
//! [`Snapshot`] has already been checked.

use folio_document::EditorDocument;
use serde::Serialize;

use crate::compiler::render;
use crate::sanitize::{escape_html, safe_src, RenderMode};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub canvas_width: f64,
    pub canvas_padding: f64,
    pub flow_html: String,
    pub floating: Vec<SnapshotImage>,
}

/// Floating image cleared for public display
///
/// `alt` and `caption` are raw text; hosts must escape them (as
/// [`Snapshot::to_html`] does).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotImage {
    pub id: String,
    pub src: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub z_index: i64,
}

/// Build the public snapshot of a document
pub fn compile_snapshot(doc: &EditorDocument) -> Snapshot {
    let inner = doc.canvas_inner_width();

    let floating = doc
        .stacking_order()
        .into_iter()
        .filter_map(|item| {
            let src = safe_src(&item.src, RenderMode::Public)?;
            let rect = item.rect().clamp_within(inner);
            Some(SnapshotImage {
                id: item.id.clone(),
                src,
                alt: item.alt.clone(),
                caption: item.caption.clone(),
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
                z_index: item.z_index,
            })
        })
        .collect();

    Snapshot {
        canvas_width: doc.meta.canvas_width,
        canvas_padding: doc.meta.canvas_padding,
        flow_html: render(&doc.flow, RenderMode::Public),
        floating,
    }
}

impl Snapshot {
    /// Height needed so no floating item is cut off
    pub fn floating_extent(&self) -> f64 {
        self.floating
            .iter()
            .map(|image| image.y + image.height)
            .fold(0.0, f64::max)
    }

    /// Self-contained HTML fragment with absolutely positioned images
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "<div class=\"folio-canvas\" style=\"position: relative; max-width: {}px; padding: {}px; box-sizing: border-box\">",
            self.canvas_width, self.canvas_padding
        ));
        out.push_str(&format!(
            "<div class=\"folio-flow\">{}</div>",
            self.flow_html
        ));

        if !self.floating.is_empty() {
            out.push_str(&format!(
                "<div class=\"folio-floating\" style=\"position: absolute; top: {pad}px; left: {pad}px; right: {pad}px; height: {}px\">",
                self.floating_extent(),
                pad = self.canvas_padding
            ));
            for image in &self.floating {
                out.push_str(&image.to_html());
            }
            out.push_str("</div>");
        }

        out.push_str("</div>");
        out
    }
}

impl SnapshotImage {
    fn to_html(&self) -> String {
        let caption = self
            .caption
            .as_deref()
            .filter(|caption| !caption.trim().is_empty())
            .map(|caption| format!("<figcaption>{}</figcaption>", escape_html(caption)))
            .unwrap_or_default();

        format!(
            "<figure class=\"folio-image\" style=\"position: absolute; margin: 0; left: {}px; top: {}px; width: {}px; z-index: {}\"><img src=\"{}\" alt=\"{}\" width=\"{}\" height=\"{}\" loading=\"lazy\">{}</figure>",
            self.x,
            self.y,
            self.width,
            self.z_index,
            escape_html(&self.src),
            escape_html(self.alt.as_deref().unwrap_or("")),
            self.width,
            self.height,
            caption
        )
    }
}
