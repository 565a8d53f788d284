//! # Folio Document
//!
//! The hybrid document model used by the content editor: a rich-text flow
//! tree plus a layer of freely positioned images.
//!
//! ```text
//! EditorDocument
//!  ├─ meta      canvas width / padding / format version
//!  ├─ flow      doc → paragraph | heading | list | quote | code | ...
//!  └─ floating  [image { x, y, width, height, zIndex }]
//! ```
//!
//! Loading goes through [`migrate::reconcile`], which picks between the
//! current format and legacy single-tree content and never fails.

pub mod document;
pub mod error;
pub mod floating;
pub mod flow;
pub mod id_generator;
pub mod migrate;
pub mod visitor;

pub use document::{
    DocumentMeta, EditorDocument, DEFAULT_CANVAS_PADDING, DEFAULT_CANVAS_WIDTH, DOCUMENT_VERSION,
    MIN_IMAGE_WIDTH,
};
pub use error::{DocumentError, DocumentResult};
pub use floating::{FloatingItem, FloatingKind, Rect};
pub use flow::{FlowNode, Mark, MarkType, NodeType};
pub use id_generator::IDGenerator;
pub use migrate::{
    migrate_legacy, normalize_node_names, parse_flow, reconcile, DocumentSource, PersistedPost,
    Reconciled,
};
pub use visitor::{Visitor, VisitorMut};
