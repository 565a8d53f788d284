//! # Document Mutations
//!
//! Every edit to an [`EditorDocument`] goes through a [`Mutation`].
//!
//! ## Semantics
//!
//! ### Geometry
//! - Moves, resizes, nudges and duplicates are clamped to the canvas, never
//!   rejected
//! - Snapping happens before clamping, so the clamp always wins
//! - Resizes are computed from the rect captured at resize start
//!
//! ### Stacking
//! - `BringForward` puts the item above everything (`max + 1`)
//! - `SendBackward` puts it below everything, but never under 1
//! - Equal z-indexes fall back to insertion order
//!
//! ### Identity
//! - Unknown item ids fail with [`MutationError::ItemNotFound`]
//! - New ids come from the session's [`IDGenerator`]

use folio_document::{EditorDocument, FloatingItem, FlowNode, IDGenerator, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EditorConfig;
use crate::geometry::{
    align_rect, create_rect, move_rect, nudge_rect, resize_rect, Alignment, Direction, Handle,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Append a new floating image
    CreateImage {
        src: String,
        width: f64,
        height: f64,
        x: Option<f64>,
        y: Option<f64>,
        alt: Option<String>,
        caption: Option<String>,
    },

    Move {
        id: String,
        x: f64,
        y: f64,
        snap: bool,
    },

    /// Resize by total pointer travel since `origin`
    Resize {
        id: String,
        handle: Handle,
        delta_x: f64,
        delta_y: f64,
        lock_aspect: bool,
        origin: Option<Rect>,
    },

    BringForward {
        id: String,
    },

    SendBackward {
        id: String,
    },

    Duplicate {
        id: String,
    },

    Align {
        id: String,
        alignment: Alignment,
    },

    /// Keyboard move; `shift` selects the large step
    Nudge {
        id: String,
        direction: Direction,
        shift: bool,
    },

    Delete {
        id: String,
    },

    /// Edit image metadata; an empty string clears the field
    UpdateItem {
        id: String,
        alt: Option<String>,
        caption: Option<String>,
    },

    /// Replace the flow tree wholesale (rich-text edits)
    ReplaceFlow {
        flow: FlowNode,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Floating item not found: {0}")]
    ItemNotFound(String),

    #[error("Image source is empty")]
    EmptySource,
}

/// What a mutation needs from its session besides the document
pub struct MutationEnv<'a> {
    pub config: &'a EditorConfig,
    pub ids: &'a mut IDGenerator,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationOutcome {
    /// Item created or changed by the mutation, if any
    pub item_id: Option<String>,
}

impl MutationOutcome {
    fn item(id: impl Into<String>) -> Self {
        Self {
            item_id: Some(id.into()),
        }
    }
}

impl Mutation {
    /// Apply the mutation to the document
    pub fn apply(
        &self,
        doc: &mut EditorDocument,
        env: &mut MutationEnv,
    ) -> Result<MutationOutcome, MutationError> {
        match self {
            Mutation::CreateImage {
                src,
                width,
                height,
                x,
                y,
                alt,
                caption,
            } => Self::apply_create(doc, env, src, *width, *height, *x, *y, alt, caption),

            Mutation::Move { id, x, y, snap } => {
                let grid = (*snap && env.config.snap_to_grid).then_some(env.config.grid_size);
                let inner = doc.canvas_inner_width();
                Self::update_rect(doc, id, |rect| move_rect(rect, *x, *y, grid, inner))
            }

            Mutation::Resize {
                id,
                handle,
                delta_x,
                delta_y,
                lock_aspect,
                origin,
            } => {
                let inner = doc.canvas_inner_width();
                Self::update_rect(doc, id, |rect| {
                    let start = origin.unwrap_or(rect);
                    resize_rect(start, *handle, *delta_x, *delta_y, *lock_aspect, inner)
                })
            }

            Mutation::BringForward { id } => {
                let z_index = doc.max_z_index() + 1;
                Self::set_z_index(doc, id, z_index)
            }

            Mutation::SendBackward { id } => {
                let z_index = (doc.min_z_index() - 1).max(1);
                Self::set_z_index(doc, id, z_index)
            }

            Mutation::Duplicate { id } => Self::apply_duplicate(doc, env, id),

            Mutation::Align { id, alignment } => {
                let inner = doc.canvas_inner_width();
                Self::update_rect(doc, id, |rect| align_rect(rect, *alignment, inner))
            }

            Mutation::Nudge {
                id,
                direction,
                shift,
            } => {
                let step = if *shift {
                    env.config.nudge_step_large
                } else {
                    env.config.nudge_step
                };
                let inner = doc.canvas_inner_width();
                Self::update_rect(doc, id, |rect| nudge_rect(rect, *direction, step, inner))
            }

            Mutation::Delete { id } => {
                let index = doc
                    .item_index(id)
                    .ok_or_else(|| MutationError::ItemNotFound(id.clone()))?;
                doc.floating.remove(index);
                Ok(MutationOutcome::item(id.clone()))
            }

            Mutation::UpdateItem { id, alt, caption } => {
                let item = Self::find(doc, id)?;
                if let Some(alt) = alt {
                    item.alt = non_empty(alt);
                }
                if let Some(caption) = caption {
                    item.caption = non_empty(caption);
                }
                Ok(MutationOutcome::item(id.clone()))
            }

            Mutation::ReplaceFlow { flow } => {
                doc.flow = flow.clone().into_doc();
                Ok(MutationOutcome::default())
            }
        }
    }

    /// Id of the floating item this mutation targets, if any
    pub fn target(&self) -> Option<&str> {
        match self {
            Mutation::Move { id, .. }
            | Mutation::Resize { id, .. }
            | Mutation::BringForward { id }
            | Mutation::SendBackward { id }
            | Mutation::Duplicate { id }
            | Mutation::Align { id, .. }
            | Mutation::Nudge { id, .. }
            | Mutation::Delete { id }
            | Mutation::UpdateItem { id, .. } => Some(id.as_str()),
            Mutation::CreateImage { .. } | Mutation::ReplaceFlow { .. } => None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_create(
        doc: &mut EditorDocument,
        env: &mut MutationEnv,
        src: &str,
        width: f64,
        height: f64,
        x: Option<f64>,
        y: Option<f64>,
        alt: &Option<String>,
        caption: &Option<String>,
    ) -> Result<MutationOutcome, MutationError> {
        if src.trim().is_empty() {
            return Err(MutationError::EmptySource);
        }

        let rect = create_rect(width, height, x, y, doc.canvas_inner_width());
        let id = env.ids.new_id();
        let mut item = FloatingItem::image(id.clone(), src, rect, doc.max_z_index() + 1);
        item.alt = alt.as_deref().and_then(non_empty);
        item.caption = caption.as_deref().and_then(non_empty);

        doc.floating.push(item);
        Ok(MutationOutcome::item(id))
    }

    fn apply_duplicate(
        doc: &mut EditorDocument,
        env: &mut MutationEnv,
        id: &str,
    ) -> Result<MutationOutcome, MutationError> {
        let original = doc
            .find_item(id)
            .ok_or_else(|| MutationError::ItemNotFound(id.to_string()))?;

        let offset = env.config.duplicate_offset;
        let rect = original.rect();
        let rect = move_rect(
            rect,
            rect.x + offset,
            rect.y + offset,
            None,
            doc.canvas_inner_width(),
        );

        let mut copy = original.clone();
        copy.id = env.ids.new_id();
        copy.z_index = original.z_index + 1;
        copy.set_rect(rect);

        let copy_id = copy.id.clone();
        doc.floating.push(copy);
        Ok(MutationOutcome::item(copy_id))
    }

    fn find<'a>(
        doc: &'a mut EditorDocument,
        id: &str,
    ) -> Result<&'a mut FloatingItem, MutationError> {
        doc.find_item_mut(id)
            .ok_or_else(|| MutationError::ItemNotFound(id.to_string()))
    }

    fn update_rect(
        doc: &mut EditorDocument,
        id: &str,
        update: impl FnOnce(Rect) -> Rect,
    ) -> Result<MutationOutcome, MutationError> {
        let item = Self::find(doc, id)?;
        let rect = update(item.rect());
        item.set_rect(rect);
        Ok(MutationOutcome::item(id))
    }

    fn set_z_index(
        doc: &mut EditorDocument,
        id: &str,
        z_index: i64,
    ) -> Result<MutationOutcome, MutationError> {
        Self::find(doc, id)?.z_index = z_index;
        Ok(MutationOutcome::item(id))
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
