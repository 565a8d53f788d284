//! # Folio Editor
//!
//! Editing engine for the hybrid flow/floating document.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ document: EditorDocument + reconcile        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditSession                         │
//! │  - Pointer interaction → Mutation           │
//! │  - Mutations clamp to the canvas            │
//! │  - Debounced autosave on tokio              │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ compiler-html: preview + public snapshot    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_editor::{EditSession, EditorConfig, MemoryStore, Mutation};
//!
//! let store = MemoryStore::new();
//! let mut session = EditSession::load("post-1", &store, EditorConfig::default())?;
//!
//! session.apply(Mutation::CreateImage {
//!     src: "https://cdn.example/cat.png".into(),
//!     width: 400.0,
//!     height: 300.0,
//!     x: None,
//!     y: None,
//!     alt: Some("A cat".into()),
//!     caption: None,
//! })?;
//!
//! session.publish(&store)?;
//! ```

pub mod autosave;
pub mod config;
pub mod errors;
pub mod geometry;
pub mod interaction;
pub mod mutations;
pub mod session;
pub mod store;

pub use autosave::{AutosaveBridge, AutosaveEvent, AutosaveHandle};
pub use config::EditorConfig;
pub use errors::EditorError;
pub use geometry::{Alignment, Direction, Handle};
pub use interaction::{
    DragState, InteractionState, Modifiers, NoopSurface, PointerEvent, PointerSurface,
    ResizeState,
};
pub use mutations::{Mutation, MutationEnv, MutationError, MutationOutcome};
pub use session::{EditSession, Key};
pub use store::{
    DocumentStore, DraftReceipt, DraftStore, FileStore, MediaUploader, MemoryDrafts, MemoryStore,
    PublishRequest, PublishedPost, StoreError, UploadedMedia,
};
