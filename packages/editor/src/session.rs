//! # Edit Session
//!
//! One editor's view of one post: the document, the selection, the active
//! pointer interaction and the unsaved-changes flag.
//!
//! Every successful mutation bumps the version, marks the session dirty and
//! hands a snapshot to autosave. Only an explicit [`EditSession::save`] or
//! [`EditSession::publish`] clears the dirty flag.

use folio_compiler_html::{compile_snapshot, render, RenderMode, Snapshot};
use folio_document::{reconcile, DocumentSource, EditorDocument, IDGenerator, PersistedPost};

use crate::autosave::AutosaveHandle;
use crate::config::EditorConfig;
use crate::errors::EditorError;
use crate::geometry::{Direction, Handle};
use crate::interaction::{InteractionState, Modifiers, NoopSurface, PointerEvent, PointerSurface};
use crate::mutations::{Mutation, MutationEnv, MutationOutcome};
use crate::store::{DocumentStore, DraftReceipt, MediaUploader, PublishRequest, PublishedPost, StoreError};

/// Keys the session reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Delete,
    Backspace,
    Escape,
    Char(char),
}

pub struct EditSession {
    pub post_id: String,

    pub document: EditorDocument,

    /// Where the document came from when loaded
    pub source: DocumentSource,

    /// Selected floating item
    pub selected: Option<String>,

    pub interaction: InteractionState,

    config: EditorConfig,
    ids: IDGenerator,
    version: u64,
    unsaved: bool,
    surface: Box<dyn PointerSurface>,
    autosave: Option<AutosaveHandle>,
}

impl EditSession {
    pub fn new(post_id: impl Into<String>, document: EditorDocument, config: EditorConfig) -> Self {
        let post_id = post_id.into();
        let ids = IDGenerator::resume(&post_id, &document);

        Self {
            post_id,
            document,
            source: DocumentSource::EditorJson,
            selected: None,
            interaction: InteractionState::Idle,
            config,
            ids,
            version: 0,
            unsaved: false,
            surface: Box::new(NoopSurface),
            autosave: None,
        }
    }

    /// Session for a persisted post, reconciling legacy content
    pub fn from_persisted(
        post_id: impl Into<String>,
        post: &PersistedPost,
        config: EditorConfig,
    ) -> Self {
        let reconciled = reconcile(post);
        let mut session = Self::new(post_id, reconciled.document, config);
        session.source = reconciled.source;
        session
    }

    /// Load a post from the store; an unknown post starts empty
    pub fn load(
        post_id: &str,
        store: &dyn DocumentStore,
        config: EditorConfig,
    ) -> Result<Self, EditorError> {
        let post = match store.get(post_id) {
            Ok(post) => post,
            Err(StoreError::NotFound(_)) => PersistedPost::default(),
            Err(e) => return Err(e.into()),
        };

        let session = Self::from_persisted(post_id, &post, config);
        tracing::debug!("Loaded post {} from {:?}", post_id, session.source);
        Ok(session)
    }

    pub fn with_surface(mut self, surface: Box<dyn PointerSurface>) -> Self {
        self.surface = surface;
        self
    }

    pub fn with_autosave(mut self, autosave: AutosaveHandle) -> Self {
        self.autosave = Some(autosave);
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn autosave(&self) -> Option<&AutosaveHandle> {
        self.autosave.as_ref()
    }

    /// Incremented by every successful mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Apply a mutation and run its side effects
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationOutcome, EditorError> {
        let mut env = MutationEnv {
            config: &self.config,
            ids: &mut self.ids,
        };
        let outcome = mutation.apply(&mut self.document, &mut env)?;

        match &mutation {
            Mutation::Delete { id } => {
                if self.selected.as_deref() == Some(id.as_str()) {
                    self.selected = None;
                }
                self.interaction.cancel_for_item(id, self.surface.as_mut());
            }
            Mutation::CreateImage { .. } | Mutation::Duplicate { .. } => {
                self.selected = outcome.item_id.clone();
            }
            _ => {}
        }

        self.version += 1;
        self.unsaved = true;
        if let Some(autosave) = &self.autosave {
            autosave.schedule(self.document.clone());
        }

        Ok(outcome)
    }

    /// Select a floating item; unknown ids are ignored
    pub fn select(&mut self, id: &str) -> bool {
        if self.document.find_item(id).is_none() {
            return false;
        }
        self.selected = Some(id.to_string());
        true
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Pointer pressed on an item body: select it and start dragging
    pub fn pointer_down_on_item(&mut self, id: &str, event: &PointerEvent) -> bool {
        let Some(item) = self.document.find_item(id) else {
            return false;
        };
        if !self.interaction.begin_drag(item, event, self.surface.as_mut()) {
            return false;
        }
        self.selected = Some(id.to_string());
        true
    }

    /// Pointer pressed on a resize handle of the selected item
    pub fn pointer_down_on_handle(&mut self, handle: Handle, event: &PointerEvent) -> bool {
        let Some(item) = self
            .selected
            .as_deref()
            .and_then(|id| self.document.find_item(id))
        else {
            return false;
        };
        self.interaction
            .begin_resize(item, handle, event, self.surface.as_mut())
    }

    pub fn pointer_move(
        &mut self,
        event: &PointerEvent,
    ) -> Result<Option<MutationOutcome>, EditorError> {
        match self.interaction.pointer_move(event) {
            Some(mutation) => self.apply(mutation).map(Some),
            None => Ok(None),
        }
    }

    pub fn pointer_up(&mut self, event: &PointerEvent) -> bool {
        self.interaction.pointer_up(event, self.surface.as_mut())
    }

    pub fn pointer_cancel(&mut self) -> bool {
        self.interaction.pointer_cancel(self.surface.as_mut())
    }

    /// Keyboard shortcut for the selected item
    ///
    /// Returns whether the key was handled. Keys are ignored mid-interaction.
    pub fn handle_key(&mut self, key: Key, modifiers: Modifiers) -> Result<bool, EditorError> {
        if !self.interaction.is_idle() {
            return Ok(false);
        }
        let Some(id) = self.selected.clone() else {
            return Ok(false);
        };

        let nudge = |direction| Mutation::Nudge {
            id: id.clone(),
            direction,
            shift: modifiers.shift,
        };

        let mutation = match key {
            Key::ArrowUp => nudge(Direction::Up),
            Key::ArrowDown => nudge(Direction::Down),
            Key::ArrowLeft => nudge(Direction::Left),
            Key::ArrowRight => nudge(Direction::Right),
            Key::Delete | Key::Backspace => Mutation::Delete { id: id.clone() },
            Key::Escape => {
                self.deselect();
                return Ok(true);
            }
            Key::Char('d') | Key::Char('D') if modifiers.command() => {
                Mutation::Duplicate { id: id.clone() }
            }
            Key::Char(']') => Mutation::BringForward { id: id.clone() },
            Key::Char('[') => Mutation::SendBackward { id: id.clone() },
            Key::Char(_) => return Ok(false),
        };

        self.apply(mutation)?;
        Ok(true)
    }

    /// Upload media and place it as a new floating image
    pub fn insert_upload(
        &mut self,
        uploader: &dyn MediaUploader,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, EditorError> {
        let media = uploader.upload(bytes, content_type)?;
        let outcome = self.apply(Mutation::CreateImage {
            src: media.url,
            width: media.width,
            height: media.height,
            x: None,
            y: None,
            alt: None,
            caption: None,
        })?;

        outcome.item_id.ok_or(EditorError::NoSelection)
    }

    /// Editor preview of the flow layer
    pub fn preview_html(&self) -> String {
        render(&self.document.flow, RenderMode::Trusted)
    }

    /// Public snapshot of the whole document
    pub fn snapshot(&self) -> Snapshot {
        compile_snapshot(&self.document)
    }

    pub fn save(&mut self, store: &dyn DocumentStore) -> Result<DraftReceipt, EditorError> {
        let receipt = store.save_draft(&self.post_id, &self.document)?;
        self.unsaved = false;
        tracing::info!("Saved post {} at version {}", self.post_id, self.version);
        Ok(receipt)
    }

    pub fn publish(&mut self, store: &dyn DocumentStore) -> Result<PublishedPost, EditorError> {
        let request = PublishRequest {
            content: self.snapshot().to_html(),
            editor_json: self.document.to_value(),
        };
        let published = store.publish(&self.post_id, request)?;
        self.unsaved = false;
        Ok(published)
    }

    /// Write any pending autosave now
    pub async fn flush_autosave(&self) {
        if let Some(autosave) = &self.autosave {
            autosave.flush().await;
        }
    }
}
