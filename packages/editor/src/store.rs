//! # Persistence Collaborators
//!
//! The editor talks to the outside world through three traits:
//!
//! - [`DocumentStore`] loads posts, saves drafts and publishes
//! - [`MediaUploader`] turns dropped files into hosted images
//! - [`DraftStore`] mirrors autosaves into local storage
//!
//! Saves are whole-snapshot overwrites, so a late save of an older snapshot
//! is harmless.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use folio_document::{EditorDocument, PersistedPost};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Post not found: {0}")]
    NotFound(String),

    #[error("Invalid post id: {0}")]
    InvalidPostId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftReceipt {
    pub saved_at: DateTime<Utc>,
}

impl DraftReceipt {
    pub fn now() -> Self {
        Self { saved_at: Utc::now() }
    }
}

/// Everything the host needs to publish a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    /// Public snapshot HTML
    pub content: String,
    pub editor_json: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedPost {
    pub post_id: String,
    pub content: String,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedMedia {
    pub url: String,
    pub width: f64,
    pub height: f64,
}

pub trait DocumentStore: Send + Sync {
    fn get(&self, post_id: &str) -> Result<PersistedPost, StoreError>;

    fn save_draft(&self, post_id: &str, doc: &EditorDocument) -> Result<DraftReceipt, StoreError>;

    fn publish(&self, post_id: &str, request: PublishRequest)
        -> Result<PublishedPost, StoreError>;
}

pub trait MediaUploader {
    fn upload(&self, bytes: &[u8], content_type: &str) -> Result<UploadedMedia, StoreError>;
}

/// Local draft mirror on the editing device
///
/// Written before every autosave; restoring from it is left to the host.
pub trait DraftStore: Send + Sync {
    fn write(&self, post_id: &str, editor_json: &Value) -> Result<(), StoreError>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory store for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    posts: Mutex<HashMap<String, PersistedPost>>,
    published: Mutex<HashMap<String, PublishedPost>>,
    draft_saves: Mutex<HashMap<String, usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_post(self, post_id: &str, post: PersistedPost) -> Self {
        lock(&self.posts).insert(post_id.to_string(), post);
        self
    }

    /// Last saved `editor_json` of a post
    pub fn editor_json(&self, post_id: &str) -> Option<Value> {
        lock(&self.posts)
            .get(post_id)
            .and_then(|post| post.editor_json.clone())
    }

    pub fn draft_saves(&self, post_id: &str) -> usize {
        lock(&self.draft_saves).get(post_id).copied().unwrap_or(0)
    }

    pub fn published(&self, post_id: &str) -> Option<PublishedPost> {
        lock(&self.published).get(post_id).cloned()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, post_id: &str) -> Result<PersistedPost, StoreError> {
        lock(&self.posts)
            .get(post_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(post_id.to_string()))
    }

    fn save_draft(&self, post_id: &str, doc: &EditorDocument) -> Result<DraftReceipt, StoreError> {
        lock(&self.posts)
            .entry(post_id.to_string())
            .or_default()
            .editor_json = Some(doc.to_value());
        *lock(&self.draft_saves)
            .entry(post_id.to_string())
            .or_insert(0) += 1;

        Ok(DraftReceipt::now())
    }

    fn publish(
        &self,
        post_id: &str,
        request: PublishRequest,
    ) -> Result<PublishedPost, StoreError> {
        lock(&self.posts)
            .entry(post_id.to_string())
            .or_default()
            .editor_json = Some(request.editor_json);

        let published = PublishedPost {
            post_id: post_id.to_string(),
            content: request.content,
            published_at: Utc::now(),
        };
        lock(&self.published).insert(post_id.to_string(), published.clone());
        tracing::info!("Published post {}", post_id);

        Ok(published)
    }
}

/// One JSON file per post in a directory
///
/// `<dir>/<post_id>.json` holds the persisted post; publishing also writes
/// `<dir>/<post_id>.html`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn put(&self, post_id: &str, post: &PersistedPost) -> Result<(), StoreError> {
        let path = self.post_path(post_id, "json")?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, serde_json::to_string_pretty(post)?)?;
        Ok(())
    }

    fn post_path(&self, post_id: &str, extension: &str) -> Result<PathBuf, StoreError> {
        let valid = !post_id.is_empty()
            && post_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidPostId(post_id.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", post_id, extension)))
    }

    fn read_or_default(&self, post_id: &str) -> Result<PersistedPost, StoreError> {
        match self.get(post_id) {
            Ok(post) => Ok(post),
            Err(StoreError::NotFound(_)) => Ok(PersistedPost::default()),
            Err(e) => Err(e),
        }
    }
}

impl DocumentStore for FileStore {
    fn get(&self, post_id: &str) -> Result<PersistedPost, StoreError> {
        let path = self.post_path(post_id, "json")?;
        if !path.exists() {
            return Err(StoreError::NotFound(post_id.to_string()));
        }
        let source = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&source)?)
    }

    fn save_draft(&self, post_id: &str, doc: &EditorDocument) -> Result<DraftReceipt, StoreError> {
        let mut post = self.read_or_default(post_id)?;
        post.editor_json = Some(doc.to_value());
        self.put(post_id, &post)?;

        Ok(DraftReceipt::now())
    }

    fn publish(
        &self,
        post_id: &str,
        request: PublishRequest,
    ) -> Result<PublishedPost, StoreError> {
        let mut post = self.read_or_default(post_id)?;
        post.editor_json = Some(request.editor_json);
        self.put(post_id, &post)?;
        fs::write(self.post_path(post_id, "html")?, &request.content)?;
        tracing::info!("Published post {} to {}", post_id, self.dir.display());

        Ok(PublishedPost {
            post_id: post_id.to_string(),
            content: request.content,
            published_at: Utc::now(),
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryDrafts {
    drafts: Mutex<HashMap<String, Value>>,
}

impl MemoryDrafts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last mirrored `editor_json` of a post
    pub fn get(&self, post_id: &str) -> Option<Value> {
        lock(&self.drafts).get(post_id).cloned()
    }
}

impl DraftStore for MemoryDrafts {
    fn write(&self, post_id: &str, editor_json: &Value) -> Result<(), StoreError> {
        lock(&self.drafts).insert(post_id.to_string(), editor_json.clone());
        Ok(())
    }
}
