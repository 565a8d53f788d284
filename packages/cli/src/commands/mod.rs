pub mod init;
pub mod migrate;
pub mod render;

pub use init::{init, InitArgs};
pub use migrate::{migrate, MigrateArgs};
pub use render::{render, RenderArgs};

use crate::config::Config;
use anyhow::{Context, Result};
use folio_document::DocumentSource;
use folio_editor::{EditSession, FileStore};
use std::path::Path;
use walkdir::WalkDir;

/// Post ids in a posts directory (`<id>.json`), sorted
pub fn find_post_ids(dir: &Path) -> Result<Vec<String>> {
    let mut ids = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        if let Some(id) = path.file_stem().and_then(|s| s.to_str()) {
            ids.push(id.to_string());
        }
    }

    Ok(ids)
}

/// Load a post, giving documents without an editor snapshot the configured canvas
pub fn open_session(store: &FileStore, post_id: &str, config: &Config) -> Result<EditSession> {
    let mut session = EditSession::load(post_id, store, config.editor.clone())
        .with_context(|| format!("Failed to load post {}", post_id))?;

    if session.source != DocumentSource::EditorJson {
        session.document.meta = config.canvas.meta();
        session.document.clamp_floating();
    }

    Ok(session)
}
