//! # Folio HTML compiler
//!
//! Document → HTML. Used for the editor preview ([`RenderMode::Trusted`]) and
//! for the public snapshot ([`RenderMode::Public`]), where the renderer doubles
//! as the sanitizer.

mod compiler;
mod sanitize;
mod snapshot;


pub use compiler::{render, MAX_DEPTH};
pub use sanitize::{escape_html, safe_color, safe_href, safe_src, RenderMode};
pub use snapshot::{compile_snapshot, Snapshot, SnapshotImage};
