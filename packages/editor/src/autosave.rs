//! # Autosave
//!
//! Debounced background saving. Every edit schedules the latest snapshot and
//! restarts the timer; the snapshot is written once edits stop for the
//! configured delay.
//!
//! ```text
//! schedule ─► [pending = doc, deadline = now + debounce]
//!                         │ timer fires
//!                         ▼
//!             DraftStore::write (optional) ─► DocumentStore::save_draft
//!                         │
//!                         ▼
//!             broadcast AutosaveEvent::{Saved, Failed}
//! ```
//!
//! Failures never touch the in-memory document; the next edit re-arms the
//! timer.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use folio_document::EditorDocument;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{sleep_until, Instant};

use crate::store::{DocumentStore, DraftStore};

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub enum AutosaveEvent {
    Saved { saved_at: DateTime<Utc> },
    Failed { message: String },
}

enum Command {
    Schedule(Box<EditorDocument>),
    Flush(oneshot::Sender<()>),
}

/// Handle to a running autosave task
///
/// Dropping the last handle saves any pending snapshot and stops the task.
#[derive(Debug, Clone)]
pub struct AutosaveHandle {
    commands: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<AutosaveEvent>,
}

impl AutosaveHandle {
    /// Replace the pending snapshot and restart the debounce timer
    pub fn schedule(&self, doc: EditorDocument) {
        if self.commands.send(Command::Schedule(Box::new(doc))).is_err() {
            tracing::warn!("Autosave task has stopped; edit not scheduled");
        }
    }

    /// Save the pending snapshot now, if there is one
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.commands.send(Command::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AutosaveEvent> {
        self.events.subscribe()
    }
}

pub struct AutosaveBridge {
    post_id: String,
    store: Arc<dyn DocumentStore>,
    drafts: Option<Arc<dyn DraftStore>>,
    debounce: Duration,
    events: broadcast::Sender<AutosaveEvent>,
}

impl AutosaveBridge {
    /// Start the autosave task on the current tokio runtime
    pub fn spawn(
        post_id: impl Into<String>,
        store: Arc<dyn DocumentStore>,
        drafts: Option<Arc<dyn DraftStore>>,
        debounce: Duration,
    ) -> AutosaveHandle {
        let (commands, receiver) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let bridge = AutosaveBridge {
            post_id: post_id.into(),
            store,
            drafts,
            debounce,
            events: events.clone(),
        };
        tokio::spawn(bridge.run(receiver));

        AutosaveHandle { commands, events }
    }

    async fn run(self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let mut pending: Option<Box<EditorDocument>> = None;
        let mut deadline: Option<Instant> = None;

        loop {
            let timer = sleep_until(deadline.unwrap_or_else(Instant::now));

            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Schedule(doc)) => {
                        pending = Some(doc);
                        deadline = Some(Instant::now() + self.debounce);
                    }
                    Some(Command::Flush(done)) => {
                        deadline = None;
                        if let Some(doc) = pending.take() {
                            self.save(&doc);
                        }
                        let _ = done.send(());
                    }
                    None => {
                        if let Some(doc) = pending.take() {
                            self.save(&doc);
                        }
                        break;
                    }
                },
                _ = timer, if deadline.is_some() => {
                    deadline = None;
                    if let Some(doc) = pending.take() {
                        self.save(&doc);
                    }
                }
            }
        }

        tracing::debug!("Autosave for post {} stopped", self.post_id);
    }

    fn save(&self, doc: &EditorDocument) {
        if let Some(drafts) = &self.drafts {
            if let Err(e) = drafts.write(&self.post_id, &doc.to_value()) {
                tracing::warn!("Local draft mirror failed for post {}: {}", self.post_id, e);
            }
        }

        let event = match self.store.save_draft(&self.post_id, doc) {
            Ok(receipt) => {
                tracing::info!("Autosaved post {}", self.post_id);
                AutosaveEvent::Saved {
                    saved_at: receipt.saved_at,
                }
            }
            Err(e) => {
                tracing::warn!("Autosave failed for post {}: {}", self.post_id, e);
                AutosaveEvent::Failed {
                    message: e.to_string(),
                }
            }
        };

        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
