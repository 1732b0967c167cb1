//! Client-side note state.
//!
//! The local list is never patched: every successful mutation is followed by
//! one full `GET /notes`, and the snapshot it returns replaces the old one
//! wholesale. Readers hold an `Arc` to the snapshot they were given.

use std::sync::Arc;

use crate::api::NotesApi;
use crate::error::Result;
use crate::structs::{Note, NoteDraft, NoteId, NoteVector};

/// Title/content inputs of the new-note form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteForm {
    pub title: String,
    pub content: String,
}

impl NoteForm {
    fn clear(&mut self) {
        self.title.clear();
        self.content.clear();
    }
}

pub struct NoteStore<A> {
    api: A,
    notes: Arc<NoteVector>,
    form: NoteForm,
}

impl<A: NotesApi> NoteStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            notes: Arc::new(NoteVector::new()),
            form: NoteForm::default(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Last list received from the server.
    pub fn notes(&self) -> Arc<NoteVector> {
        Arc::clone(&self.notes)
    }

    pub fn form(&self) -> &NoteForm {
        &self.form
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.form.title = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.form.content = content.into();
    }

    /// Fetch every note and replace the local list with the result.
    pub async fn list(&mut self) -> Result<Arc<NoteVector>> {
        let notes = self.api.get_notes().await?;
        log::debug!("[Notes] synced {} notes", notes.len());
        self.notes = Arc::new(notes);
        Ok(self.notes())
    }

    /// Create a note, then resync.
    ///
    /// Returns `Ok(None)` without touching the network when either field is
    /// empty, and also when the server accepted the note but its answer did
    /// not decode. Any accepted note clears the form and triggers the resync.
    /// A failed resync is logged and leaves the previous list in place; the
    /// note itself was still created.
    pub async fn create(&mut self, title: &str, content: &str) -> Result<Option<Note>> {
        if title.is_empty() || content.is_empty() {
            return Ok(None);
        }

        let note = self.api.create_note(&NoteDraft::new(title, content)).await?;
        match &note {
            Some(note) => log::info!("[Notes] created note {}", note.id),
            None => log::info!("[Notes] created note"),
        }
        self.form.clear();
        self.refresh().await;
        Ok(note)
    }

    /// `PUT /notes/:id`, then resync. Not reachable from the form flow.
    pub async fn update(&mut self, id: NoteId, title: &str, content: &str) -> Result<Option<Note>> {
        let note = self.api.update_note(id, &NoteDraft::new(title, content)).await?;
        log::info!("[Notes] updated note {}", id);
        self.refresh().await;
        Ok(note)
    }

    pub async fn delete(&mut self, id: NoteId) -> Result<()> {
        self.api.delete_note(id).await?;
        log::info!("[Notes] deleted note {}", id);
        self.refresh().await;
        Ok(())
    }

    // Handlers below are what the UI calls: failures end in the log.

    pub async fn load(&mut self) {
        if let Err(e) = self.list().await {
            log::error!("[Notes] {}: {:?}", e, e);
        }
    }

    /// Create a note from the current form contents.
    pub async fn submit(&mut self) {
        let NoteForm { title, content } = self.form.clone();
        if let Err(e) = self.create(&title, &content).await {
            log::error!("[Notes] {}: {:?}", e, e);
        }
    }

    pub async fn remove(&mut self, id: NoteId) {
        if let Err(e) = self.delete(id).await {
            log::error!("[Notes] {}: {:?}", e, e);
        }
    }

    async fn refresh(&mut self) {
        self.load().await;
    }
}
