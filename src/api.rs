//! Remote note store.
//!
//! [`NotesApi`] is the seam between the client state and the backend's REST
//! endpoints; [`HttpApi`] is the reqwest implementation used outside tests.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use crate::config::Config;
use crate::error::{NetworkError, Operation, Result};
use crate::structs::{Health, Note, NoteDraft, NoteId, NoteVector, PushSubscription};

#[async_trait]
pub trait NotesApi: Send + Sync {
    /// `GET /notes`
    async fn get_notes(&self) -> Result<NoteVector>;

    /// `POST /notes`. `None` when the server accepted the note but its
    /// answer did not decode.
    async fn create_note(&self, draft: &NoteDraft) -> Result<Option<Note>>;

    /// `PUT /notes/:id`, with the same `None` rule as `create_note`.
    async fn update_note(&self, id: NoteId, draft: &NoteDraft) -> Result<Option<Note>>;

    /// `DELETE /notes/:id`; the response body is ignored.
    async fn delete_note(&self, id: NoteId) -> Result<()>;

    /// `POST /subscriptions`; the response body is ignored.
    async fn post_subscription(&self, subscription: &PushSubscription) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.backend_base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, operation: Operation, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| NetworkError::transport(operation, e))?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            log::debug!("[Notes] {} answered {}", response.url(), status);
            Err(NetworkError::status(operation, status))
        }
    }

    /// Body of a success response as JSON, or `None` if it is not JSON.
    async fn json_body(&self, operation: Operation, response: Response) -> Result<Option<Value>> {
        let url = response.url().clone();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| NetworkError::transport(operation, e))?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::warn!("[Notes] {} sent a body that is not JSON: {}", url, e);
                Ok(None)
            }
        }
    }

    async fn note_body(&self, operation: Operation, response: Response) -> Result<Option<Note>> {
        let Some(body) = self.json_body(operation, response).await? else {
            return Ok(None);
        };
        match serde_json::from_value(body) {
            Ok(note) => Ok(Some(note)),
            Err(e) => {
                log::warn!("[Notes] note in response did not decode: {}", e);
                Ok(None)
            }
        }
    }

    /// `GET /health`. Not part of [`NotesApi`]; only used to report reachability.
    pub async fn health(&self) -> Result<Health> {
        let operation = Operation::Health;
        let response = self.send(operation, self.client.get(self.url("/health"))).await?;
        let body = self.json_body(operation, response).await?;
        Ok(body
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default())
    }
}

#[async_trait]
impl NotesApi for HttpApi {
    async fn get_notes(&self) -> Result<NoteVector> {
        let operation = Operation::FetchNotes;
        let response = self.send(operation, self.client.get(self.url("/notes"))).await?;
        let body = self.json_body(operation, response).await?;
        Ok(notes_from_body(body.unwrap_or(Value::Null)))
    }

    async fn create_note(&self, draft: &NoteDraft) -> Result<Option<Note>> {
        let operation = Operation::CreateNote;
        let request = self.client.post(self.url("/notes")).json(draft);
        let response = self.send(operation, request).await?;
        self.note_body(operation, response).await
    }

    async fn update_note(&self, id: NoteId, draft: &NoteDraft) -> Result<Option<Note>> {
        let operation = Operation::UpdateNote;
        let request = self.client.put(self.url(&format!("/notes/{}", id))).json(draft);
        let response = self.send(operation, request).await?;
        self.note_body(operation, response).await
    }

    async fn delete_note(&self, id: NoteId) -> Result<()> {
        let request = self.client.delete(self.url(&format!("/notes/{}", id)));
        self.send(Operation::DeleteNote, request).await?;
        Ok(())
    }

    async fn post_subscription(&self, subscription: &PushSubscription) -> Result<()> {
        let request = self.client.post(self.url("/subscriptions")).json(subscription);
        self.send(Operation::Subscribe, request).await?;
        Ok(())
    }
}

/// Anything other than a JSON array of notes reads as an empty list.
fn notes_from_body(body: Value) -> NoteVector {
    match body {
        Value::Array(items) => {
            let total = items.len();
            let notes: NoteVector = items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect();
            if notes.len() != total {
                log::warn!("[Notes] skipped {} malformed notes", total - notes.len());
            }
            notes
        }
        other => {
            log::warn!("[Notes] expected a list of notes, got {}", kind(&other));
            NoteVector::new()
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
