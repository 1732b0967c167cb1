//! In-memory collaborators for unit tests.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Result as AnyResult};
use async_trait::async_trait;
use reqwest::StatusCode;

use crate::api::NotesApi;
use crate::error::{NetworkError, Operation, Result};
use crate::push::{PlatformSubscription, PushPlatform, SubscribeOptions, SubscriptionKeys};
use crate::structs::{Note, NoteDraft, NoteId, NoteVector, PushSubscription};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetNotes,
    CreateNote(NoteDraft),
    UpdateNote(NoteId, NoteDraft),
    DeleteNote(NoteId),
    PostSubscription(PushSubscription),
}

#[derive(Debug, Default)]
struct Backend {
    notes: NoteVector,
    next_id: NoteId,
    subscriptions: Vec<PushSubscription>,
    calls: Vec<Call>,
    failing: HashSet<Operation>,
    bodiless: bool,
}

/// Behaves like the notes backend: assigns ids, answers 404 for unknown ids.
#[derive(Debug, Clone, Default)]
pub struct MemoryApi {
    inner: Arc<Mutex<Backend>>,
}

impl MemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notes(notes: NoteVector) -> Self {
        let api = Self::new();
        {
            let mut backend = api.inner.lock().unwrap();
            backend.next_id = notes.iter().map(|note| note.id).max().unwrap_or(0);
            backend.notes = notes;
        }
        api
    }

    pub fn fail(&self, operation: Operation) {
        self.inner.lock().unwrap().failing.insert(operation);
    }

    pub fn recover(&self, operation: Operation) {
        self.inner.lock().unwrap().failing.remove(&operation);
    }

    /// Accept mutations but answer without a decodable note.
    pub fn answer_without_body(&self) {
        self.inner.lock().unwrap().bodiless = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn server_notes(&self) -> NoteVector {
        self.inner.lock().unwrap().notes.clone()
    }

    pub fn subscriptions(&self) -> Vec<PushSubscription> {
        self.inner.lock().unwrap().subscriptions.clone()
    }

    fn record(&self, call: Call, operation: Operation) -> Result<MutexGuard<'_, Backend>> {
        let mut backend = self.inner.lock().unwrap();
        backend.calls.push(call);
        if backend.failing.contains(&operation) {
            return Err(NetworkError::status(operation, StatusCode::INTERNAL_SERVER_ERROR));
        }
        Ok(backend)
    }
}

#[async_trait]
impl NotesApi for MemoryApi {
    async fn get_notes(&self) -> Result<NoteVector> {
        let backend = self.record(Call::GetNotes, Operation::FetchNotes)?;
        Ok(backend.notes.clone())
    }

    async fn create_note(&self, draft: &NoteDraft) -> Result<Option<Note>> {
        let mut backend = self.record(Call::CreateNote(draft.clone()), Operation::CreateNote)?;
        backend.next_id += 1;
        let note = Note {
            id: backend.next_id,
            title: draft.title.clone(),
            content: draft.content.clone(),
            created_at: Some(chrono::Utc::now()),
        };
        backend.notes.push(note.clone());
        Ok((!backend.bodiless).then_some(note))
    }

    async fn update_note(&self, id: NoteId, draft: &NoteDraft) -> Result<Option<Note>> {
        let operation = Operation::UpdateNote;
        let mut backend = self.record(Call::UpdateNote(id, draft.clone()), operation)?;
        let note = backend
            .notes
            .iter_mut()
            .find(|note| note.id == id)
            .ok_or_else(|| NetworkError::status(operation, StatusCode::NOT_FOUND))?;
        note.title = draft.title.clone();
        note.content = draft.content.clone();
        let note = note.clone();
        Ok((!backend.bodiless).then_some(note))
    }

    async fn delete_note(&self, id: NoteId) -> Result<()> {
        let operation = Operation::DeleteNote;
        let mut backend = self.record(Call::DeleteNote(id), operation)?;
        let before = backend.notes.len();
        backend.notes.retain(|note| note.id != id);
        if backend.notes.len() == before {
            return Err(NetworkError::status(operation, StatusCode::NOT_FOUND));
        }
        Ok(())
    }

    async fn post_subscription(&self, subscription: &PushSubscription) -> Result<()> {
        let mut backend =
            self.record(Call::PostSubscription(subscription.clone()), Operation::Subscribe)?;
        backend.subscriptions.push(subscription.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    Ready,
    GetSubscription,
    Register { script: String, scope: String },
    Subscribe(SubscribeOptions),
}

#[derive(Debug, Default)]
struct Platform {
    supports_workers: bool,
    existing: Option<PlatformSubscription>,
    reject_register: bool,
    reject_subscribe: bool,
    issued: VecDeque<PlatformSubscription>,
    calls: Vec<PlatformCall>,
}

/// Scripted browser push facility.
#[derive(Debug, Clone, Default)]
pub struct FakePlatform {
    inner: Arc<Mutex<Platform>>,
}

impl FakePlatform {
    pub fn supported() -> Self {
        let platform = Self::default();
        platform.inner.lock().unwrap().supports_workers = true;
        platform
    }

    pub fn unsupported() -> Self {
        Self::default()
    }

    pub fn with_existing(self, subscription: PlatformSubscription) -> Self {
        self.inner.lock().unwrap().existing = Some(subscription);
        self
    }

    pub fn issuing(self, subscription: PlatformSubscription) -> Self {
        self.inner.lock().unwrap().issued.push_back(subscription);
        self
    }

    pub fn rejecting_register(self) -> Self {
        self.inner.lock().unwrap().reject_register = true;
        self
    }

    pub fn rejecting_subscribe(self) -> Self {
        self.inner.lock().unwrap().reject_subscribe = true;
        self
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.inner.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl PushPlatform for FakePlatform {
    fn supports_workers(&self) -> bool {
        self.inner.lock().unwrap().supports_workers
    }

    async fn ready(&self) -> AnyResult<()> {
        self.inner.lock().unwrap().calls.push(PlatformCall::Ready);
        Ok(())
    }

    async fn existing_subscription(&self) -> AnyResult<Option<PlatformSubscription>> {
        let mut platform = self.inner.lock().unwrap();
        platform.calls.push(PlatformCall::GetSubscription);
        Ok(platform.existing.clone())
    }

    async fn register_worker(&self, script: &str, scope: &str) -> AnyResult<()> {
        let mut platform = self.inner.lock().unwrap();
        platform.calls.push(PlatformCall::Register {
            script: script.to_string(),
            scope: scope.to_string(),
        });
        if platform.reject_register {
            return Err(anyhow!("worker script failed to install"));
        }
        Ok(())
    }

    async fn subscribe(&self, options: &SubscribeOptions) -> AnyResult<PlatformSubscription> {
        let mut platform = self.inner.lock().unwrap();
        platform.calls.push(PlatformCall::Subscribe(options.clone()));
        if platform.reject_subscribe {
            return Err(anyhow!("permission denied"));
        }
        let subscription = platform
            .issued
            .pop_front()
            .ok_or_else(|| anyhow!("push service unavailable"))?;
        platform.existing = Some(subscription.clone());
        Ok(subscription)
    }
}

pub fn platform_subscription(endpoint: &str) -> PlatformSubscription {
    PlatformSubscription {
        endpoint: endpoint.to_string(),
        expiration_time: None,
        keys: SubscriptionKeys {
            p256dh: concat!(
                "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQtUbVlUls0VJXg7A8u-",
                "Ts1XbjhazAkj7I99e8QcYP7DkM"
            )
            .to_string(),
            auth: "tBHItJI5svbpez7KI4CCXg".to_string(),
        },
    }
}
