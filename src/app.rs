use std::sync::Arc;

use crate::api::NotesApi;
use crate::push::{PushManager, PushPlatform, SubscriptionState};
use crate::store::NoteStore;
use crate::structs::{NoteId, NoteVector};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Initial load: fetch notes, then look for an existing subscription.
    Load,

    NewTitle(String),
    NewContent(String),

    Submit,
    Delete(NoteId),
    EnableNotifications,
}

/// Note list and push subscription driven by UI messages, one at a time.
pub struct App<A, P> {
    store: NoteStore<A>,
    push: PushManager<P>,
}

impl<A: NotesApi, P: PushPlatform> App<A, P> {
    pub fn new(store: NoteStore<A>, push: PushManager<P>) -> Self {
        Self { store, push }
    }

    /// Never fails; errors are logged by the component that hit them.
    pub async fn update(&mut self, msg: Msg) {
        match msg {
            Msg::Load => {
                self.store.load().await;
                self.push.check_existing().await;
            }
            Msg::NewTitle(value) => self.store.set_title(value),
            Msg::NewContent(value) => self.store.set_content(value),
            Msg::Submit => self.store.submit().await,
            Msg::Delete(id) => self.store.remove(id).await,
            Msg::EnableNotifications => {
                self.push.subscribe(self.store.api()).await;
            }
        }
    }

    pub fn notes(&self) -> Arc<NoteVector> {
        self.store.notes()
    }

    pub fn store(&self) -> &NoteStore<A> {
        &self.store
    }

    pub fn subscription_state(&self) -> SubscriptionState {
        self.push.state()
    }
}
