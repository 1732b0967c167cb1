//! Client for the EchoVault notes service.
//!
//! [`store::NoteStore`] keeps the session's copy of the note list in step with
//! the backend; [`push::PushManager`] registers this client for push
//! notifications. [`app::App`] drives both from UI messages.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod push;
pub mod store;
pub mod structs;

#[cfg(test)]
mod fakes;

pub use api::{HttpApi, NotesApi};
pub use app::{App, Msg};
pub use config::Config;
pub use error::{NetworkError, Operation};
pub use push::{PushManager, PushPlatform, SubscriptionState};
pub use store::NoteStore;
pub use structs::{Note, NoteDraft, NoteId, NoteVector, PushSubscription};
