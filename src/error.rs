use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Remote call that a [`NetworkError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchNotes,
    CreateNote,
    UpdateNote,
    DeleteNote,
    Subscribe,
    Health,
}

impl Operation {
    pub fn message(&self) -> &'static str {
        match self {
            Operation::FetchNotes => "Failed to fetch notes",
            Operation::CreateNote => "Failed to create note",
            Operation::UpdateNote => "Failed to update note",
            Operation::DeleteNote => "Failed to delete note",
            Operation::Subscribe => "Failed to subscribe",
            Operation::Health => "Failed to reach backend",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Non-success status or transport failure talking to the notes backend.
///
/// Displays as the operation's message only; the status and underlying
/// transport error are available through [`NetworkError::status`] and
/// [`std::error::Error::source`].
#[derive(Debug, Error)]
#[error("{operation}")]
pub struct NetworkError {
    operation: Operation,
    status: Option<StatusCode>,
    #[source]
    source: Option<reqwest::Error>,
}

impl NetworkError {
    pub fn status(operation: Operation, status: StatusCode) -> Self {
        Self {
            operation,
            status: Some(status),
            source: None,
        }
    }

    pub fn transport(operation: Operation, source: reqwest::Error) -> Self {
        Self {
            operation,
            status: source.status(),
            source: Some(source),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn http_status(&self) -> Option<StatusCode> {
        self.status
    }
}

pub type Result<T> = std::result::Result<T, NetworkError>;
