//! Reference host for the `sse` change stream: an in-memory document
//! journal served over HTTP, where `GET /documents` doubles as a change
//! poll for clients that accept `text/event-stream`.

use journal::Journal;
use sse::ChangeStream;

mod controller;
pub mod error;
pub mod journal;
pub mod router;

pub use error::{Error, Result};

// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub journal: Journal,
    pub change_stream: ChangeStream,
}

impl AppState {
    pub fn new(journal: Journal, change_stream: ChangeStream) -> Self {
        Self {
            journal,
            change_stream,
        }
    }
}
