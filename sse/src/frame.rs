use crate::error::Result;
use serde_json::Value;
use std::fmt;

/// A single SSE record announcing that a collection changed.
///
/// Renders as `id`, `event` and `data` lines followed by the blank line that
/// terminates the record. `data` is always a single-line JSON array.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub id: i64,
    pub event: String,
    pub data: String,
}

impl Frame {
    pub fn new(id: i64, event: impl Into<String>, documents: &[Value]) -> Result<Self> {
        Ok(Self {
            id,
            event: event.into(),
            data: serde_json::to_string(documents)?,
        })
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id: {}\nevent: {}\ndata: {}\n\n",
            self.id, self.event, self.data
        )
    }
}
