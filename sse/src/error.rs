//! Error types for the change stream adapter.
//!
//! Follows the same pattern as the rest of the workspace: a root Error struct
//! holding an error kind and an optional source for error chaining.

use std::error::Error as StdError;
use std::fmt;

pub type Result<T> = core::result::Result<T, Error>;

/// Top-level error type for the `sse` crate.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// The collection does not expose the configured range query.
    /// Only raised while building a `ChangeStream`, never per request.
    MissingQuery { model_name: String, query: String },
    /// A range query reported a failure. Answered with a 500.
    Query,
    /// The result batch could not be encoded as JSON.
    Serialization,
}

impl Error {
    pub fn missing_query(model_name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            source: None,
            error_kind: ErrorKind::MissingQuery {
                model_name: model_name.into(),
                query: query.into(),
            },
        }
    }

    /// Wraps whatever the underlying store failed with.
    pub fn query<E>(source: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self {
            source: Some(source.into()),
            error_kind: ErrorKind::Query,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::MissingQuery { model_name, query } => write!(
                f,
                "Seems like \"{model_name}\" doesn't implement the query method \"{query}\""
            ),
            ErrorKind::Query => match &self.source {
                Some(source) => write!(f, "Change query failed: {source}"),
                None => write!(f, "Change query failed"),
            },
            ErrorKind::Serialization => write!(f, "Failed to serialize change batch"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Serialization,
        }
    }
}
