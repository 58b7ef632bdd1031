//! Server-Sent Events (SSE) change polling for queryable collections.
//!
//! This crate turns any collection that can answer "what changed between two
//! points in time" into an SSE endpoint, as an axum middleware placed in front
//! of the collection's regular route.
//!
//! # Architecture
//!
//! - **Request/response polling**: Each request is answered with at most one
//!   event and the response is closed. Clients reconnect with the
//!   `Last-Event-ID` they were given to fetch the next batch.
//! - **Content negotiation**: Only requests whose `Accept` header contains
//!   `text/event-stream` are handled; everything else passes through to the
//!   wrapped route untouched.
//! - **Resolved once**: The range query a stream uses is looked up on the
//!   collection when the stream is built. A collection missing it is a startup
//!   error, not a request-time one.
//!
//! # Message Flow
//!
//! 1. Client sends `GET` with `Accept: text/event-stream` and optionally
//!    `Last-Event-ID: <epoch ms>` (defaults to 0)
//! 2. The window `(Last-Event-ID, now]` is handed to the collection's range query
//! 3. Nothing changed: `200` with event stream headers and an empty body
//! 4. Something changed: `200` plus a single record whose `id` is `now`, whose
//!    `event` is the collection name and whose `data` is the JSON array of
//!    changed documents
//! 5. The query failed: `500` with an empty body
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::{middleware::from_fn_with_state, routing::get, Router};
//! use sse::{serve_changes, ChangeStream, Config};
//!
//! let stream = ChangeStream::new(Some(collection), Config::default())?;
//!
//! let app = Router::new()
//!     .route("/documents", get(index))
//!     .route_layer(from_fn_with_state(stream, serve_changes));
//! ```
//!
//! # Modules
//!
//! - `changeable`: Traits a collection implements to be streamed
//! - `config`: Stream options (which range query to use)
//! - `frame`: The SSE record written for a batch of changes
//! - `stream`: The middleware itself

pub mod changeable;
pub mod config;
pub mod error;
pub mod frame;
pub mod stream;

pub use changeable::{Changeable, RangeQuery, CREATED_BETWEEN, UPDATED_BETWEEN};
pub use config::Config;
pub use error::{Error, ErrorKind};
pub use frame::Frame;
pub use stream::{serve_changes, ChangeStream};
