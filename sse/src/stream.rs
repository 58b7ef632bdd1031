use crate::changeable::{Changeable, RangeQuery};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::frame::Frame;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use log::*;
use std::sync::Arc;

const EVENT_STREAM: &str = "text/event-stream";
const LAST_EVENT_ID: &str = "last-event-id";

/// Answers `Accept: text/event-stream` requests with whatever changed in a
/// collection since the client's `Last-Event-ID`.
///
/// Every poll is a plain request/response: the response carries at most one
/// record and is then closed. The record's `id` is the upper bound of the
/// window that was queried, so a reconnecting client picks up where the
/// previous response ended.
///
/// Cloning is cheap; all clones share the same collection and config.
#[derive(Clone)]
pub struct ChangeStream {
    inner: Arc<Inner>,
}

struct Inner {
    source: Option<Source>,
    config: Config,
}

// The collection together with the range query resolved from it at build time.
struct Source {
    collection: Arc<dyn Changeable>,
    range_query: Arc<dyn RangeQuery>,
}

impl ChangeStream {
    /// Resolves `config.query` on the collection and fails right away if the
    /// collection does not provide it.
    ///
    /// Without a collection the stream still builds, but every event stream
    /// request it receives is answered with a 500.
    pub fn new(collection: Option<Arc<dyn Changeable>>, config: Config) -> Result<Self> {
        let source = match collection {
            Some(collection) => {
                let range_query = collection
                    .range_query(&config.query)
                    .ok_or_else(|| Error::missing_query(collection.model_name(), &config.query))?;

                info!(
                    "Serving changes of {} ({}) through {}",
                    collection.model_name(),
                    collection.collection_name(),
                    config.query
                );

                Some(Source {
                    collection,
                    range_query,
                })
            }
            None => {
                warn!("Change stream built without a collection, event stream requests will fail");
                None
            }
        };

        Ok(Self {
            inner: Arc::new(Inner { source, config }),
        })
    }

    /// Handles one request, deferring to `next` when the client did not ask
    /// for an event stream.
    pub async fn handle(&self, request: Request, next: Next) -> Response {
        if !accepts_event_stream(request.headers()) {
            debug!("Request does not accept {EVENT_STREAM}, passing it on");
            return next.run(request).await;
        }

        let start_at = last_event_id(request.headers());
        let end_at = Utc::now().timestamp_millis();

        match self.poll(start_at, end_at).await {
            Ok(Some(frame)) => event_stream_response(Body::from(frame.to_string())),
            Ok(None) => event_stream_response(Body::empty()),
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }

    async fn poll(&self, start_at: i64, end_at: i64) -> Result<Option<Frame>> {
        let Some(source) = &self.inner.source else {
            return Err(Error::query("no collection to query"));
        };

        debug!(
            "Querying {} {} from {start_at} to {end_at}",
            source.collection.collection_name(),
            self.inner.config.query
        );

        let documents = source.range_query.between(start_at, end_at).await?;
        if documents.is_empty() {
            return Ok(None);
        }

        let frame = Frame::new(end_at, source.collection.collection_name(), &documents)?;
        debug!(
            "Sending {} changed document(s) as event {}",
            documents.len(),
            frame.event
        );

        Ok(Some(frame))
    }
}

/// Middleware entry point, mount with `axum::middleware::from_fn_with_state`.
pub async fn serve_changes(
    State(stream): State<ChangeStream>,
    request: Request,
    next: Next,
) -> Response {
    stream.handle(request, next).await
}

fn event_stream_response(body: Body) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, EVENT_STREAM),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        body,
    )
        .into_response()
}

fn accepts_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.contains(EVENT_STREAM))
}

fn last_event_id(headers: &HeaderMap) -> i64 {
    headers
        .get(LAST_EVENT_ID)
        .and_then(|value| value.to_str().ok())
        .map_or(0, parse_event_id)
}

/// Reads the leading base-10 integer of `value`, ignoring any trailing junk.
/// Anything without digits reads as 0; values beyond `i64` saturate.
fn parse_event_id(value: &str) -> i64 {
    let value = value.trim();
    let (sign, unsigned) = match value.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", value.strip_prefix('+').unwrap_or(value)),
    };
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());

    let digits = &unsigned[..end];
    if digits.is_empty() {
        return 0;
    }

    format!("{sign}{digits}")
        .parse()
        .unwrap_or(if sign.is_empty() { i64::MAX } else { i64::MIN })
}
