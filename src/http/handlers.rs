use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::payload::{Materialized, PayloadError};
use crate::recovery::JournalRecord;

use super::server::AppState;

const QUEUE_NOT_EXISTS: &str = "Queue not exists!";
const QUEUE_EMPTY: &str = "Queue is empty!";
const MESSAGE_EMPTY: &str = "Message is empty!";
const INTERNAL_ERROR: &str = "Internal server error!";
const OK: &str = "OK.";

/// GET /list - all queue names, one per line.
pub async fn list(State(state): State<AppState>) -> String {
    let mut out = String::new();
    for name in state.manager.list_queues() {
        out.push_str(&name);
        out.push('\n');
    }
    out
}

/// GET /count/:queue - current length of a queue.
pub async fn count(State(state): State<AppState>, Path(queue): Path<String>) -> Response {
    match state.manager.get_queue(&queue) {
        Some(queue) => queue.size().to_string().into_response(),
        None => (StatusCode::NOT_FOUND, QUEUE_NOT_EXISTS).into_response(),
    }
}

/// GET /skip/:queue/:number - rotate the head of a queue to its tail
/// `number` times. Not journaled: the queue contents do not change.
pub async fn skip(
    State(state): State<AppState>,
    Path((queue, number)): Path<(String, String)>,
) -> Response {
    let Some(queue) = state.manager.get_queue(&queue) else {
        return (StatusCode::NOT_FOUND, QUEUE_NOT_EXISTS).into_response();
    };
    let Ok(n) = number.parse::<i64>() else {
        return (StatusCode::BAD_REQUEST, "Number must be a integer!").into_response();
    };
    queue.rotate(n.max(0) as usize);
    OK.into_response()
}

/// GET /set/:queue/*message - enqueue a message, creating the queue if
/// needed. Indirect payloads are validated before they are accepted.
pub async fn set(
    State(state): State<AppState>,
    Path((queue_name, message)): Path<(String, String)>,
) -> Response {
    // The queue exists from this point on even when the message is rejected.
    let queue = state.manager.get_or_create_queue(&queue_name);

    if let Err(e) = state.payloads.validate(&message).await {
        return payload_error_response(e);
    }

    queue.enqueue(message.clone());
    match state.journal.record(JournalRecord::set(&queue_name, &message)) {
        Ok(()) => OK.into_response(),
        Err(e) => {
            tracing::error!(queue = %queue_name, "failed to journal SET: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR).into_response()
        }
    }
}

/// GET /set/:queue and /set/:queue/ - the message segment is missing. The
/// wildcard route never matches an empty message, so these shapes get their
/// own route. The queue is still created first, as a non-empty set does.
pub async fn set_empty(State(state): State<AppState>, Path(queue_name): Path<String>) -> Response {
    state.manager.get_or_create_queue(&queue_name);
    (StatusCode::BAD_REQUEST, MESSAGE_EMPTY).into_response()
}

/// GET /get/:queue - pop the head of a queue and return its raw body.
pub async fn get(State(state): State<AppState>, Path(queue_name): Path<String>) -> Response {
    match state.manager.dequeue(&queue_name) {
        None => (StatusCode::NOT_FOUND, QUEUE_NOT_EXISTS).into_response(),
        Some(None) => (StatusCode::GONE, QUEUE_EMPTY).into_response(),
        Some(Some(message)) => {
            match state
                .journal
                .record(JournalRecord::get(&queue_name, &message.body))
            {
                Ok(()) => message.body.into_response(),
                Err(e) => {
                    tracing::error!(queue = %queue_name, "failed to journal GET: {}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR).into_response()
                }
            }
        }
    }
}

/// GET /fetch/:queue - pop the head of a queue and materialize it: `file:`
/// and `mysql:` payloads are resolved to their data, plain bodies returned
/// as text.
pub async fn fetch(State(state): State<AppState>, Path(queue_name): Path<String>) -> Response {
    match state.manager.dequeue(&queue_name) {
        None => (StatusCode::NOT_FOUND, QUEUE_NOT_EXISTS).into_response(),
        Some(None) => (StatusCode::GONE, QUEUE_EMPTY).into_response(),
        Some(Some(message)) => {
            if let Err(e) = state
                .journal
                .record(JournalRecord::get(&queue_name, &message.body))
            {
                tracing::error!(queue = %queue_name, "failed to journal GET: {}", e);
                return (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR).into_response();
            }
            materialize_response(&state, &message.body).await
        }
    }
}

/// GET /download/*message - materialize a message body without touching any
/// queue.
pub async fn download(State(state): State<AppState>, Path(message): Path<String>) -> Response {
    materialize_response(&state, &message).await
}

/// GET /download and /download/ - the message segment is missing.
pub async fn download_empty() -> Response {
    (StatusCode::BAD_REQUEST, MESSAGE_EMPTY).into_response()
}

/// GET /delete/:queue - drop a queue and everything buffered in it.
pub async fn delete(State(state): State<AppState>, Path(queue_name): Path<String>) -> Response {
    if !state.manager.delete_queue(&queue_name) {
        return (StatusCode::NOT_FOUND, QUEUE_NOT_EXISTS).into_response();
    }
    match state.journal.record(JournalRecord::del(&queue_name)) {
        Ok(()) => OK.into_response(),
        Err(e) => {
            tracing::error!(queue = %queue_name, "failed to journal DEL: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR).into_response()
        }
    }
}

async fn materialize_response(state: &AppState, body: &str) -> Response {
    match state.payloads.materialize(body).await {
        Ok(Materialized::Plain(text)) => text.into_response(),
        Ok(Materialized::Bytes { content_type, data }) => {
            let mut response = Response::new(Body::from(data));
            if let Ok(value) = HeaderValue::from_str(&content_type) {
                response.headers_mut().insert(header::CONTENT_TYPE, value);
            }
            // The raw body rides along so the client knows what it got.
            if let Ok(value) = HeaderValue::from_str(body) {
                response.headers_mut().insert("Message", value);
            }
            response
        }
        Err(e) => payload_error_response(e),
    }
}

fn payload_error_response(e: PayloadError) -> Response {
    match e {
        PayloadError::SourceMissing
        | PayloadError::BadRecordName
        | PayloadError::RecordMissing => (StatusCode::NOT_ACCEPTABLE, e.to_string()).into_response(),
        PayloadError::FileVanished => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
        PayloadError::MysqlDisabled | PayloadError::Sql(_) | PayloadError::Io(_) => {
            tracing::error!("payload resolution failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR).into_response()
        }
    }
}
