use std::convert::Infallible;

use axum::response::{
    sse::{Event, KeepAlive, Sse},
    IntoResponse, Response,
};
use futures::stream::{self, Stream, StreamExt};
use mockview_core::{TurnEvent, TurnStream};
use serde::Serialize;
use tracing::error;

use crate::apis::interview::types::{ChunkData, DoneData};
use crate::ErrorResponse;

/// SSE framing of one streamed turn.
///
/// Emits `session_id` first when `announce` is set, then one `chunk` per
/// fragment, then exactly one `done` or `error`. When the client disconnects
/// axum drops this stream, which drops the turn and its backend stream.
pub fn turn_to_sse_stream(
    session_id: String,
    announce: bool,
    turn: TurnStream,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let head = announce.then(|| Event::default().event("session_id").data(session_id.clone()));
    let events = turn.map(move |event| format_event(&session_id, event));

    stream::iter(head).chain(events).map(Ok::<Event, Infallible>)
}

pub fn sse_response<S>(stream: S) -> Response
where
    S: Stream<Item = Result<Event, Infallible>> + Send + 'static,
{
    Sse::new(stream).keep_alive(KeepAlive::default()).into_response()
}

fn format_event(session_id: &str, event: TurnEvent) -> Event {
    match event {
        TurnEvent::Fragment(text) => json_event(session_id, "chunk", &ChunkData { text }),
        TurnEvent::Committed { text } => json_event(
            session_id,
            "done",
            &DoneData {
                session_id: session_id.to_string(),
                message: text,
            },
        ),
        TurnEvent::Failed(err) => json_event(session_id, "error", &ErrorResponse::from(err)),
    }
}

fn json_event<T: Serialize>(session_id: &str, name: &str, data: &T) -> Event {
    Event::default().event(name).json_data(data).unwrap_or_else(|e| {
        error!("[{}] Failed to serialize {} event: {}", session_id, name, e);
        Event::default().event(name).data("{}")
    })
}
