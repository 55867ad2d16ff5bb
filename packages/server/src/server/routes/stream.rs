//! Streaming search endpoint.
//!
//! POST /api/search-stream with the same body as /api/search; the response
//! is `text/event-stream`. Every frame is `data: <JSON>\n\n` where the
//! JSON carries `type` of `status`, `error`, or `complete`. No extraction
//! happens here - the terminal `complete` frame hands the client the full
//! accumulated upstream text to parse itself.

use std::convert::Infallible;

use axum::{
    extract::Extension,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use finder_core::{prompts, SearchQuery};
use perplexity_client::{ChatRequest, Message};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::warn;

use crate::kernel::relay::{run_relay, StreamMessage};
use crate::server::app::AppState;

/// Token budget for the streaming completion.
const MAX_TOKENS: u32 = 2500;

/// Streaming search handler.
///
/// The whole search runs in a spawned task feeding a channel; the SSE body
/// is just that channel drained as `data:` frames. If the client goes
/// away, the receiver drops, sends start failing, and the task winds down
/// - dropping the upstream stream is the only cleanup there is.
pub async fn search_stream_handler(
    Extension(state): Extension<AppState>,
    Json(query): Json<SearchQuery>,
) -> Sse<impl futures::Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<StreamMessage>(32);

    tokio::spawn(stream_search(state, query, tx));

    let stream = ReceiverStream::new(rx)
        .filter_map(|message| Event::default().json_data(&message).ok().map(Ok));

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// The search task feeding one SSE connection.
async fn stream_search(state: AppState, query: SearchQuery, tx: mpsc::Sender<StreamMessage>) {
    let Some(client) = state.client else {
        let _ = tx.send(StreamMessage::error("API key not configured")).await;
        return;
    };

    if tx
        .send(StreamMessage::status("Initializing search..."))
        .await
        .is_err()
    {
        return;
    }

    let request = ChatRequest::new(&state.model)
        .message(Message::system(prompts::system_prompt(&query)))
        .message(Message::user(prompts::user_prompt(&query)))
        .temperature(0.1)
        .max_tokens(MAX_TOKENS);

    if tx
        .send(StreamMessage::status("Connecting to AI search..."))
        .await
        .is_err()
    {
        return;
    }

    match client.chat_completion_stream(request).await {
        Ok(chunks) => {
            let _ = tx
                .send(StreamMessage::status("Searching for naloxone providers..."))
                .await;
            run_relay(chunks, query, &tx).await;
        }
        Err(e) => {
            warn!(error = %e, "failed to open upstream stream");
            let _ = tx.send(StreamMessage::error("Search failed")).await;
        }
    }
}
