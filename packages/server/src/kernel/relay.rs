//! Streaming search relay.
//!
//! Forwards an upstream chat-completion token stream to the client as
//! typed messages, accumulating the deltas and injecting canned progress
//! notices along the way. The progress notices are purely cosmetic — they
//! are gated on wall-clock time, not on any real measure of completion —
//! and each phrase fires at most once per request.
//!
//! The relay performs no extraction: when the upstream closes it forwards
//! the full accumulated text once as a `complete` message, and the client
//! does its own parsing.

use std::time::Duration;

use finder_core::SearchQuery;
use futures::{Stream, StreamExt};
use perplexity_client::{PerplexityError, StreamEvent};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Canned progress phrases, emitted in order, each at most once.
pub const STATUS_MESSAGES: [&str; 5] = [
    "Locating pharmacies...",
    "Checking distribution points...",
    "Finding community resources...",
    "Verifying availability...",
    "Compiling results...",
];

/// Minimum wall-clock gap between injected progress notices.
const STATUS_INTERVAL: Duration = Duration::from_secs(2);

/// One frame of the client-facing event stream.
///
/// Serializes to the wire shape `{"type": "...", ...}` carried in each
/// SSE `data:` line.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamMessage {
    Status { message: String },
    Error { message: String },
    Complete { content: String, params: SearchQuery },
}

impl StreamMessage {
    pub fn status(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Drive an upstream token stream to completion, forwarding progress and
/// the final accumulated content into `tx`.
///
/// A mid-stream upstream error becomes a single generic `error` message
/// and ends the relay without a `complete` frame. A closed receiver
/// (client disconnected) just stops the relay; there is nothing to clean
/// up beyond dropping the upstream stream.
pub async fn run_relay<S>(mut chunks: S, params: SearchQuery, tx: &mpsc::Sender<StreamMessage>)
where
    S: Stream<Item = Result<StreamEvent, PerplexityError>> + Unpin,
{
    let mut content = String::new();
    let mut last_status = Instant::now();
    let mut next_status = 0;

    while let Some(event) = chunks.next().await {
        match event {
            Ok(StreamEvent::Delta(delta)) => {
                content.push_str(&delta);

                if last_status.elapsed() > STATUS_INTERVAL && next_status < STATUS_MESSAGES.len() {
                    let message = StreamMessage::status(STATUS_MESSAGES[next_status]);
                    if tx.send(message).await.is_err() {
                        return;
                    }
                    next_status += 1;
                    last_status = Instant::now();
                }
            }
            Ok(StreamEvent::Done) => break,
            Err(e) => {
                warn!(error = %e, "upstream stream failed mid-relay");
                let _ = tx.send(StreamMessage::error("An error occurred")).await;
                return;
            }
        }
    }

    if tx
        .send(StreamMessage::status("Processing results..."))
        .await
        .is_err()
    {
        return;
    }

    debug!(chars = content.len(), "stream complete");
    let _ = tx
        .send(StreamMessage::Complete { content, params })
        .await;
}
