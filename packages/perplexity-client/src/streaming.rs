//! SSE streaming parser for Perplexity chat completions.
//!
//! Converts a raw `reqwest` byte stream into [`StreamEvent`] values.
//! Handles partial lines, `data:` framing, and the `[DONE]` terminator.

use bytes::Bytes;
use futures::stream::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::PerplexityError;

/// A single event from a streaming chat completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text delta. May be empty (e.g. the role-only first chunk).
    Delta(String),
    /// The upstream sent `[DONE]`.
    Done,
}

/// Raw streaming chunk from the API.
#[derive(Debug, serde::Deserialize)]
struct ChunkRaw {
    choices: Vec<ChoiceRaw>,
}

#[derive(Debug, serde::Deserialize)]
struct ChoiceRaw {
    delta: DeltaRaw,
}

#[derive(Debug, serde::Deserialize)]
struct DeltaRaw {
    #[serde(default)]
    content: Option<String>,
}

/// Stream adapter that converts raw SSE bytes into [`StreamEvent`] values.
///
/// The upstream frames look like `data: {json}\n\n` with a literal
/// `data: [DONE]\n\n` at the end. Bytes may arrive split at arbitrary
/// positions, so incomplete lines are buffered until the next read.
pub struct ChatCompletionStream {
    inner: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
    buffer: String,
}

impl ChatCompletionStream {
    pub(crate) fn new(
        byte_stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
    ) -> Self {
        Self {
            inner: Box::pin(byte_stream),
            buffer: String::new(),
        }
    }
}

impl Stream for ChatCompletionStream {
    type Item = Result<StreamEvent, PerplexityError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(event) = next_event(&mut this.buffer) {
                return Poll::Ready(Some(event));
            }

            // No complete frame buffered; pull more bytes
            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => match std::str::from_utf8(&bytes) {
                    Ok(text) => this.buffer.push_str(text),
                    Err(e) => {
                        return Poll::Ready(Some(Err(PerplexityError::Parse(format!(
                            "Invalid UTF-8 in stream: {}",
                            e
                        )))));
                    }
                },
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(PerplexityError::Network(e.to_string()))));
                }
                Poll::Ready(None) => {
                    // Upstream closed; a trailing unterminated line is dropped
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Extract the next complete SSE event from the buffer, if any.
///
/// Consumes lines up to and including the one that produced an event.
/// Blank lines (event separators) and non-`data:` fields (`event:`, `id:`,
/// `retry:`) are skipped.
fn next_event(buffer: &mut String) -> Option<Result<StreamEvent, PerplexityError>> {
    loop {
        let newline_pos = buffer.find('\n')?;
        let line = buffer[..newline_pos].trim().to_string();
        buffer.drain(..=newline_pos);

        let Some(data) = line.strip_prefix("data:") else {
            continue;
        };
        let data = data.trim();
        if data.is_empty() {
            continue;
        }

        if data == "[DONE]" {
            return Some(Ok(StreamEvent::Done));
        }

        match serde_json::from_str::<ChunkRaw>(data) {
            Ok(raw) => {
                let delta = raw
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.delta.content)
                    .unwrap_or_default();
                return Some(Ok(StreamEvent::Delta(delta)));
            }
            Err(e) => {
                return Some(Err(PerplexityError::Parse(format!(
                    "Failed to parse stream chunk: {} (data: {})",
                    e,
                    &data[..data.len().min(200)]
                ))));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn byte_stream(frames: &[&str]) -> impl Stream<Item = Result<Bytes, reqwest::Error>> {
        let frames: Vec<_> = frames
            .iter()
            .map(|f| Ok(Bytes::from(f.to_string())))
            .collect();
        futures::stream::iter(frames)
    }

    #[tokio::test]
    async fn test_single_delta_then_done() {
        let mut stream = ChatCompletionStream::new(byte_stream(&[
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\n",
            "data: [DONE]\n\n",
        ]));

        assert_eq!(
            stream.next().await.unwrap().unwrap(),
            StreamEvent::Delta("Hello".into())
        );
        assert_eq!(stream.next().await.unwrap().unwrap(), StreamEvent::Done);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_deltas_concatenate_in_order() {
        let mut stream = ChatCompletionStream::new(byte_stream(&[
            "data: {\"choices\":[{\"delta\":{\"content\":\"CVS \"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Pharmacy\"}}]}\n\n",
            "data: [DONE]\n\n",
        ]));

        let mut content = String::new();
        while let Some(event) = stream.next().await {
            match event.unwrap() {
                StreamEvent::Delta(d) => content.push_str(&d),
                StreamEvent::Done => break,
            }
        }
        assert_eq!(content, "CVS Pharmacy");
    }

    #[tokio::test]
    async fn test_frame_split_across_reads() {
        // A data line arriving in two byte chunks must be reassembled
        let mut stream = ChatCompletionStream::new(byte_stream(&[
            "data: {\"choices\":[{\"delta\":{\"cont",
            "ent\":\"split\"}}]}\n\ndata: [DONE]\n\n",
        ]));

        assert_eq!(
            stream.next().await.unwrap().unwrap(),
            StreamEvent::Delta("split".into())
        );
        assert_eq!(stream.next().await.unwrap().unwrap(), StreamEvent::Done);
    }

    #[tokio::test]
    async fn test_empty_delta() {
        let mut stream = ChatCompletionStream::new(byte_stream(&[
            "data: {\"choices\":[{\"delta\":{}}]}\n\n",
            "data: [DONE]\n\n",
        ]));

        assert_eq!(
            stream.next().await.unwrap().unwrap(),
            StreamEvent::Delta(String::new())
        );
    }

    #[tokio::test]
    async fn test_non_data_lines_skipped() {
        let mut stream = ChatCompletionStream::new(byte_stream(&[
            "event: message\nid: 3\ndata: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\n\n",
            "data: [DONE]\n\n",
        ]));

        assert_eq!(
            stream.next().await.unwrap().unwrap(),
            StreamEvent::Delta("x".into())
        );
    }

    #[tokio::test]
    async fn test_malformed_chunk_is_parse_error() {
        let mut stream =
            ChatCompletionStream::new(byte_stream(&["data: {not json}\n\n", "data: [DONE]\n\n"]));

        assert!(matches!(
            stream.next().await.unwrap(),
            Err(PerplexityError::Parse(_))
        ));
    }
}
