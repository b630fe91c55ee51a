//! Content-stream wire events and SSE parsing
//!
//! The content-generation service pushes slide updates over a
//! `text/event-stream` response. Events are separated by blank lines;
//! `data:` payloads are either JSON events (`SLIDE_CONTENT_UPDATE`,
//! `SLIDE_CONTENT_ERROR`) or free-text progress lines.

use bytes::Bytes;
use futures::Stream;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::{CourseforgeError, Result};

/// A slide content update from the generation stream
#[derive(Debug, Clone, Deserialize)]
pub struct SlideContentUpdate {
    /// Matching key, `"{chapter}/{title}"`
    pub path: String,
    /// Declared content type for the slide
    #[serde(rename = "slideType")]
    pub slide_type: String,
    /// Event-level generation status (`"generating"`, `"completed"`, ...)
    #[serde(default)]
    pub status: Option<String>,
    /// Type-specific payload
    #[serde(rename = "contentData", default)]
    pub content_data: Value,
}

/// A per-slide generation failure
#[derive(Debug, Clone, Deserialize)]
pub struct SlideContentError {
    /// Matching key, `"{chapter}/{title}"`
    pub path: String,
    /// Declared content type, when the service knew it
    #[serde(rename = "slideType", default)]
    pub slide_type: Option<String>,
    /// Human-readable failure description
    #[serde(rename = "errorMessage", default)]
    pub error_message: Option<String>,
}

/// Internally tagged wire shape of JSON events
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum WireEvent {
    #[serde(rename = "SLIDE_CONTENT_UPDATE")]
    Update(SlideContentUpdate),
    #[serde(rename = "SLIDE_CONTENT_ERROR")]
    Error(SlideContentError),
}

/// One event from the content-generation stream
#[derive(Debug, Clone)]
pub enum GenerationEvent {
    /// A slide received (partial) content
    Update(SlideContentUpdate),
    /// A slide failed to generate
    Error(SlideContentError),
    /// Free-text progress status for the user
    Progress(String),
}

impl GenerationEvent {
    /// Parse one SSE `data:` payload into an event
    ///
    /// Payloads that do not start with `{` are treated as free-text
    /// progress lines rather than errors.
    ///
    /// # Errors
    ///
    /// Returns [`CourseforgeError::Stream`] for JSON payloads that are not
    /// one of the known event shapes.
    pub fn parse(data: &str) -> Result<Self> {
        let trimmed = data.trim();
        if !trimmed.starts_with('{') {
            return Ok(Self::Progress(trimmed.to_string()));
        }
        let wire: WireEvent = serde_json::from_str(trimmed)
            .map_err(|e| CourseforgeError::Stream(format!("unrecognized event: {}", e)))?;
        Ok(match wire {
            WireEvent::Update(update) => Self::Update(update),
            WireEvent::Error(error) => Self::Error(error),
        })
    }
}

/// Split a matching path into its chapter and title halves
///
/// Paths without a separator carry only a title; the matcher then skips
/// the chapter comparison.
pub fn split_path(path: &str) -> (Option<&str>, &str) {
    match path.split_once('/') {
        Some((chapter, title)) => (Some(chapter), title),
        None => (None, path),
    }
}

/// Parse an SSE byte stream and forward complete `data:` payloads
///
/// Intended to run inside a `tokio::spawn`; consumes the stream until it
/// ends or a chunk read fails. Events are separated by blank lines; `data:`
/// values on consecutive lines are joined with newlines. Comment lines
/// (starting with `:`) and empty payloads are discarded.
pub async fn pump_sse_stream(
    byte_stream: impl Stream<Item = reqwest::Result<Bytes>>,
    data_tx: mpsc::UnboundedSender<String>,
) {
    use futures::StreamExt;

    let mut buffer = String::new();

    tokio::pin!(byte_stream);

    while let Some(chunk_result) = byte_stream.next().await {
        let chunk = match chunk_result {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("Content stream read failed: {}", e);
                break;
            }
        };

        buffer.push_str(&String::from_utf8_lossy(&chunk));

        // SSE events are separated by blank lines.
        while let Some(pos) = buffer.find("\n\n") {
            let event_block = buffer[..pos].to_string();
            buffer = buffer[pos + 2..].to_string();
            forward_event_block(&event_block, &data_tx);
        }
    }

    // Flush a trailing partial event.
    if !buffer.is_empty() {
        forward_event_block(&buffer, &data_tx);
    }
}

/// Extract the joined `data:` value from one SSE event block and send it
fn forward_event_block(event_block: &str, data_tx: &mpsc::UnboundedSender<String>) {
    let mut data_lines: Vec<&str> = Vec::new();

    for line in event_block.lines() {
        if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.trim());
        }
        // `event:`/`id:` fields and `:` comments are not used by this
        // stream and are ignored.
    }

    let data = data_lines.join("\n");
    if data.is_empty() {
        return;
    }

    let _ = data_tx.send(data);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_update_event() {
        let json = r#"{
            "type": "SLIDE_CONTENT_UPDATE",
            "path": "Ch1/Intro",
            "slideType": "DOCUMENT",
            "status": "completed",
            "contentData": {"content": "# Hello"}
        }"#;
        match GenerationEvent::parse(json).unwrap() {
            GenerationEvent::Update(update) => {
                assert_eq!(update.path, "Ch1/Intro");
                assert_eq!(update.slide_type, "DOCUMENT");
                assert_eq!(update.status.as_deref(), Some("completed"));
                assert_eq!(update.content_data["content"], "# Hello");
            }
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_event() {
        let json = r#"{
            "type": "SLIDE_CONTENT_ERROR",
            "path": "Ch1/Intro",
            "slideType": "DOCUMENT",
            "errorMessage": "model overloaded"
        }"#;
        match GenerationEvent::parse(json).unwrap() {
            GenerationEvent::Error(error) => {
                assert_eq!(error.path, "Ch1/Intro");
                assert_eq!(error.error_message.as_deref(), Some("model overloaded"));
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_progress_text() {
        match GenerationEvent::parse("Generating chapter 2 of 5").unwrap() {
            GenerationEvent::Progress(text) => assert_eq!(text, "Generating chapter 2 of 5"),
            other => panic!("expected progress, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_unknown_event_type_fails() {
        let json = r#"{"type":"SOMETHING_ELSE","path":"x"}"#;
        assert!(GenerationEvent::parse(json).is_err());
    }

    #[test]
    fn test_parse_update_defaults() {
        let json = r#"{"type":"SLIDE_CONTENT_UPDATE","path":"Ch1/A","slideType":"VIDEO"}"#;
        match GenerationEvent::parse(json).unwrap() {
            GenerationEvent::Update(update) => {
                assert!(update.status.is_none());
                assert!(update.content_data.is_null());
            }
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("Ch1/Intro"), (Some("Ch1"), "Intro"));
        assert_eq!(split_path("Intro"), (None, "Intro"));
        // Only the first separator splits; titles keep their slashes.
        assert_eq!(split_path("Ch1/A/B"), (Some("Ch1"), "A/B"));
    }

    #[tokio::test]
    async fn test_pump_sse_single_event() {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let body = b"data: {\"type\":\"x\"}\n\n".to_vec();
        let chunk: reqwest::Result<Bytes> = Ok(Bytes::from(body));
        let byte_stream = futures::stream::iter(vec![chunk]);

        pump_sse_stream(byte_stream, tx).await;

        assert_eq!(rx.try_recv().unwrap(), r#"{"type":"x"}"#);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_pump_sse_event_split_across_chunks() {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let chunks: Vec<reqwest::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"data: hel")),
            Ok(Bytes::from_static(b"lo\n\ndata: world\n\n")),
        ];
        let byte_stream = futures::stream::iter(chunks);

        pump_sse_stream(byte_stream, tx).await;

        assert_eq!(rx.try_recv().unwrap(), "hello");
        assert_eq!(rx.try_recv().unwrap(), "world");
    }

    #[tokio::test]
    async fn test_pump_sse_multiline_data_joined() {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let body = b"data: line one\ndata: line two\n\n".to_vec();
        let chunk: reqwest::Result<Bytes> = Ok(Bytes::from(body));
        let byte_stream = futures::stream::iter(vec![chunk]);

        pump_sse_stream(byte_stream, tx).await;

        assert_eq!(rx.try_recv().unwrap(), "line one\nline two");
    }

    #[tokio::test]
    async fn test_pump_sse_trailing_event_without_blank_line() {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let body = b"data: tail".to_vec();
        let chunk: reqwest::Result<Bytes> = Ok(Bytes::from(body));
        let byte_stream = futures::stream::iter(vec![chunk]);

        pump_sse_stream(byte_stream, tx).await;

        assert_eq!(rx.try_recv().unwrap(), "tail");
    }

    #[tokio::test]
    async fn test_pump_sse_ignores_comments_and_empty() {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let body = b": keepalive\n\ndata: real\n\n".to_vec();
        let chunk: reqwest::Result<Bytes> = Ok(Bytes::from(body));
        let byte_stream = futures::stream::iter(vec![chunk]);

        pump_sse_stream(byte_stream, tx).await;

        assert_eq!(rx.try_recv().unwrap(), "real");
        assert!(rx.try_recv().is_err());
    }
}
