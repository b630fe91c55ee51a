//! Content-stream ingestion
//!
//! Consumes per-slide generation events from a [`ContentSource`], matches
//! each to its slide, merges typed payloads, and mirrors the collection
//! after every mutation. Processing is strictly sequential: each event is
//! applied synchronously before the next is read, so the mirror write is
//! the only critical section and needs no locking.

pub mod events;
pub mod matcher;
pub mod merge;
pub mod state;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::course::{CourseMetadata, Todo};
use crate::error::{CourseforgeError, Result};
use crate::outline::OutlineResponse;
use crate::store::SlideStore;

pub use events::{GenerationEvent, SlideContentError, SlideContentUpdate};
pub use state::{Applied, GenerationState};

/// Grace period after the stream ends before the run flags are forced
///
/// The upstream protocol does not guarantee a terminal event; end-of-stream
/// plus this delay closes the bookkeeping so callers never hang. When the
/// completion predicate is already satisfied the flags flip immediately
/// and this timer never runs.
pub const COMPLETION_FALLBACK: Duration = Duration::from_secs(2);

/// Request payload for the content-generation stream
#[derive(Debug, Clone, Serialize)]
pub struct ContentRequest {
    /// The outline tree, echoed back to the service
    pub course_tree: Value,
    /// The generation work items
    pub todos: Vec<Todo>,
    /// Course-level metadata
    #[serde(rename = "courseMetadata")]
    pub course_metadata: CourseMetadata,
}

impl ContentRequest {
    /// Build the content request from an outline response
    pub fn from_outline(outline: &OutlineResponse) -> Result<Self> {
        Ok(Self {
            course_tree: serde_json::to_value(&outline.tree)?,
            todos: outline.todos.clone(),
            course_metadata: outline.course_metadata.clone(),
        })
    }
}

/// Source of raw content-stream payloads
///
/// The seam between the ingestor and the transport: the HTTP
/// implementation opens the SSE response and pumps `data:` payloads into a
/// channel; tests substitute a hand-fed channel.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Open the stream and return the receiver of raw `data:` payloads
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be opened (bad status,
    /// connection failure). Mid-stream failures end the channel instead.
    async fn open(&self, request: &ContentRequest) -> Result<mpsc::UnboundedReceiver<String>>;
}

/// HTTP/SSE implementation of [`ContentSource`]
pub struct HttpContentSource {
    client: reqwest::Client,
    api_base: url::Url,
}

impl HttpContentSource {
    /// Construct a source targeting `api_base`
    ///
    /// # Errors
    ///
    /// Returns [`CourseforgeError::Config`] if the base URL is invalid.
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self> {
        let api_base = url::Url::parse(api_base)
            .map_err(|e| CourseforgeError::Config(format!("invalid generator api_base: {}", e)))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, api_base })
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn open(&self, request: &ContentRequest) -> Result<mpsc::UnboundedReceiver<String>> {
        let endpoint = self
            .api_base
            .join("generate/content")
            .map_err(|e| CourseforgeError::Config(format!("invalid content endpoint: {}", e)))?;

        tracing::info!("Opening content stream at {}", endpoint);
        let response = self
            .client
            .post(endpoint)
            .header("Accept", "text/event-stream")
            .json(request)
            .send()
            .await
            .map_err(|e| CourseforgeError::Stream(format!("content request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CourseforgeError::Authentication(format!(
                "content stream rejected with HTTP {}",
                status
            ))
            .into());
        }
        if !status.is_success() {
            return Err(CourseforgeError::Stream(format!(
                "content stream returned HTTP {}",
                status
            ))
            .into());
        }

        let (data_tx, data_rx) = mpsc::unbounded_channel();
        let byte_stream = response.bytes_stream();
        tokio::spawn(async move {
            events::pump_sse_stream(byte_stream, data_tx).await;
        });

        Ok(data_rx)
    }
}

/// Summary of one ingestion run
#[derive(Debug, Clone, Default)]
pub struct IngestSummary {
    /// Events that mutated a slide
    pub applied: usize,
    /// Events dropped because no slide matched
    pub skipped: usize,
    /// Payloads that failed to parse
    pub parse_errors: usize,
    /// True when the run was cancelled by the caller
    pub cancelled: bool,
    /// True when the fallback timer closed the run flags
    pub forced_completion: bool,
}

/// The content-stream event loop
pub struct ContentIngestor<'a> {
    store: &'a SlideStore,
}

impl<'a> ContentIngestor<'a> {
    /// Create an ingestor mirroring into `store`
    pub fn new(store: &'a SlideStore) -> Self {
        Self { store }
    }

    /// Consume the content stream until it ends or `cancel` fires
    ///
    /// Events are applied through the state reducer one at a time; the
    /// collection is mirrored after every mutation. The snapshot persisted
    /// before this run serves as the matcher's fallback for events whose
    /// titles drifted from the live collection.
    ///
    /// # Errors
    ///
    /// Returns an error only when the stream cannot be opened; everything
    /// after that is recovered locally (skip and continue).
    pub async fn run(
        &self,
        source: &dyn ContentSource,
        request: &ContentRequest,
        state: &mut GenerationState,
        cancel: &CancellationToken,
    ) -> Result<IngestSummary> {
        let fallback = self
            .store
            .load_snapshot()
            .unwrap_or_else(|e| {
                tracing::warn!("Could not load fallback snapshot: {}", e);
                None
            })
            .map(|s| s.slides);

        let mut rx = source.open(request).await?;
        let mut summary = IngestSummary::default();

        self.mirror(state);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Content generation cancelled");
                    state.is_generating = false;
                    self.mirror(state);
                    summary.cancelled = true;
                    break;
                }
                maybe_data = rx.recv() => {
                    let Some(data) = maybe_data else {
                        self.finish(state, &mut summary).await;
                        break;
                    };
                    let event = match GenerationEvent::parse(&data) {
                        Ok(event) => event,
                        Err(e) => {
                            tracing::warn!("Dropping unparseable event: {}", e);
                            summary.parse_errors += 1;
                            continue;
                        }
                    };
                    if let Applied::Updated(_) = state.apply(&event, fallback.as_deref()) {
                        summary.applied += 1;
                        self.mirror(state);
                    }
                }
            }
        }

        summary.skipped = state.skipped_events;
        Ok(summary)
    }

    /// Close out the run after the stream ends
    async fn finish(&self, state: &mut GenerationState, summary: &mut IngestSummary) {
        if state.is_generated {
            return;
        }
        tracing::debug!(
            "Stream ended without a completion signal, forcing flags in {:?}",
            COMPLETION_FALLBACK
        );
        tokio::time::sleep(COMPLETION_FALLBACK).await;
        state.force_complete();
        summary.forced_completion = true;
        self.mirror(state);
    }

    /// The single persistence side-effect point; failures are best-effort
    fn mirror(&self, state: &GenerationState) {
        if let Err(e) = self.store.mirror(&state.slides, state.is_generating) {
            tracing::warn!("Mirror write failed: {}", e);
        }
    }
}
