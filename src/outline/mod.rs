//! Outline generation client
//!
//! Sends a course configuration to the generation service and consumes a
//! newline-delimited streaming response. Lines prefixed with the literal
//! progress marker carry user-facing status text; the line beginning with
//! `{` carries the final JSON payload (`tree`, `todos`, `courseMetadata`).
//!
//! A single failure aborts generation: non-2xx status, a stream that ends
//! without a final payload, malformed JSON, or a missing/non-array `tree`
//! all surface as descriptive errors. There is no retry and no
//! cancellation path for this call.

use std::time::Duration;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::course::{CourseMetadata, OutlineNode, Slide, SlideType, Todo};
use crate::error::{CourseforgeError, Result};

/// Literal prefix marking user-facing status lines in the outline stream
pub const PROGRESS_MARKER: &str = "@@PROGRESS@@";

/// Request payload for outline generation
#[derive(Debug, Clone, Serialize)]
pub struct OutlineRequest {
    /// The educator's course description
    pub user_prompt: String,
    /// Existing course tree to refine; empty array for a fresh course
    pub course_tree: Value,
    /// Structural depth knob, 1-10
    pub course_depth: u8,
    /// Free-form generation options forwarded to the service
    pub generation_options: Value,
}

impl OutlineRequest {
    /// Build a request for a fresh course from a prompt and depth
    pub fn new(user_prompt: impl Into<String>, course_depth: u8) -> Self {
        Self {
            user_prompt: user_prompt.into(),
            course_tree: Value::Array(vec![]),
            course_depth,
            generation_options: Value::Object(serde_json::Map::new()),
        }
    }
}

/// Final payload of the outline stream
#[derive(Debug, Clone, Deserialize)]
pub struct OutlineResponse {
    /// Hierarchical course structure: courses → chapters → slide leaves
    pub tree: Vec<OutlineNode>,
    /// Flat list of generation work items
    #[serde(default)]
    pub todos: Vec<Todo>,
    /// Course-level metadata
    #[serde(rename = "courseMetadata", default)]
    pub course_metadata: CourseMetadata,
    /// Optional explanation text from the service
    #[serde(default)]
    pub explanation: Option<String>,
}

/// HTTP client for the outline endpoint
pub struct OutlineClient {
    client: reqwest::Client,
    api_base: url::Url,
}

impl OutlineClient {
    /// Construct a client targeting `api_base`
    ///
    /// # Arguments
    ///
    /// * `api_base` - Base URL of the generation service
    /// * `timeout` - Per-request timeout; also bounds the stream read
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

    /// Generate a course outline
    ///
    /// Opens the streamed response and parses it line by line. Status lines
    /// (prefixed with [`PROGRESS_MARKER`]) are forwarded to `on_progress`;
    /// the first line beginning with `{` is parsed as the final payload.
    ///
    /// # Errors
    ///
    /// Returns [`CourseforgeError::Outline`] if the response status is not
    /// 2xx, the stream ends without a final payload, the payload is not
    /// valid JSON, or `tree` is absent or not an array.
    pub async fn generate(
        &self,
        request: &OutlineRequest,
        mut on_progress: impl FnMut(&str),
    ) -> Result<OutlineResponse> {
        let endpoint = self.api_base.join("generate/outline").map_err(|e| {
            CourseforgeError::Config(format!("invalid outline endpoint: {}", e))
        })?;

        tracing::info!("Requesting outline from {}", endpoint);
        let response = self
            .client
            .post(endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| CourseforgeError::Outline(format!("outline request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CourseforgeError::Outline(format!(
                "outline request returned HTTP {}",
                status
            ))
            .into());
        }

        // Lines arrive split across arbitrary chunk boundaries; buffer on
        // newlines and process each complete line as it lands.
        let mut byte_stream = response.bytes_stream();
        let mut buffer = String::new();
        let mut payload: Option<String> = None;

        while let Some(chunk) = byte_stream.next().await {
            let chunk = chunk
                .map_err(|e| CourseforgeError::Outline(format!("outline stream failed: {}", e)))?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(pos) = buffer.find('\n') {
                let line = buffer[..pos].to_string();
                buffer = buffer[pos + 1..].to_string();
                if let Some(found) = Self::process_line(&line, &mut on_progress) {
                    payload = Some(found);
                }
            }
        }
        // The final payload line may not be newline-terminated.
        if payload.is_none() {
            if let Some(found) = Self::process_line(&buffer, &mut on_progress) {
                payload = Some(found);
            }
        }

        let payload = payload.ok_or_else(|| {
            CourseforgeError::Outline("stream ended without a final outline payload".to_string())
        })?;

        Self::parse_payload(&payload)
    }

    /// Handle one stream line; returns the line when it carries the final
    /// JSON payload.
    fn process_line(line: &str, on_progress: &mut impl FnMut(&str)) -> Option<String> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if let Some(status) = line.strip_prefix(PROGRESS_MARKER) {
            let status = status.trim();
            tracing::info!("Outline progress: {}", status);
            on_progress(status);
            return None;
        }
        if line.starts_with('{') {
            return Some(line.to_string());
        }
        tracing::debug!("Ignoring unrecognized outline line: {}", line);
        None
    }

    /// Parse and validate the final payload
    fn parse_payload(payload: &str) -> Result<OutlineResponse> {
        // Validate the tree shape explicitly before deserializing, so the
        // error distinguishes "missing tree" from "malformed JSON".
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| CourseforgeError::Outline(format!("malformed outline payload: {}", e)))?;

        match value.get("tree") {
            None | Some(Value::Null) => {
                return Err(CourseforgeError::Outline(
                    "outline payload has no tree".to_string(),
                )
                .into())
            }
            Some(tree) if !tree.is_array() => {
                return Err(CourseforgeError::Outline(
                    "outline tree is not an array".to_string(),
                )
                .into())
            }
            Some(_) => {}
        }

        let response: OutlineResponse = serde_json::from_value(value)
            .map_err(|e| CourseforgeError::Outline(format!("malformed outline payload: {}", e)))?;
        Ok(response)
    }
}

/// Transform an outline response into the flat slide collection
///
/// One pending slide is produced per todo, with its stable `path` assigned
/// here. Chapter leaves in the tree with no corresponding todo become
/// placeholder slides so the course structure survives, but they are
/// excluded from progress and completion.
///
/// Todos with a declared type the service never uses fall back to document
/// slides with a warning rather than being dropped.
pub fn transform(response: &OutlineResponse) -> Vec<Slide> {
    let mut slides: Vec<Slide> = Vec::new();

    // Todos first, ordered per chapter by their declared order.
    let mut todos: Vec<&Todo> = response.todos.iter().collect();
    todos.sort_by_key(|t| t.order);

    let mut chapter_order: Vec<String> = Vec::new();
    for todo in &todos {
        if !chapter_order.contains(&todo.chapter_name) {
            chapter_order.push(todo.chapter_name.clone());
        }
    }

    for chapter in &chapter_order {
        let mut order = 0usize;
        for todo in todos.iter().filter(|t| &t.chapter_name == chapter) {
            let slide_type = SlideType::from_declared(&todo.slide_type).unwrap_or_else(|| {
                tracing::warn!(
                    "Unknown declared type '{}' for '{}', defaulting to document",
                    todo.slide_type,
                    todo.path()
                );
                SlideType::Document
            });
            slides.push(Slide::new(chapter, &todo.title, slide_type, order));
            order += 1;
        }
    }

    // Tree leaves with no todo become placeholders.
    for course in &response.tree {
        for chapter in &course.children {
            let mut order = slides
                .iter()
                .filter(|s| s.chapter == chapter.title)
                .count();
            for leaf in &chapter.children {
                let has_todo = response
                    .todos
                    .iter()
                    .any(|t| t.chapter_name == chapter.title && t.title == leaf.title);
                if !has_todo {
                    let slide_type = leaf
                        .slide_type
                        .as_deref()
                        .and_then(SlideType::from_declared)
                        .unwrap_or(SlideType::Document);
                    slides.push(Slide::new_placeholder(
                        &chapter.title,
                        &leaf.title,
                        slide_type,
                        order,
                    ));
                    order += 1;
                }
            }
        }
    }

    slides
}
