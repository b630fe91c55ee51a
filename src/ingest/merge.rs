//! Per-type content merge rules
//!
//! Each incoming payload is folded into typed slide content according to
//! the slide's declared type, together with the type-specific completeness
//! predicate. Merging is pure over the event payload, so re-applying the
//! same event is idempotent by construction.

use pulldown_cmark::{html, Parser};
use serde_json::Value;

use crate::course::{AiVideoMeta, Assessment, AssessmentQuestion, SlideContent, SlideType};

/// Result of merging one payload into a slide
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The new content for the slide
    pub content: SlideContent,
    /// Whether the type-specific completeness predicate is satisfied
    pub completed: bool,
    /// Progress hint extracted from the payload, when it carried one
    pub progress: Option<u8>,
    /// AI-video metadata extracted from the payload, when applicable
    pub ai_video: Option<AiVideoMeta>,
}

impl MergeOutcome {
    fn incomplete(content: SlideContent) -> Self {
        Self {
            content,
            completed: false,
            progress: None,
            ai_video: None,
        }
    }
}

/// Merge a content payload according to the slide's type
///
/// # Arguments
///
/// * `slide_type` - The target slide's type
/// * `event_status` - The event-level status string, used only where the
///   payload itself carries no completion signal (AI-video)
/// * `content_data` - The event payload
pub fn merge_content(
    slide_type: SlideType,
    event_status: Option<&str>,
    content_data: &Value,
) -> MergeOutcome {
    match slide_type {
        SlideType::Document | SlideType::CodeEditor => merge_document(content_data),
        SlideType::Assessment => merge_assessment(content_data),
        SlideType::Video => merge_video(content_data),
        SlideType::AiVideo => merge_ai_video(event_status, content_data),
        SlideType::VideoCode => merge_video_code(content_data),
    }
}

/// True when an event-level status string signals completion
pub fn status_is_completed(status: Option<&str>) -> bool {
    status.map_or(false, |s| {
        s.eq_ignore_ascii_case("completed")
            || s.eq_ignore_ascii_case("complete")
            || s.eq_ignore_ascii_case("done")
    })
}

fn merge_document(content_data: &Value) -> MergeOutcome {
    let Some(text) = extract_text(content_data) else {
        return MergeOutcome::incomplete(SlideContent::Empty);
    };
    if text.trim().is_empty() {
        return MergeOutcome::incomplete(SlideContent::Empty);
    }

    // Fenced payloads already contain HTML; everything else is markdown.
    let html_body = match strip_code_fence(&text) {
        Some(inner) => inner,
        None => markdown_to_html(&text),
    };

    MergeOutcome {
        content: SlideContent::Html(html_body),
        completed: true,
        progress: Some(100),
        ai_video: None,
    }
}

fn merge_assessment(content_data: &Value) -> MergeOutcome {
    match normalize_assessment(content_data) {
        Ok(assessment) => {
            let completed = !assessment.questions.is_empty();
            MergeOutcome {
                content: SlideContent::Assessment(assessment),
                completed,
                progress: completed.then_some(100),
                ai_video: None,
            }
        }
        // A failed conversion marks the slide instead of failing the run.
        Err(reason) => MergeOutcome::incomplete(SlideContent::Failed(format!(
            "assessment conversion failed: {}",
            reason
        ))),
    }
}

fn merge_video(content_data: &Value) -> MergeOutcome {
    let title = string_field(content_data, &["title"]);
    let description = string_field(content_data, &["description"]);
    let url = string_field(content_data, &["url", "video_url", "videoUrl"]);

    let Some(url) = url else {
        return MergeOutcome::incomplete(SlideContent::Empty);
    };

    let mut fragment = String::from("<div class=\"video-slide\">");
    if let Some(title) = &title {
        fragment.push_str(&format!("<h3>{}</h3>", escape_html(title)));
    }
    if let Some(description) = &description {
        fragment.push_str(&format!("<p>{}</p>", escape_html(description)));
    }
    fragment.push_str(&format!(
        "<video controls src=\"{}\"></video></div>",
        escape_html(&url)
    ));

    MergeOutcome {
        content: SlideContent::Html(fragment),
        completed: true,
        progress: Some(100),
        ai_video: None,
    }
}

fn merge_ai_video(event_status: Option<&str>, content_data: &Value) -> MergeOutcome {
    // The full partial payload is stored verbatim and overwritten by the
    // latest event.
    let content = SlideContent::AiVideo(content_data.clone());

    let embedded_status = content_data.get("status").and_then(Value::as_str);
    let completed = match embedded_status {
        Some(status) => status_is_completed(Some(status)),
        None => status_is_completed(event_status),
    };

    let payload_progress = content_data
        .get("progress")
        .or_else(|| content_data.get("generation_progress"))
        .and_then(Value::as_u64)
        .map(|p| p.min(100) as u8);

    let meta = AiVideoMeta {
        timeline_url: string_field(content_data, &["timeline_url", "timelineUrl"]),
        audio_url: string_field(content_data, &["audio_url", "audioUrl"]),
        generation_progress: payload_progress,
    };

    MergeOutcome {
        content,
        completed,
        progress: if completed { Some(100) } else { payload_progress },
        ai_video: Some(meta),
    }
}

fn merge_video_code(content_data: &Value) -> MergeOutcome {
    let has_video = content_data.get("video").map_or(false, |v| !v.is_null());
    let has_code = content_data.get("code").map_or(false, |v| !v.is_null());
    let completed = has_video && has_code;

    let progress = match (has_video, has_code) {
        (true, true) => Some(100),
        (true, false) | (false, true) => Some(50),
        (false, false) => None,
    };

    MergeOutcome {
        content: SlideContent::VideoCode(content_data.clone()),
        completed,
        progress,
        ai_video: None,
    }
}

/// Pull a text body out of a payload that is either a bare string or an
/// object with a conventional content field
fn extract_text(content_data: &Value) -> Option<String> {
    match content_data {
        Value::String(s) => Some(s.clone()),
        Value::Object(_) => string_field(content_data, &["content", "html", "text", "body"]),
        _ => None,
    }
}

fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| value.get(k).and_then(Value::as_str))
        .map(|s| s.to_string())
}

/// Strip a surrounding markdown code fence, returning the inner text
///
/// Returns `None` when the text is not fenced.
fn strip_code_fence(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let rest = trimmed.strip_prefix("```")?;
    // Drop the info string ("html", "json", ...) on the opening fence.
    let after_open = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => return None,
    };
    let inner = after_open.trim_end().strip_suffix("```")?;
    Some(inner.trim_end().to_string())
}

/// Convert markdown to HTML
fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Normalize an assessment payload into its canonical question list
///
/// Accepts a JSON object, a JSON string (optionally fenced), and a
/// handful of conventional field spellings for questions, options, and
/// answers.
fn normalize_assessment(content_data: &Value) -> Result<Assessment, String> {
    let value: Value = match content_data {
        Value::String(s) => {
            let text = strip_code_fence(s).unwrap_or_else(|| s.clone());
            serde_json::from_str(&text).map_err(|e| e.to_string())?
        }
        Value::Object(_) => content_data.clone(),
        other => return Err(format!("unexpected payload shape: {}", kind_of(other))),
    };

    let questions_value = value
        .get("questions")
        .or_else(|| value.get("items"))
        .ok_or_else(|| "payload has no questions".to_string())?;
    let questions_array = questions_value
        .as_array()
        .ok_or_else(|| "questions is not an array".to_string())?;

    let mut questions = Vec::with_capacity(questions_array.len());
    for entry in questions_array {
        let question = string_field(entry, &["question", "text", "prompt", "title"])
            .ok_or_else(|| "question entry has no text".to_string())?;

        let options = entry
            .get("options")
            .or_else(|| entry.get("choices"))
            .and_then(Value::as_array)
            .map(|opts| {
                opts.iter()
                    .filter_map(|o| match o {
                        Value::String(s) => Some(s.clone()),
                        Value::Object(_) => string_field(o, &["text", "option", "label"]),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let answer = entry
            .get("answer")
            .or_else(|| entry.get("correct_answer"))
            .or_else(|| entry.get("correctAnswer"))
            .and_then(|a| match a {
                Value::String(s) => Some(s.clone()),
                // Numeric answers index into the options list.
                Value::Number(n) => n
                    .as_u64()
                    .and_then(|i| options.get(i as usize))
                    .cloned(),
                _ => None,
            });

        let explanation = string_field(entry, &["explanation"]);

        questions.push(AssessmentQuestion {
            question,
            options,
            answer,
            explanation,
        });
    }

    Ok(Assessment {
        title: string_field(&value, &["title"]),
        questions,
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_markdown_converted() {
        let outcome = merge_content(
            SlideType::Document,
            Some("completed"),
            &json!({"content": "# Title\n\nBody text"}),
        );
        assert!(outcome.completed);
        match outcome.content {
            SlideContent::Html(html) => {
                assert!(html.contains("<h1>Title</h1>"));
                assert!(html.contains("<p>Body text</p>"));
            }
            other => panic!("expected html, got {:?}", other),
        }
    }

    #[test]
    fn test_document_fenced_html_stripped() {
        let fenced = "```html\n<h1>Already HTML</h1>\n```";
        let outcome = merge_content(SlideType::Document, None, &json!(fenced));
        match outcome.content {
            SlideContent::Html(html) => assert_eq!(html, "<h1>Already HTML</h1>"),
            other => panic!("expected html, got {:?}", other),
        }
        assert!(outcome.completed);
    }

    #[test]
    fn test_document_empty_payload_incomplete() {
        let outcome = merge_content(SlideType::Document, None, &json!({"content": "   "}));
        assert!(!outcome.completed);
        assert_eq!(outcome.content, SlideContent::Empty);
    }

    #[test]
    fn test_document_merge_is_idempotent() {
        let payload = json!({"content": "Some **bold** text"});
        let first = merge_content(SlideType::Document, None, &payload);
        let second = merge_content(SlideType::Document, None, &payload);
        assert_eq!(first.content, second.content);
        assert_eq!(first.completed, second.completed);
    }

    #[test]
    fn test_assessment_normalized() {
        let payload = json!({
            "title": "Checkpoint",
            "questions": [{
                "question": "What is 2+2?",
                "options": ["3", "4"],
                "answer": 1
            }]
        });
        let outcome = merge_content(SlideType::Assessment, None, &payload);
        assert!(outcome.completed);
        match outcome.content {
            SlideContent::Assessment(assessment) => {
                assert_eq!(assessment.title.as_deref(), Some("Checkpoint"));
                assert_eq!(assessment.questions.len(), 1);
                assert_eq!(assessment.questions[0].answer.as_deref(), Some("4"));
            }
            other => panic!("expected assessment, got {:?}", other),
        }
    }

    #[test]
    fn test_assessment_from_fenced_json_string() {
        let fenced = "```json\n{\"questions\":[{\"text\":\"Pick one\",\"choices\":[\"a\",\"b\"]}]}\n```";
        let outcome = merge_content(SlideType::Assessment, None, &json!(fenced));
        assert!(outcome.completed);
        match outcome.content {
            SlideContent::Assessment(assessment) => {
                assert_eq!(assessment.questions[0].question, "Pick one");
                assert_eq!(assessment.questions[0].options, vec!["a", "b"]);
            }
            other => panic!("expected assessment, got {:?}", other),
        }
    }

    #[test]
    fn test_assessment_zero_questions_never_completes() {
        let outcome = merge_content(SlideType::Assessment, Some("completed"), &json!({"questions": []}));
        assert!(!outcome.completed);
        assert!(matches!(outcome.content, SlideContent::Assessment(_)));
    }

    #[test]
    fn test_assessment_conversion_failure_marks_slide() {
        let outcome = merge_content(SlideType::Assessment, None, &json!("{broken json"));
        assert!(!outcome.completed);
        match outcome.content {
            SlideContent::Failed(marker) => {
                assert!(marker.contains("assessment conversion failed"))
            }
            other => panic!("expected failed marker, got {:?}", other),
        }
    }

    #[test]
    fn test_video_fragment_synthesized() {
        let payload = json!({
            "title": "Ownership & Borrowing",
            "description": "A <tour> of the borrow checker",
            "url": "https://cdn.example.com/v.mp4"
        });
        let outcome = merge_content(SlideType::Video, None, &payload);
        assert!(outcome.completed);
        match outcome.content {
            SlideContent::Html(html) => {
                assert!(html.contains("Ownership &amp; Borrowing"));
                assert!(html.contains("A &lt;tour&gt; of the borrow checker"));
                assert!(html.contains("src=\"https://cdn.example.com/v.mp4\""));
            }
            other => panic!("expected html, got {:?}", other),
        }
    }

    #[test]
    fn test_video_without_url_incomplete() {
        let outcome = merge_content(SlideType::Video, None, &json!({"title": "Soon"}));
        assert!(!outcome.completed);
        assert_eq!(outcome.content, SlideContent::Empty);
    }

    #[test]
    fn test_ai_video_stores_payload_verbatim() {
        let payload = json!({
            "status": "generating",
            "progress": 40,
            "timeline_url": "https://cdn.example.com/t.json"
        });
        let outcome = merge_content(SlideType::AiVideo, Some("generating"), &payload);
        assert!(!outcome.completed);
        assert_eq!(outcome.progress, Some(40));
        assert_eq!(outcome.content, SlideContent::AiVideo(payload.clone()));
        let meta = outcome.ai_video.unwrap();
        assert_eq!(meta.timeline_url.as_deref(), Some("https://cdn.example.com/t.json"));
        assert_eq!(meta.generation_progress, Some(40));
    }

    #[test]
    fn test_ai_video_embedded_status_wins() {
        let payload = json!({"status": "completed"});
        let outcome = merge_content(SlideType::AiVideo, Some("generating"), &payload);
        assert!(outcome.completed);
        assert_eq!(outcome.progress, Some(100));
    }

    #[test]
    fn test_ai_video_falls_back_to_event_status() {
        let payload = json!({"video_url": "https://cdn.example.com/v.mp4"});
        let outcome = merge_content(SlideType::AiVideo, Some("completed"), &payload);
        assert!(outcome.completed);
    }

    #[test]
    fn test_video_code_requires_both_parts() {
        let partial = json!({"video": {"url": "https://v"}, "code": null});
        let outcome = merge_content(SlideType::VideoCode, Some("completed"), &partial);
        assert!(!outcome.completed);
        assert_eq!(outcome.progress, Some(50));

        let full = json!({"video": {"url": "https://v"}, "code": {"language": "rust"}});
        let outcome = merge_content(SlideType::VideoCode, None, &full);
        assert!(outcome.completed);
        assert_eq!(outcome.progress, Some(100));
    }

    #[test]
    fn test_status_is_completed() {
        assert!(status_is_completed(Some("completed")));
        assert!(status_is_completed(Some("COMPLETE")));
        assert!(status_is_completed(Some("done")));
        assert!(!status_is_completed(Some("generating")));
        assert!(!status_is_completed(None));
    }

    #[test]
    fn test_strip_code_fence_plain_text() {
        assert!(strip_code_fence("no fences here").is_none());
    }

    #[test]
    fn test_strip_code_fence_no_info_string() {
        assert_eq!(
            strip_code_fence("```\n<p>hi</p>\n```").as_deref(),
            Some("<p>hi</p>")
        );
    }
}
