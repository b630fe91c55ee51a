//! Course publishing against the content-management backend
//!
//! Walks the finished sessions in order and issues the creation sequence:
//! institute lookup, course/package, subject, module, then per-chapter and
//! per-slide records. Course, subject, and module failures are fatal and
//! abort the publish with one classified user-facing error; chapter and
//! slide failures are logged and skipped so a partial publish still lands
//! everything else.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::course::{CourseMetadata, Session, Slide, SlideContent, SlideType};
use crate::error::{CourseforgeError, ErrorClass, Result};

/// Identifiers returned by the institute-details lookup
#[derive(Debug, Clone, Deserialize)]
pub struct InstituteDetails {
    /// Institute identifier echoed back by the backend
    pub institute_id: String,
    /// Package-session identifier required by course creation
    pub package_session_id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CreatedRecord {
    id: String,
}

/// Result of a publish run
#[derive(Debug, Clone, Default)]
pub struct PublishReport {
    /// Backend id of the created course
    pub course_id: String,
    /// Chapters created successfully
    pub chapters_created: usize,
    /// Slides created successfully
    pub slides_created: usize,
    /// Paths of chapters/slides that failed and were skipped
    pub skipped: Vec<String>,
}

/// REST client for the publishing sequence
pub struct Publisher {
    client: reqwest::Client,
    api_base: url::Url,
    institute_id: String,
}

impl Publisher {
    /// Construct a publisher for one institute
    ///
    /// # Errors
    ///
    /// Returns [`CourseforgeError::Config`] if the base URL is invalid.
    pub fn new(api_base: &str, institute_id: &str) -> Result<Self> {
        let api_base = url::Url::parse(api_base)
            .map_err(|e| CourseforgeError::Config(format!("invalid backend api_base: {}", e)))?;
        let client = reqwest::Client::new();
        Ok(Self {
            client,
            api_base,
            institute_id: institute_id.to_string(),
        })
    }

    /// Publish the course
    ///
    /// # Errors
    ///
    /// Returns [`CourseforgeError::Publish`] (with a classification tag in
    /// the message) when the institute lookup or course/subject/module
    /// creation fails. Chapter and slide failures never error; they are
    /// recorded in the report's `skipped` list.
    pub async fn publish(
        &self,
        metadata: &CourseMetadata,
        sessions: &[Session],
    ) -> Result<PublishReport> {
        let details = self.institute_details().await?;
        tracing::info!(
            "Publishing course '{}' to institute {}",
            metadata.name,
            details.institute_id
        );

        let course = self
            .create_record(
                "packages",
                &json!({
                    "name": metadata.name,
                    "description": metadata.description,
                    "tags": metadata.tags,
                    "media": metadata.media,
                    "institute_id": details.institute_id,
                    "package_session_id": details.package_session_id,
                }),
            )
            .await?;

        let subject = self
            .create_record(
                "subjects",
                &json!({
                    "package_id": course.id,
                    "name": metadata.name,
                }),
            )
            .await?;

        let module = self
            .create_record(
                "modules",
                &json!({
                    "subject_id": subject.id,
                    "name": metadata.name,
                }),
            )
            .await?;

        let mut report = PublishReport {
            course_id: course.id,
            ..Default::default()
        };

        for (order, session) in sessions.iter().enumerate() {
            let chapter = match self
                .create_record(
                    "chapters",
                    &json!({
                        "module_id": module.id,
                        "name": session.title,
                        "order": order,
                    }),
                )
                .await
            {
                Ok(chapter) => chapter,
                Err(e) => {
                    tracing::warn!("Skipping chapter '{}': {}", session.title, e);
                    report.skipped.push(session.title.clone());
                    continue;
                }
            };
            report.chapters_created += 1;

            for slide in &session.slides {
                let payload = slide_payload(slide);
                let endpoint = format!("chapters/{}/slides", chapter.id);
                match self.create_record(&endpoint, &payload).await {
                    Ok(_) => report.slides_created += 1,
                    Err(e) => {
                        tracing::warn!("Skipping slide '{}': {}", slide.path, e);
                        report.skipped.push(slide.path.clone());
                    }
                }
            }
        }

        tracing::info!(
            "Publish finished: {} chapters, {} slides, {} skipped",
            report.chapters_created,
            report.slides_created,
            report.skipped.len()
        );
        Ok(report)
    }

    /// Look up institute identifiers needed by the creation sequence
    async fn institute_details(&self) -> Result<InstituteDetails> {
        let endpoint = self
            .api_base
            .join(&format!("institutes/{}/details", self.institute_id))
            .map_err(|e| CourseforgeError::Config(format!("invalid institute endpoint: {}", e)))?;

        let response = self
            .client
            .get(endpoint)
            .send()
            .await
            .map_err(|e| self.fatal(format!("institute lookup failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self
                .fatal(format!("institute lookup returned HTTP {}", status))
                .into());
        }

        let details = response
            .json()
            .await
            .map_err(|e| self.fatal(format!("institute lookup returned bad JSON: {}", e)))?;
        Ok(details)
    }

    /// POST one creation request and parse the created record id
    async fn create_record(&self, path: &str, payload: &Value) -> Result<CreatedRecord> {
        let endpoint = self
            .api_base
            .join(path)
            .map_err(|e| CourseforgeError::Config(format!("invalid endpoint '{}': {}", path, e)))?;

        let response = self
            .client
            .post(endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.fatal(format!("request to {} failed: {}", path, e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CourseforgeError::Authentication(format!(
                "{} rejected with HTTP {}",
                path, status
            ))
            .into());
        }
        if !status.is_success() {
            return Err(self
                .fatal(format!("{} returned HTTP {}", path, status))
                .into());
        }

        let record = response
            .json()
            .await
            .map_err(|e| self.fatal(format!("{} returned bad JSON: {}", path, e)))?;
        Ok(record)
    }

    /// Wrap a failure with its coarse classification for error copy
    fn fatal(&self, message: String) -> CourseforgeError {
        let class = ErrorClass::classify(&message);
        CourseforgeError::Publish(format!("[{}] {}", class, message))
    }
}

/// Select the type-specific creation payload for a slide
///
/// Documents and code editors publish as text slides; videos publish their
/// URL (or embed HTML); assessments publish their normalized questions;
/// video+code composites publish as a document describing the video so the
/// backend needs no composite type. Placeholders publish as empty text
/// slides to preserve the course structure.
pub fn slide_payload(slide: &Slide) -> Value {
    match (&slide.slide_type, &slide.content) {
        (SlideType::Assessment, SlideContent::Assessment(assessment)) => json!({
            "title": slide.title,
            "order": slide.order,
            "slide_type": "quiz",
            "questions": assessment.questions,
        }),
        (SlideType::Video | SlideType::AiVideo, SlideContent::Html(html)) => json!({
            "title": slide.title,
            "order": slide.order,
            "slide_type": "video",
            "content_html": html,
        }),
        (SlideType::AiVideo, SlideContent::AiVideo(payload)) => json!({
            "title": slide.title,
            "order": slide.order,
            "slide_type": "video",
            "video": payload,
        }),
        (SlideType::VideoCode, SlideContent::VideoCode(payload)) => {
            // Hybrid shape: a document whose body describes the video and
            // carries the code sample.
            json!({
                "title": slide.title,
                "order": slide.order,
                "slide_type": "text",
                "content_html": format!("<h3>{}</h3>", slide.title),
                "video": payload.get("video").cloned().unwrap_or(Value::Null),
                "code": payload.get("code").cloned().unwrap_or(Value::Null),
            })
        }
        (_, SlideContent::Html(html)) => json!({
            "title": slide.title,
            "order": slide.order,
            "slide_type": "text",
            "content_html": html,
        }),
        _ => json!({
            "title": slide.title,
            "order": slide.order,
            "slide_type": "text",
            "content_html": "",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::{Assessment, AssessmentQuestion};
    use serde_json::json;

    #[test]
    fn test_slide_payload_document() {
        let mut slide = Slide::new("Ch1", "Intro", SlideType::Document, 0);
        slide.content = SlideContent::Html("<p>hello</p>".to_string());
        let payload = slide_payload(&slide);
        assert_eq!(payload["slide_type"], "text");
        assert_eq!(payload["content_html"], "<p>hello</p>");
    }

    #[test]
    fn test_slide_payload_quiz() {
        let mut slide = Slide::new("Ch1", "Quiz", SlideType::Assessment, 1);
        slide.content = SlideContent::Assessment(Assessment {
            title: None,
            questions: vec![AssessmentQuestion {
                question: "Q?".to_string(),
                options: vec!["a".to_string()],
                answer: Some("a".to_string()),
                explanation: None,
            }],
        });
        let payload = slide_payload(&slide);
        assert_eq!(payload["slide_type"], "quiz");
        assert_eq!(payload["questions"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_slide_payload_video_html() {
        let mut slide = Slide::new("Ch1", "Clip", SlideType::Video, 2);
        slide.content = SlideContent::Html("<video></video>".to_string());
        let payload = slide_payload(&slide);
        assert_eq!(payload["slide_type"], "video");
    }

    #[test]
    fn test_slide_payload_video_code_hybrid() {
        let mut slide = Slide::new("Ch1", "Demo", SlideType::VideoCode, 3);
        slide.content = SlideContent::VideoCode(json!({
            "video": {"url": "https://v"},
            "code": {"language": "rust", "source": "fn main() {}"}
        }));
        let payload = slide_payload(&slide);
        assert_eq!(payload["slide_type"], "text");
        assert_eq!(payload["video"]["url"], "https://v");
        assert_eq!(payload["code"]["language"], "rust");
    }

    #[test]
    fn test_slide_payload_placeholder_empty_text() {
        let slide = Slide::new_placeholder("Ch1", "Divider", SlideType::Document, 4);
        let payload = slide_payload(&slide);
        assert_eq!(payload["slide_type"], "text");
        assert_eq!(payload["content_html"], "");
    }

    #[test]
    fn test_publisher_rejects_bad_base_url() {
        assert!(Publisher::new("not a url", "inst-1").is_err());
    }
}
