//! Slide record and its typed content union
//!
//! A slide is one unit of course content of a specific type. Its `content`
//! field is a tagged union keyed on the slide type, so each kind of
//! generated payload keeps its own shape instead of being coerced into a
//! single string.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Content type of a slide
///
/// Wire names arriving on outline todos and content events are uppercase
/// (`"DOCUMENT"`, `"QUIZ"`, ...); the serialized tag is the short form
/// used in the persisted snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideType {
    /// HTML document page
    #[serde(rename = "doc")]
    Document,
    /// Quiz / assessment with structured questions
    #[serde(rename = "quiz")]
    Assessment,
    /// Plain video page
    #[serde(rename = "video")]
    Video,
    /// Video generated asynchronously with incremental progress
    #[serde(rename = "ai-video")]
    AiVideo,
    /// Composite of a video and an attached code sample
    #[serde(rename = "video-code")]
    VideoCode,
    /// Interactive code editor page
    #[serde(rename = "code")]
    CodeEditor,
}

impl SlideType {
    /// Map a declared wire type name to a slide type
    ///
    /// Accepts the uppercase names used by the generation service
    /// (`QUIZ` and `ASSESSMENT` are aliases) and is case-insensitive.
    /// Returns `None` for names the service never declared.
    ///
    /// # Examples
    ///
    /// ```
    /// use courseforge::course::SlideType;
    ///
    /// assert_eq!(SlideType::from_declared("DOCUMENT"), Some(SlideType::Document));
    /// assert_eq!(SlideType::from_declared("quiz"), Some(SlideType::Assessment));
    /// assert_eq!(SlideType::from_declared("HOLOGRAM"), None);
    /// ```
    pub fn from_declared(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "DOCUMENT" | "DOC" | "TEXT" => Some(Self::Document),
            "QUIZ" | "ASSESSMENT" => Some(Self::Assessment),
            "VIDEO" => Some(Self::Video),
            "AI_VIDEO" | "AI-VIDEO" | "AIVIDEO" => Some(Self::AiVideo),
            "VIDEO_CODE" | "VIDEO-CODE" | "VIDEOCODE" => Some(Self::VideoCode),
            "CODE_EDITOR" | "CODE" => Some(Self::CodeEditor),
            _ => None,
        }
    }

    /// The short serialized tag for this type
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Document => "doc",
            Self::Assessment => "quiz",
            Self::Video => "video",
            Self::AiVideo => "ai-video",
            Self::VideoCode => "video-code",
            Self::CodeEditor => "code",
        }
    }
}

impl std::fmt::Display for SlideType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Lifecycle status of a slide
///
/// Moves `Pending → Generating` when the first content event for the slide
/// arrives, and `Generating → Completed` once the type-specific
/// completeness predicate is satisfied. A per-slide error event reverts a
/// generating slide to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideStatus {
    Pending,
    Generating,
    Completed,
}

/// Normalized assessment payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Optional assessment title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Normalized questions; an assessment with zero questions never
    /// completes its slide
    pub questions: Vec<AssessmentQuestion>,
}

/// One normalized assessment question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentQuestion {
    /// Question text
    pub question: String,
    /// Answer options, in display order
    #[serde(default)]
    pub options: Vec<String>,
    /// The correct answer, when the payload declared one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// Optional explanation shown after answering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Typed content of a slide, keyed on its type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "kebab-case")]
pub enum SlideContent {
    /// No content received yet
    Empty,
    /// Rendered HTML (documents, video embeds)
    Html(String),
    /// Normalized assessment
    Assessment(Assessment),
    /// Verbatim AI-video payload, overwritten by the latest event
    AiVideo(serde_json::Value),
    /// Verbatim video+code composite payload
    VideoCode(serde_json::Value),
    /// Inline error marker left by a failed conversion; the run continues
    Failed(String),
}

impl SlideContent {
    /// True when no usable content is present
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty | Self::Failed(_))
    }
}

/// Generation metadata for AI-video slides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiVideoMeta {
    /// Timeline asset URL, once the service has produced one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_url: Option<String>,
    /// Audio track URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Generation progress reported by the service, 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_progress: Option<u8>,
}

/// One unit of course content
///
/// Identified by an opaque id, owned by a chapter, carrying a stable `path`
/// matching key assigned at outline-transformation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    /// Opaque identifier (UUID v4)
    pub id: String,
    /// Owning chapter title
    pub chapter: String,
    /// Display title
    pub title: String,
    /// Stable matching key, `"{chapter}/{title}"`
    pub path: String,
    /// Content type tag
    pub slide_type: SlideType,
    /// Lifecycle status
    pub status: SlideStatus,
    /// Completion progress, 0-100
    pub progress: u8,
    /// Typed content
    pub content: SlideContent,
    /// AI-video generation metadata, when applicable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_video: Option<AiVideoMeta>,
    /// Position within the chapter
    pub order: usize,
    /// True for outline leaves with no generation todo; placeholders never
    /// receive content and are excluded from progress aggregation
    #[serde(default)]
    pub placeholder: bool,
}

impl Slide {
    /// Build the stable matching key for a chapter/title pair
    pub fn make_path(chapter: &str, title: &str) -> String {
        format!("{}/{}", chapter, title)
    }

    /// Create a pending slide for a generation todo
    pub fn new(chapter: &str, title: &str, slide_type: SlideType, order: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            chapter: chapter.to_string(),
            title: title.to_string(),
            path: Self::make_path(chapter, title),
            slide_type,
            status: SlideStatus::Pending,
            progress: 0,
            content: SlideContent::Empty,
            ai_video: None,
            order,
            placeholder: false,
        }
    }

    /// Create a placeholder slide for an outline leaf with no todo
    pub fn new_placeholder(chapter: &str, title: &str, slide_type: SlideType, order: usize) -> Self {
        Self {
            placeholder: true,
            ..Self::new(chapter, title, slide_type, order)
        }
    }

    /// True when this slide participates in generation and progress
    pub fn is_content_bearing(&self) -> bool {
        !self.placeholder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_declared_document() {
        assert_eq!(SlideType::from_declared("DOCUMENT"), Some(SlideType::Document));
        assert_eq!(SlideType::from_declared("document"), Some(SlideType::Document));
    }

    #[test]
    fn test_from_declared_quiz_aliases() {
        assert_eq!(SlideType::from_declared("QUIZ"), Some(SlideType::Assessment));
        assert_eq!(SlideType::from_declared("ASSESSMENT"), Some(SlideType::Assessment));
    }

    #[test]
    fn test_from_declared_ai_video_variants() {
        assert_eq!(SlideType::from_declared("AI_VIDEO"), Some(SlideType::AiVideo));
        assert_eq!(SlideType::from_declared("ai-video"), Some(SlideType::AiVideo));
    }

    #[test]
    fn test_from_declared_unknown() {
        assert_eq!(SlideType::from_declared("HOLOGRAM"), None);
        assert_eq!(SlideType::from_declared(""), None);
    }

    #[test]
    fn test_slide_type_tag_round_trip() {
        for t in [
            SlideType::Document,
            SlideType::Assessment,
            SlideType::Video,
            SlideType::AiVideo,
            SlideType::VideoCode,
            SlideType::CodeEditor,
        ] {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.tag()));
            let back: SlideType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, t);
        }
    }

    #[test]
    fn test_slide_status_serialization() {
        assert_eq!(
            serde_json::to_string(&SlideStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&SlideStatus::Generating).unwrap(),
            "\"generating\""
        );
        assert_eq!(
            serde_json::to_string(&SlideStatus::Completed).unwrap(),
            "\"completed\""
        );
    }

    #[test]
    fn test_new_slide_defaults() {
        let slide = Slide::new("Ch1", "Intro", SlideType::Document, 0);
        assert_eq!(slide.path, "Ch1/Intro");
        assert_eq!(slide.status, SlideStatus::Pending);
        assert_eq!(slide.progress, 0);
        assert_eq!(slide.content, SlideContent::Empty);
        assert!(slide.ai_video.is_none());
        assert!(!slide.placeholder);
        assert!(slide.is_content_bearing());
    }

    #[test]
    fn test_new_slide_unique_ids() {
        let a = Slide::new("Ch1", "Intro", SlideType::Document, 0);
        let b = Slide::new("Ch1", "Intro", SlideType::Document, 0);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_placeholder_slide() {
        let slide = Slide::new_placeholder("Ch1", "Summary", SlideType::Document, 3);
        assert!(slide.placeholder);
        assert!(!slide.is_content_bearing());
        assert_eq!(slide.status, SlideStatus::Pending);
    }

    #[test]
    fn test_slide_serialization_round_trip() {
        let mut slide = Slide::new("Ch1", "Quiz time", SlideType::Assessment, 1);
        slide.status = SlideStatus::Completed;
        slide.progress = 100;
        slide.content = SlideContent::Assessment(Assessment {
            title: None,
            questions: vec![AssessmentQuestion {
                question: "What is 2+2?".to_string(),
                options: vec!["3".to_string(), "4".to_string()],
                answer: Some("4".to_string()),
                explanation: None,
            }],
        });

        let json = serde_json::to_string(&slide).unwrap();
        let back: Slide = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, slide.id);
        assert_eq!(back.slide_type, SlideType::Assessment);
        assert_eq!(back.status, SlideStatus::Completed);
        assert_eq!(back.content, slide.content);
    }

    #[test]
    fn test_content_is_empty() {
        assert!(SlideContent::Empty.is_empty());
        assert!(SlideContent::Failed("x".to_string()).is_empty());
        assert!(!SlideContent::Html("<p>hi</p>".to_string()).is_empty());
    }
}
