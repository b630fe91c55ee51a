//! Course data model
//!
//! Slides, chapters (sessions), outline todos, and course metadata. Slides
//! are created once from the outline, mutated in place as generation events
//! arrive, and never deleted automatically.

pub mod metadata;
pub mod session;
pub mod slide;
pub mod todo;

pub use metadata::CourseMetadata;
pub use session::{group_sessions, Session};
pub use slide::{AiVideoMeta, Assessment, AssessmentQuestion, Slide, SlideContent, SlideStatus, SlideType};
pub use todo::{OutlineNode, Todo};
