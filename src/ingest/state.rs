//! Generation state and its reducer
//!
//! All event handling funnels through [`GenerationState::apply`], the
//! single place slide records are mutated. The caller mirrors the state
//! into the store after every `Applied::Updated`, which keeps exactly one
//! persistence side-effect point.

use serde::{Deserialize, Serialize};

use crate::course::{Slide, SlideStatus, SlideType};
use crate::ingest::events::{GenerationEvent, SlideContentError, SlideContentUpdate};
use crate::ingest::matcher::find_slide;
use crate::ingest::merge::merge_content;

/// Outcome of applying one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// A slide was mutated; the state should be mirrored
    Updated(usize),
    /// The event matched no slide and was dropped
    Skipped,
    /// The event matched a slide but changed nothing
    Unchanged,
    /// Free-text progress; nothing changed
    Progress,
}

/// The live generation state: slides plus the two run-level flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationState {
    /// The flat slide collection, mutated in place
    pub slides: Vec<Slide>,
    /// True while the content stream is being consumed
    pub is_generating: bool,
    /// True once every content-bearing slide has completed
    pub is_generated: bool,
    /// Count of dropped events, for the run summary
    #[serde(default)]
    pub skipped_events: usize,
}

impl GenerationState {
    /// Start a run over a freshly transformed slide collection
    pub fn new(slides: Vec<Slide>) -> Self {
        Self {
            slides,
            is_generating: true,
            is_generated: false,
            skipped_events: 0,
        }
    }

    /// Apply one stream event
    ///
    /// Matching first consults the live collection; on a miss, the last
    /// persisted snapshot (`fallback`) is re-scanned with the same cascade
    /// and resolved back into the live collection by slide id. Events that
    /// still miss are dropped with a warning.
    ///
    /// The global completion check runs after every mutation, so the run
    /// flags flip in the same synchronous update that completes the final
    /// slide.
    pub fn apply(&mut self, event: &GenerationEvent, fallback: Option<&[Slide]>) -> Applied {
        match event {
            GenerationEvent::Update(update) => self.apply_update(update, fallback),
            GenerationEvent::Error(error) => self.apply_error(error, fallback),
            GenerationEvent::Progress(text) => {
                tracing::info!("Generation progress: {}", text);
                Applied::Progress
            }
        }
    }

    fn apply_update(&mut self, update: &SlideContentUpdate, fallback: Option<&[Slide]>) -> Applied {
        let Some(declared) = SlideType::from_declared(&update.slide_type) else {
            tracing::warn!(
                "Dropping update for '{}': unknown declared type '{}'",
                update.path,
                update.slide_type
            );
            self.skipped_events += 1;
            return Applied::Skipped;
        };

        let Some(index) = self.locate(&update.path, Some(declared), fallback) else {
            tracing::warn!("No slide matches update for '{}', skipping", update.path);
            self.skipped_events += 1;
            return Applied::Skipped;
        };

        let outcome = merge_content(declared, update.status.as_deref(), &update.content_data);
        let slide = &mut self.slides[index];

        // An empty merge means the event carried no usable payload; the
        // previous content is kept.
        if !matches!(outcome.content, crate::course::SlideContent::Empty) {
            slide.content = outcome.content;
        }

        if let Some(meta) = outcome.ai_video {
            let merged = slide.ai_video.take().unwrap_or_default();
            slide.ai_video = Some(crate::course::AiVideoMeta {
                timeline_url: meta.timeline_url.or(merged.timeline_url),
                audio_url: meta.audio_url.or(merged.audio_url),
                generation_progress: meta.generation_progress.or(merged.generation_progress),
            });
        }

        if outcome.completed {
            slide.status = SlideStatus::Completed;
            slide.progress = 100;
        } else {
            slide.status = SlideStatus::Generating;
            if let Some(progress) = outcome.progress {
                slide.progress = progress;
            }
        }

        self.check_completion();
        Applied::Updated(index)
    }

    fn apply_error(&mut self, error: &SlideContentError, fallback: Option<&[Slide]>) -> Applied {
        let declared = error
            .slide_type
            .as_deref()
            .and_then(SlideType::from_declared);

        let Some(index) = self.locate(&error.path, declared, fallback) else {
            tracing::warn!("No slide matches error for '{}', skipping", error.path);
            self.skipped_events += 1;
            return Applied::Skipped;
        };

        let slide = &mut self.slides[index];
        tracing::warn!(
            "Generation failed for '{}': {}",
            slide.path,
            error.error_message.as_deref().unwrap_or("unknown error")
        );

        // Only an in-flight slide is reverted; completed content stays.
        if slide.status == SlideStatus::Generating {
            slide.status = SlideStatus::Pending;
            slide.progress = 0;
            return Applied::Updated(index);
        }

        Applied::Unchanged
    }

    fn locate(
        &self,
        path: &str,
        declared: Option<SlideType>,
        fallback: Option<&[Slide]>,
    ) -> Option<usize> {
        if let Some(index) = find_slide(&self.slides, path, declared) {
            return Some(index);
        }

        // Re-scan the last persisted snapshot; a hit there is resolved
        // back into the live collection by id (titles may have drifted).
        let snapshot = fallback?;
        let snapshot_index = find_slide(snapshot, path, declared)?;
        let id = &snapshot[snapshot_index].id;
        self.slides.iter().position(|s| &s.id == id)
    }

    /// Flip the run flags when every content-bearing slide has completed
    ///
    /// Returns true when generation is finished.
    pub fn check_completion(&mut self) -> bool {
        let bearing: Vec<&Slide> = self
            .slides
            .iter()
            .filter(|s| s.is_content_bearing())
            .collect();

        if bearing.is_empty() {
            return false;
        }

        if bearing.iter().all(|s| s.status == SlideStatus::Completed) {
            self.is_generating = false;
            self.is_generated = true;
        }

        self.is_generated
    }

    /// Force the run flags closed without touching slide statuses
    ///
    /// Used when the stream ends without an explicit completion signal so
    /// callers never hang on the flags.
    pub fn force_complete(&mut self) {
        self.is_generating = false;
        self.is_generated = true;
    }
}
