//! Chapter (session) grouping and derived progress
//!
//! Sessions are purely derived from the flat slide list; there is no
//! independent storage. Aggregate progress counts completed slides plus the
//! proportional progress of slides still generating, over the
//! non-placeholder slide count.

use serde::{Deserialize, Serialize};

use crate::course::slide::{Slide, SlideStatus};

/// An ordered group of slides under one chapter title
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Chapter title
    pub title: String,
    /// Slides in chapter order
    pub slides: Vec<Slide>,
}

impl Session {
    /// Derived aggregate progress, 0-100
    ///
    /// `round(100 * (completed + Σ generating_progress/100) / non_placeholder_count)`.
    /// A session with no content-bearing slides reports 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use courseforge::course::{Session, Slide, SlideStatus, SlideType};
    ///
    /// let mut s1 = Slide::new("Ch1", "A", SlideType::Document, 0);
    /// s1.status = SlideStatus::Completed;
    /// let mut s2 = Slide::new("Ch1", "B", SlideType::Document, 1);
    /// s2.status = SlideStatus::Generating;
    /// s2.progress = 50;
    /// let s3 = Slide::new("Ch1", "C", SlideType::Document, 2);
    ///
    /// let session = Session { title: "Ch1".to_string(), slides: vec![s1, s2, s3] };
    /// assert_eq!(session.progress(), 50);
    /// ```
    pub fn progress(&self) -> u8 {
        let bearing: Vec<&Slide> = self
            .slides
            .iter()
            .filter(|s| s.is_content_bearing())
            .collect();
        if bearing.is_empty() {
            return 0;
        }

        let mut weight = 0.0f64;
        for slide in &bearing {
            match slide.status {
                SlideStatus::Completed => weight += 1.0,
                SlideStatus::Generating => weight += f64::from(slide.progress) / 100.0,
                SlideStatus::Pending => {}
            }
        }

        (weight / bearing.len() as f64 * 100.0).round() as u8
    }

    /// True once every content-bearing slide in the session is completed
    pub fn is_complete(&self) -> bool {
        self.slides
            .iter()
            .filter(|s| s.is_content_bearing())
            .all(|s| s.status == SlideStatus::Completed)
    }
}

/// Group a flat slide list into sessions, preserving first-appearance
/// chapter order and per-chapter slide order
pub fn group_sessions(slides: &[Slide]) -> Vec<Session> {
    let mut sessions: Vec<Session> = Vec::new();
    for slide in slides {
        match sessions.iter_mut().find(|s| s.title == slide.chapter) {
            Some(session) => session.slides.push(slide.clone()),
            None => sessions.push(Session {
                title: slide.chapter.clone(),
                slides: vec![slide.clone()],
            }),
        }
    }
    for session in &mut sessions {
        session.slides.sort_by_key(|s| s.order);
    }
    sessions
}
