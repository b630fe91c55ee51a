//! Slide matching for incoming content events
//!
//! Events identify slides by a display-title path. The primary lookup is
//! the stable `path` key assigned at outline time; beneath it sit three
//! cascading heuristic tiers for titles that drifted between the outline
//! and the content stream: exact, case-insensitive, then fuzzy substring
//! containment. Tiers are attempted strictly in order over the whole
//! collection, so a unique exact triple can never fall through to a fuzzy
//! hit on some other slide.

use crate::course::{Slide, SlideType};
use crate::ingest::events::split_path;

/// Locate the slide an event refers to
///
/// # Arguments
///
/// * `slides` - The live slide collection
/// * `path` - The event's matching key, `"{chapter}/{title}"`
/// * `declared` - The event's declared type, when it mapped to a known
///   slide type; `None` skips the type check (error events may omit it)
///
/// # Returns
///
/// The index of the first slide matched by the highest tier that produced
/// any match, or `None` when every tier misses.
pub fn find_slide(slides: &[Slide], path: &str, declared: Option<SlideType>) -> Option<usize> {
    let (chapter, title) = split_path(path);

    // Primary: stable path key.
    if let Some(index) = slides
        .iter()
        .position(|s| s.path == path && type_matches(s, declared))
    {
        return Some(index);
    }

    // Tier 1: exact chapter + title.
    if let Some(index) = slides.iter().position(|s| {
        chapter.map_or(true, |c| s.chapter == c) && s.title == title && type_matches(s, declared)
    }) {
        return Some(index);
    }

    // Tier 2: case-insensitive.
    if let Some(index) = slides.iter().position(|s| {
        chapter.map_or(true, |c| s.chapter.eq_ignore_ascii_case(c))
            && s.title.eq_ignore_ascii_case(title)
            && type_matches(s, declared)
    }) {
        return Some(index);
    }

    // Tier 3: fuzzy substring containment in either direction.
    slides.iter().position(|s| {
        chapter.map_or(true, |c| fuzzy_matches(&s.chapter, c))
            && fuzzy_matches(&s.title, title)
            && type_matches(s, declared)
    })
}

fn type_matches(slide: &Slide, declared: Option<SlideType>) -> bool {
    declared.map_or(true, |d| d == slide.slide_type)
}

/// Case-insensitive equality, or substring containment in either direction
fn fuzzy_matches(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a == b || a.contains(&b) || b.contains(&a)
}
