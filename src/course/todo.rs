//! Outline wire types: generation todos and the chapter/slide tree
//!
//! A todo is a transient unit of generation work derived from the outline
//! response. It is consumed when the outline is transformed into slides and
//! is never persisted.

use serde::{Deserialize, Serialize};

/// A pending content-generation work item from the outline response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    /// Owning chapter name, the first half of the matching key
    pub chapter_name: String,
    /// Slide title; the service emits either `title` or `name`
    #[serde(alias = "name")]
    pub title: String,
    /// Declared content type (`"DOCUMENT"`, `"QUIZ"`, ...)
    #[serde(rename = "type")]
    pub slide_type: String,
    /// Position within the chapter
    #[serde(default)]
    pub order: usize,
    /// Optional generation prompt forwarded to the content stream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl Todo {
    /// The stable matching key for the slide this todo will produce
    pub fn path(&self) -> String {
        format!("{}/{}", self.chapter_name, self.title)
    }
}

/// One node of the hierarchical course tree
///
/// The root level holds course nodes, their children are chapters, and
/// chapter children are slide leaves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineNode {
    /// Node title; the service emits either `title` or `name`
    #[serde(alias = "name")]
    pub title: String,
    /// Child nodes; empty for leaves
    #[serde(default)]
    pub children: Vec<OutlineNode>,
    /// Declared content type on slide leaves, when present
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub slide_type: Option<String>,
}
