//! Loosely-typed course metadata
//!
//! Populated from the outline response, edited by the caller, and sent
//! once at publish time. Unknown fields are carried through in `extra` so
//! nothing the service attaches is lost.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Course-level metadata attached to a generation session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseMetadata {
    /// Course display name
    #[serde(default)]
    pub name: String,
    /// Course description
    #[serde(default)]
    pub description: String,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Media references (cover image, trailer, ...)
    #[serde(default)]
    pub media: Vec<String>,
    /// Passthrough for fields the backend echoes verbatim
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}
