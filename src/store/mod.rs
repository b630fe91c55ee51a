//! Persistence mirror for the live slide collection
//!
//! After every slide mutation the entire collection is serialized into an
//! embedded `sled` database under a fixed key, alongside the
//! `is_generating` flag. This is the only durability mechanism: writes are
//! best-effort, synchronous, last-write-wins, with no transaction spanning
//! the in-memory state and the mirrored copy. The snapshot feeds reload
//! recovery (`status`, `publish`) and the matcher's fallback scan.

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sled::Db;

use crate::course::{CourseMetadata, Slide};
use crate::error::{CourseforgeError, Result};

/// Fixed key holding the serialized slide collection
const SLIDES_KEY: &str = "slides";
/// Fixed key holding the "is generating" flag
const GENERATING_KEY: &str = "is_generating";
/// Fixed key holding course metadata for publish-after-reload
const METADATA_KEY: &str = "course_metadata";

/// A persisted copy of the slide collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideSnapshot {
    /// RFC-3339 write timestamp
    pub saved_at: String,
    /// The mirrored slides
    pub slides: Vec<Slide>,
}

/// Embedded key-value mirror of the generation state
pub struct SlideStore {
    db: Db,
}

impl SlideStore {
    /// Open or create the store at `path`
    ///
    /// # Errors
    ///
    /// Returns [`CourseforgeError::Storage`] if the database cannot be
    /// opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path)
            .map_err(|e| CourseforgeError::Storage(format!("failed to open database: {}", e)))?;
        Ok(Self { db })
    }

    /// Mirror the slide collection and the generating flag
    ///
    /// # Errors
    ///
    /// Returns [`CourseforgeError::Storage`] if serialization or the write
    /// fails. Callers treat failures as best-effort and keep running.
    pub fn mirror(&self, slides: &[Slide], is_generating: bool) -> Result<()> {
        let snapshot = SlideSnapshot {
            saved_at: Utc::now().to_rfc3339(),
            slides: slides.to_vec(),
        };
        let value = serde_json::to_vec(&snapshot)
            .map_err(|e| CourseforgeError::Storage(format!("serialization failed: {}", e)))?;

        self.db
            .insert(SLIDES_KEY, value)
            .map_err(|e| CourseforgeError::Storage(format!("insert failed: {}", e)))?;
        self.db
            .insert(GENERATING_KEY, vec![u8::from(is_generating)])
            .map_err(|e| CourseforgeError::Storage(format!("insert failed: {}", e)))?;
        self.db
            .flush()
            .map_err(|e| CourseforgeError::Storage(format!("flush failed: {}", e)))?;

        Ok(())
    }

    /// Load the last mirrored snapshot, if any
    pub fn load_snapshot(&self) -> Result<Option<SlideSnapshot>> {
        match self
            .db
            .get(SLIDES_KEY)
            .map_err(|e| CourseforgeError::Storage(format!("get failed: {}", e)))?
        {
            Some(bytes) => {
                let snapshot = serde_json::from_slice(&bytes).map_err(|e| {
                    CourseforgeError::Storage(format!("deserialization failed: {}", e))
                })?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    /// Read the mirrored generating flag; absent means not generating
    pub fn is_generating(&self) -> Result<bool> {
        let flag = self
            .db
            .get(GENERATING_KEY)
            .map_err(|e| CourseforgeError::Storage(format!("get failed: {}", e)))?
            .map(|bytes| bytes.first() == Some(&1))
            .unwrap_or(false);
        Ok(flag)
    }

    /// Persist course metadata for publish-after-reload
    pub fn save_metadata(&self, metadata: &CourseMetadata) -> Result<()> {
        let value = serde_json::to_vec(metadata)
            .map_err(|e| CourseforgeError::Storage(format!("serialization failed: {}", e)))?;
        self.db
            .insert(METADATA_KEY, value)
            .map_err(|e| CourseforgeError::Storage(format!("insert failed: {}", e)))?;
        self.db
            .flush()
            .map_err(|e| CourseforgeError::Storage(format!("flush failed: {}", e)))?;
        Ok(())
    }

    /// Load persisted course metadata, if any
    pub fn load_metadata(&self) -> Result<Option<CourseMetadata>> {
        match self
            .db
            .get(METADATA_KEY)
            .map_err(|e| CourseforgeError::Storage(format!("get failed: {}", e)))?
        {
            Some(bytes) => {
                let metadata = serde_json::from_slice(&bytes).map_err(|e| {
                    CourseforgeError::Storage(format!("deserialization failed: {}", e))
                })?;
                Ok(Some(metadata))
            }
            None => Ok(None),
        }
    }

    /// Remove all mirrored state
    pub fn clear(&self) -> Result<()> {
        for key in [SLIDES_KEY, GENERATING_KEY, METADATA_KEY] {
            self.db
                .remove(key)
                .map_err(|e| CourseforgeError::Storage(format!("remove failed: {}", e)))?;
        }
        self.db
            .flush()
            .map_err(|e| CourseforgeError::Storage(format!("flush failed: {}", e)))?;
        Ok(())
    }
}
