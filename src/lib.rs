//! Courseforge - AI course generation pipeline library
//!
//! This library provides the core functionality for the Courseforge CLI:
//! streaming outline generation, content-stream ingestion and
//! reconciliation, local persistence, and course publishing.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `outline`: Outline generation client and outline-to-slide transform
//! - `ingest`: Content-stream consumption, slide matching, and content
//!   merge rules
//! - `course`: The slide/session/todo/metadata data model
//! - `store`: Embedded key-value mirror of the live slide collection
//! - `publish`: REST client for the content-management backend
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use courseforge::{Config, OutlineClient, OutlineRequest};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let client = OutlineClient::new(
//!         &config.generator.api_base,
//!         Duration::from_secs(config.generator.timeout_seconds),
//!     )?;
//!     let request = OutlineRequest::new("Rust for beginners", 3);
//!     let outline = client.generate(&request, |status| println!("{status}")).await?;
//!     println!("{} todos", outline.todos.len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod course;
pub mod error;
pub mod ingest;
pub mod outline;
pub mod publish;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use course::{Session, Slide, SlideContent, SlideStatus, SlideType};
pub use error::{CourseforgeError, ErrorClass, Result};
pub use ingest::{ContentIngestor, ContentSource, GenerationEvent, GenerationState};
pub use outline::{OutlineClient, OutlineRequest, OutlineResponse};
pub use publish::Publisher;
pub use store::SlideStore;
