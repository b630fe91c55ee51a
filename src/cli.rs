//! Command-line interface definition for Courseforge
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for outline generation, full course generation,
//! status inspection, and publishing.

use clap::{Parser, Subcommand};

/// Courseforge - AI course generation pipeline
///
/// Stream a course outline and its slide content from a generation
/// service, mirror progress locally, and publish the finished course.
#[derive(Parser, Debug, Clone)]
#[command(name = "courseforge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the mirror database path
    #[arg(long, env = "COURSEFORGE_STORAGE_PATH")]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Courseforge
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate a course end-to-end: outline, then slide content
    Generate {
        /// The course description sent to the generation service
        #[arg(short, long)]
        prompt: String,

        /// Override the configured course depth (1-10)
        #[arg(short, long)]
        depth: Option<u8>,
    },

    /// Generate only the outline and print the resulting plan
    Outline {
        /// The course description sent to the generation service
        #[arg(short, long)]
        prompt: String,

        /// Override the configured course depth (1-10)
        #[arg(short, long)]
        depth: Option<u8>,

        /// Print the raw outline as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the mirrored generation state and per-chapter progress
    Status {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Publish the mirrored course to the content-management backend
    Publish {
        /// Override the configured institute id
        #[arg(short, long)]
        institute: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            storage_path: None,
            command: Commands::Status { json: false },
        }
    }
}
