//! Outline-only command: generate and print the plan

use std::time::Duration;

use crate::config::Config;
use crate::course::group_sessions;
use crate::error::Result;
use crate::outline::{transform, OutlineClient, OutlineRequest};

/// Generate the outline and print the resulting plan
pub async fn run_outline(config: Config, prompt: String, depth: Option<u8>, json: bool) -> Result<()> {
    let timeout = Duration::from_secs(config.generator.timeout_seconds);
    let depth = depth.unwrap_or(config.generator.course_depth);

    let client = OutlineClient::new(&config.generator.api_base, timeout)?;
    let request = OutlineRequest::new(prompt, depth);

    let outline = client
        .generate(&request, |status| println!("  {}", status))
        .await?;

    let slides = transform(&outline);

    if json {
        println!("{}", serde_json::to_string_pretty(&slides)?);
        return Ok(());
    }

    if !outline.course_metadata.name.is_empty() {
        println!("Course: {}", outline.course_metadata.name);
    }
    if let Some(explanation) = &outline.explanation {
        println!("{}", explanation);
    }
    for session in group_sessions(&slides) {
        println!("{}", session.title);
        for slide in &session.slides {
            let marker = if slide.placeholder { " (placeholder)" } else { "" };
            println!("  [{}] {}{}", slide.slide_type, slide.title, marker);
        }
    }

    Ok(())
}
