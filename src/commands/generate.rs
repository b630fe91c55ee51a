//! End-to-end generation command: outline, then slide content

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::course::group_sessions;
use crate::error::Result;
use crate::ingest::{ContentIngestor, ContentRequest, GenerationState, HttpContentSource};
use crate::outline::{transform, OutlineClient, OutlineRequest};
use crate::store::SlideStore;

/// Generate a course end-to-end
///
/// Streams the outline, transforms it into the slide collection, then
/// consumes the content stream until it ends, is cancelled with Ctrl-C, or
/// every slide completes. The mirror is written after every mutation so an
/// interrupted run can be inspected with `status`.
pub async fn run_generate(config: Config, prompt: String, depth: Option<u8>) -> Result<()> {
    let timeout = Duration::from_secs(config.generator.timeout_seconds);
    let depth = depth.unwrap_or(config.generator.course_depth);

    let outline_client = OutlineClient::new(&config.generator.api_base, timeout)?;
    let request = OutlineRequest::new(prompt, depth);

    println!("Generating outline...");
    let outline = outline_client
        .generate(&request, |status| println!("  {}", status))
        .await?;

    let slides = transform(&outline);
    println!(
        "Outline ready: {} chapters, {} slides",
        group_sessions(&slides).len(),
        slides.len()
    );

    let store = SlideStore::open(&config.storage.path)?;
    store.save_metadata(&outline.course_metadata)?;

    let mut state = GenerationState::new(slides);

    // Only the content phase is cancellable; Ctrl-C stops the stream and
    // leaves the mirror in its last consistent shape.
    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, cancelling content generation");
            ctrl_c_cancel.cancel();
        }
    });

    let source = HttpContentSource::new(&config.generator.api_base, timeout)?;
    let content_request = ContentRequest::from_outline(&outline)?;
    let ingestor = ContentIngestor::new(&store);

    println!("Generating slide content...");
    let summary = ingestor
        .run(&source, &content_request, &mut state, &cancel)
        .await?;

    for session in group_sessions(&state.slides) {
        println!("  {}: {}%", session.title, session.progress());
    }
    println!(
        "Content generation finished: {} updates applied, {} skipped, {} unparseable{}{}",
        summary.applied,
        summary.skipped,
        summary.parse_errors,
        if summary.cancelled { " (cancelled)" } else { "" },
        if summary.forced_completion {
            " (completion forced after stream end)"
        } else {
            ""
        },
    );

    Ok(())
}
