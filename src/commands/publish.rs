//! Publish command: push the mirrored course to the backend

use crate::config::Config;
use crate::course::group_sessions;
use crate::error::{CourseforgeError, Result};
use crate::publish::Publisher;
use crate::store::SlideStore;

/// Publish the mirrored course
///
/// Loads the last snapshot and the persisted course metadata, then walks
/// the creation sequence. Chapter/slide failures are reported but do not
/// fail the command; a fatal failure (course, subject, module) aborts with
/// a classified error.
pub async fn run_publish(config: Config, institute: Option<String>) -> Result<()> {
    let institute_id = institute.unwrap_or_else(|| config.backend.institute_id.clone());
    if institute_id.is_empty() {
        return Err(CourseforgeError::Config(
            "no institute id configured; set backend.institute_id or pass --institute".to_string(),
        )
        .into());
    }

    let store = SlideStore::open(&config.storage.path)?;
    let Some(snapshot) = store.load_snapshot()? else {
        return Err(CourseforgeError::Publish(
            "nothing to publish: no mirrored course found".to_string(),
        )
        .into());
    };
    let metadata = store.load_metadata()?.unwrap_or_default();

    let sessions = group_sessions(&snapshot.slides);
    let publisher = Publisher::new(&config.backend.api_base, &institute_id)?;

    let report = publisher.publish(&metadata, &sessions).await?;

    println!(
        "Published course {} ({} chapters, {} slides)",
        report.course_id, report.chapters_created, report.slides_created
    );
    if !report.skipped.is_empty() {
        println!("Skipped after failures:");
        for path in &report.skipped {
            println!("  {}", path);
        }
    }

    Ok(())
}
