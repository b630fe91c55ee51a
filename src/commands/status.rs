//! Status command: inspect the mirrored snapshot

use crate::config::Config;
use crate::course::group_sessions;
use crate::error::Result;
use crate::store::SlideStore;

/// Print the mirrored generation state and per-chapter progress
pub fn run_status(config: Config, json: bool) -> Result<()> {
    let store = SlideStore::open(&config.storage.path)?;

    let Some(snapshot) = store.load_snapshot()? else {
        println!("No mirrored course found at {}", config.storage.path);
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!(
        "Snapshot from {} ({})",
        snapshot.saved_at,
        if store.is_generating()? {
            "generation in progress"
        } else {
            "idle"
        }
    );

    for session in group_sessions(&snapshot.slides) {
        println!("{}: {}%", session.title, session.progress());
        for slide in &session.slides {
            println!(
                "  [{:?}] {} ({}%, {})",
                slide.status, slide.title, slide.progress, slide.slide_type
            );
        }
    }

    Ok(())
}
