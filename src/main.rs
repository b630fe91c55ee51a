//! Courseforge - AI course generation pipeline CLI
//!
//! Main entry point for the Courseforge application.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use courseforge::cli::{Cli, Commands};
use courseforge::commands;
use courseforge::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Generate { prompt, depth } => {
            tracing::info!("Starting end-to-end course generation");
            commands::generate::run_generate(config, prompt, depth).await?;
            Ok(())
        }
        Commands::Outline { prompt, depth, json } => {
            tracing::info!("Starting outline generation");
            commands::outline::run_outline(config, prompt, depth, json).await?;
            Ok(())
        }
        Commands::Status { json } => {
            commands::status::run_status(config, json)?;
            Ok(())
        }
        Commands::Publish { institute } => {
            tracing::info!("Starting course publish");
            commands::publish::run_publish(config, institute).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("courseforge=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
