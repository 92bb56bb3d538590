use std::sync::Arc;

use blessing::cli::{Cli, Commands, Context};
use blessing::notifications::{NotificationScheduler, install_handler};
use blessing::storage::KeyValueStore;
use blessing::{Config, Database, Profile, utils};
use clap::Parser;
use color_eyre::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from_path(&utils::expand_path(path), profile)?,
        None => Config::load_with_profile(profile)?,
    };

    // Process-wide notification presentation, registered once at startup
    install_handler(config.notifications.behavior());

    let db_path = config.get_database_path();
    let db = Database::new(
        db_path
            .to_str()
            .ok_or_else(|| color_eyre::eyre::eyre!("Database path contains invalid UTF-8"))?,
    )?;

    let store: Arc<dyn KeyValueStore> = Arc::new(db.clone());
    let scheduler: Arc<dyn NotificationScheduler> = Arc::new(db);
    let ctx = Context {
        config,
        store,
        scheduler,
    };

    let command = cli.command.unwrap_or(Commands::Today);
    blessing::cli::run(command, &ctx).await?;

    Ok(())
}

/// Logs go to stderr so command output stays clean; RUST_LOG overrides the level
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("blessing=info,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
