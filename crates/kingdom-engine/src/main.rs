//! Engine binary for Kingdom Builder.
//!
//! Wires configuration, content and a session together and drives a short
//! scripted game through the session queue, the same way the transport
//! layer would. The final snapshot is written to stdout as JSON.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `kingdom-config.yaml` (or the path given as
//!    the first argument)
//! 2. Initialize structured logging (tracing)
//! 3. Load and validate the content document
//! 4. Start the session and wrap it in a queue handle
//! 5. Play the scripted turns
//! 6. Print the final snapshot

mod script;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use kingdom_core::{EngineConfig, GameSession, SessionHandle};
use kingdom_effects::ContentRegistry;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Default location of the engine configuration.
const DEFAULT_CONFIG_PATH: &str = "kingdom-config.yaml";

/// Number of full turns the scripted game plays.
const SCRIPTED_TURNS: u32 = 3;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration or content cannot be loaded, or if
/// the session fails while playing.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration (logging depends on it).
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = load_config(&config_path)?;

    // 2. Initialize structured logging. RUST_LOG wins over the config.
    init_tracing(&config);
    info!(
        config = %config_path.display(),
        players = config.players.len(),
        phases = config.phases.len(),
        "kingdom-engine starting"
    );

    // 3. Load content.
    let content = ContentRegistry::from_file(&config.content.path)
        .with_context(|| format!("loading content from {}", config.content.path.display()))?;

    // 4. Start the session.
    let session = GameSession::new(config, content).context("starting session")?;
    let handle = SessionHandle::new(session);
    info!(session_id = %handle.id(), "Session ready");

    // 5. Play.
    script::play(&handle, SCRIPTED_TURNS).await?;

    // 6. Report.
    let snapshot = handle.latest_snapshot();
    info!(
        turn = snapshot.game.turn,
        recent_gains = snapshot.recent_gains.len(),
        "Scripted game finished"
    );
    let json = serde_json::to_string_pretty(&snapshot).context("serializing snapshot")?;
    println!("{json}");
    Ok(())
}

/// Load configuration, falling back to defaults when the file is absent.
fn load_config(path: &Path) -> anyhow::Result<EngineConfig> {
    if path.exists() {
        EngineConfig::from_file(path).with_context(|| format!("loading {}", path.display()))
    } else {
        let mut config = EngineConfig::default();
        config.content.apply_env_overrides();
        Ok(config)
    }
}

fn init_tracing(config: &EngineConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
