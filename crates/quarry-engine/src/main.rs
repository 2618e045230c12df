//! Engine binary for the Quarry agent.
//!
//! Wires the agent to the in-memory demo world and drives it until a stop
//! condition is met.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `quarry-config.yaml` (or `QUARRY_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the demo world from the configured seed
//! 4. Load agent memory and queue the startup commands
//! 5. Install the Ctrl-C stop handler
//! 6. Run the tick loop
//! 7. Save memory and log the result

mod error;
mod progress;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use quarry_agent::config::{LogFormat, LoggingConfig};
use quarry_agent::{Agent, QuarryConfig, RunControl, log_run_end, run_agent};
use quarry_world::create_demo_world;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::progress::ProgressCallback;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, logging, or memory persistence fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let config_path = QuarryConfig::path_from_env();
    let config = load_config(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!("quarry-engine starting");
    if config_path.exists() {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }
    info!(
        seed = config.agent.seed,
        tick_interval_ms = config.agent.tick_interval_ms,
        max_ticks = config.agent.max_ticks,
        max_depth = config.planner.max_depth,
        "Configuration resolved"
    );

    // 3. Build the world.
    let world = create_demo_world(config.agent.seed);
    info!(seed = config.agent.seed, "Demo world created");

    // 4. Start the agent.
    let mut agent = Agent::load(&config, world.handles()).map_err(EngineError::from)?;
    for command in config.startup_commands.iter().cloned() {
        let _ = agent.execute(command);
    }
    info!(
        startup_commands = config.startup_commands.len(),
        "Agent ready"
    );

    // 5. Stop cleanly on Ctrl-C.
    let control = Arc::new(RunControl::new(&config.agent));
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received, stopping");
                    control.request_stop();
                }
                Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
            }
        });
    }

    // 6. Run.
    let mut callback = ProgressCallback::new();
    let result = run_agent(&mut agent, &control, &mut callback).await;

    // 7. Save memory and report.
    log_run_end(&result);
    agent.shutdown().map_err(EngineError::from)?;

    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        commands_finished = callback.finished(),
        "quarry-engine shutdown complete"
    );

    Ok(())
}

/// Load the configuration at `path`, falling back to defaults (plus
/// environment overrides) when the file does not exist.
fn load_config(path: &Path) -> Result<QuarryConfig, EngineError> {
    if path.exists() {
        Ok(QuarryConfig::from_file(path)?)
    } else {
        let mut config = QuarryConfig::default();
        config.apply_env_overrides();
        Ok(config)
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_logging(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = match logging.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| EngineError::Logging {
        message: format!("{e}"),
    })
}
