//! Interactive console binary for the pet simulation.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `petsim-config.yaml` (or the path given as
//!    the first argument), falling back to defaults
//! 2. Initialize structured logging (tracing) to stderr
//! 3. Start the engine with the console and tracing observers
//! 4. Run the menu until the player exits, input ends, or Ctrl-C
//! 5. Shut the engine down and print the final score

mod console;
mod menu;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use petsim_core::config::{LogFormat, LoggingConfig};
use petsim_core::{Engine, SimulationConfig, TracingObserver};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::console::ConsoleObserver;
use crate::menu::Prompt;

/// Config file looked up in the working directory when no path is given.
const DEFAULT_CONFIG_PATH: &str = "petsim-config.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_tracing(&config.logging);
    info!(
        decay_interval_ms = config.engine.decay_interval_ms,
        quest_interval_ms = config.engine.quest_interval_ms,
        initial_stat = config.pets.initial_stat,
        "Configuration loaded"
    );

    let console = Arc::new(ConsoleObserver::new());
    let engine = Engine::builder(config)
        .shared_observer(Arc::clone(&console) as Arc<dyn petsim_core::SimObserver>)
        .observer(TracingObserver)
        .start()
        .context("failed to start engine")?;

    let mut prompt = Prompt::stdin()?;
    let outcome = tokio::select! {
        result = menu::run(&engine, &console, &mut prompt) => result,
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("Interrupted"),
                Err(err) => warn!(error = %err, "Failed to listen for Ctrl-C"),
            }
            Ok(())
        }
    };

    let report = engine.shutdown().await;
    println!(
        "\nGoodbye! Final points: {} ({} pets still alive)",
        report.total_points, report.pets_alive
    );
    outcome
}

/// Load configuration from the path in the first argument, or from
/// [`DEFAULT_CONFIG_PATH`] if it exists, or use the defaults.
fn load_config() -> anyhow::Result<SimulationConfig> {
    let explicit = std::env::args_os().nth(1).map(PathBuf::from);
    let path = explicit
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    if path.exists() {
        return SimulationConfig::from_file(&path)
            .with_context(|| format!("failed to load {}", path.display()));
    }
    if explicit.is_some() {
        anyhow::bail!("config file {} not found", path.display());
    }

    let mut config = SimulationConfig::default();
    config.apply_env_overrides()?;
    config.validate()?;
    Ok(config)
}

/// Install the global subscriber. `RUST_LOG` overrides the configured
/// level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
