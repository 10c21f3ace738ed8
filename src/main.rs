//! pattern-learner: a learner client for a bit-level learning environment
//!
//! The environment launches learners with its port appended to the command
//! line and talks to them over a ZeroMQ PAIR socket:
//! - The learner greets with `hello`
//! - Each step the environment sends a reward, then one bit
//! - The learner answers with the next byte of its reply pattern
//!
//! Features:
//! - Configurable endpoint, pattern and cycle bound
//! - Optional receive timeout
//! - Graceful stop on Ctrl+C
//! - Configuration via CLI arguments or TOML file

mod bits;
mod client;
mod config;
mod error;
mod pattern;
mod protocol;
mod shutdown;
mod transport;

use client::Client;
use config::Config;
use shutdown::Shutdown;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(
        endpoint = %config.endpoint,
        pattern = %config.pattern,
        period = config.pattern.period(),
        max_cycles = ?config.max_cycles,
        recv_timeout_ms = ?config.recv_timeout.map(|t| t.as_millis()),
        "Starting pattern-learner"
    );

    let shutdown = Shutdown::new();
    shutdown::watch_ctrl_c(shutdown.clone())?;

    let mut client = Client::connect(&config)?;
    client.handshake()?;

    let outcome = client.serve(&shutdown)?;
    info!(?outcome, "Serve loop finished");

    let stats = client.shutdown()?;
    info!(
        cycles = stats.cycles,
        total_reward = stats.total_reward,
        positive_rewards = stats.positive_rewards,
        unparsed_rewards = stats.unparsed_rewards,
        "Session summary"
    );

    Ok(())
}
