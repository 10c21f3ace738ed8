//! Configuration module for pattern-learner.
//!
//! Supports both command-line arguments and TOML configuration file.
//! CLI arguments take precedence over config file values.

use crate::pattern::{Pattern, PatternError};
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for the learner
#[derive(Parser, Debug)]
#[command(name = "pattern-learner")]
#[command(author = "pattern-learner authors")]
#[command(version = "0.1.0")]
#[command(about = "A ZeroMQ PAIR learner that replies with a cycling bit pattern", long_about = None)]
pub struct CliArgs {
    /// Environment port on localhost (the environment appends it when launching learners)
    pub port: Option<u16>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Endpoint to connect to (e.g., tcp://localhost:5556)
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Reply pattern, one byte sent per cycle
    #[arg(short, long, conflicts_with = "reply_text")]
    pub pattern: Option<String>,

    /// Text whose bit encoding is used as the reply pattern
    #[arg(long)]
    pub reply_text: Option<String>,

    /// Stop after this many replies (runs until Ctrl+C if unset)
    #[arg(short = 'n', long)]
    pub max_cycles: Option<u64>,

    /// Fail if a message takes longer than this to arrive (milliseconds)
    #[arg(long)]
    pub recv_timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Client-related configuration
#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    /// Endpoint to connect to
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Reply pattern
    pub pattern: Option<String>,
    /// Text to encode as the reply pattern
    pub reply_text: Option<String>,
    /// Stop after this many replies
    pub max_cycles: Option<u64>,
    /// Receive timeout in milliseconds
    pub recv_timeout_ms: Option<u64>,
    /// How often a blocked receive checks for shutdown, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// How long unsent messages survive socket close, in milliseconds
    #[serde(default = "default_linger_ms")]
    pub linger_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            pattern: None,
            reply_text: None,
            max_cycles: None,
            recv_timeout_ms: None,
            poll_interval_ms: default_poll_interval_ms(),
            linger_ms: default_linger_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_endpoint() -> String {
    "tcp://localhost:5556".to_string()
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_linger_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: String,
    pub pattern: Pattern,
    pub max_cycles: Option<u64>,
    pub recv_timeout: Option<Duration>,
    pub poll_interval: Duration,
    pub linger: Duration,
    pub log_level: String,
}

impl Config {
    /// Load configuration from CLI args and optional TOML file.
    /// CLI arguments take precedence over TOML file values.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_args(CliArgs::parse())
    }

    pub fn from_args(cli: CliArgs) -> Result<Self, ConfigError> {
        // Load TOML config if specified
        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        Self::merge(cli, toml_config)
    }

    fn merge(cli: CliArgs, toml_config: TomlConfig) -> Result<Self, ConfigError> {
        let client = toml_config.client;

        // An explicit endpoint beats the positional port, which beats the file
        let endpoint = match (cli.endpoint, cli.port) {
            (Some(endpoint), _) => endpoint,
            (None, Some(port)) => format!("tcp://localhost:{port}"),
            (None, None) => client.endpoint,
        };

        // A pattern given on the command line replaces both file options
        let pattern = if cli.pattern.is_some() || cli.reply_text.is_some() {
            resolve_pattern(cli.pattern, cli.reply_text)
        } else {
            resolve_pattern(client.pattern, client.reply_text)
        }
        .map_err(ConfigError::Pattern)?;

        Ok(Config {
            endpoint,
            pattern,
            max_cycles: cli.max_cycles.or(client.max_cycles),
            recv_timeout: cli
                .recv_timeout_ms
                .or(client.recv_timeout_ms)
                .map(Duration::from_millis),
            poll_interval: Duration::from_millis(client.poll_interval_ms.max(1)),
            linger: Duration::from_millis(client.linger_ms),
            log_level: cli.log_level.unwrap_or(toml_config.logging.level),
        })
    }
}

fn resolve_pattern(
    pattern: Option<String>,
    reply_text: Option<String>,
) -> Result<Pattern, PatternError> {
    match (pattern, reply_text) {
        (Some(pattern), _) => Pattern::new(pattern.into_bytes()),
        (None, Some(text)) => Pattern::from_text(&text),
        (None, None) => Ok(Pattern::default()),
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
    Pattern(PatternError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::Pattern(e) => write!(f, "Invalid reply pattern: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
