//! Logging set-up using `tracing-subscriber`.
//!
//! Log levels:
//!
//! - `warn`: skipped seasons, drivers and races (default)
//! - `info`: pipeline stage progress with counts (`-v`)
//! - `debug`: every remote call (`-vv`)
//! - `trace`: everything else (`-vvv`)
//!
//! `RUST_LOG` replaces the level chosen on the command line.

use clap::ValueEnum;
use std::io::{self, IsTerminal};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Logging options.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LogConfig {
    pub(crate) level: Level,
    pub(crate) format: LogFormat,
    pub(crate) with_ansi: bool,
}

impl LogConfig {
    /// Level from the number of `-v` flags.
    pub(crate) fn from_verbosity(verbosity: u8, format: LogFormat) -> Self {
        let level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            format,
            with_ansi: io::stderr().is_terminal(),
        }
    }

    /// Whether log lines would interleave with progress spinners.
    pub(crate) fn is_quiet(&self) -> bool {
        self.level == Level::WARN && std::env::var_os("RUST_LOG").is_none()
    }
}

/// Install the global subscriber, writing to stderr.
pub(crate) fn init_logging(config: &LogConfig) {
    let filter = build_env_filter(config.level);

    match config.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_target(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .init();
        }
        LogFormat::Text => {
            let layer = fmt::layer()
                .compact()
                .with_writer(io::stderr)
                .with_ansi(config.with_ansi)
                .with_target(false)
                .without_time();
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .init();
        }
    }
}

/// Filter at `level` for podium crates, `warn` for dependencies.
fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,podium={level},podium_data={level},podium_output={level}",
            level = level.as_str().to_lowercase()
        ))
    })
}
