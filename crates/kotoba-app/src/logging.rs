//! Structured logging to stderr.
//!
//! Stdout belongs to the terminal UI, so every layer writes to stderr.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{LogFormatArg, LogLevelArg};

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormatArg,
    pub with_ansi: bool,
}

impl LogConfig {
    /// Interactive sessions stay quiet unless asked; one-shot runs log progress.
    pub fn new(level: Option<LogLevelArg>, format: LogFormatArg, interactive: bool) -> Self {
        let level = match level {
            Some(LogLevelArg::Error) => Level::ERROR,
            Some(LogLevelArg::Warn) => Level::WARN,
            Some(LogLevelArg::Info) => Level::INFO,
            Some(LogLevelArg::Debug) => Level::DEBUG,
            Some(LogLevelArg::Trace) => Level::TRACE,
            None if interactive => Level::WARN,
            None => Level::INFO,
        };
        Self {
            level,
            format,
            with_ansi: atty::is(atty::Stream::Stderr),
        }
    }
}

pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let filter = build_env_filter(config.level);
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormatArg::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormatArg::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_ansi(config.with_ansi)
                    .with_target(false),
            )
            .try_init(),
        LogFormatArg::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr)
                    .with_ansi(config.with_ansi),
            )
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level.as_str().to_ascii_lowercase();
        EnvFilter::new(format!(
            "warn,kotoba={level},kotoba_analyzer={level},kotoba_capture={level},kotoba_core={level},kotoba_ui={level}"
        ))
    })
}
