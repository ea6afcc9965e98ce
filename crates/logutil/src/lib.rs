//! Utilities for logging.

use tracing::Level;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    HumanReadable,
    Json,
}

impl LogFormat {
    /// Parse a format from a user provided string, e.g. a command line flag.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "human" | "humanreadable" | "text" => Some(LogFormat::HumanReadable),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Build the env filter used by the global logger.
///
/// `RUST_LOG` takes precedence over the provided default level.
pub fn env_filter(default_level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy()
}

/// Install a global tracing subscriber writing to `writer`.
///
/// Only the first call installs a subscriber, later calls are ignored. Use
/// `try_configure_global_logger` to observe the failure.
pub fn configure_global_logger<W>(default_level: Level, format: LogFormat, writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let _ = try_configure_global_logger(default_level, format, writer);
}

pub fn try_configure_global_logger<W>(
    default_level: Level,
    format: LogFormat,
    writer: W,
) -> Result<(), SetGlobalDefaultError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = FmtSubscriber::builder()
        .with_env_filter(env_filter(default_level))
        .with_writer(writer)
        .with_file(true)
        .with_line_number(true);

    match format {
        LogFormat::HumanReadable => tracing::subscriber::set_global_default(builder.finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_name() {
        assert_eq!(Some(LogFormat::Json), LogFormat::from_name("JSON"));
        assert_eq!(Some(LogFormat::HumanReadable), LogFormat::from_name("human"));
        assert_eq!(None, LogFormat::from_name("xml"));
    }

    #[test]
    fn second_install_fails() {
        let _ = try_configure_global_logger(Level::ERROR, LogFormat::HumanReadable, std::io::sink);
        let res = try_configure_global_logger(Level::ERROR, LogFormat::Json, std::io::sink);
        assert!(res.is_err());
    }
}
