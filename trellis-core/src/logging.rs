//! Logging configuration for applications embedding the registration layer.
//!
//! Defaults to JSON output on STDOUT. Access-log records emitted by the
//! route compiler use the `trellis::access` target and can be filtered
//! independently via `RUST_LOG`.

use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// Re-export the macros applications log with
pub use tracing::{debug, error, info, trace, warn};

/// Log level for filtering messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Output format for log records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Structured JSON, one record per line (default)
    Json,
    /// Human-readable multi-line output
    Pretty,
    /// Single-line human-readable output
    Compact,
}

/// Where log records are written
#[derive(Debug, Clone)]
pub enum LogOutput {
    Stdout,
    Stderr,
    /// Daily-rotated file under `directory` with the given `prefix`
    RollingFile {
        directory: String,
        prefix: String,
    },
}

/// Logging configuration builder
#[derive(Debug, Clone)]
pub struct LogConfig {
    level: LogLevel,
    format: LogFormat,
    output: LogOutput,
    with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Json,
            output: LogOutput::Stdout,
            with_target: true,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_targets(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    /// Install the global subscriber.
    ///
    /// Returns a guard that must be kept alive when logging to a rolling
    /// file; dropping it flushes and stops the background writer. Calling
    /// `init` when a subscriber is already installed is a no-op, which keeps
    /// repeated initialization in tests harmless.
    pub fn init(self) -> Option<WorkerGuard> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_str()));

        let (writer, guard) = match self.output {
            LogOutput::Stdout => (BoxMakeWriter::new(io::stdout), None),
            LogOutput::Stderr => (BoxMakeWriter::new(io::stderr), None),
            LogOutput::RollingFile { directory, prefix } => {
                let appender = tracing_appender::rolling::daily(directory, prefix);
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);
                (BoxMakeWriter::new(non_blocking), Some(guard))
            }
        };

        let base = fmt::layer()
            .with_writer(writer)
            .with_target(self.with_target);

        let layer = match self.format {
            LogFormat::Json => base.json().boxed(),
            LogFormat::Pretty => base.pretty().boxed(),
            LogFormat::Compact => base.compact().boxed(),
        };

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init();

        guard
    }
}
