//! Subscriber setup for library diagnostics.
//!
//! Events are filtered by [`LOG_ENV`] when set, else by [`LogSettings::level`]
//! for this crate only, and written to a [`LogTarget`]. The demo draws in the
//! alternate screen, so it routes everything into a [`DiagnosticLog`] pane
//! instead of stderr.

use std::io::{self, Write};

use tracing::Level;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;

use crate::diagnostics::{self, DiagnosticLog, DiagnosticWriter};

/// Environment variable holding an `EnvFilter` directive, e.g.
/// `float_wm=trace`.
pub const LOG_ENV: &str = "FLOAT_WM_LOG";

/// Where formatted events go.
#[derive(Clone, Debug, Default)]
pub enum LogTarget {
    Diagnostics(DiagnosticLog),
    Stderr,
    #[default]
    Discard,
}

impl LogTarget {
    /// The globally registered log, or stderr when none is registered.
    pub fn from_global() -> Self {
        diagnostics::global().map_or(LogTarget::Stderr, LogTarget::Diagnostics)
    }
}

pub enum LogWriter {
    Diagnostics(DiagnosticWriter),
    Stderr(io::Stderr),
    Discard(io::Sink),
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogWriter::Diagnostics(w) => w.write(buf),
            LogWriter::Stderr(w) => w.write(buf),
            LogWriter::Discard(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogWriter::Diagnostics(w) => w.flush(),
            LogWriter::Stderr(w) => w.flush(),
            LogWriter::Discard(w) => w.flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for LogTarget {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        match self {
            LogTarget::Diagnostics(log) => LogWriter::Diagnostics(log.writer()),
            LogTarget::Stderr => LogWriter::Stderr(io::stderr()),
            LogTarget::Discard => LogWriter::Discard(io::sink()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogSettings {
    pub level: Level,
    pub target: LogTarget,
    /// Read [`LOG_ENV`] before falling back to `level`.
    pub from_env: bool,
}

impl LogSettings {
    pub fn new(target: LogTarget) -> Self {
        Self {
            level: Level::DEBUG,
            target,
            from_env: true,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    fn filter(&self) -> EnvFilter {
        let directive = format!("float_wm={}", self.level.as_str().to_lowercase());
        let fallback = || EnvFilter::new(&directive);
        if self.from_env {
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| fallback())
        } else {
            fallback()
        }
    }
}

/// Build the subscriber without installing it.
pub fn subscriber(settings: LogSettings) -> impl Subscriber + Send + Sync {
    let filter = settings.filter();
    tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .compact()
            .with_writer(settings.target)
            .with_target(false)
            .with_thread_names(false)
            .with_ansi(false),
    )
}

/// Install the subscriber globally. Later calls are no-ops.
pub fn init(settings: LogSettings) {
    let _ = tracing::subscriber::set_global_default(subscriber(settings));
}

/// Debug-level logging into the global diagnostic log, or stderr.
pub fn init_default() {
    init(LogSettings::new(LogTarget::from_global()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(log: &DiagnosticLog, level: Level) -> LogSettings {
        LogSettings {
            from_env: false,
            ..LogSettings::new(LogTarget::Diagnostics(log.clone())).with_level(level)
        }
    }

    #[test]
    fn events_land_in_the_diagnostic_log() {
        let log = DiagnosticLog::new(16);
        tracing::subscriber::with_default(subscriber(settings(&log, Level::DEBUG)), || {
            tracing::warn!(buffer = 3, "host batch aborted");
            tracing::trace!("filtered out");
        });
        let lines = log.tail(16);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("host batch aborted"));
        assert!(lines[0].contains("buffer=3"));
    }

    #[test]
    fn other_crates_are_filtered() {
        let log = DiagnosticLog::new(16);
        tracing::subscriber::with_default(subscriber(settings(&log, Level::TRACE)), || {
            tracing::error!(target: "some_dependency", "noise");
        });
        assert!(log.is_empty());
    }
}
