//! Diagnostics sink
//!
//! Components that need to report something (an unknown cartridge type, a
//! bad header checksum) are handed a sink explicitly. Nothing in the core
//! keeps process-wide logger state; [`LogDiagnostics`] merely forwards to
//! whatever `log` backend the host installed.

use std::fmt;

use log::Level;

/// Destination for warnings and debug notes produced by the core.
pub trait Diagnostics {
    fn report(&mut self, level: Level, message: fmt::Arguments<'_>);

    fn warn(&mut self, message: fmt::Arguments<'_>) {
        self.report(Level::Warn, message);
    }

    fn debug(&mut self, message: fmt::Arguments<'_>) {
        self.report(Level::Debug, message);
    }
}

/// Forwards everything to the `log` facade under the `shatter` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn report(&mut self, level: Level, message: fmt::Arguments<'_>) {
        log::log!(target: "shatter", level, "{}", message);
    }
}

/// Discards every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {
    fn report(&mut self, _level: Level, _message: fmt::Arguments<'_>) {}
}

/// Keeps reports in memory so callers can inspect them.
#[derive(Debug, Default, Clone)]
pub struct RecordingDiagnostics {
    pub entries: Vec<(Level, String)>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries recorded at exactly `level`.
    pub fn count(&self, level: Level) -> usize {
        self.entries.iter().filter(|(l, _)| *l == level).count()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn report(&mut self, level: Level, message: fmt::Arguments<'_>) {
        self.entries.push((level, message.to_string()));
    }
}
