//! Process log level control
//!
//! A system-options update that names a log level different from the current
//! one is forwarded to a [`LogLevelSink`]. [`ReloadLogSink`] swaps the filter
//! of the installed `tracing` subscriber; [`RecordingLogSink`] only remembers
//! what it was asked to do.

use nrf_model::LogLevel;
use parking_lot::{Mutex, RwLock};
use std::fmt::{self, Debug, Formatter};
use tracing_subscriber::{
    filter::EnvFilter, fmt as tracing_fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, Registry,
};

/// Request to change the process log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLevelCommand {
    pub level: LogLevel,
}

impl LogLevelCommand {
    #[inline]
    #[must_use]
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// Filter directive for the level
    #[inline]
    #[must_use]
    pub fn directive(&self) -> &'static str {
        self.level.as_directive()
    }
}

/// Log level errors
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to install subscriber: {0}")]
    Install(String),

    #[error("failed to reload log filter: {0}")]
    Reload(String),
}

/// Receiver of log level changes
pub trait LogLevelSink: Send + Sync + Debug {
    /// Level currently in effect
    fn current_level(&self) -> LogLevel;

    /// Apply a level change
    ///
    /// # Errors
    /// Returns error if the change cannot be applied
    fn apply(&self, command: &LogLevelCommand) -> Result<(), LoggingError>;
}

/// Sink that records commands without touching the subscriber
#[derive(Debug)]
pub struct RecordingLogSink {
    level: RwLock<LogLevel>,
    commands: Mutex<Vec<LogLevelCommand>>,
}

impl RecordingLogSink {
    #[must_use]
    pub fn new(initial: LogLevel) -> Self {
        Self {
            level: RwLock::new(initial),
            commands: Mutex::new(Vec::new()),
        }
    }

    /// Commands applied so far, oldest first
    #[must_use]
    pub fn commands(&self) -> Vec<LogLevelCommand> {
        self.commands.lock().clone()
    }
}

impl LogLevelSink for RecordingLogSink {
    fn current_level(&self) -> LogLevel {
        *self.level.read()
    }

    fn apply(&self, command: &LogLevelCommand) -> Result<(), LoggingError> {
        *self.level.write() = command.level;
        self.commands.lock().push(*command);
        Ok(())
    }
}

/// Sink backed by a reloadable `tracing` filter
pub struct ReloadLogSink {
    level: RwLock<LogLevel>,
    handle: reload::Handle<EnvFilter, Registry>,
}

impl Debug for ReloadLogSink {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReloadLogSink").field("level", &*self.level.read()).finish_non_exhaustive()
    }
}

impl LogLevelSink for ReloadLogSink {
    fn current_level(&self) -> LogLevel {
        *self.level.read()
    }

    fn apply(&self, command: &LogLevelCommand) -> Result<(), LoggingError> {
        self.handle
            .reload(EnvFilter::new(command.directive()))
            .map_err(|e| LoggingError::Reload(e.to_string()))?;
        *self.level.write() = command.level;
        Ok(())
    }
}

/// Install the global subscriber with a reloadable level filter
///
/// Output goes to stderr.
///
/// # Errors
/// Returns error if a global subscriber is already installed
pub fn init_tracing(initial: LogLevel, json: bool) -> Result<ReloadLogSink, LoggingError> {
    let (filter, handle) = reload::Layer::new(EnvFilter::new(initial.as_directive()));
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_fmt::layer().with_target(false).with_writer(std::io::stderr)))
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))?;
    Ok(ReloadLogSink {
        level: RwLock::new(initial),
        handle,
    })
}
