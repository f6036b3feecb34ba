//! NRF Configuration Service
//!
//! Validated, versioned updates of the NRF configuration of one owner.
//!
//! # Core Concepts
//!
//! - [`ConfigurationService`]: every read and write operation, each returning
//!   a [`ConfigResult`](nrf_model::ConfigResult)
//! - [`UpdateStage`]: the linear pipeline an options update runs through
//! - [`ServiceConfig`]: owner identifier, entry limit, schema version
//! - [`LogLevelSink`]: receiver of log level changes requested through the
//!   system options
//! - [`ReadView`]: removal of internal state before values reach a caller
//!
//! Stores are written with the revision that was read, so a writer holding a
//! stale view gets a Conflict instead of overwriting a newer update.
//!
//! # Example
//!
//! ```rust,ignore
//! use nrf_config::{init_tracing, ConfigurationService, ServiceConfig};
//! use nrf_store::{MemoryEventLog, MemoryStore};
//!
//! let config = ServiceConfig::from_toml_str(&std::fs::read_to_string("nrf.toml")?)?;
//! let sink = Arc::new(init_tracing(config.log_level, false)?);
//! let service = ConfigurationService::new(config, Arc::new(MemoryStore::new()), Arc::new(MemoryEventLog::new()), sink)?;
//! let options = service.system_options()?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod aggregate;
mod config;
mod logging;
mod metrics;
mod service;
mod view;

pub use config::{ConfigError, ServiceConfig};
pub use logging::{init_tracing, LogLevelCommand, LogLevelSink, LoggingError, RecordingLogSink, ReloadLogSink};
pub use metrics::DB_OPERATIONS_TOTAL;
pub use service::{ConfigurationService, UpdateStage};
pub use view::ReadView;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
