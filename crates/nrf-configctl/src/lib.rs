//! NRF Configuration CLI
//!
//! Runs configuration service operations against a JSON state snapshot.
//!
//! # Core Concepts
//!
//! - [`StateSnapshot`]: stored documents and the event log, loaded into
//!   in-memory stores and written back after a successful write
//! - [`CtlCommand`]: one service call with its decoded request body
//!
//! # Example
//!
//! ```rust,ignore
//! use nrf_configctl::{CtlCommand, StateSnapshot};
//!
//! let (store, events) = StateSnapshot::load(path)?.into_stores()?;
//! let body = CtlCommand::ShowOptions.run(&service)?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod command;
mod snapshot;

pub use command::{parse_list_type, parse_status, read_body, CtlCommand};
pub use snapshot::StateSnapshot;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
