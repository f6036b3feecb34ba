//! NRF Configuration Storage
//!
//! Storage seams for configuration documents and recorded events.
//!
//! # Core Concepts
//!
//! - [`DocumentStore`]: find, save with a [`WriteExpectation`], atomic batch save
//! - [`EventLog`]: read-only view of recorded NF events
//! - [`MemoryStore`] / [`MemoryEventLog`]: in-process implementations
//!
//! # Example
//!
//! ```rust,ignore
//! use nrf_store::{DocumentStore, MemoryStore, WriteExpectation, WriteRequest};
//!
//! let store = MemoryStore::new();
//! let prior = store.find(&key)?;
//! store.save(WriteRequest::new(next, WriteExpectation::from_prior(prior.as_ref())))?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod memory;
mod store;

pub use error::StoreError;
pub use memory::{MemoryEventLog, MemoryStore};
pub use store::{DocumentStore, EventLog, WriteExpectation, WriteRequest};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
