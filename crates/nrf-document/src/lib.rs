//! NRF Configuration Documents
//!
//! Versioned documents with JSON pointer addressing and patch support.
//!
//! # Core Concepts
//!
//! - [`ConfigurationDocument`]: stored unit with key, schema version, payload and revision
//! - [`ConfigKey`]: owner plus [`ConfigKind`]
//! - [`JsonPointer`]: RFC 6901 addressing within a payload
//! - [`PatchItem`] / [`PatchApplier`]: add, remove, replace, copy, move, test
//! - [`overlay`]: partial-update merge where absent means "keep"
//!
//! # Example
//!
//! ```rust,ignore
//! use nrf_document::{PatchApplier, PatchItem};
//! use serde_json::json;
//!
//! let doc = json!({"nfScreeningRulesListStatus": "DISABLED"});
//! let item = PatchItem::replace("/nfScreeningRulesListStatus", json!("ENABLED"));
//! let next = PatchApplier::new().apply(&doc, &item)?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod document;
mod key;
mod merge;
mod patch;
mod pointer;

pub use document::{ConfigurationDocument, DocumentError, SchemaVersion, EXTENSION_BAG_FIELD};
pub use key::{ConfigKey, ConfigKind, OwnerId};
pub use merge::overlay;
pub use patch::{PatchApplier, PatchError, PatchItem, PatchOperation};
pub use pointer::{parse_index, JsonPointer, PointerError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
