//! Persisted configuration documents
//!
//! A [`ConfigurationDocument`] is the unit of storage: a key, a schema version
//! tag, an opaque JSON payload, a last-update timestamp and a revision used
//! for optimistic concurrency.

use crate::key::ConfigKey;
use nrf_model::{ExtensionBag, FeatureStatus};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};

/// Payload field holding the extension bag
pub const EXTENSION_BAG_FIELD: &str = "additionalAttributes";

/// Schema version tag carried by every document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaVersion(String);

impl SchemaVersion {
    /// Version written by this build
    pub const CURRENT: &'static str = "v1";

    #[inline]
    #[must_use]
    pub fn current() -> Self {
        Self(Self::CURRENT.to_string())
    }

    #[inline]
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Versions this build can decode
    #[inline]
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.0 == Self::CURRENT
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::current()
    }
}

impl Display for SchemaVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationDocument {
    key: ConfigKey,
    #[serde(default)]
    schema_version: SchemaVersion,
    payload: Value,
    last_update_ms: i64,
    /// Rule list status column, screening documents only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<FeatureStatus>,
    /// 0 until stored; bumped by the store on every write
    #[serde(default)]
    revision: u64,
}

impl ConfigurationDocument {
    /// Create a fresh (never stored) document stamped with the current time
    #[must_use]
    pub fn new(key: ConfigKey, payload: Value) -> Self {
        Self {
            key,
            schema_version: SchemaVersion::current(),
            payload,
            last_update_ms: chrono::Utc::now().timestamp_millis(),
            status: None,
            revision: 0,
        }
    }

    /// Serialize a typed value into a fresh document
    ///
    /// # Errors
    /// Returns error if the value cannot be represented as JSON
    pub fn from_typed<T: Serialize>(key: ConfigKey, value: &T) -> Result<Self, DocumentError> {
        let payload = serde_json::to_value(value).map_err(|source| DocumentError::Encode {
            key: key.clone(),
            source,
        })?;
        Ok(Self::new(key, payload))
    }

    /// Decode the payload into a typed value
    ///
    /// # Errors
    /// Returns error on an unsupported schema version or a payload that does
    /// not match `T`
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, DocumentError> {
        if !self.schema_version.is_supported() {
            return Err(DocumentError::UnsupportedVersion {
                key: self.key.clone(),
                version: self.schema_version.clone(),
            });
        }
        serde_json::from_value(self.payload.clone()).map_err(|source| DocumentError::Decode {
            key: self.key.clone(),
            source,
        })
    }

    #[inline]
    #[must_use]
    pub fn key(&self) -> &ConfigKey {
        &self.key
    }

    #[inline]
    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    #[inline]
    #[must_use]
    pub fn schema_version(&self) -> &SchemaVersion {
        &self.schema_version
    }

    #[inline]
    #[must_use]
    pub fn last_update_ms(&self) -> i64 {
        self.last_update_ms
    }

    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<FeatureStatus> {
        self.status
    }

    #[inline]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Extension bag stored in the payload, if any
    #[inline]
    #[must_use]
    pub fn extension_bag(&self) -> Option<&ExtensionBag> {
        self.payload
            .get(EXTENSION_BAG_FIELD)
            .and_then(Value::as_object)
    }

    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: FeatureStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_last_update_ms(mut self, at: i64) -> Self {
        self.last_update_ms = at;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_schema_version(mut self, version: SchemaVersion) -> Self {
        self.schema_version = version;
        self
    }

    /// Set by stores when a write is accepted
    #[inline]
    #[must_use]
    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }
}

/// Errors converting between documents and typed values
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("document {key} does not decode: {source}")]
    Decode {
        key: ConfigKey,
        #[source]
        source: serde_json::Error,
    },

    #[error("document {key} does not encode: {source}")]
    Encode {
        key: ConfigKey,
        #[source]
        source: serde_json::Error,
    },

    #[error("document {key} has unsupported schema version '{version}'")]
    UnsupportedVersion { key: ConfigKey, version: SchemaVersion },
}
