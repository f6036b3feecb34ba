//! Storage errors

use nrf_document::ConfigKey;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Backend could not serve the request
    #[error("store unavailable during {operation}: {reason}")]
    Unavailable { operation: String, reason: String },

    /// Revision moved since the writer read it (optimistic concurrency failure)
    #[error("revision conflict on {key}: expected {expected}, found {actual:?}")]
    Conflict {
        key: ConfigKey,
        expected: String,
        actual: Option<u64>,
    },

    /// Same key twice in one batch
    #[error("duplicate key {0} in write batch")]
    DuplicateKey(ConfigKey),
}

impl StoreError {
    /// Create unavailable error for an operation
    pub fn unavailable(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
