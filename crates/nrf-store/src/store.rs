//! Storage traits
//!
//! [`DocumentStore`] holds configuration documents; [`EventLog`] holds
//! recorded events. Writes carry a [`WriteExpectation`] so a writer that read
//! an older revision cannot silently overwrite a newer one.

use crate::error::StoreError;
use nrf_document::{ConfigKey, ConfigurationDocument, OwnerId};
use nrf_model::NrfEventDetails;
use std::fmt::{self, Debug, Display, Formatter};

/// Precondition on the stored revision of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteExpectation {
    /// Write regardless of what is stored
    Unconditional,
    /// Nothing may be stored under the key
    Absent,
    /// The stored revision must equal this one
    Revision(u64),
}

impl WriteExpectation {
    /// Expectation matching what a reader observed
    #[inline]
    #[must_use]
    pub fn from_prior(prior: Option<&ConfigurationDocument>) -> Self {
        prior.map_or(Self::Absent, |doc| Self::Revision(doc.revision()))
    }

    /// Check against the stored revision
    #[inline]
    #[must_use]
    pub fn is_met_by(self, stored: Option<u64>) -> bool {
        match self {
            Self::Unconditional => true,
            Self::Absent => stored.is_none(),
            Self::Revision(expected) => stored == Some(expected),
        }
    }
}

impl Display for WriteExpectation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconditional => f.write_str("any"),
            Self::Absent => f.write_str("absent"),
            Self::Revision(r) => write!(f, "revision {r}"),
        }
    }
}

/// One document to write with its precondition
#[derive(Debug, Clone)]
pub struct WriteRequest {
    pub document: ConfigurationDocument,
    pub expectation: WriteExpectation,
}

impl WriteRequest {
    #[inline]
    #[must_use]
    pub fn new(document: ConfigurationDocument, expectation: WriteExpectation) -> Self {
        Self {
            document,
            expectation,
        }
    }
}

/// Configuration document storage
pub trait DocumentStore: Send + Sync + Debug {
    /// Fetch one document
    ///
    /// # Errors
    /// Returns error if the backend cannot be read
    fn find(&self, key: &ConfigKey) -> Result<Option<ConfigurationDocument>, StoreError>;

    /// Fetch every document of an owner
    ///
    /// # Errors
    /// Returns error if the backend cannot be read
    fn find_by_owner(&self, owner: &OwnerId) -> Result<Vec<ConfigurationDocument>, StoreError>;

    /// Write one document, returning it with its new revision
    ///
    /// # Errors
    /// Returns [`StoreError::Conflict`] if the expectation is not met
    fn save(&self, request: WriteRequest) -> Result<ConfigurationDocument, StoreError>;

    /// Write a batch atomically: either every document is stored or none is
    ///
    /// # Errors
    /// Returns [`StoreError::Conflict`] if any expectation is not met
    fn save_all(&self, requests: Vec<WriteRequest>) -> Result<Vec<ConfigurationDocument>, StoreError>;
}

/// Recorded NF events
pub trait EventLog: Send + Sync + Debug {
    /// Every recorded event
    ///
    /// # Errors
    /// Returns error if the backend cannot be read
    fn events(&self) -> Result<Vec<NrfEventDetails>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expectation_matching() {
        assert!(WriteExpectation::Unconditional.is_met_by(Some(4)));
        assert!(WriteExpectation::Absent.is_met_by(None));
        assert!(!WriteExpectation::Absent.is_met_by(Some(1)));
        assert!(WriteExpectation::Revision(3).is_met_by(Some(3)));
        assert!(!WriteExpectation::Revision(3).is_met_by(Some(4)));
        assert!(!WriteExpectation::Revision(3).is_met_by(None));
    }
}
