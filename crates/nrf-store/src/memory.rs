//! In-memory storage
//!
//! Reads go straight to a [`DashMap`]; writes serialize on one guard so a
//! batch checks every expectation before inserting anything.

use crate::error::StoreError;
use crate::store::{DocumentStore, EventLog, WriteExpectation, WriteRequest};
use dashmap::DashMap;
use nrf_document::{ConfigKey, ConfigurationDocument, OwnerId};
use nrf_model::NrfEventDetails;
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;

/// Document store backed by a concurrent map
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: DashMap<ConfigKey, ConfigurationDocument>,
    write_guard: Mutex<()>,
}

impl MemoryStore {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load documents as-is, keeping their revisions
    #[must_use]
    pub fn from_documents(documents: impl IntoIterator<Item = ConfigurationDocument>) -> Self {
        let store = Self::new();
        for doc in documents {
            store.documents.insert(doc.key().clone(), doc);
        }
        store
    }

    /// Every stored document, ordered by key
    #[must_use]
    pub fn documents(&self) -> Vec<ConfigurationDocument> {
        let mut docs: Vec<_> = self.documents.iter().map(|e| e.value().clone()).collect();
        docs.sort_by(|a, b| a.key().cmp(b.key()));
        docs
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Store a document ignoring revisions
    ///
    /// # Errors
    /// Propagates store errors
    pub fn seed(&self, document: ConfigurationDocument) -> Result<ConfigurationDocument, StoreError> {
        self.save(WriteRequest::new(document, WriteExpectation::Unconditional))
    }

    fn stored_revision(&self, key: &ConfigKey) -> Option<u64> {
        self.documents.get(key).map(|d| d.revision())
    }

    fn check(&self, request: &WriteRequest) -> Result<u64, StoreError> {
        let key = request.document.key();
        let stored = self.stored_revision(key);
        if !request.expectation.is_met_by(stored) {
            tracing::debug!("Rejecting write to {}: expected {}, found {:?}", key, request.expectation, stored);
            return Err(StoreError::Conflict {
                key: key.clone(),
                expected: request.expectation.to_string(),
                actual: stored,
            });
        }
        Ok(stored.map_or(1, |r| r + 1))
    }
}

impl DocumentStore for MemoryStore {
    fn find(&self, key: &ConfigKey) -> Result<Option<ConfigurationDocument>, StoreError> {
        Ok(self.documents.get(key).map(|d| d.value().clone()))
    }

    fn find_by_owner(&self, owner: &OwnerId) -> Result<Vec<ConfigurationDocument>, StoreError> {
        Ok(self
            .documents()
            .into_iter()
            .filter(|d| &d.key().owner == owner)
            .collect())
    }

    fn save(&self, request: WriteRequest) -> Result<ConfigurationDocument, StoreError> {
        let _guard = self.write_guard.lock();
        let revision = self.check(&request)?;
        let stored = request.document.with_revision(revision);
        self.documents.insert(stored.key().clone(), stored.clone());
        Ok(stored)
    }

    fn save_all(&self, requests: Vec<WriteRequest>) -> Result<Vec<ConfigurationDocument>, StoreError> {
        let _guard = self.write_guard.lock();

        let mut seen = HashSet::new();
        let mut revisions = Vec::with_capacity(requests.len());
        for request in &requests {
            if !seen.insert(request.document.key().clone()) {
                return Err(StoreError::DuplicateKey(request.document.key().clone()));
            }
            revisions.push(self.check(request)?);
        }

        let stored: Vec<_> = requests
            .into_iter()
            .zip(revisions)
            .map(|(request, revision)| request.document.with_revision(revision))
            .collect();
        for doc in &stored {
            self.documents.insert(doc.key().clone(), doc.clone());
        }
        Ok(stored)
    }
}

/// Event log backed by a vector
#[derive(Debug, Default)]
pub struct MemoryEventLog {
    events: RwLock<Vec<NrfEventDetails>>,
}

impl MemoryEventLog {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_events(events: Vec<NrfEventDetails>) -> Self {
        Self {
            events: RwLock::new(events),
        }
    }

    /// Append an event
    #[inline]
    pub fn record(&self, event: NrfEventDetails) {
        self.events.write().push(event);
    }
}

impl EventLog for MemoryEventLog {
    fn events(&self) -> Result<Vec<NrfEventDetails>, StoreError> {
        Ok(self.events.read().clone())
    }
}
