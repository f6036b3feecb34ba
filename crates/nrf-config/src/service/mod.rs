//! Configuration service
//!
//! [`ConfigurationService`] owns the validators and the storage handles and
//! exposes every read and write operation. Operations are split by resource:
//! system and engineering options, screening rules, and event queries.

mod events;
mod options;
mod screening;

use crate::aggregate::{LoadedPair, PairedAggregate};
use crate::config::{ConfigError, ServiceConfig};
use crate::logging::LogLevelSink;
use crate::metrics::{observe, DbMethod, DbOperation};
use nrf_document::{ConfigKey, ConfigKind, ConfigurationDocument, OwnerId, PatchApplier};
use nrf_model::{ConfigResult, ProblemDetails, ProblemKind};
use nrf_store::{DocumentStore, EventLog, StoreError};
use nrf_validation::{
    CrossSectionConsistencyValidator, SemanticValidator, StructuralValidator, ValidationFailure,
};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use tracing::{debug, error};

/// Stages of an options update, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStage {
    FetchPrior,
    BuildCandidate,
    Structural,
    Semantic,
    CrossSection,
    Persist,
    Rehydrate,
    Sanitize,
}

impl Display for UpdateStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FetchPrior => "FETCH_PRIOR",
            Self::BuildCandidate => "BUILD_CANDIDATE",
            Self::Structural => "STRUCTURAL",
            Self::Semantic => "SEMANTIC",
            Self::CrossSection => "CROSS_SECTION",
            Self::Persist => "PERSIST",
            Self::Rehydrate => "REHYDRATE",
            Self::Sanitize => "SANITIZE",
        };
        f.write_str(name)
    }
}

/// Validated access to the NRF configuration of one owner
#[derive(Debug)]
pub struct ConfigurationService {
    config: ServiceConfig,
    owner: OwnerId,
    store: Arc<dyn DocumentStore>,
    events: Arc<dyn EventLog>,
    log_sink: Arc<dyn LogLevelSink>,
    applier: PatchApplier,
    structural: StructuralValidator,
    screening_structural: StructuralValidator,
    semantic: SemanticValidator,
    cross_section: CrossSectionConsistencyValidator,
}

impl ConfigurationService {
    /// Create a service over the given storage
    ///
    /// # Errors
    /// Returns error if the configuration is invalid
    pub fn new(
        config: ServiceConfig,
        store: Arc<dyn DocumentStore>,
        events: Arc<dyn EventLog>,
        log_sink: Arc<dyn LogLevelSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            owner: config.owner(),
            semantic: SemanticValidator::new(config.max_count),
            config,
            store,
            events,
            log_sink,
            applier: PatchApplier::new(),
            structural: StructuralValidator::new(),
            screening_structural: StructuralValidator::for_screening_rules(),
            cross_section: CrossSectionConsistencyValidator::new(),
        })
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    fn key(&self, kind: ConfigKind) -> ConfigKey {
        ConfigKey::new(self.owner.clone(), kind)
    }

    /// Fetch one document, counting the call
    fn find(&self, method: DbMethod, kind: ConfigKind) -> Result<Option<ConfigurationDocument>, StoreError> {
        observe(method, DbOperation::Find, kind.table(), self.store.find(&self.key(kind)))
    }

    /// Fetch a singleton document that must exist
    ///
    /// A missing document is reported as `missing`; NotFound on reads,
    /// InternalError inside updates.
    fn find_required(
        &self,
        method: DbMethod,
        kind: ConfigKind,
        label: &str,
        missing: ProblemKind,
    ) -> ConfigResult<ConfigurationDocument> {
        let cause = format!("Could not fetch {label} due to an unexpected error.");
        let found = self.find(method, kind).map_err(|e| {
            error!("{}: {}", cause, e);
            ProblemDetails::for_internal_error(cause.as_str(), e.to_string())
        })?;
        found.ok_or_else(|| {
            error!("{} with ID {} is missing", label, kind.id());
            ProblemDetails::new(missing, cause.as_str(), format!("Unable to fetch {label} with ID:{}", kind.id()))
        })
    }

    /// Load and join both halves of a paired aggregate
    fn load_pair<T: PairedAggregate>(&self, method: DbMethod, missing: ProblemKind) -> ConfigResult<LoadedPair<T>> {
        let primary = self.find_required(method, T::PRIMARY, T::LABEL, missing)?;
        let secondary = self.find_required(method, T::SECONDARY, T::LABEL, missing)?;
        LoadedPair::join(primary, secondary).map_err(|e| {
            error!("Stored {} is unreadable: {}", T::LABEL, e);
            ProblemDetails::for_internal_error(
                format!("Could not fetch {} due to an unexpected error.", T::LABEL),
                e.to_string(),
            )
        })
    }

    /// Persist a split aggregate and join what the store returned
    fn persist_pair<T: PairedAggregate>(
        &self,
        method: DbMethod,
        prior: &LoadedPair<T>,
        candidate: T,
    ) -> ConfigResult<T> {
        let cause = format!("Could not update {} due to an unexpected error.", T::LABEL);
        debug!("{}: {}", T::LABEL, UpdateStage::Persist);
        let writes = prior
            .split(candidate, now_ms())
            .map_err(|e| ProblemDetails::for_internal_error(cause.as_str(), e.to_string()))?;
        let saved = observe(method, DbOperation::Update, T::PRIMARY.table(), self.store.save_all(writes))
            .map_err(|e| store_failure(&cause, &e))?;

        debug!("{}: {}", T::LABEL, UpdateStage::Rehydrate);
        let [primary, secondary]: [ConfigurationDocument; 2] = saved
            .try_into()
            .map_err(|_| ProblemDetails::for_internal_error(cause.as_str(), "store returned an unexpected batch"))?;
        LoadedPair::<T>::join(primary, secondary)
            .map(|pair| pair.value)
            .map_err(|e| ProblemDetails::for_internal_error(cause.as_str(), e.to_string()))
    }
}

/// Milliseconds since the epoch
fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Problem report for a validation failure
fn rejection(kind: ProblemKind, failure: &ValidationFailure) -> ProblemDetails {
    error!("{}", failure);
    ProblemDetails::new(kind, failure.cause.as_str(), failure.detail.as_str()).with_invalid_params(failure.invalid_params())
}

/// Problem report for a failed write
fn store_failure(cause: &str, err: &StoreError) -> ProblemDetails {
    error!("{}: {}", cause, err);
    if err.is_conflict() {
        ProblemDetails::for_conflict("Concurrent modification", err.to_string())
    } else {
        ProblemDetails::for_internal_error(cause, err.to_string())
    }
}

/// Problem report for a failed read
fn fetch_failure(cause: &str, err: &impl Display) -> ProblemDetails {
    error!("{}: {}", cause, err);
    ProblemDetails::for_internal_error(cause, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::RecordingLogSink;
    use mockall::mock;
    use nrf_model::{
        LogLevel, NfDiscoverSystemOptions, NfScreeningRulesListType, NrfEngSystemOptions, NrfEventDetails,
        NrfSystemOptions, ScreeningRulesQuery,
    };
    use nrf_store::{MemoryEventLog, MemoryStore, WriteExpectation, WriteRequest};
    use serde_json::json;

    mock! {
        pub Store {}

        impl DocumentStore for Store {
            fn find(&self, key: &ConfigKey) -> Result<Option<ConfigurationDocument>, StoreError>;
            fn find_by_owner(&self, owner: &OwnerId) -> Result<Vec<ConfigurationDocument>, StoreError>;
            fn save(&self, request: WriteRequest) -> Result<ConfigurationDocument, StoreError>;
            fn save_all(&self, requests: Vec<WriteRequest>) -> Result<Vec<ConfigurationDocument>, StoreError>;
        }
    }

    mock! {
        pub Events {}

        impl EventLog for Events {
            fn events(&self) -> Result<Vec<NrfEventDetails>, StoreError>;
        }
    }

    impl std::fmt::Debug for MockStore {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("MockStore")
        }
    }

    impl std::fmt::Debug for MockEvents {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("MockEvents")
        }
    }

    fn service_over(store: Arc<dyn DocumentStore>, events: Arc<dyn EventLog>) -> ConfigurationService {
        ConfigurationService::new(
            ServiceConfig::new("nrf-1"),
            store,
            events,
            Arc::new(RecordingLogSink::new(LogLevel::Info)),
        )
        .unwrap()
    }

    fn unavailable_store() -> MockStore {
        let mut store = MockStore::new();
        store
            .expect_find()
            .returning(|_| Err(StoreError::unavailable("find", "connection refused")));
        store
            .expect_find_by_owner()
            .returning(|_| Err(StoreError::unavailable("find_by_owner", "connection refused")));
        store
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = ConfigurationService::new(
            ServiceConfig::new(""),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryEventLog::new()),
            Arc::new(RecordingLogSink::new(LogLevel::Info)),
        );
        assert!(matches!(result, Err(ConfigError::MissingInstanceId)));
    }

    #[test]
    fn read_failures_are_internal_errors() {
        let service = service_over(Arc::new(unavailable_store()), Arc::new(MemoryEventLog::new()));

        let err = service.system_options().unwrap_err();
        assert_eq!(err.kind(), ProblemKind::InternalError);
        assert_eq!(err.cause, "Could not fetch NrfSystemOptions due to an unexpected error.");

        let err = service.screening_rule(NfScreeningRulesListType::NfFqdn).unwrap_err();
        assert_eq!(err.kind(), ProblemKind::InternalError);

        let err = service.screening_rules(&ScreeningRulesQuery::default()).unwrap_err();
        assert_eq!(err.kind(), ProblemKind::InternalError);
    }

    #[test]
    fn missing_singletons_are_not_found_on_read() {
        let service = service_over(Arc::new(MemoryStore::new()), Arc::new(MemoryEventLog::new()));
        let err = service.system_options().unwrap_err();
        assert_eq!(err.kind(), ProblemKind::NotFound);
        assert_eq!(err.detail, "Unable to fetch NrfSystemOptions with ID:OCNRF_SYSTEM_OPTIONS");

        let err = service.eng_system_options().unwrap_err();
        assert_eq!(err.kind(), ProblemKind::NotFound);
    }

    #[test]
    fn missing_singletons_are_internal_errors_on_update() {
        let service = service_over(Arc::new(MemoryStore::new()), Arc::new(MemoryEventLog::new()));
        let err = service.update_system_options(Default::default()).unwrap_err();
        assert_eq!(err.kind(), ProblemKind::InternalError);
    }

    #[test]
    fn event_log_failure_is_internal_error() {
        let mut events = MockEvents::new();
        events
            .expect_events()
            .times(1)
            .returning(|| Err(StoreError::unavailable("events", "timeout")));
        let service = service_over(Arc::new(MemoryStore::new()), Arc::new(events));
        let err = service.nf_profile_events(None).unwrap_err();
        assert_eq!(err.kind(), ProblemKind::InternalError);
    }

    /// Every key resolves to an empty stored document at revision 1
    fn blank_store() -> MockStore {
        let mut store = MockStore::new();
        store
            .expect_find()
            .returning(|key| Ok(Some(ConfigurationDocument::new(key.clone(), json!({})).with_revision(1))));
        store.expect_save().never();
        store
    }

    fn threshold(value: u32) -> NrfSystemOptions {
        NrfSystemOptions {
            nf_discover_system_options: Some(NfDiscoverSystemOptions {
                discovery_result_load_threshold: Some(value),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn pair_is_written_in_one_batch() {
        let mut store = blank_store();
        store
            .expect_save_all()
            .times(1)
            .withf(|writes: &Vec<WriteRequest>| {
                writes.len() == 2
                    && writes.iter().all(|w| w.expectation == WriteExpectation::Revision(1))
                    && writes[0].document.key().kind == ConfigKind::SystemOptions
                    && writes[1].document.key().kind == ConfigKind::ErrorResponses
            })
            .returning(|writes| Ok(writes.into_iter().map(|w| w.document.with_revision(2)).collect()));
        let service = service_over(Arc::new(store), Arc::new(MemoryEventLog::new()));

        let updated = service.update_system_options(threshold(10)).unwrap();
        assert_eq!(
            updated.nf_discover_system_options.unwrap().discovery_result_load_threshold,
            Some(10)
        );
    }

    #[test]
    fn failed_pair_write_is_internal_error() {
        let mut store = blank_store();
        store
            .expect_save_all()
            .times(1)
            .returning(|_| Err(StoreError::unavailable("save_all", "disk full")));
        let service = service_over(Arc::new(store), Arc::new(MemoryEventLog::new()));

        let err = service.update_system_options(threshold(10)).unwrap_err();
        assert_eq!(err.kind(), ProblemKind::InternalError);
        assert_eq!(err.cause, "Could not update NrfSystemOptions due to an unexpected error.");
    }

    #[test]
    fn stale_pair_write_is_conflict() {
        let mut store = blank_store();
        store.expect_save_all().times(1).returning(|writes| {
            Err(StoreError::Conflict {
                key: writes[0].document.key().clone(),
                expected: "revision 1".into(),
                actual: Some(2),
            })
        });
        let service = service_over(Arc::new(store), Arc::new(MemoryEventLog::new()));

        let err = service.update_eng_system_options(NrfEngSystemOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ProblemKind::Conflict);
    }

    #[test]
    fn validation_failure_never_reaches_the_store() {
        let mut store = blank_store();
        store.expect_save_all().never();
        let service = service_over(Arc::new(store), Arc::new(MemoryEventLog::new()));
        let err = service.update_system_options(threshold(150)).unwrap_err();
        assert_eq!(err.kind(), ProblemKind::BadRequest);
    }

    #[test]
    fn stage_names() {
        assert_eq!(UpdateStage::CrossSection.to_string(), "CROSS_SECTION");
        assert_eq!(UpdateStage::FetchPrior.to_string(), "FETCH_PRIOR");
    }
}
