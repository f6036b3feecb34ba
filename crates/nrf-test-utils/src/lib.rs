//! Testing utilities for the NRF configuration workspace
//!
//! Shared fixtures, a seeded store and a store wrapper that lets a test run
//! a competing writer between a read and the following write.

#![allow(missing_docs)]

use nrf_config::{ConfigurationService, RecordingLogSink, ServiceConfig};
use nrf_document::{ConfigKey, ConfigKind, ConfigurationDocument, OwnerId};
use nrf_model::{
    AuthFeatureConfig, ErrorInfo, ErrorResponses, ExtensionBag, FeatureStatus, ForwardingSystemOptions,
    GeneralEngSystemOptions, IpEndPoint, LogLevel, LoggingLevelSystemOptions, NfAccessTokenSystemOptions,
    NfAuthenticationSystemOptions, NfConfig, NfDiscoverSystemOptions, NfScreeningRules, NfScreeningRulesListType,
    NfScreeningType, NrfEngSystemOptions, NrfEventDetails, NrfSystemOptions, PlmnId, ScreeningRuleSet,
    SlfSystemOptions,
};
use nrf_store::{DocumentStore, MemoryEventLog, MemoryStore, StoreError, WriteRequest};
use parking_lot::Mutex;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

pub const OWNER: &str = "6faf1bbc-6e4a-4454-a507-a14ef8e1bc5a";

pub fn owner() -> OwnerId {
    OwnerId::new(OWNER)
}

pub fn test_config() -> ServiceConfig {
    ServiceConfig::new(OWNER)
}

pub fn extension_bag(marker: &str) -> ExtensionBag {
    let mut bag = ExtensionBag::new();
    bag.insert("vendorMarker".into(), serde_json::json!(marker));
    bag
}

/// Operator options with forwarding, SLF and the auth feature all disabled
pub fn sample_system_options() -> NrfSystemOptions {
    NrfSystemOptions {
        forwarding_system_options: Some(ForwardingSystemOptions {
            access_token_forwarding_status: Some(FeatureStatus::Disabled),
            discovery_forwarding_status: Some(FeatureStatus::Disabled),
            profile_retrieval_forwarding_status: Some(FeatureStatus::Disabled),
            subscription_forwarding_status: Some(FeatureStatus::Disabled),
            nrf_host_config: None,
        }),
        slf_system_options: Some(SlfSystemOptions::default()),
        nf_authentication_system_options: Some(NfAuthenticationSystemOptions {
            nf_authentication_error_responses: Some(vec![
                ErrorInfo::new("NF_Authentication_Failure", 403),
                ErrorInfo::new("NF_Not_Authorized", 307),
            ]),
        }),
        nf_access_token_system_options: Some(NfAccessTokenSystemOptions {
            auth_feature_config: Some(AuthFeatureConfig {
                auth_feature_status: Some(FeatureStatus::Disabled),
                auth_config: None,
            }),
        }),
        nf_discover_system_options: Some(NfDiscoverSystemOptions {
            discovery_result_load_threshold: Some(80),
            profiles_count_in_discovery_response: None,
            discovery_validity_period: Some(3600),
        }),
        logging_level_system_options: Some(LoggingLevelSystemOptions {
            nrf_configuration_log_level: Some(LogLevel::Info),
        }),
        error_responses: Some(sample_error_responses()),
        additional_attributes: Some(extension_bag("options")),
    }
}

/// SLF and forwarding error responses with internal fields populated
pub fn sample_error_responses() -> ErrorResponses {
    let mut slf = ErrorInfo::new("SLF_Not_Reachable", 503);
    slf.error_detection_result_code = Some(1);
    slf.use_error_code_returned = Some(false);
    let mut forwarding = ErrorInfo::new("NRF_Not_Reachable", 504);
    forwarding.use_error_code_returned = Some(true);
    ErrorResponses {
        slf_error_responses: Some(vec![slf]),
        nrf_forwarding_error_responses: Some(vec![forwarding]),
        additional_attributes: Some(extension_bag("errors")),
    }
}

/// Engineering options listing `3xx` and `503` as redirect codes
pub fn sample_eng_options() -> NrfEngSystemOptions {
    NrfEngSystemOptions {
        general_eng_system_options: Some(GeneralEngSystemOptions {
            redirect_url_error_codes: Some(vec!["3xx".into(), "503".into()]),
        }),
        error_responses: Some(ErrorResponses::default()),
        additional_attributes: Some(extension_bag("eng")),
    }
}

pub fn nrf_host(host: &str) -> NfConfig {
    NfConfig::new(host, 8080).with_scheme("http")
}

/// Rule set with two entries in the field governed by `list_type`
pub fn sample_rule_set(list_type: NfScreeningRulesListType) -> ScreeningRuleSet {
    let mut set = ScreeningRuleSet::default();
    match list_type {
        NfScreeningRulesListType::NfFqdn => {
            set.nf_fqdn = Some(vec!["amf1.example.com".into(), "smf1.example.com".into()]);
        }
        NfScreeningRulesListType::NfIpEndpoint => {
            set.nf_ip_end_point_list = Some(vec![
                IpEndPoint::ipv4("10.0.0.1", Some(8080)),
                IpEndPoint::ipv4("10.0.0.2", None),
            ]);
        }
        NfScreeningRulesListType::CallbackUri => {
            set.callback_uri = Some(vec![
                "http://amf1.example.com/notify".into(),
                "https://smf1.example.com/callback".into(),
            ]);
        }
        NfScreeningRulesListType::PlmnId => {
            set.plmn_id = Some(vec![PlmnId::new("310", "14"), PlmnId::new("311", "480")]);
        }
        NfScreeningRulesListType::NfTypeRegister => {
            set.nf_type = Some(vec!["AMF".into(), "SMF".into()]);
        }
    }
    set
}

pub fn sample_screening_rules(list_type: NfScreeningRulesListType) -> NfScreeningRules {
    NfScreeningRules::new(list_type, NfScreeningType::Blacklist)
        .with_status(FeatureStatus::Enabled)
        .with_global_rules(sample_rule_set(list_type))
}

/// FQDN rule set with `count` distinct entries
pub fn fqdn_rules_with(count: usize) -> NfScreeningRules {
    let set = ScreeningRuleSet {
        nf_fqdn: Some((0..count).map(|i| format!("nf{i}.example.com")).collect()),
        ..Default::default()
    };
    NfScreeningRules::new(NfScreeningRulesListType::NfFqdn, NfScreeningType::Whitelist).with_global_rules(set)
}

fn key(kind: ConfigKind) -> ConfigKey {
    ConfigKey::new(owner(), kind)
}

fn document(kind: ConfigKind, payload: serde_json::Value) -> ConfigurationDocument {
    ConfigurationDocument::new(key(kind), payload)
}

/// Options and error-response documents for a system options aggregate
pub fn system_option_documents(options: &NrfSystemOptions) -> [ConfigurationDocument; 2] {
    let mut primary = options.clone();
    let errors = primary.error_responses.take().unwrap_or_default();
    [
        document(ConfigKind::SystemOptions, serde_json::to_value(&primary).unwrap()),
        document(ConfigKind::ErrorResponses, serde_json::to_value(&errors).unwrap()),
    ]
}

/// Options and error-response documents for an engineering aggregate
pub fn eng_option_documents(options: &NrfEngSystemOptions) -> [ConfigurationDocument; 2] {
    let mut primary = options.clone();
    let errors = primary.error_responses.take().unwrap_or_default();
    [
        document(ConfigKind::EngSystemOptions, serde_json::to_value(&primary).unwrap()),
        document(ConfigKind::EngErrorResponses, serde_json::to_value(&errors).unwrap()),
    ]
}

pub fn screening_document(rules: &NfScreeningRules) -> ConfigurationDocument {
    document(
        ConfigKind::ScreeningRules(rules.nf_screening_rules_list_type),
        serde_json::to_value(rules).unwrap(),
    )
    .with_status(rules.nf_screening_rules_list_status)
}

/// Store seeded with the given system options, the sample engineering
/// options and an FQDN rule list carrying an extension bag
pub fn store_with(options: &NrfSystemOptions) -> MemoryStore {
    let store = MemoryStore::new();
    let mut rules = sample_screening_rules(NfScreeningRulesListType::NfFqdn);
    rules.additional_attributes = Some(extension_bag("rules"));
    for doc in system_option_documents(options)
        .into_iter()
        .chain(eng_option_documents(&sample_eng_options()))
        .chain([screening_document(&rules)])
    {
        store.seed(doc).unwrap();
    }
    store
}

pub fn seeded_store() -> MemoryStore {
    store_with(&sample_system_options())
}

pub fn sample_events() -> Vec<NrfEventDetails> {
    vec![
        NrfEventDetails::profile("nf-instance-1", "NF_REGISTERED", 1_700_000_000_000),
        NrfEventDetails::subscription("subscription-1", "NF_STATUS_SUBSCRIBED", 1_700_000_000_100),
        NrfEventDetails::profile("nf-instance-2", "NF_DEREGISTERED", 1_700_000_000_200),
    ]
}

/// Service over in-memory storage, with handles for inspection
pub struct TestHarness<S: DocumentStore + 'static = MemoryStore> {
    pub service: ConfigurationService,
    pub store: Arc<S>,
    pub events: Arc<MemoryEventLog>,
    pub log_sink: Arc<RecordingLogSink>,
}

impl TestHarness<MemoryStore> {
    pub fn new() -> Self {
        Self::with_store(Arc::new(seeded_store()))
    }
}

impl Default for TestHarness<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: DocumentStore + 'static> TestHarness<S> {
    pub fn with_store(store: Arc<S>) -> Self {
        let events = Arc::new(MemoryEventLog::from_events(sample_events()));
        let log_sink = Arc::new(RecordingLogSink::new(LogLevel::Info));
        let service = ConfigurationService::new(test_config(), store.clone(), events.clone(), log_sink.clone()).unwrap();
        Self {
            service,
            store,
            events,
            log_sink,
        }
    }
}

type Hook = Box<dyn FnOnce() + Send>;

/// Store that runs a hook right after the first read of a chosen key
///
/// Used to place a competing write between a reader's fetch and its write.
pub struct InterleavingStore {
    inner: Arc<MemoryStore>,
    trigger: Mutex<Option<(ConfigKey, Hook)>>,
}

impl InterleavingStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            trigger: Mutex::new(None),
        }
    }

    /// Run `hook` once, after the next read of `kind`
    pub fn after_find(&self, kind: ConfigKind, hook: impl FnOnce() + Send + 'static) {
        *self.trigger.lock() = Some((key(kind), Box::new(hook)));
    }

    pub fn inner(&self) -> &Arc<MemoryStore> {
        &self.inner
    }
}

impl Debug for InterleavingStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterleavingStore").field("inner", &self.inner).finish_non_exhaustive()
    }
}

impl DocumentStore for InterleavingStore {
    fn find(&self, key: &ConfigKey) -> Result<Option<ConfigurationDocument>, StoreError> {
        let found = self.inner.find(key)?;
        let hook = {
            let mut trigger = self.trigger.lock();
            match trigger.take() {
                Some((armed, hook)) if armed == *key => Some(hook),
                other => {
                    *trigger = other;
                    None
                }
            }
        };
        if let Some(hook) = hook {
            hook();
        }
        Ok(found)
    }

    fn find_by_owner(&self, owner: &OwnerId) -> Result<Vec<ConfigurationDocument>, StoreError> {
        self.inner.find_by_owner(owner)
    }

    fn save(&self, request: WriteRequest) -> Result<ConfigurationDocument, StoreError> {
        self.inner.save(request)
    }

    fn save_all(&self, requests: Vec<WriteRequest>) -> Result<Vec<ConfigurationDocument>, StoreError> {
        self.inner.save_all(requests)
    }
}
