//! Operator-facing NRF system options
//!
//! Every section is optional in a request. An absent (or null) field means
//! "keep what is persisted".

use crate::common::{ErrorInfo, ExtensionBag, FeatureStatus, LogLevel, NfConfig};
use serde::{Deserialize, Serialize};

/// Full system options view
///
/// Persisted as two documents: everything except [`ErrorResponses`] in the
/// options document, and the error responses in their own document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NrfSystemOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forwarding_system_options: Option<ForwardingSystemOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slf_system_options: Option<SlfSystemOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nf_authentication_system_options: Option<NfAuthenticationSystemOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nf_access_token_system_options: Option<NfAccessTokenSystemOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nf_discover_system_options: Option<NfDiscoverSystemOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging_level_system_options: Option<LoggingLevelSystemOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_responses: Option<ErrorResponses>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_attributes: Option<ExtensionBag>,
}

impl NrfSystemOptions {
    /// Log level named by this document, if any
    #[inline]
    #[must_use]
    pub fn requested_log_level(&self) -> Option<LogLevel> {
        self.logging_level_system_options
            .as_ref()
            .and_then(|l| l.nrf_configuration_log_level)
    }

    /// Authentication error responses, empty when unset
    #[inline]
    #[must_use]
    pub fn nf_authentication_error_responses(&self) -> &[ErrorInfo] {
        self.nf_authentication_system_options
            .as_ref()
            .and_then(|a| a.nf_authentication_error_responses.as_deref())
            .unwrap_or_default()
    }

    /// Access-token authentication feature section
    #[inline]
    #[must_use]
    pub fn auth_feature_config(&self) -> Option<&AuthFeatureConfig> {
        self.nf_access_token_system_options
            .as_ref()
            .and_then(|a| a.auth_feature_config.as_ref())
    }
}

/// Forwarding of requests to peer NRFs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ForwardingSystemOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_forwarding_status: Option<FeatureStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_forwarding_status: Option<FeatureStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_retrieval_forwarding_status: Option<FeatureStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_forwarding_status: Option<FeatureStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nrf_host_config: Option<Vec<NfConfig>>,
}

impl ForwardingSystemOptions {
    /// The four per-service forwarding switches
    #[inline]
    #[must_use]
    pub fn statuses(&self) -> [Option<FeatureStatus>; 4] {
        [
            self.access_token_forwarding_status,
            self.discovery_forwarding_status,
            self.profile_retrieval_forwarding_status,
            self.subscription_forwarding_status,
        ]
    }

    /// True when at least one switch is ENABLED
    #[inline]
    #[must_use]
    pub fn any_enabled(&self) -> bool {
        self.statuses()
            .iter()
            .any(|s| s.is_some_and(FeatureStatus::is_enabled))
    }
}

/// Subscriber location function lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SlfSystemOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_nf_type_list: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slf_host_config: Option<Vec<NfConfig>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NfAuthenticationSystemOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nf_authentication_error_responses: Option<Vec<ErrorInfo>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NfAccessTokenSystemOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_feature_config: Option<AuthFeatureConfig>,
}

/// Access-token authentication feature
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AuthFeatureConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_feature_status: Option<FeatureStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_config: Option<Vec<AuthConfig>>,
}

/// Per-NF-type token verification settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AuthConfig {
    pub nf_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
}

impl AuthConfig {
    #[inline]
    #[must_use]
    pub fn new(nf_type: impl Into<String>) -> Self {
        Self {
            nf_type: nf_type.into(),
            key_id: None,
            algorithm: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NfDiscoverSystemOptions {
    /// Percentage; 0 when unset in read views
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_result_load_threshold: Option<u32>,
    /// 0 when unset in read views
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles_count_in_discovery_response: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_validity_period: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoggingLevelSystemOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nrf_configuration_log_level: Option<LogLevel>,
}

/// Error-response document shared by the operator and engineering aggregates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ErrorResponses {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slf_error_responses: Option<Vec<ErrorInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nrf_forwarding_error_responses: Option<Vec<ErrorInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_attributes: Option<ExtensionBag>,
}
