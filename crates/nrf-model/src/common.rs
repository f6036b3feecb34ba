//! Shared building blocks used across option sections and rule lists

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Opaque extension bag persisted alongside every document
///
/// Never interpreted by the service and never shown to callers.
pub type ExtensionBag = serde_json::Map<String, serde_json::Value>;

/// NF types recognised by screening and SLF configuration
pub const NF_TYPES: &[&str] = &[
    "NRF", "UDM", "AMF", "SMF", "AUSF", "NEF", "PCF", "SMSF", "NSSF", "UDR", "LMF", "GMLC",
    "5G_EIR", "SEPP", "UPF", "N3IWF", "AF", "UDSF", "BSF", "CHF", "NWDAF",
];

/// Check a name against [`NF_TYPES`]
#[inline]
#[must_use]
pub fn is_known_nf_type(name: &str) -> bool {
    NF_TYPES.contains(&name)
}

/// Feature switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureStatus {
    Enabled,
    #[default]
    Disabled,
}

impl FeatureStatus {
    #[inline]
    #[must_use]
    pub fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }

    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => "ENABLED",
            Self::Disabled => "DISABLED",
        }
    }
}

impl Display for FeatureStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ENABLED" => Ok(Self::Enabled),
            "DISABLED" => Ok(Self::Disabled),
            other => Err(format!("unknown feature status '{other}'")),
        }
    }
}

/// Process-wide log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    #[inline]
    #[must_use]
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Off => "off",
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_directive().to_ascii_uppercase())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "off" => Ok(Self::Off),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// Remote NF endpoint (NRF peers for forwarding, SLF hosts)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NfConfig {
    pub host: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

impl NfConfig {
    #[inline]
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            api_prefix: None,
            scheme: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }
}

/// Error-response entry keyed by its condition
///
/// `error_detection_result_code` and `use_error_code_returned` are internal
/// and stripped from read views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ErrorInfo {
    pub error_condition: String,
    pub error_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_cause: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detection_result_code: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_error_code_returned: Option<bool>,
}

impl ErrorInfo {
    #[inline]
    #[must_use]
    pub fn new(condition: impl Into<String>, code: u16) -> Self {
        Self {
            error_condition: condition.into(),
            error_code: code,
            error_cause: None,
            redirect_url: None,
            retry_after: None,
            error_detection_result_code: None,
            use_error_code_returned: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }

    /// Status class of the error code, e.g. `"3xx"` for 307
    #[inline]
    #[must_use]
    pub fn code_group(&self) -> String {
        format!("{}xx", self.error_code / 100)
    }

    /// Strip fields that are never exposed to callers
    #[inline]
    #[must_use]
    pub fn without_internal_fields(mut self) -> Self {
        self.error_detection_result_code = None;
        self.use_error_code_returned = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_status_wire_names() {
        let json = serde_json::to_string(&FeatureStatus::Enabled).unwrap();
        assert_eq!(json, "\"ENABLED\"");
        assert_eq!("disabled".parse::<FeatureStatus>().unwrap(), FeatureStatus::Disabled);
    }

    #[test]
    fn log_level_directives() {
        assert_eq!(LogLevel::Warn.as_directive(), "warn");
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::Debug.to_string(), "DEBUG");
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn error_code_group() {
        assert_eq!(ErrorInfo::new("NF_NOT_FOUND", 307).code_group(), "3xx");
        assert_eq!(ErrorInfo::new("NF_NOT_FOUND", 503).code_group(), "5xx");
    }

    #[test]
    fn internal_fields_are_stripped() {
        let mut info = ErrorInfo::new("SLF_NOT_REACHABLE", 503);
        info.error_detection_result_code = Some(5012);
        info.use_error_code_returned = Some(true);

        let view = info.without_internal_fields();
        assert!(view.error_detection_result_code.is_none());
        assert!(view.use_error_code_returned.is_none());
        assert_eq!(view.error_code, 503);
    }

    #[test]
    fn nf_type_lookup() {
        assert!(is_known_nf_type("AMF"));
        assert!(is_known_nf_type("5G_EIR"));
        assert!(!is_known_nf_type("amf"));
    }
}
