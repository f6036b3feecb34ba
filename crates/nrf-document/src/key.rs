//! Document identity: owner plus configuration kind

use nrf_model::NfScreeningRulesListType;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// NRF instance that owns a set of documents
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configuration kind stored under an owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfigKind {
    SystemOptions,
    ErrorResponses,
    EngSystemOptions,
    EngErrorResponses,
    ScreeningRules(NfScreeningRulesListType),
}

impl ConfigKind {
    /// Stable document id
    #[must_use]
    pub fn id(self) -> String {
        match self {
            Self::SystemOptions => "OCNRF_SYSTEM_OPTIONS".to_string(),
            Self::ErrorResponses => "OCNRF_ERROR_RESPONSES".to_string(),
            Self::EngSystemOptions => "OCNRF_ENG_SYSTEM_OPTIONS".to_string(),
            Self::EngErrorResponses => "OCNRF_ENG_ERROR_RESPONSES".to_string(),
            Self::ScreeningRules(list_type) => format!("NF_SCREENING_{list_type}"),
        }
    }

    /// Table the document lives in
    #[inline]
    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            Self::ScreeningRules(_) => "NfScreening",
            _ => "NrfSystemOptions",
        }
    }

    #[inline]
    #[must_use]
    pub fn is_screening(self) -> bool {
        matches!(self, Self::ScreeningRules(_))
    }
}

impl Display for ConfigKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// Full document key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConfigKey {
    pub owner: OwnerId,
    pub kind: ConfigKind,
}

impl ConfigKey {
    #[inline]
    #[must_use]
    pub fn new(owner: OwnerId, kind: ConfigKind) -> Self {
        Self { owner, kind }
    }

    #[inline]
    #[must_use]
    pub fn screening(owner: OwnerId, list_type: NfScreeningRulesListType) -> Self {
        Self::new(owner, ConfigKind::ScreeningRules(list_type))
    }
}

impl Display for ConfigKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_ids() {
        assert_eq!(ConfigKind::SystemOptions.id(), "OCNRF_SYSTEM_OPTIONS");
        assert_eq!(ConfigKind::EngErrorResponses.id(), "OCNRF_ENG_ERROR_RESPONSES");
        assert_eq!(
            ConfigKind::ScreeningRules(NfScreeningRulesListType::PlmnId).id(),
            "NF_SCREENING_PLMN_ID"
        );
    }

    #[test]
    fn key_display_includes_owner() {
        let key = ConfigKey::new(OwnerId::new("nrf-1"), ConfigKind::ErrorResponses);
        assert_eq!(key.to_string(), "nrf-1/OCNRF_ERROR_RESPONSES");
        assert_eq!(key.kind.table(), "NrfSystemOptions");
    }
}
