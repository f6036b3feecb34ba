//! CLI commands over the configuration service

use anyhow::{Context, Result};
use nrf_config::ConfigurationService;
use nrf_document::PatchItem;
use nrf_model::{
    ConfigResult, FeatureStatus, NfScreeningRules, NfScreeningRulesList, NfScreeningRulesListType, NrfEngSystemOptions,
    NrfSystemOptions, ProblemDetails, ScreeningRulesQuery,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::path::Path;

/// One service call with its decoded input
#[derive(Debug, Clone, PartialEq)]
pub enum CtlCommand {
    ShowOptions,
    UpdateOptions(NrfSystemOptions),
    ShowEngOptions,
    UpdateEngOptions(NrfEngSystemOptions),
    ShowRule(NfScreeningRulesListType),
    ListRules(ScreeningRulesQuery),
    ReplaceRule(NfScreeningRulesListType, NfScreeningRules),
    PatchRule(NfScreeningRulesListType, Vec<PatchItem>),
    CreateRules(NfScreeningRulesList),
    ProfileEvents(Option<String>),
    SubscriptionEvents(Option<String>),
}

/// Decode a JSON request body from a file
///
/// # Errors
/// Returns error if the file cannot be read or does not match `T`
pub fn read_body<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("decoding {}", path.display()))
}

/// Parse a rule list type argument
///
/// # Errors
/// Returns error naming the unknown type
pub fn parse_list_type(raw: &str) -> Result<NfScreeningRulesListType> {
    raw.parse().map_err(|e: String| anyhow::anyhow!(e))
}

/// Parse a rule list status argument
///
/// # Errors
/// Returns error naming the unknown status
pub fn parse_status(raw: &str) -> Result<FeatureStatus> {
    raw.parse().map_err(|e: String| anyhow::anyhow!(e))
}

fn json<T: Serialize>(result: ConfigResult<T>) -> ConfigResult<Value> {
    result.and_then(|value| {
        serde_json::to_value(value)
            .map_err(|e| ProblemDetails::for_internal_error("Could not encode response", e.to_string()))
    })
}

impl CtlCommand {
    /// True for commands that change stored state
    #[must_use]
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Self::UpdateOptions(_)
                | Self::UpdateEngOptions(_)
                | Self::ReplaceRule(..)
                | Self::PatchRule(..)
                | Self::CreateRules(_)
        )
    }

    /// Run against the service, returning the response body
    ///
    /// # Errors
    /// Returns the service's problem report
    pub fn run(self, service: &ConfigurationService) -> ConfigResult<Value> {
        match self {
            Self::ShowOptions => json(service.system_options()),
            Self::UpdateOptions(request) => json(service.update_system_options(request)),
            Self::ShowEngOptions => json(service.eng_system_options()),
            Self::UpdateEngOptions(request) => json(service.update_eng_system_options(request)),
            Self::ShowRule(list_type) => json(service.screening_rule(list_type)),
            Self::ListRules(query) => json(service.screening_rules(&query)),
            Self::ReplaceRule(list_type, rules) => json(service.replace_screening_rule(list_type, rules)),
            Self::PatchRule(list_type, items) => json(service.patch_screening_rule(list_type, &items)),
            Self::CreateRules(list) => json(service.create_screening_rules(list)),
            Self::ProfileEvents(id) => json(service.nf_profile_events(id.as_deref())),
            Self::SubscriptionEvents(id) => json(service.nf_subscription_events(id.as_deref())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nrf_test_utils::TestHarness;
    use serde_json::json;

    #[test]
    fn list_type_and_status_parsing() {
        assert_eq!(parse_list_type("PLMN_ID").unwrap(), NfScreeningRulesListType::PlmnId);
        let err = parse_list_type("FOO").unwrap_err();
        assert_eq!(err.to_string(), "Invalid NfScreening Rule Type 'FOO'");
        assert_eq!(parse_status("ENABLED").unwrap(), FeatureStatus::Enabled);
        assert!(parse_status("maybe").is_err());
    }

    #[test]
    fn read_body_decodes_patch_items() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patch.json");
        std::fs::write(&path, r#"[{"op": "replace", "path": "/nfScreeningType", "value": "WHITELIST"}]"#).unwrap();
        let items: Vec<PatchItem> = read_body(&path).unwrap();
        assert_eq!(items, vec![PatchItem::replace("/nfScreeningType", json!("WHITELIST"))]);
    }

    #[test]
    fn writes_are_flagged() {
        assert!(!CtlCommand::ShowOptions.is_write());
        assert!(!CtlCommand::ListRules(ScreeningRulesQuery::default()).is_write());
        assert!(CtlCommand::PatchRule(NfScreeningRulesListType::NfFqdn, Vec::new()).is_write());
    }

    #[test]
    fn run_returns_response_bodies() {
        let harness = TestHarness::new();
        let body = CtlCommand::ShowRule(NfScreeningRulesListType::NfFqdn)
            .run(&harness.service)
            .unwrap();
        assert_eq!(body["nfScreeningRulesListType"], "NF_FQDN");
        assert!(body.get("additionalAttributes").is_none());

        let err = CtlCommand::ShowRule(NfScreeningRulesListType::PlmnId)
            .run(&harness.service)
            .unwrap_err();
        assert_eq!(err.status, 404);
    }
}
