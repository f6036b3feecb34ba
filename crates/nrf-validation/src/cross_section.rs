//! Cross-section consistency validation
//!
//! Rules that span option sections or compare the request with persisted
//! state. Every gated feature follows one template ([`GateRule`]): when the
//! candidate enables the feature, its dependency list must end up non-empty.

use crate::failure::{ValidationFailure, ValidationStage, Verdict, Violation};
use nrf_model::{
    ErrorInfo, FeatureStatus, ForwardingSystemOptions, NrfEngSystemOptions, NrfSystemOptions,
    SlfSystemOptions,
};

/// Candidate state of one gated feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateState {
    /// Feature enabled once the request is applied
    pub enabled: bool,
    /// Dependency list length in the request; `None` when absent
    pub requested: Option<usize>,
    /// Dependency list length persisted; `None` when absent
    pub prior: Option<usize>,
}

/// Gated-feature rule: messages for the two ways the dependency can be
/// missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateRule {
    pub cause: &'static str,
    /// JSON pointer of the dependency list
    pub dependency: &'static str,
    /// Request silent on the dependency and nothing persisted
    pub missing_detail: &'static str,
    /// Request supplies an empty dependency list
    pub empty_detail: &'static str,
}

impl GateRule {
    /// Evaluate the template
    ///
    /// 1. Feature not enabled in the candidate: accepted.
    /// 2. Dependency present but empty in the request: rejected.
    /// 3. Dependency absent in the request and absent or empty in the prior
    ///    state: rejected.
    ///
    /// # Errors
    /// Returns a cross-section failure with the rule's cause and detail
    pub fn evaluate(&self, state: GateState) -> Verdict {
        if !state.enabled {
            return Ok(());
        }
        let detail = match (state.requested, state.prior) {
            (Some(0), _) => self.empty_detail,
            (None, None | Some(0)) => self.missing_detail,
            _ => return Ok(()),
        };
        Err(
            ValidationFailure::new(ValidationStage::CrossSection, self.cause, detail)
                .with_violation(Violation::new(self.dependency, detail)),
        )
    }
}

pub const FORWARDING_GATE: GateRule = GateRule {
    cause: "couldnot update forwardingSystemOptions",
    dependency: "/forwardingSystemOptions/nrfHostConfig",
    missing_detail: "Forwarding is not allowed to be enabled without nrfHostConfig",
    empty_detail: "nrfHostConfig is not allowed to be empty while enabling forwarding",
};

pub const SLF_GATE: GateRule = GateRule {
    cause: "couldnot update slfSystemOption",
    dependency: "/slfSystemOptions/slfHostConfig",
    missing_detail: "supportedNfTypeList is not allowed to be configured without slfHostConfig",
    empty_detail: "slfHostConfig is not allowed to be empty when supportedNfTypeList is present",
};

pub const AUTH_FEATURE_GATE: GateRule = GateRule {
    cause: "authFeature cannot be enabled without the configuring authConfig",
    dependency: "/nfAccessTokenSystemOptions/authFeatureConfig/authConfig",
    missing_detail: "authFeature cannot be enabled without the configuring authConfig",
    empty_detail: "authFeature cannot be enabled without the configuring authConfig",
};

const REDIRECT_CAUSE: &str = "Could not update NrfSystemOptions";

/// Validator for rules spanning sections and persisted state
///
/// Only sections carried by the request are evaluated.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossSectionConsistencyValidator;

impl CrossSectionConsistencyValidator {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Run every rule in order, stopping at the first failure
    ///
    /// # Errors
    /// Returns the first failing rule
    pub fn validate(
        &self,
        request: &NrfSystemOptions,
        prior: &NrfSystemOptions,
        eng: &NrfEngSystemOptions,
    ) -> Verdict {
        self.validate_forwarding(request, prior)?;
        self.validate_slf(request, prior)?;
        self.validate_redirect_urls(request, prior, eng)?;
        self.validate_auth_feature(request, prior)
    }

    /// Forwarding is enabled when any of its four switches is ENABLED
    ///
    /// # Errors
    /// Returns a failure when forwarding ends up enabled without hosts
    pub fn validate_forwarding(&self, request: &NrfSystemOptions, prior: &NrfSystemOptions) -> Verdict {
        let Some(requested) = &request.forwarding_system_options else {
            return Ok(());
        };
        let persisted = prior.forwarding_system_options.clone().unwrap_or_default();

        let enabled = requested
            .statuses()
            .iter()
            .zip(persisted.statuses())
            .any(|(r, p)| r.or(p).is_some_and(FeatureStatus::is_enabled));

        FORWARDING_GATE.evaluate(GateState {
            enabled,
            requested: host_count(requested),
            prior: host_count(&persisted),
        })
    }

    /// SLF is enabled when the candidate supported NF type list is non-empty
    ///
    /// # Errors
    /// Returns a failure when SLF types are configured without hosts
    pub fn validate_slf(&self, request: &NrfSystemOptions, prior: &NrfSystemOptions) -> Verdict {
        let Some(requested) = &request.slf_system_options else {
            return Ok(());
        };
        let persisted = prior.slf_system_options.clone().unwrap_or_default();

        let enabled = requested
            .supported_nf_type_list
            .as_ref()
            .or(persisted.supported_nf_type_list.as_ref())
            .is_some_and(|types| !types.is_empty());

        SLF_GATE.evaluate(GateState {
            enabled,
            requested: slf_host_count(requested),
            prior: slf_host_count(&persisted),
        })
    }

    /// Access-token authentication feature needs a non-empty authConfig
    ///
    /// # Errors
    /// Returns a failure when the feature ends up enabled without authConfig
    pub fn validate_auth_feature(&self, request: &NrfSystemOptions, prior: &NrfSystemOptions) -> Verdict {
        let Some(requested) = request.auth_feature_config() else {
            return Ok(());
        };
        let persisted = prior.auth_feature_config().cloned().unwrap_or_default();

        let enabled = requested
            .auth_feature_status
            .or(persisted.auth_feature_status)
            .is_some_and(FeatureStatus::is_enabled);

        AUTH_FEATURE_GATE.evaluate(GateState {
            enabled,
            requested: requested.auth_config.as_ref().map(Vec::len),
            prior: persisted.auth_config.as_ref().map(Vec::len),
        })
    }

    /// Authentication error responses whose code is redirect-eligible need a
    /// redirect URL in the request or in the persisted entry with the same
    /// condition
    ///
    /// # Errors
    /// Returns a failure naming the eligible code list
    pub fn validate_redirect_urls(
        &self,
        request: &NrfSystemOptions,
        prior: &NrfSystemOptions,
        eng: &NrfEngSystemOptions,
    ) -> Verdict {
        let codes = eng.redirect_url_error_codes();
        let persisted = prior.nf_authentication_error_responses();

        for (i, entry) in request.nf_authentication_error_responses().iter().enumerate() {
            let Some(previous) = persisted
                .iter()
                .find(|p| p.error_condition == entry.error_condition)
            else {
                continue;
            };
            if redirect_eligible(entry, codes)
                && entry.redirect_url.is_none()
                && previous.redirect_url.is_none()
            {
                let detail = format!(
                    "redirectURL should be configured for redirect error codes: [{}]",
                    codes.join(", ")
                );
                tracing::debug!("Error response '{}' lacks redirect URL", entry.error_condition);
                return Err(ValidationFailure::new(ValidationStage::CrossSection, REDIRECT_CAUSE, detail.clone())
                    .with_violation(Violation::new(
                        format!("/nfAuthenticationSystemOptions/nfAuthenticationErrorResponses/{i}/redirectUrl"),
                        detail,
                    )));
            }
        }
        Ok(())
    }
}

/// Code matches a listed `Nxx` group or the exact code
#[must_use]
pub fn redirect_eligible(entry: &ErrorInfo, codes: &[String]) -> bool {
    let group = entry.code_group();
    let exact = entry.error_code.to_string();
    codes
        .iter()
        .any(|c| c.eq_ignore_ascii_case(&group) || *c == exact)
}

fn host_count(options: &ForwardingSystemOptions) -> Option<usize> {
    options.nrf_host_config.as_ref().map(Vec::len)
}

fn slf_host_count(options: &SlfSystemOptions) -> Option<usize> {
    options.slf_host_config.as_ref().map(Vec::len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nrf_model::{
        AuthConfig, AuthFeatureConfig, GeneralEngSystemOptions, NfAccessTokenSystemOptions,
        NfAuthenticationSystemOptions, NfConfig,
    };
    use proptest::prelude::*;

    fn forwarding(statuses: [Option<FeatureStatus>; 4], hosts: Option<Vec<NfConfig>>) -> NrfSystemOptions {
        NrfSystemOptions {
            forwarding_system_options: Some(ForwardingSystemOptions {
                access_token_forwarding_status: statuses[0],
                discovery_forwarding_status: statuses[1],
                profile_retrieval_forwarding_status: statuses[2],
                subscription_forwarding_status: statuses[3],
                nrf_host_config: hosts,
            }),
            ..Default::default()
        }
    }

    fn host() -> Vec<NfConfig> {
        vec![NfConfig::new("nrf-2.example.com", 8080)]
    }

    const ENABLED: Option<FeatureStatus> = Some(FeatureStatus::Enabled);
    const DISABLED: Option<FeatureStatus> = Some(FeatureStatus::Disabled);

    fn eng(codes: &[&str]) -> NrfEngSystemOptions {
        NrfEngSystemOptions {
            general_eng_system_options: Some(GeneralEngSystemOptions {
                redirect_url_error_codes: Some(codes.iter().map(ToString::to_string).collect()),
            }),
            ..Default::default()
        }
    }

    fn auth_errors(entries: Vec<ErrorInfo>) -> NrfSystemOptions {
        NrfSystemOptions {
            nf_authentication_system_options: Some(NfAuthenticationSystemOptions {
                nf_authentication_error_responses: Some(entries),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn enabling_forwarding_without_hosts_anywhere_fails() {
        let request = forwarding([ENABLED, None, None, None], None);
        let failure = CrossSectionConsistencyValidator::new()
            .validate_forwarding(&request, &NrfSystemOptions::default())
            .unwrap_err();
        assert_eq!(failure.detail, FORWARDING_GATE.missing_detail);
        assert_eq!(failure.cause, "couldnot update forwardingSystemOptions");
    }

    #[test]
    fn enabling_forwarding_with_empty_hosts_fails() {
        let request = forwarding([None, ENABLED, None, None], Some(Vec::new()));
        let prior = forwarding([None; 4], Some(host()));
        let failure = CrossSectionConsistencyValidator::new()
            .validate_forwarding(&request, &prior)
            .unwrap_err();
        assert_eq!(failure.detail, FORWARDING_GATE.empty_detail);
    }

    #[test]
    fn enabling_forwarding_inherits_persisted_hosts() {
        let request = forwarding([ENABLED, None, None, None], None);
        let prior = forwarding([None; 4], Some(host()));
        assert!(CrossSectionConsistencyValidator::new()
            .validate_forwarding(&request, &prior)
            .is_ok());
    }

    #[test]
    fn silent_switches_inherit_persisted_enabled_state() {
        let prior = forwarding([ENABLED; 4], Some(host()));
        let request = forwarding([None; 4], Some(Vec::new()));
        assert!(CrossSectionConsistencyValidator::new()
            .validate_forwarding(&request, &prior)
            .is_err());
    }

    #[test]
    fn disabling_forwarding_is_always_accepted() {
        let prior = forwarding([ENABLED; 4], Some(Vec::new()));
        let request = forwarding([DISABLED; 4], Some(Vec::new()));
        assert!(CrossSectionConsistencyValidator::new()
            .validate_forwarding(&request, &prior)
            .is_ok());
    }

    #[test]
    fn absent_section_is_not_evaluated() {
        let prior = forwarding([ENABLED; 4], Some(Vec::new()));
        let request = NrfSystemOptions::default();
        assert!(CrossSectionConsistencyValidator::new()
            .validate_forwarding(&request, &prior)
            .is_ok());

        let reassert = forwarding([None; 4], None);
        assert!(CrossSectionConsistencyValidator::new()
            .validate_forwarding(&reassert, &prior)
            .is_err());
    }

    #[test]
    fn slf_types_need_hosts() {
        let validator = CrossSectionConsistencyValidator::new();
        let request = NrfSystemOptions {
            slf_system_options: Some(SlfSystemOptions {
                supported_nf_type_list: Some(vec!["UDM".into()]),
                slf_host_config: None,
            }),
            ..Default::default()
        };
        let failure = validator.validate_slf(&request, &NrfSystemOptions::default()).unwrap_err();
        assert_eq!(failure.detail, SLF_GATE.missing_detail);

        let empty_hosts = NrfSystemOptions {
            slf_system_options: Some(SlfSystemOptions {
                supported_nf_type_list: None,
                slf_host_config: Some(Vec::new()),
            }),
            ..Default::default()
        };
        let prior = NrfSystemOptions {
            slf_system_options: Some(SlfSystemOptions {
                supported_nf_type_list: Some(vec!["UDM".into()]),
                slf_host_config: Some(host()),
            }),
            ..Default::default()
        };
        let failure = validator.validate_slf(&empty_hosts, &prior).unwrap_err();
        assert_eq!(failure.detail, SLF_GATE.empty_detail);
    }

    #[test]
    fn clearing_slf_types_with_empty_hosts_is_accepted() {
        let request = NrfSystemOptions {
            slf_system_options: Some(SlfSystemOptions {
                supported_nf_type_list: Some(Vec::new()),
                slf_host_config: Some(Vec::new()),
            }),
            ..Default::default()
        };
        assert!(CrossSectionConsistencyValidator::new()
            .validate_slf(&request, &NrfSystemOptions::default())
            .is_ok());
    }

    #[test]
    fn auth_feature_needs_auth_config() {
        let request = NrfSystemOptions {
            nf_access_token_system_options: Some(NfAccessTokenSystemOptions {
                auth_feature_config: Some(AuthFeatureConfig {
                    auth_feature_status: Some(FeatureStatus::Enabled),
                    auth_config: None,
                }),
            }),
            ..Default::default()
        };
        let validator = CrossSectionConsistencyValidator::new();
        let failure = validator
            .validate_auth_feature(&request, &NrfSystemOptions::default())
            .unwrap_err();
        assert_eq!(failure.cause, AUTH_FEATURE_GATE.cause);

        let prior = NrfSystemOptions {
            nf_access_token_system_options: Some(NfAccessTokenSystemOptions {
                auth_feature_config: Some(AuthFeatureConfig {
                    auth_feature_status: None,
                    auth_config: Some(vec![AuthConfig::new("AMF")]),
                }),
            }),
            ..Default::default()
        };
        assert!(validator.validate_auth_feature(&request, &prior).is_ok());
    }

    #[test]
    fn redirect_eligible_entry_without_url_fails() {
        let prior = auth_errors(vec![ErrorInfo::new("NF_NOT_FOUND", 404)]);
        let request = auth_errors(vec![ErrorInfo::new("NF_NOT_FOUND", 307)]);
        let failure = CrossSectionConsistencyValidator::new()
            .validate_redirect_urls(&request, &prior, &eng(&["3xx", "503"]))
            .unwrap_err();
        assert_eq!(
            failure.detail,
            "redirectURL should be configured for redirect error codes: [3xx, 503]"
        );
        assert_eq!(failure.cause, "Could not update NrfSystemOptions");
    }

    #[test]
    fn persisted_redirect_url_satisfies_rule() {
        let prior = auth_errors(vec![
            ErrorInfo::new("NF_NOT_FOUND", 307).with_redirect_url("https://nrf.example/r"),
        ]);
        let request = auth_errors(vec![ErrorInfo::new("NF_NOT_FOUND", 308)]);
        assert!(CrossSectionConsistencyValidator::new()
            .validate_redirect_urls(&request, &prior, &eng(&["3xx"]))
            .is_ok());
    }

    #[test]
    fn exact_code_and_unmatched_condition() {
        let validator = CrossSectionConsistencyValidator::new();
        let prior = auth_errors(vec![ErrorInfo::new("TOKEN_EXPIRED", 401)]);

        let exact = auth_errors(vec![ErrorInfo::new("TOKEN_EXPIRED", 503)]);
        assert!(validator.validate_redirect_urls(&exact, &prior, &eng(&["503"])).is_err());

        let new_condition = auth_errors(vec![ErrorInfo::new("BRAND_NEW", 503)]);
        assert!(validator
            .validate_redirect_urls(&new_condition, &prior, &eng(&["503"]))
            .is_ok());

        let not_listed = auth_errors(vec![ErrorInfo::new("TOKEN_EXPIRED", 401)]);
        assert!(validator
            .validate_redirect_urls(&not_listed, &prior, &eng(&["3xx", "503"]))
            .is_ok());
    }

    #[test]
    fn rules_run_in_order() {
        let request = NrfSystemOptions {
            slf_system_options: Some(SlfSystemOptions {
                supported_nf_type_list: Some(vec!["UDM".into()]),
                slf_host_config: None,
            }),
            ..forwarding([ENABLED, None, None, None], None)
        };
        let failure = CrossSectionConsistencyValidator::new()
            .validate(&request, &NrfSystemOptions::default(), &NrfEngSystemOptions::default())
            .unwrap_err();
        assert_eq!(failure.cause, FORWARDING_GATE.cause);
    }

    proptest! {
        #[test]
        fn gate_template_properties(
            enabled in any::<bool>(),
            requested in proptest::option::of(0usize..3),
            prior in proptest::option::of(0usize..3),
        ) {
            let verdict = FORWARDING_GATE.evaluate(GateState { enabled, requested, prior });
            let dependency_available = match requested {
                Some(n) => n > 0,
                None => prior.is_some_and(|n| n > 0),
            };
            prop_assert_eq!(verdict.is_ok(), !enabled || dependency_available);
        }
    }
}
