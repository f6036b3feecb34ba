//! Semantic validation
//!
//! Content rules that depend on configuration rather than on the shape of a
//! single field: entry-count limits and uniqueness of condition keys.

use crate::failure::{ValidationFailure, ValidationStage, Verdict, Violation};
use nrf_model::{ErrorInfo, NfScreeningRules, NrfEngSystemOptions, NrfSystemOptions};
use std::collections::HashSet;

/// Default per-field entry limit
pub const DEFAULT_MAX_COUNT: usize = 1000;

/// Validator for count limits and uniqueness
#[derive(Debug, Clone, Copy)]
pub struct SemanticValidator {
    max_count: usize,
}

impl Default for SemanticValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_COUNT)
    }
}

impl SemanticValidator {
    #[inline]
    #[must_use]
    pub fn new(max_count: usize) -> Self {
        Self { max_count }
    }

    #[inline]
    #[must_use]
    pub fn max_count(&self) -> usize {
        self.max_count
    }

    /// Every rule set stays within `max_count` distinct entries for the
    /// field its list type governs
    ///
    /// # Errors
    /// Returns a semantic failure naming each over-limit rule set
    pub fn validate_screening_rules(&self, rules: &NfScreeningRules) -> Verdict {
        let list_type = rules.nf_screening_rules_list_type;
        let field = list_type.governed_field();

        let mut violations: Vec<Violation> = rules
            .rule_sets()
            .into_iter()
            .filter_map(|(location, set)| {
                let count = set.distinct_entries(list_type);
                (count > self.max_count).then(|| {
                    Violation::new(
                        format!("{location}/{field}"),
                        format!("{count} entries exceed maxCount {}", self.max_count),
                    )
                })
            })
            .collect();

        let custom_sets = rules
            .custom_nf_screening_rules_configuration
            .as_ref()
            .map_or(0, Vec::len);
        if custom_sets > self.max_count {
            violations.push(Violation::new(
                "/customNfScreeningRulesConfiguration",
                format!("{custom_sets} rule sets exceed maxCount {}", self.max_count),
            ));
        }

        self.verdict(
            "Could not update NfScreeningRules",
            format!("NfScreeningRules for {list_type} exceed maxCount {}", self.max_count),
            violations,
        )
    }

    /// Host lists stay within `max_count` and condition keys are unique
    /// within each error-response list
    ///
    /// # Errors
    /// Returns a semantic failure listing every violation
    pub fn validate_system_options(&self, options: &NrfSystemOptions) -> Verdict {
        let mut violations = Vec::new();

        if let Some(forwarding) = &options.forwarding_system_options {
            self.check_len(
                forwarding.nrf_host_config.as_ref().map_or(0, Vec::len),
                "/forwardingSystemOptions/nrfHostConfig",
                &mut violations,
            );
        }
        if let Some(slf) = &options.slf_system_options {
            self.check_len(
                slf.slf_host_config.as_ref().map_or(0, Vec::len),
                "/slfSystemOptions/slfHostConfig",
                &mut violations,
            );
        }

        unique_conditions(
            options.nf_authentication_error_responses(),
            "/nfAuthenticationSystemOptions/nfAuthenticationErrorResponses",
            &mut violations,
        );
        if let Some(errors) = &options.error_responses {
            unique_conditions(
                errors.slf_error_responses.as_deref().unwrap_or_default(),
                "/errorResponses/slfErrorResponses",
                &mut violations,
            );
            unique_conditions(
                errors.nrf_forwarding_error_responses.as_deref().unwrap_or_default(),
                "/errorResponses/nrfForwardingErrorResponses",
                &mut violations,
            );
        }

        self.verdict(
            "Could not update NrfSystemOptions",
            "NrfSystemOptions violate configured limits",
            violations,
        )
    }

    /// Redirect error codes are listed once each
    ///
    /// # Errors
    /// Returns a semantic failure naming each duplicate
    pub fn validate_eng_system_options(&self, options: &NrfEngSystemOptions) -> Verdict {
        let mut seen = HashSet::new();
        let violations = options
            .redirect_url_error_codes()
            .iter()
            .enumerate()
            .filter(|(_, code)| !seen.insert(code.to_ascii_lowercase()))
            .map(|(i, code)| {
                Violation::new(
                    format!("/generalEngSystemOptions/redirectUrlErrorCodes/{i}"),
                    format!("duplicate redirect error code '{code}'"),
                )
            })
            .collect();

        self.verdict(
            "Could not update NrfEngSystemOptions",
            "NrfEngSystemOptions contain duplicate entries",
            violations,
        )
    }

    fn check_len(&self, len: usize, param: &str, violations: &mut Vec<Violation>) {
        if len > self.max_count {
            violations.push(Violation::new(
                param,
                format!("{len} entries exceed maxCount {}", self.max_count),
            ));
        }
    }

    fn verdict(&self, cause: &str, detail: impl Into<String>, violations: Vec<Violation>) -> Verdict {
        if violations.is_empty() {
            return Ok(());
        }
        tracing::debug!("Semantic validation found {} violation(s)", violations.len());
        Err(ValidationFailure::new(ValidationStage::Semantic, cause, detail).with_violations(violations))
    }
}

fn unique_conditions(entries: &[ErrorInfo], at: &str, violations: &mut Vec<Violation>) {
    let mut seen = HashSet::new();
    for (i, entry) in entries.iter().enumerate() {
        if !seen.insert(entry.error_condition.as_str()) {
            violations.push(Violation::new(
                format!("{at}/{i}/errorCondition"),
                format!("duplicate errorCondition '{}'", entry.error_condition),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nrf_model::{
        CustomScreeningRules, NfAuthenticationSystemOptions, NfScreeningRulesListType,
        NfScreeningType, ScreeningRuleSet,
    };

    fn fqdn_rules(count: usize) -> NfScreeningRules {
        let fqdns = (0..count).map(|i| format!("nf{i}.example.com")).collect();
        NfScreeningRules::new(NfScreeningRulesListType::NfFqdn, NfScreeningType::Blacklist)
            .with_global_rules(ScreeningRuleSet {
                nf_fqdn: Some(fqdns),
                ..Default::default()
            })
    }

    #[test]
    fn at_limit_passes() {
        assert!(SemanticValidator::default().validate_screening_rules(&fqdn_rules(1000)).is_ok());
    }

    #[test]
    fn over_limit_names_the_limit() {
        let failure = SemanticValidator::default()
            .validate_screening_rules(&fqdn_rules(1001))
            .unwrap_err();
        assert_eq!(failure.stage, ValidationStage::Semantic);
        assert!(failure.detail.contains("maxCount 1000"));
        assert_eq!(failure.violations[0].param, "/globalScreeningRulesConfiguration/nfFqdn");
        assert!(failure.violations[0].reason.contains("1001"));
    }

    #[test]
    fn duplicates_do_not_count_twice() {
        let mut rules = fqdn_rules(3);
        if let Some(set) = rules.global_screening_rules_configuration.as_mut() {
            set.nf_fqdn.get_or_insert_with(Vec::new).push("nf0.example.com".into());
        }
        assert!(SemanticValidator::new(3).validate_screening_rules(&rules).is_ok());
    }

    #[test]
    fn only_the_governed_field_counts() {
        let rules = NfScreeningRules::new(NfScreeningRulesListType::CallbackUri, NfScreeningType::Whitelist)
            .with_custom_rules(CustomScreeningRules {
                nf_type: "AMF".into(),
                rules: ScreeningRuleSet {
                    nf_fqdn: Some(vec!["a.example".into(), "b.example".into()]),
                    callback_uri: Some(vec!["http://cb.example/1".into()]),
                    ..Default::default()
                },
            });
        assert!(SemanticValidator::new(1).validate_screening_rules(&rules).is_ok());
    }

    #[test]
    fn duplicate_error_conditions_rejected() {
        let options = NrfSystemOptions {
            nf_authentication_system_options: Some(NfAuthenticationSystemOptions {
                nf_authentication_error_responses: Some(vec![
                    ErrorInfo::new("NF_NOT_FOUND", 404),
                    ErrorInfo::new("NF_NOT_FOUND", 307),
                ]),
            }),
            ..Default::default()
        };
        let failure = SemanticValidator::default().validate_system_options(&options).unwrap_err();
        assert_eq!(
            failure.violations[0].param,
            "/nfAuthenticationSystemOptions/nfAuthenticationErrorResponses/1/errorCondition"
        );
    }

    #[test]
    fn duplicate_redirect_codes_rejected() {
        let options: NrfEngSystemOptions = serde_json::from_value(serde_json::json!({
            "generalEngSystemOptions": {"redirectUrlErrorCodes": ["3xx", "503", "3XX"]}
        }))
        .unwrap();
        let failure = SemanticValidator::default().validate_eng_system_options(&options).unwrap_err();
        assert_eq!(failure.violations.len(), 1);
    }
}
