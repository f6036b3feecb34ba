//! Field-level constraints
//!
//! Each domain type reports every violation it finds into a
//! [`ConstraintReport`]; nothing short-circuits so callers see the full list.

use crate::failure::Violation;
use nrf_document::JsonPointer;
use nrf_model::{
    is_known_nf_type, AuthConfig, AuthFeatureConfig, CustomScreeningRules, ErrorInfo,
    ErrorResponses, ForwardingSystemOptions, GeneralEngSystemOptions, IpEndPoint,
    NfAccessTokenSystemOptions, NfAuthenticationSystemOptions, NfConfig,
    NfDiscoverSystemOptions, NfScreeningRules, NrfEngSystemOptions, NrfSystemOptions, PlmnId,
    ScreeningRuleSet, SlfSystemOptions,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::net::{Ipv4Addr, Ipv6Addr};

static FQDN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\*\.)?([A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)*[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?$")
        .expect("static regex")
});
static URI: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s/?#]+[^\s]*$").expect("static regex"));
static MCC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{3}$").expect("static regex"));
static MNC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{2,3}$").expect("static regex"));
static REDIRECT_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([345]xx|[345][0-9]{2})$").expect("static regex"));

const MAX_HOST_LEN: usize = 255;
const SCHEMES: &[&str] = &["http", "https"];
const ALGORITHMS: &[&str] = &["ES256", "RS256"];

/// Collected constraint violations
#[derive(Debug, Clone, Default)]
pub struct ConstraintReport {
    violations: Vec<Violation>,
}

impl ConstraintReport {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation at `at` unless `ok`
    #[inline]
    pub fn require(&mut self, ok: bool, at: &JsonPointer, reason: impl Into<String>) {
        if !ok {
            self.violations.push(Violation::new(at.to_string(), reason));
        }
    }

    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    #[inline]
    #[must_use]
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

/// Types with field-level constraints
pub trait Constrained {
    /// Report every violation below `at`
    fn check_constraints(&self, at: &JsonPointer, report: &mut ConstraintReport);
}

fn check_opt<T: Constrained>(item: Option<&T>, at: JsonPointer, report: &mut ConstraintReport) {
    if let Some(item) = item {
        item.check_constraints(&at, report);
    }
}

fn check_each<T: Constrained>(items: Option<&[T]>, at: JsonPointer, report: &mut ConstraintReport) {
    for (i, item) in items.unwrap_or_default().iter().enumerate() {
        item.check_constraints(&at.child(i.to_string()), report);
    }
}

fn check_strings(
    items: Option<&[String]>,
    at: JsonPointer,
    report: &mut ConstraintReport,
    valid: impl Fn(&str) -> bool,
    reason: &str,
) {
    for (i, item) in items.unwrap_or_default().iter().enumerate() {
        report.require(valid(item), &at.child(i.to_string()), format!("{reason}: '{item}'"));
    }
}

impl Constrained for NfConfig {
    fn check_constraints(&self, at: &JsonPointer, report: &mut ConstraintReport) {
        report.require(
            !self.host.trim().is_empty() && self.host.len() <= MAX_HOST_LEN,
            &at.child("host"),
            "host must be non-empty and at most 255 characters",
        );
        report.require(self.port != 0, &at.child("port"), "port must be between 1 and 65535");
        if let Some(scheme) = &self.scheme {
            report.require(
                SCHEMES.contains(&scheme.as_str()),
                &at.child("scheme"),
                "scheme must be http or https",
            );
        }
    }
}

impl Constrained for ErrorInfo {
    fn check_constraints(&self, at: &JsonPointer, report: &mut ConstraintReport) {
        report.require(
            !self.error_condition.trim().is_empty(),
            &at.child("errorCondition"),
            "errorCondition must not be empty",
        );
        report.require(
            (100..=599).contains(&self.error_code),
            &at.child("errorCode"),
            "errorCode must be a valid HTTP status code",
        );
        if let Some(url) = &self.redirect_url {
            report.require(URI.is_match(url), &at.child("redirectUrl"), "redirectUrl must be an absolute http(s) URL");
        }
    }
}

impl Constrained for ForwardingSystemOptions {
    fn check_constraints(&self, at: &JsonPointer, report: &mut ConstraintReport) {
        check_each(self.nrf_host_config.as_deref(), at.child("nrfHostConfig"), report);
    }
}

impl Constrained for SlfSystemOptions {
    fn check_constraints(&self, at: &JsonPointer, report: &mut ConstraintReport) {
        check_strings(
            self.supported_nf_type_list.as_deref(),
            at.child("supportedNfTypeList"),
            report,
            is_known_nf_type,
            "unknown NF type",
        );
        check_each(self.slf_host_config.as_deref(), at.child("slfHostConfig"), report);
    }
}

impl Constrained for NfAuthenticationSystemOptions {
    fn check_constraints(&self, at: &JsonPointer, report: &mut ConstraintReport) {
        check_each(
            self.nf_authentication_error_responses.as_deref(),
            at.child("nfAuthenticationErrorResponses"),
            report,
        );
    }
}

impl Constrained for AuthConfig {
    fn check_constraints(&self, at: &JsonPointer, report: &mut ConstraintReport) {
        report.require(is_known_nf_type(&self.nf_type), &at.child("nfType"), format!("unknown NF type: '{}'", self.nf_type));
        if let Some(algorithm) = &self.algorithm {
            report.require(
                ALGORITHMS.contains(&algorithm.as_str()),
                &at.child("algorithm"),
                "algorithm must be ES256 or RS256",
            );
        }
    }
}

impl Constrained for AuthFeatureConfig {
    fn check_constraints(&self, at: &JsonPointer, report: &mut ConstraintReport) {
        check_each(self.auth_config.as_deref(), at.child("authConfig"), report);
    }
}

impl Constrained for NfAccessTokenSystemOptions {
    fn check_constraints(&self, at: &JsonPointer, report: &mut ConstraintReport) {
        check_opt(self.auth_feature_config.as_ref(), at.child("authFeatureConfig"), report);
    }
}

impl Constrained for NfDiscoverSystemOptions {
    fn check_constraints(&self, at: &JsonPointer, report: &mut ConstraintReport) {
        if let Some(threshold) = self.discovery_result_load_threshold {
            report.require(
                threshold <= 100,
                &at.child("discoveryResultLoadThreshold"),
                "discoveryResultLoadThreshold must be between 0 and 100",
            );
        }
    }
}

impl Constrained for ErrorResponses {
    fn check_constraints(&self, at: &JsonPointer, report: &mut ConstraintReport) {
        check_each(self.slf_error_responses.as_deref(), at.child("slfErrorResponses"), report);
        check_each(
            self.nrf_forwarding_error_responses.as_deref(),
            at.child("nrfForwardingErrorResponses"),
            report,
        );
    }
}

impl Constrained for NrfSystemOptions {
    fn check_constraints(&self, at: &JsonPointer, report: &mut ConstraintReport) {
        check_opt(self.forwarding_system_options.as_ref(), at.child("forwardingSystemOptions"), report);
        check_opt(self.slf_system_options.as_ref(), at.child("slfSystemOptions"), report);
        check_opt(
            self.nf_authentication_system_options.as_ref(),
            at.child("nfAuthenticationSystemOptions"),
            report,
        );
        check_opt(
            self.nf_access_token_system_options.as_ref(),
            at.child("nfAccessTokenSystemOptions"),
            report,
        );
        check_opt(self.nf_discover_system_options.as_ref(), at.child("nfDiscoverSystemOptions"), report);
        check_opt(self.error_responses.as_ref(), at.child("errorResponses"), report);
    }
}

impl Constrained for GeneralEngSystemOptions {
    fn check_constraints(&self, at: &JsonPointer, report: &mut ConstraintReport) {
        check_strings(
            self.redirect_url_error_codes.as_deref(),
            at.child("redirectUrlErrorCodes"),
            report,
            |code| REDIRECT_CODE.is_match(code),
            "redirect error code must be 3xx, 4xx, 5xx or an exact code",
        );
    }
}

impl Constrained for NrfEngSystemOptions {
    fn check_constraints(&self, at: &JsonPointer, report: &mut ConstraintReport) {
        check_opt(self.general_eng_system_options.as_ref(), at.child("generalEngSystemOptions"), report);
        check_opt(self.error_responses.as_ref(), at.child("errorResponses"), report);
    }
}

impl Constrained for IpEndPoint {
    fn check_constraints(&self, at: &JsonPointer, report: &mut ConstraintReport) {
        match (&self.ipv4_address, &self.ipv6_address) {
            (Some(v4), None) => report.require(
                v4.parse::<Ipv4Addr>().is_ok(),
                &at.child("ipv4Address"),
                format!("invalid IPv4 address: '{v4}'"),
            ),
            (None, Some(v6)) => report.require(
                v6.parse::<Ipv6Addr>().is_ok(),
                &at.child("ipv6Address"),
                format!("invalid IPv6 address: '{v6}'"),
            ),
            _ => report.require(false, at, "exactly one of ipv4Address or ipv6Address is required"),
        }
    }
}

impl Constrained for PlmnId {
    fn check_constraints(&self, at: &JsonPointer, report: &mut ConstraintReport) {
        report.require(MCC.is_match(&self.mcc), &at.child("mcc"), "mcc must be three digits");
        report.require(MNC.is_match(&self.mnc), &at.child("mnc"), "mnc must be two or three digits");
    }
}

impl Constrained for ScreeningRuleSet {
    fn check_constraints(&self, at: &JsonPointer, report: &mut ConstraintReport) {
        check_strings(
            self.nf_fqdn.as_deref(),
            at.child("nfFqdn"),
            report,
            |f| f.len() <= MAX_HOST_LEN && FQDN.is_match(f),
            "invalid FQDN",
        );
        check_each(self.nf_ip_end_point_list.as_deref(), at.child("nfIpEndPointList"), report);
        check_strings(
            self.callback_uri.as_deref(),
            at.child("callbackUri"),
            report,
            |u| URI.is_match(u),
            "invalid callback URI",
        );
        check_each(self.plmn_id.as_deref(), at.child("plmnId"), report);
        check_strings(self.nf_type.as_deref(), at.child("nfType"), report, is_known_nf_type, "unknown NF type");
    }
}

impl Constrained for CustomScreeningRules {
    fn check_constraints(&self, at: &JsonPointer, report: &mut ConstraintReport) {
        report.require(is_known_nf_type(&self.nf_type), &at.child("nfType"), format!("unknown NF type: '{}'", self.nf_type));
        self.rules.check_constraints(&at.child("rules"), report);
    }
}

impl Constrained for NfScreeningRules {
    fn check_constraints(&self, at: &JsonPointer, report: &mut ConstraintReport) {
        check_opt(
            self.global_screening_rules_configuration.as_ref(),
            at.child("globalScreeningRulesConfiguration"),
            report,
        );
        check_each(
            self.custom_nf_screening_rules_configuration.as_deref(),
            at.child("customNfScreeningRulesConfiguration"),
            report,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nrf_model::{NfScreeningRulesListType, NfScreeningType};

    fn report_for<T: Constrained>(value: &T) -> Vec<Violation> {
        let mut report = ConstraintReport::new();
        value.check_constraints(&JsonPointer::root(), &mut report);
        report.into_violations()
    }

    #[test]
    fn nf_config_rules() {
        assert!(report_for(&NfConfig::new("nrf-2.example.com", 8080)).is_empty());

        let bad = NfConfig::new("", 0).with_scheme("ftp");
        let params: Vec<String> = report_for(&bad).into_iter().map(|v| v.param).collect();
        assert_eq!(params, vec!["/host", "/port", "/scheme"]);
    }

    #[test]
    fn error_info_rules() {
        let bad = ErrorInfo::new(" ", 999).with_redirect_url("not a url");
        assert_eq!(report_for(&bad).len(), 3);
        assert!(report_for(&ErrorInfo::new("NF_NOT_FOUND", 307).with_redirect_url("https://nrf.example/redirect")).is_empty());
    }

    #[test]
    fn screening_entries_are_checked_individually() {
        let rules = NfScreeningRules::new(NfScreeningRulesListType::NfFqdn, NfScreeningType::Blacklist)
            .with_global_rules(ScreeningRuleSet {
                nf_fqdn: Some(vec!["amf.example.com".into(), "bad fqdn".into(), "*.smf.example.com".into()]),
                plmn_id: Some(vec![PlmnId::new("310", "14"), PlmnId::new("31", "1234")]),
                nf_ip_end_point_list: Some(vec![
                    IpEndPoint::ipv4("10.0.0.1", Some(80)),
                    IpEndPoint::ipv4("10.0.0.300", None),
                ]),
                ..Default::default()
            });

        let params: Vec<String> = report_for(&rules).into_iter().map(|v| v.param).collect();
        assert_eq!(
            params,
            vec![
                "/globalScreeningRulesConfiguration/nfFqdn/1",
                "/globalScreeningRulesConfiguration/nfIpEndPointList/1/ipv4Address",
                "/globalScreeningRulesConfiguration/plmnId/1/mcc",
                "/globalScreeningRulesConfiguration/plmnId/1/mnc",
            ]
        );
    }

    #[test]
    fn ip_endpoint_needs_exactly_one_address() {
        let both = IpEndPoint {
            ipv4_address: Some("10.0.0.1".into()),
            ipv6_address: Some("::1".into()),
            port: None,
        };
        assert_eq!(report_for(&both).len(), 1);
    }

    #[test]
    fn redirect_codes_format() {
        let eng = GeneralEngSystemOptions {
            redirect_url_error_codes: Some(vec!["3xx".into(), "503".into(), "2xx".into(), "30".into()]),
        };
        let params: Vec<String> = report_for(&eng).into_iter().map(|v| v.param).collect();
        assert_eq!(params, vec!["/redirectUrlErrorCodes/2", "/redirectUrlErrorCodes/3"]);
    }

    #[test]
    fn supported_nf_types_must_be_known() {
        let slf = SlfSystemOptions {
            supported_nf_type_list: Some(vec!["UDM".into(), "WIDGET".into()]),
            slf_host_config: None,
        };
        let violations = report_for(&slf);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].param, "/supportedNfTypeList/1");
    }
}
