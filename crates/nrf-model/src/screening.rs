//! NF screening rule lists
//!
//! One rule list exists per [`NfScreeningRulesListType`]. The list type is the
//! identity of the document and cannot change after creation.

use crate::common::{ExtensionBag, FeatureStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::hash::Hash;
use std::str::FromStr;

/// Rule list discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NfScreeningRulesListType {
    NfFqdn,
    NfIpEndpoint,
    CallbackUri,
    PlmnId,
    NfTypeRegister,
}

impl NfScreeningRulesListType {
    pub const ALL: [Self; 5] = [
        Self::NfFqdn,
        Self::NfIpEndpoint,
        Self::CallbackUri,
        Self::PlmnId,
        Self::NfTypeRegister,
    ];

    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NfFqdn => "NF_FQDN",
            Self::NfIpEndpoint => "NF_IP_ENDPOINT",
            Self::CallbackUri => "CALLBACK_URI",
            Self::PlmnId => "PLMN_ID",
            Self::NfTypeRegister => "NF_TYPE_REGISTER",
        }
    }

    /// Rule-set field screened by this list type
    #[inline]
    #[must_use]
    pub fn governed_field(self) -> &'static str {
        match self {
            Self::NfFqdn => "nfFqdn",
            Self::NfIpEndpoint => "nfIpEndPointList",
            Self::CallbackUri => "callbackUri",
            Self::PlmnId => "plmnId",
            Self::NfTypeRegister => "nfType",
        }
    }
}

impl Display for NfScreeningRulesListType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NfScreeningRulesListType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid NfScreening Rule Type '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NfScreeningType {
    Blacklist,
    Whitelist,
}

/// Rule lists are created DISABLED unless stated otherwise
pub type NfScreeningRulesListStatus = FeatureStatus;

/// One screening rule list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NfScreeningRules {
    pub nf_screening_rules_list_type: NfScreeningRulesListType,
    pub nf_screening_type: NfScreeningType,
    #[serde(default)]
    pub nf_screening_rules_list_status: NfScreeningRulesListStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_screening_rules_configuration: Option<ScreeningRuleSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_nf_screening_rules_configuration: Option<Vec<CustomScreeningRules>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_attributes: Option<ExtensionBag>,
}

impl NfScreeningRules {
    /// Empty, disabled rule list
    #[must_use]
    pub fn new(list_type: NfScreeningRulesListType, screening_type: NfScreeningType) -> Self {
        Self {
            nf_screening_rules_list_type: list_type,
            nf_screening_type: screening_type,
            nf_screening_rules_list_status: FeatureStatus::Disabled,
            global_screening_rules_configuration: None,
            custom_nf_screening_rules_configuration: None,
            additional_attributes: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: NfScreeningRulesListStatus) -> Self {
        self.nf_screening_rules_list_status = status;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_global_rules(mut self, rules: ScreeningRuleSet) -> Self {
        self.global_screening_rules_configuration = Some(rules);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_custom_rules(mut self, rules: CustomScreeningRules) -> Self {
        self.custom_nf_screening_rules_configuration
            .get_or_insert_with(Vec::new)
            .push(rules);
        self
    }

    /// Every rule set with its JSON pointer location
    #[must_use]
    pub fn rule_sets(&self) -> Vec<(String, &ScreeningRuleSet)> {
        let mut sets = Vec::new();
        if let Some(global) = &self.global_screening_rules_configuration {
            sets.push(("/globalScreeningRulesConfiguration".to_string(), global));
        }
        for (i, custom) in self
            .custom_nf_screening_rules_configuration
            .iter()
            .flatten()
            .enumerate()
        {
            sets.push((
                format!("/customNfScreeningRulesConfiguration/{i}/rules"),
                &custom.rules,
            ));
        }
        sets
    }
}

/// Entries a rule set screens against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScreeningRuleSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nf_fqdn: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nf_ip_end_point_list: Option<Vec<IpEndPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_uri: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plmn_id: Option<Vec<PlmnId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nf_type: Option<Vec<String>>,
}

impl ScreeningRuleSet {
    /// Distinct entries in the field governed by `list_type`
    #[must_use]
    pub fn distinct_entries(&self, list_type: NfScreeningRulesListType) -> usize {
        match list_type {
            NfScreeningRulesListType::NfFqdn => distinct(self.nf_fqdn.as_deref()),
            NfScreeningRulesListType::NfIpEndpoint => distinct(self.nf_ip_end_point_list.as_deref()),
            NfScreeningRulesListType::CallbackUri => distinct(self.callback_uri.as_deref()),
            NfScreeningRulesListType::PlmnId => distinct(self.plmn_id.as_deref()),
            NfScreeningRulesListType::NfTypeRegister => distinct(self.nf_type.as_deref()),
        }
    }
}

fn distinct<T: Eq + Hash>(entries: Option<&[T]>) -> usize {
    entries
        .unwrap_or_default()
        .iter()
        .collect::<HashSet<_>>()
        .len()
}

/// Rule set scoped to one NF type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomScreeningRules {
    pub nf_type: String,
    #[serde(default)]
    pub rules: ScreeningRuleSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IpEndPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl IpEndPoint {
    #[inline]
    #[must_use]
    pub fn ipv4(address: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            ipv4_address: Some(address.into()),
            ipv6_address: None,
            port,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlmnId {
    pub mcc: String,
    pub mnc: String,
}

impl PlmnId {
    #[inline]
    #[must_use]
    pub fn new(mcc: impl Into<String>, mnc: impl Into<String>) -> Self {
        Self {
            mcc: mcc.into(),
            mnc: mnc.into(),
        }
    }
}

/// Bulk create body and filtered query result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NfScreeningRulesList {
    #[serde(default)]
    pub nf_screening_rules_list: Vec<NfScreeningRules>,
}

/// Optional filters for listing rule lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreeningRulesQuery {
    pub list_type: Option<NfScreeningRulesListType>,
    pub status: Option<NfScreeningRulesListStatus>,
}

impl ScreeningRulesQuery {
    #[inline]
    #[must_use]
    pub fn with_list_type(mut self, list_type: NfScreeningRulesListType) -> Self {
        self.list_type = Some(list_type);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: NfScreeningRulesListStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Check a rule list against both filters
    #[inline]
    #[must_use]
    pub fn matches(&self, rules: &NfScreeningRules) -> bool {
        self.list_type
            .map_or(true, |t| t == rules.nf_screening_rules_list_type)
            && self
                .status
                .map_or(true, |s| s == rules.nf_screening_rules_list_status)
    }
}
