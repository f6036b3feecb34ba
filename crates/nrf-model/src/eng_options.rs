//! Engineering system options
//!
//! Tuning knobs that are not part of the operator surface. The redirect error
//! code list drives the redirect-URL rule for authentication error responses.

use crate::common::ExtensionBag;
use crate::system_options::ErrorResponses;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NrfEngSystemOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_eng_system_options: Option<GeneralEngSystemOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_responses: Option<ErrorResponses>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_attributes: Option<ExtensionBag>,
}

impl NrfEngSystemOptions {
    /// Codes (`"3xx"` style groups or exact codes) that require a redirect URL
    #[inline]
    #[must_use]
    pub fn redirect_url_error_codes(&self) -> &[String] {
        self.general_eng_system_options
            .as_ref()
            .and_then(|g| g.redirect_url_error_codes.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GeneralEngSystemOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url_error_codes: Option<Vec<String>>,
}
