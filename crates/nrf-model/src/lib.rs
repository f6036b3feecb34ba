//! NRF Configuration Model
//!
//! Typed domain objects for the NRF configuration surface and the single
//! failure representation shared by every operation.
//!
//! # Core Concepts
//!
//! - [`NrfSystemOptions`]: operator-facing system options, persisted as two documents
//! - [`NrfEngSystemOptions`]: engineering options (redirect error codes and friends)
//! - [`NfScreeningRules`]: one screening rule list per [`NfScreeningRulesListType`]
//! - [`NrfEventDetails`]: recorded profile and subscription events
//! - [`ProblemDetails`]: caller-facing failure with a [`ProblemKind`] classification
//!
//! # Example
//!
//! ```rust,ignore
//! use nrf_model::{FeatureStatus, ForwardingSystemOptions, NrfSystemOptions};
//!
//! let request = NrfSystemOptions {
//!     forwarding_system_options: Some(ForwardingSystemOptions {
//!         discovery_forwarding_status: Some(FeatureStatus::Enabled),
//!         ..Default::default()
//!     }),
//!     ..Default::default()
//! };
//! assert!(request.forwarding_system_options.unwrap().any_enabled());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod common;
mod eng_options;
mod events;
mod problem;
mod screening;
mod system_options;

pub use common::{is_known_nf_type, ErrorInfo, ExtensionBag, FeatureStatus, LogLevel, NfConfig, NF_TYPES};
pub use eng_options::{GeneralEngSystemOptions, NrfEngSystemOptions};
pub use events::{NrfEventDetails, NrfEventResponse};
pub use problem::{ConfigResult, InvalidParam, ProblemDetails, ProblemKind};
pub use screening::{
    CustomScreeningRules, IpEndPoint, NfScreeningRules, NfScreeningRulesList,
    NfScreeningRulesListStatus, NfScreeningRulesListType, NfScreeningType, PlmnId,
    ScreeningRuleSet, ScreeningRulesQuery,
};
pub use system_options::{
    AuthConfig, AuthFeatureConfig, ErrorResponses, ForwardingSystemOptions,
    LoggingLevelSystemOptions, NfAccessTokenSystemOptions, NfAuthenticationSystemOptions,
    NfDiscoverSystemOptions, NrfSystemOptions, SlfSystemOptions,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the NRF configuration model
    pub use crate::{
        ConfigResult, FeatureStatus, NfScreeningRules, NfScreeningRulesListType,
        NrfEngSystemOptions, NrfSystemOptions, ProblemDetails, ProblemKind,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn system_options_decode_from_wire_shape() {
        let wire = json!({
            "forwardingSystemOptions": {
                "accessTokenForwardingStatus": "ENABLED",
                "nrfHostConfig": [{"host": "nrf-2.oracle.com", "port": 8080}]
            },
            "loggingLevelSystemOptions": {"nrfConfigurationLogLevel": "DEBUG"},
            "errorResponses": {
                "slfErrorResponses": [{"errorCondition": "SLF_NOT_REACHABLE", "errorCode": 503}]
            }
        });

        let options: NrfSystemOptions = serde_json::from_value(wire).unwrap();
        let forwarding = options.forwarding_system_options.as_ref().unwrap();
        assert!(forwarding.any_enabled());
        assert_eq!(options.requested_log_level(), Some(LogLevel::Debug));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let wire = json!({
            "nfScreeningRulesListType": "NF_FQDN",
            "nfScreeningType": "BLACKLIST",
            "bogus": 1
        });
        let result: Result<NfScreeningRules, _> = serde_json::from_value(wire);
        assert!(result.is_err());
    }
}
