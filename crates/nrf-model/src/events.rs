//! Recorded NF profile and subscription events

use serde::{Deserialize, Serialize};

/// One recorded event
///
/// Profile events carry `nf_instance_id`, subscription events carry
/// `subscription_id`. Either may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NrfEventDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nf_instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    pub event_type: String,
    pub event_timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl NrfEventDetails {
    #[must_use]
    pub fn profile(nf_instance_id: impl Into<String>, event_type: impl Into<String>, at: i64) -> Self {
        Self {
            nf_instance_id: Some(nf_instance_id.into()),
            subscription_id: None,
            event_type: event_type.into(),
            event_timestamp: at,
            details: None,
        }
    }

    #[must_use]
    pub fn subscription(subscription_id: impl Into<String>, event_type: impl Into<String>, at: i64) -> Self {
        Self {
            nf_instance_id: None,
            subscription_id: Some(subscription_id.into()),
            event_type: event_type.into(),
            event_timestamp: at,
            details: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NrfEventResponse {
    pub nrf_event_list: Vec<NrfEventDetails>,
}
