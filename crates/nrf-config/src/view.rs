//! Caller-facing views
//!
//! Stored documents carry an extension bag and a few internal error-response
//! fields that are never returned to callers.

use nrf_model::{ErrorResponses, NfScreeningRules, NrfEngSystemOptions, NrfSystemOptions};

/// Strip internal state from a value before returning it
pub trait ReadView {
    #[must_use]
    fn into_view(self) -> Self;
}

fn strip_error_responses(errors: &mut ErrorResponses) {
    errors.additional_attributes = None;
    for list in [&mut errors.slf_error_responses, &mut errors.nrf_forwarding_error_responses] {
        if let Some(entries) = list.take() {
            *list = Some(entries.into_iter().map(|e| e.without_internal_fields()).collect());
        }
    }
}

impl ReadView for NrfSystemOptions {
    fn into_view(mut self) -> Self {
        self.additional_attributes = None;
        if let Some(errors) = self.error_responses.as_mut() {
            strip_error_responses(errors);
        }
        let discover = self.nf_discover_system_options.get_or_insert_with(Default::default);
        discover.discovery_result_load_threshold.get_or_insert(0);
        discover.profiles_count_in_discovery_response.get_or_insert(0);
        self
    }
}

impl ReadView for NrfEngSystemOptions {
    fn into_view(mut self) -> Self {
        self.additional_attributes = None;
        if let Some(errors) = self.error_responses.as_mut() {
            strip_error_responses(errors);
        }
        self
    }
}

impl ReadView for NfScreeningRules {
    fn into_view(mut self) -> Self {
        self.additional_attributes = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nrf_model::{ErrorInfo, NfScreeningRulesListType, NfScreeningType};
    use pretty_assertions::assert_eq;

    fn bag() -> nrf_model::ExtensionBag {
        let mut bag = nrf_model::ExtensionBag::new();
        bag.insert("vendor".into(), serde_json::json!({"k": 1}));
        bag
    }

    #[test]
    fn system_options_view_hides_internal_state() {
        let mut entry = ErrorInfo::new("NRF_Not_Reachable", 503);
        entry.error_detection_result_code = Some(5);
        entry.use_error_code_returned = Some(true);
        let options = NrfSystemOptions {
            additional_attributes: Some(bag()),
            error_responses: Some(ErrorResponses {
                slf_error_responses: Some(vec![entry.clone()]),
                nrf_forwarding_error_responses: Some(vec![entry]),
                additional_attributes: Some(bag()),
            }),
            ..Default::default()
        };

        let view = options.into_view();
        assert!(view.additional_attributes.is_none());
        let errors = view.error_responses.unwrap();
        assert!(errors.additional_attributes.is_none());
        let forwarded = &errors.nrf_forwarding_error_responses.unwrap()[0];
        assert_eq!(forwarded.error_detection_result_code, None);
        assert_eq!(forwarded.use_error_code_returned, None);
        assert_eq!(forwarded.error_code, 503);
        let discover = view.nf_discover_system_options.unwrap();
        assert_eq!(discover.discovery_result_load_threshold, Some(0));
        assert_eq!(discover.profiles_count_in_discovery_response, Some(0));
    }

    #[test]
    fn discovery_values_are_kept() {
        let mut options = NrfSystemOptions::default();
        options.nf_discover_system_options = Some(nrf_model::NfDiscoverSystemOptions {
            discovery_result_load_threshold: Some(80),
            ..Default::default()
        });
        let discover = options.into_view().nf_discover_system_options.unwrap();
        assert_eq!(discover.discovery_result_load_threshold, Some(80));
        assert_eq!(discover.profiles_count_in_discovery_response, Some(0));
    }

    #[test]
    fn screening_view_drops_bag() {
        let mut rules = NfScreeningRules::new(NfScreeningRulesListType::NfFqdn, NfScreeningType::Blacklist);
        rules.additional_attributes = Some(bag());
        assert!(rules.into_view().additional_attributes.is_none());
    }
}
