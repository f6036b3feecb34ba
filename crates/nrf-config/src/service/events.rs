//! Event log queries

use super::{fetch_failure, ConfigurationService};
use crate::metrics::{observe, DbMethod, DbOperation};
use nrf_model::{ConfigResult, NrfEventDetails, NrfEventResponse, ProblemDetails};
use tracing::{debug, error};

const TABLE: &str = "NrfEventTransactions";

fn nf_instance_id(event: &NrfEventDetails) -> Option<&str> {
    event.nf_instance_id.as_deref()
}

fn subscription_id(event: &NrfEventDetails) -> Option<&str> {
    event.subscription_id.as_deref()
}

impl ConfigurationService {
    /// Events that name an NF instance, optionally only the given one
    ///
    /// # Errors
    /// NotFound when nothing matches, InternalError on store failure
    pub fn nf_profile_events(&self, wanted: Option<&str>) -> ConfigResult<NrfEventResponse> {
        debug!("Fetching NfProfile events for {:?}", wanted);
        self.query_events(nf_instance_id, wanted, "Could not find NfProfile events")
    }

    /// Events that name a subscription, optionally only the given one
    ///
    /// # Errors
    /// NotFound when nothing matches, InternalError on store failure
    pub fn nf_subscription_events(&self, wanted: Option<&str>) -> ConfigResult<NrfEventResponse> {
        debug!("Fetching NfSubscription events for {:?}", wanted);
        self.query_events(subscription_id, wanted, "Could not find NfSubscription events")
    }

    fn query_events(
        &self,
        id_of: fn(&NrfEventDetails) -> Option<&str>,
        wanted: Option<&str>,
        missing: &str,
    ) -> ConfigResult<NrfEventResponse> {
        let events = observe(DbMethod::Get, DbOperation::Find, TABLE, self.events.events())
            .map_err(|e| fetch_failure("Could not fetch NrfEventTransactions", &e))?;
        if events.is_empty() {
            error!("No NrfEventTransactions recorded");
            return Err(ProblemDetails::for_not_found(
                "Could not fetch NrfEventTransactions",
                "Could not fetch NrfEventTransactions",
            ));
        }

        let nrf_event_list: Vec<NrfEventDetails> = events
            .into_iter()
            .filter(|event| id_of(event).is_some_and(|id| wanted.map_or(true, |w| w == id)))
            .collect();
        if nrf_event_list.is_empty() {
            error!("{}", missing);
            return Err(ProblemDetails::for_not_found(missing, missing));
        }
        Ok(NrfEventResponse { nrf_event_list })
    }
}
