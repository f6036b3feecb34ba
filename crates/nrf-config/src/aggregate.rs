//! Paired aggregates
//!
//! System options and engineering options are each stored as two documents:
//! the options themselves and their error responses. Reads join the pair,
//! writes split it again and save both halves in one batch.

use nrf_document::{ConfigKind, ConfigurationDocument, DocumentError};
use nrf_model::{ErrorResponses, ExtensionBag, NrfEngSystemOptions, NrfSystemOptions};
use nrf_store::{WriteExpectation, WriteRequest};
use nrf_validation::Constrained;
use serde::{de::DeserializeOwned, Serialize};

/// An aggregate persisted as an options document plus an error-response document
pub(crate) trait PairedAggregate: Serialize + DeserializeOwned + Constrained + Clone {
    /// Name used in problem reports and logs
    const LABEL: &'static str;
    const PRIMARY: ConfigKind;
    const SECONDARY: ConfigKind;

    fn error_responses_mut(&mut self) -> &mut Option<ErrorResponses>;
    fn extension_bag_mut(&mut self) -> &mut Option<ExtensionBag>;

    /// Remove both extension bags
    fn clear_extension_bags(&mut self) {
        *self.extension_bag_mut() = None;
        if let Some(errors) = self.error_responses_mut() {
            errors.additional_attributes = None;
        }
    }
}

impl PairedAggregate for NrfSystemOptions {
    const LABEL: &'static str = "NrfSystemOptions";
    const PRIMARY: ConfigKind = ConfigKind::SystemOptions;
    const SECONDARY: ConfigKind = ConfigKind::ErrorResponses;

    fn error_responses_mut(&mut self) -> &mut Option<ErrorResponses> {
        &mut self.error_responses
    }

    fn extension_bag_mut(&mut self) -> &mut Option<ExtensionBag> {
        &mut self.additional_attributes
    }
}

impl PairedAggregate for NrfEngSystemOptions {
    const LABEL: &'static str = "NrfEngSystemOptions";
    const PRIMARY: ConfigKind = ConfigKind::EngSystemOptions;
    const SECONDARY: ConfigKind = ConfigKind::EngErrorResponses;

    fn error_responses_mut(&mut self) -> &mut Option<ErrorResponses> {
        &mut self.error_responses
    }

    fn extension_bag_mut(&mut self) -> &mut Option<ExtensionBag> {
        &mut self.additional_attributes
    }
}

/// Both stored halves of an aggregate and their joined value
#[derive(Debug, Clone)]
pub(crate) struct LoadedPair<T> {
    pub(crate) value: T,
    primary: ConfigurationDocument,
    secondary: ConfigurationDocument,
}

impl<T: PairedAggregate> LoadedPair<T> {
    /// Join the two documents
    pub(crate) fn join(primary: ConfigurationDocument, secondary: ConfigurationDocument) -> Result<Self, DocumentError> {
        let mut value: T = primary.decode()?;
        let errors: ErrorResponses = secondary.decode()?;
        *value.error_responses_mut() = Some(errors);
        Ok(Self {
            value,
            primary,
            secondary,
        })
    }

    /// Joined value without extension bags
    pub(crate) fn bare(&self) -> T {
        let mut value = self.value.clone();
        value.clear_extension_bags();
        value
    }

    /// Split a candidate into two writes conditioned on the loaded revisions
    ///
    /// The stored extension bags are carried over unchanged.
    pub(crate) fn split(&self, mut candidate: T, at: i64) -> Result<Vec<WriteRequest>, DocumentError> {
        let mut errors = candidate.error_responses_mut().take().unwrap_or_default();
        errors.additional_attributes = self.secondary.extension_bag().cloned();
        *candidate.extension_bag_mut() = self.primary.extension_bag().cloned();

        let primary = ConfigurationDocument::from_typed(self.primary.key().clone(), &candidate)?.with_last_update_ms(at);
        let secondary = ConfigurationDocument::from_typed(self.secondary.key().clone(), &errors)?.with_last_update_ms(at);
        Ok(vec![
            WriteRequest::new(primary, WriteExpectation::Revision(self.primary.revision())),
            WriteRequest::new(secondary, WriteExpectation::Revision(self.secondary.revision())),
        ])
    }
}
