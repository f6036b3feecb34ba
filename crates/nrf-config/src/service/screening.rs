//! Screening rule operations

use super::{fetch_failure, now_ms, rejection, store_failure, ConfigurationService};
use crate::metrics::{observe, DbMethod, DbOperation};
use crate::view::ReadView;
use nrf_document::{ConfigKind, ConfigurationDocument, PatchItem};
use nrf_model::{
    ConfigResult, InvalidParam, NfScreeningRules, NfScreeningRulesList, NfScreeningRulesListType, ProblemDetails,
    ProblemKind, ScreeningRulesQuery,
};
use nrf_store::{WriteExpectation, WriteRequest};
use nrf_validation::{ValidationFailure, Verdict};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

const TABLE: &str = "NfScreening";
const UPDATE_CAUSE: &str = "Could not update NfScreeningRules";

fn not_found(list_type: NfScreeningRulesListType) -> ProblemDetails {
    let message = format!("NfScreeningRule for {list_type} is not found");
    error!("{}", message);
    ProblemDetails::for_not_found(message.as_str(), message.as_str())
}

fn patch_param(item: &PatchItem) -> InvalidParam {
    InvalidParam::new("patchItem", item.to_string())
}

/// An item applied but left the list invalid
fn invalid_patch(failure: &ValidationFailure, item: &PatchItem) -> ProblemDetails {
    error!("Patch item {} rejected: {}", item, failure);
    ProblemDetails::for_unprocessable_entity(failure.cause.as_str(), "patch causes the resource to become invalid")
        .with_invalid_params(failure.invalid_params())
        .with_invalid_param(patch_param(item))
}

impl ConfigurationService {
    /// One screening rule list
    ///
    /// # Errors
    /// NotFound if no list of this type is stored, InternalError on store failure
    pub fn screening_rule(&self, list_type: NfScreeningRulesListType) -> ConfigResult<NfScreeningRules> {
        debug!("Fetching NfScreeningRules for {}", list_type);
        let document = self
            .find(DbMethod::Get, ConfigKind::ScreeningRules(list_type))
            .map_err(|e| fetch_failure("Could not fetch NfScreeningRule due to a certain db operation error.", &e))?
            .ok_or_else(|| not_found(list_type))?;
        let rules: NfScreeningRules = document
            .decode()
            .map_err(|e| fetch_failure("Could not fetch NfScreeningRule due to an unexpected error.", &e))?;
        Ok(rules.into_view())
    }

    /// Every screening rule list of the owner matching `query`
    ///
    /// # Errors
    /// InternalError on store failure or an unreadable stored list
    pub fn screening_rules(&self, query: &ScreeningRulesQuery) -> ConfigResult<NfScreeningRulesList> {
        debug!("Fetching NfScreeningRules matching {:?}", query);
        let documents = observe(DbMethod::Get, DbOperation::Find, TABLE, self.store.find_by_owner(&self.owner))
            .map_err(|e| fetch_failure("Could not fetch NfScreeningRules due to a certain db operation error.", &e))?;

        let mut list = Vec::new();
        for document in documents.iter().filter(|d| d.key().kind.is_screening()) {
            let rules: NfScreeningRules = document
                .decode()
                .map_err(|e| fetch_failure("Could not fetch NfScreeningRules due to an unexpected error.", &e))?;
            if query.matches(&rules) {
                list.push(rules.into_view());
            }
        }
        list.sort_by_key(|rules| rules.nf_screening_rules_list_type.as_str());
        Ok(NfScreeningRulesList {
            nf_screening_rules_list: list,
        })
    }

    /// Replace (or create) one screening rule list
    ///
    /// The list type from `list_type` wins over the one in `rules`. A stored
    /// extension bag is kept.
    ///
    /// # Errors
    /// BadRequest on validation failure, Conflict on a concurrent write,
    /// InternalError on store failure
    pub fn replace_screening_rule(
        &self,
        list_type: NfScreeningRulesListType,
        mut rules: NfScreeningRules,
    ) -> ConfigResult<NfScreeningRules> {
        info!("Replacing NfScreeningRules for {}", list_type);
        rules.nf_screening_rules_list_type = list_type;
        self.validate_rules(&rules).map_err(|f| rejection(ProblemKind::BadRequest, &f))?;

        let prior = self
            .find(DbMethod::Put, ConfigKind::ScreeningRules(list_type))
            .map_err(|e| fetch_failure(UPDATE_CAUSE, &e))?;
        if let Some(document) = &prior {
            rules.additional_attributes = document.extension_bag().cloned();
        }

        let request = self.rules_write(rules, WriteExpectation::from_prior(prior.as_ref()), now_ms())?;
        let saved = observe(DbMethod::Put, DbOperation::Update, TABLE, self.store.save(request))
            .map_err(|e| store_failure(UPDATE_CAUSE, &e))?;
        warn!("Successfully updated NfScreeningRules for {}", list_type);
        Self::rehydrate_rules(&saved)
    }

    /// Apply a patch to one stored screening rule list
    ///
    /// Items apply in order to the caller view of the stored list. Every
    /// intermediate result is validated until an item fails to apply; after
    /// that, the remaining items are only applied to collect their errors.
    ///
    /// # Errors
    /// BadRequest on a read-only target or any item that fails to apply,
    /// UnprocessableEntity when an item leaves the list invalid, NotFound if
    /// no list is stored, Conflict on a concurrent write, InternalError on
    /// store failure
    pub fn patch_screening_rule(
        &self,
        list_type: NfScreeningRulesListType,
        items: &[PatchItem],
    ) -> ConfigResult<NfScreeningRules> {
        info!("Patching NfScreeningRules for {} with {} item(s)", list_type, items.len());
        let prior = self
            .find(DbMethod::Patch, ConfigKind::ScreeningRules(list_type))
            .map_err(|e| fetch_failure("Internal Error", &e))?
            .ok_or_else(|| not_found(list_type))?;
        let stored: NfScreeningRules = prior.decode().map_err(|e| fetch_failure(UPDATE_CAUSE, &e))?;
        let view = stored.clone().into_view();
        if items.is_empty() {
            debug!("Empty patch for {}, nothing to write", list_type);
            return Ok(view);
        }

        let mut current = serde_json::to_value(&view).map_err(|e| fetch_failure(UPDATE_CAUSE, &e))?;
        let mut failed_items = Vec::new();
        for item in items {
            self.screening_structural.check_patch_target(item).map_err(|f| {
                rejection(ProblemKind::BadRequest, &f).with_invalid_param(patch_param(item))
            })?;
            match self.applier.apply(&current, item) {
                Ok(next) => {
                    if failed_items.is_empty() {
                        self.validate_rules_value(&next).map_err(|f| invalid_patch(&f, item))?;
                    }
                    current = next;
                }
                Err(e) => {
                    warn!("Patch item {} failed: {}", item, e);
                    failed_items.push(patch_param(item));
                }
            }
        }

        if !failed_items.is_empty() {
            let detail = if failed_items.len() > 1 {
                "Multiple patchItem errors"
            } else {
                "Invalid JSON format"
            };
            error!("Patch for {} rejected: {}", list_type, detail);
            return Err(ProblemDetails::for_bad_request("Invalid JSON format", detail).with_invalid_params(failed_items));
        }

        let mut patched = self
            .validate_rules_value(&current)
            .map_err(|f| rejection(ProblemKind::UnprocessableEntity, &f))?;
        patched.additional_attributes = stored.additional_attributes;

        let request = self.rules_write(patched, WriteExpectation::Revision(prior.revision()), now_ms())?;
        let saved = observe(DbMethod::Patch, DbOperation::Update, TABLE, self.store.save(request))
            .map_err(|e| store_failure(UPDATE_CAUSE, &e))?;
        warn!("Successfully updated NfScreeningRules for {}", list_type);
        Self::rehydrate_rules(&saved)
    }

    /// Create or replace several screening rule lists in one atomic write
    ///
    /// # Errors
    /// BadRequest on an empty list, a repeated list type or any invalid
    /// entry, Conflict on a concurrent write, InternalError on store failure
    pub fn create_screening_rules(&self, list: NfScreeningRulesList) -> ConfigResult<NfScreeningRulesList> {
        info!("Creating {} NfScreeningRules list(s)", list.nf_screening_rules_list.len());
        if list.nf_screening_rules_list.is_empty() {
            error!("Empty NfScreeningRules list");
            return Err(ProblemDetails::for_bad_request(UPDATE_CAUSE, "nfScreeningRulesList must not be empty"));
        }

        let at = now_ms();
        let mut seen = HashSet::new();
        let mut requests = Vec::with_capacity(list.nf_screening_rules_list.len());
        for (index, mut rules) in list.nf_screening_rules_list.into_iter().enumerate() {
            let list_type = rules.nf_screening_rules_list_type;
            self.validate_rules(&rules).map_err(|f| {
                rejection(ProblemKind::BadRequest, &f.nested_under(&format!("/nfScreeningRulesList/{index}")))
            })?;
            if !seen.insert(list_type) {
                error!("NfScreeningRules for {} repeated", list_type);
                return Err(ProblemDetails::for_bad_request(
                    UPDATE_CAUSE,
                    format!("NfScreeningRules for {list_type} appears more than once"),
                )
                .with_invalid_param(InvalidParam::new(
                    format!("/nfScreeningRulesList/{index}/nfScreeningRulesListType"),
                    "duplicate list type",
                )));
            }

            let prior = self
                .find(DbMethod::Post, ConfigKind::ScreeningRules(list_type))
                .map_err(|e| fetch_failure(UPDATE_CAUSE, &e))?;
            if let Some(document) = &prior {
                rules.additional_attributes = document.extension_bag().cloned();
            }
            requests.push(self.rules_write(rules, WriteExpectation::from_prior(prior.as_ref()), at)?);
        }

        let saved = observe(DbMethod::Post, DbOperation::Create, TABLE, self.store.save_all(requests))
            .map_err(|e| store_failure(UPDATE_CAUSE, &e))?;
        warn!("Successfully created {} NfScreeningRules list(s)", saved.len());
        let nf_screening_rules_list = saved
            .iter()
            .map(Self::rehydrate_rules)
            .collect::<ConfigResult<Vec<_>>>()?;
        Ok(NfScreeningRulesList {
            nf_screening_rules_list,
        })
    }

    /// Field constraints then entry limits
    fn validate_rules(&self, rules: &NfScreeningRules) -> Verdict {
        self.screening_structural.check(rules)?;
        self.semantic.validate_screening_rules(rules)
    }

    /// Strict decode of a patched value followed by full validation
    fn validate_rules_value(&self, value: &Value) -> Verdict<NfScreeningRules> {
        let rules: NfScreeningRules = self.screening_structural.decode(value)?;
        self.semantic.validate_screening_rules(&rules)?;
        Ok(rules)
    }

    fn rules_write(
        &self,
        rules: NfScreeningRules,
        expectation: WriteExpectation,
        at: i64,
    ) -> ConfigResult<WriteRequest> {
        let status = rules.nf_screening_rules_list_status;
        let key = self.key(ConfigKind::ScreeningRules(rules.nf_screening_rules_list_type));
        let document = ConfigurationDocument::from_typed(key, &rules)
            .map_err(|e| fetch_failure(UPDATE_CAUSE, &e))?
            .with_status(status)
            .with_last_update_ms(at);
        Ok(WriteRequest::new(document, expectation))
    }

    fn rehydrate_rules(document: &ConfigurationDocument) -> ConfigResult<NfScreeningRules> {
        document
            .decode::<NfScreeningRules>()
            .map(ReadView::into_view)
            .map_err(|e| fetch_failure(UPDATE_CAUSE, &e))
    }
}
