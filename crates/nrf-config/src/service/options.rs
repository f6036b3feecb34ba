//! System options and engineering options

use super::{rejection, ConfigurationService, UpdateStage};
use crate::aggregate::PairedAggregate;
use crate::logging::LogLevelCommand;
use crate::metrics::DbMethod;
use crate::view::ReadView;
use nrf_document::overlay;
use nrf_model::{ConfigResult, NrfEngSystemOptions, NrfSystemOptions, ProblemDetails, ProblemKind};
use nrf_validation::Verdict;
use tracing::{debug, info, warn};

impl ConfigurationService {
    /// Current system options
    ///
    /// # Errors
    /// NotFound if either stored half is missing, InternalError on store failure
    pub fn system_options(&self) -> ConfigResult<NrfSystemOptions> {
        debug!("Fetching NrfSystemOptions");
        let loaded = self.load_pair::<NrfSystemOptions>(DbMethod::Get, ProblemKind::NotFound)?;
        Ok(loaded.value.into_view())
    }

    /// Merge a partial update into the system options
    ///
    /// Runs structural, semantic and cross-section validation on the merged
    /// candidate, saves both halves atomically and returns the stored view.
    /// A changed log level is forwarded to the log sink afterwards.
    ///
    /// # Errors
    /// BadRequest on any validation failure, Conflict on a concurrent write,
    /// InternalError on store failure or missing stored state
    pub fn update_system_options(&self, request: NrfSystemOptions) -> ConfigResult<NrfSystemOptions> {
        info!("Updating NrfSystemOptions");
        debug!("{}: {}", NrfSystemOptions::LABEL, UpdateStage::FetchPrior);
        let eng = self
            .load_pair::<NrfEngSystemOptions>(DbMethod::Put, ProblemKind::InternalError)?
            .bare();

        let stored = self.update_pair(
            &request,
            DbMethod::Put,
            |candidate| self.semantic.validate_system_options(candidate),
            |prior| self.cross_section.validate(&request, prior, &eng),
        )?;

        debug!("{}: {}", NrfSystemOptions::LABEL, UpdateStage::Sanitize);
        let view = stored.into_view();
        self.apply_log_level(&request);
        Ok(view)
    }

    /// Current engineering options
    ///
    /// # Errors
    /// NotFound if either stored half is missing, InternalError on store failure
    pub fn eng_system_options(&self) -> ConfigResult<NrfEngSystemOptions> {
        debug!("Fetching NrfEngSystemOptions");
        let loaded = self.load_pair::<NrfEngSystemOptions>(DbMethod::Get, ProblemKind::NotFound)?;
        Ok(loaded.value.into_view())
    }

    /// Merge a partial update into the engineering options
    ///
    /// # Errors
    /// Same as [`ConfigurationService::update_system_options`], without the
    /// cross-section stage
    pub fn update_eng_system_options(&self, request: NrfEngSystemOptions) -> ConfigResult<NrfEngSystemOptions> {
        info!("Updating NrfEngSystemOptions");
        let stored = self.update_pair(
            &request,
            DbMethod::Put,
            |candidate| self.semantic.validate_eng_system_options(candidate),
            |_| Ok(()),
        )?;
        debug!("{}: {}", NrfEngSystemOptions::LABEL, UpdateStage::Sanitize);
        Ok(stored.into_view())
    }

    /// Shared update pipeline for paired aggregates
    ///
    /// `semantic` sees the merged candidate; `cross_section` sees the prior
    /// state without extension bags.
    fn update_pair<T, S, C>(&self, request: &T, method: DbMethod, semantic: S, cross_section: C) -> ConfigResult<T>
    where
        T: PairedAggregate,
        S: FnOnce(&T) -> Verdict,
        C: FnOnce(&T) -> Verdict,
    {
        debug!("{}: {}", T::LABEL, UpdateStage::FetchPrior);
        let prior = self.load_pair::<T>(method, ProblemKind::InternalError)?;
        let prior_view = prior.bare();

        debug!("{}: {}", T::LABEL, UpdateStage::BuildCandidate);
        let mut requested = request.clone();
        requested.clear_extension_bags();
        let encode_failure = |e: serde_json::Error| {
            ProblemDetails::for_internal_error(
                format!("Could not update {} due to an unexpected error.", T::LABEL),
                e.to_string(),
            )
        };
        let merged = overlay(
            &serde_json::to_value(&prior_view).map_err(encode_failure)?,
            &serde_json::to_value(&requested).map_err(encode_failure)?,
        );

        debug!("{}: {}", T::LABEL, UpdateStage::Structural);
        let candidate: T = self
            .structural
            .decode(&merged)
            .map_err(|f| rejection(ProblemKind::BadRequest, &f))?;

        debug!("{}: {}", T::LABEL, UpdateStage::Semantic);
        semantic(&candidate).map_err(|f| rejection(ProblemKind::BadRequest, &f))?;

        debug!("{}: {}", T::LABEL, UpdateStage::CrossSection);
        cross_section(&prior_view).map_err(|f| rejection(ProblemKind::BadRequest, &f))?;

        let stored = self.persist_pair(method, &prior, candidate)?;
        warn!("{} updated", T::LABEL);
        Ok(stored)
    }

    /// Forward a requested log level that differs from the current one
    fn apply_log_level(&self, request: &NrfSystemOptions) {
        let Some(level) = request.requested_log_level() else {
            return;
        };
        let current = self.log_sink.current_level();
        if level == current {
            return;
        }
        match self.log_sink.apply(&LogLevelCommand::new(level)) {
            Ok(()) => info!("Log level changed from {} to {}", current, level),
            Err(e) => warn!("Could not change log level to {}: {}", level, e),
        }
    }
}
