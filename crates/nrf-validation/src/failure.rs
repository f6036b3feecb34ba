//! Validation verdicts
//!
//! Validators never build caller-facing errors. They return a
//! [`ValidationFailure`] and leave classification to the caller.

use nrf_model::InvalidParam;
use std::fmt::{self, Display, Formatter};

/// Result of a validator
pub type Verdict<T = ()> = Result<T, ValidationFailure>;

/// Pipeline stage that produced a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationStage {
    Structural,
    Semantic,
    CrossSection,
}

impl Display for ValidationStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Structural => "structural",
            Self::Semantic => "semantic",
            Self::CrossSection => "cross-section",
        })
    }
}

/// One offending field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer of the field, or a parameter name
    pub param: String,
    pub reason: String,
}

impl Violation {
    #[inline]
    #[must_use]
    pub fn new(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            reason: reason.into(),
        }
    }
}

impl From<Violation> for InvalidParam {
    fn from(v: Violation) -> Self {
        InvalidParam::new(v.param, v.reason)
    }
}

/// Failed verdict
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{stage} validation failed: {cause}: {detail}")]
pub struct ValidationFailure {
    pub stage: ValidationStage,
    pub cause: String,
    pub detail: String,
    pub violations: Vec<Violation>,
}

impl ValidationFailure {
    #[must_use]
    pub fn new(stage: ValidationStage, cause: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            stage,
            cause: cause.into(),
            detail: detail.into(),
            violations: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_violation(mut self, violation: Violation) -> Self {
        self.violations.push(violation);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_violations(mut self, violations: impl IntoIterator<Item = Violation>) -> Self {
        self.violations.extend(violations);
        self
    }

    /// Prefix every violation path, e.g. with a list position
    #[must_use]
    pub fn nested_under(mut self, prefix: &str) -> Self {
        for violation in &mut self.violations {
            violation.param = format!("{prefix}{}", violation.param);
        }
        self
    }

    /// Invalid parameters for a problem report
    #[must_use]
    pub fn invalid_params(&self) -> Vec<InvalidParam> {
        self.violations.iter().cloned().map(InvalidParam::from).collect()
    }
}
