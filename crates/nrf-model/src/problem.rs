//! Caller-facing failure representation
//!
//! Every service operation reports failure as a [`ProblemDetails`]. The
//! classification lives in [`ProblemKind`] and maps one-to-one onto an HTTP
//! status so a routing layer can forward it unchanged.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Result type shared by every configuration operation
pub type ConfigResult<T> = Result<T, ProblemDetails>;

/// Failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProblemKind {
    /// Malformed request, constraint violation or cross-section rule failure
    BadRequest,
    /// Requested resource absent at read time
    NotFound,
    /// Stale writer lost an optimistic-concurrency race
    Conflict,
    /// Patch applied but left the resource invalid
    UnprocessableEntity,
    /// Storage failure or missing mandatory singleton during update
    InternalError,
}

impl ProblemKind {
    /// HTTP status code
    #[inline]
    #[must_use]
    pub fn status(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::UnprocessableEntity => 422,
            Self::InternalError => 500,
        }
    }

    /// HTTP reason phrase used as the problem title
    #[inline]
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::Conflict => "Conflict",
            Self::UnprocessableEntity => "Unprocessable Entity",
            Self::InternalError => "Internal Server Error",
        }
    }

    /// Classify a status code; anything unrecognised is an internal error
    #[inline]
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            404 => Self::NotFound,
            409 => Self::Conflict,
            422 => Self::UnprocessableEntity,
            _ => Self::InternalError,
        }
    }
}

impl Display for ProblemKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One offending parameter of a rejected request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidParam {
    pub param: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl InvalidParam {
    /// Create with a reason
    #[inline]
    #[must_use]
    pub fn new(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            reason: Some(reason.into()),
        }
    }
}

/// Structured failure: title, status, cause, detail and invalid parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{title} ({status}): {cause}: {detail}")]
pub struct ProblemDetails {
    pub title: String,
    pub status: u16,
    pub cause: String,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalid_params: Vec<InvalidParam>,
}

impl ProblemDetails {
    /// Create a problem of the given kind
    #[must_use]
    pub fn new(kind: ProblemKind, cause: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            title: kind.title().to_string(),
            status: kind.status(),
            cause: cause.into(),
            detail: detail.into(),
            invalid_params: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn for_bad_request(cause: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::BadRequest, cause, detail)
    }

    #[inline]
    #[must_use]
    pub fn for_not_found(cause: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::NotFound, cause, detail)
    }

    #[inline]
    #[must_use]
    pub fn for_conflict(cause: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::Conflict, cause, detail)
    }

    #[inline]
    #[must_use]
    pub fn for_unprocessable_entity(cause: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::UnprocessableEntity, cause, detail)
    }

    #[inline]
    #[must_use]
    pub fn for_internal_error(cause: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::InternalError, cause, detail)
    }

    /// Append one invalid parameter
    #[inline]
    #[must_use]
    pub fn with_invalid_param(mut self, param: InvalidParam) -> Self {
        self.invalid_params.push(param);
        self
    }

    /// Append several invalid parameters
    #[inline]
    #[must_use]
    pub fn with_invalid_params(mut self, params: impl IntoIterator<Item = InvalidParam>) -> Self {
        self.invalid_params.extend(params);
        self
    }

    /// Classification derived from the status code
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ProblemKind {
        ProblemKind::from_status(self.status)
    }
}
