//! Structural validation
//!
//! Strict decode of candidate documents, exhaustive field constraints and
//! immutable-path enforcement for patches.

use crate::constraints::{ConstraintReport, Constrained};
use crate::failure::{ValidationFailure, ValidationStage, Verdict, Violation};
use nrf_document::{JsonPointer, PatchItem, PatchOperation};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Validator for document shape and field constraints
#[derive(Debug, Clone, Default)]
pub struct StructuralValidator {
    immutable_paths: Vec<JsonPointer>,
}

impl StructuralValidator {
    /// Validator without immutable paths
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator for screening rule lists: the list type and the extension
    /// bag cannot be patched
    #[must_use]
    pub fn for_screening_rules() -> Self {
        Self::new()
            .with_immutable_path(JsonPointer::new(vec!["nfScreeningRulesListType".into()]))
            .with_immutable_path(JsonPointer::new(vec!["additionalAttributes".into()]))
    }

    #[inline]
    #[must_use]
    pub fn with_immutable_path(mut self, path: JsonPointer) -> Self {
        self.immutable_paths.push(path);
        self
    }

    #[inline]
    #[must_use]
    pub fn immutable_paths(&self) -> &[JsonPointer] {
        &self.immutable_paths
    }

    /// Reject a patch item that touches an immutable path
    ///
    /// Applies to every operation kind regardless of value. A pointer that
    /// does not parse is left for the patch applier to report.
    ///
    /// # Errors
    /// Returns a structural failure naming the immutable path
    pub fn check_patch_target(&self, item: &PatchItem) -> Verdict {
        let mut touched = Vec::new();
        if let Ok(target) = item.target() {
            touched.push(target);
        }
        if item.op == PatchOperation::Move {
            if let Ok(source) = item.source() {
                touched.push(source);
            }
        }

        for pointer in &touched {
            if let Some(immutable) = self
                .immutable_paths
                .iter()
                .find(|p| p.is_prefix_of(pointer) || pointer.is_prefix_of(p))
            {
                tracing::debug!("Patch item '{}' touches read-only path {}", item, immutable);
                return Err(ValidationFailure::new(
                    ValidationStage::Structural,
                    "Read-only attribute",
                    format!("{immutable} cannot be modified"),
                )
                .with_violation(Violation::new(immutable.to_string(), "attribute is read-only")));
            }
        }
        Ok(())
    }

    /// Strictly decode a candidate and check its field constraints
    ///
    /// # Errors
    /// Returns a structural failure if the value does not decode into `T` or
    /// violates any constraint
    pub fn decode<T>(&self, value: &Value) -> Verdict<T>
    where
        T: DeserializeOwned + Constrained,
    {
        let typed: T = serde_json::from_value(value.clone()).map_err(|e| {
            ValidationFailure::new(
                ValidationStage::Structural,
                "Invalid document",
                "document does not match the expected structure",
            )
            .with_violation(Violation::new("document", e.to_string()))
        })?;
        self.check(&typed)?;
        Ok(typed)
    }

    /// Check field constraints of an already typed candidate
    ///
    /// # Errors
    /// Returns a structural failure listing every violation
    pub fn check<T: Constrained>(&self, candidate: &T) -> Verdict {
        let mut report = ConstraintReport::new();
        candidate.check_constraints(&JsonPointer::root(), &mut report);
        if report.is_clean() {
            return Ok(());
        }
        Err(ValidationFailure::new(
            ValidationStage::Structural,
            "Invalid document",
            "one or more attributes violate their constraints",
        )
        .with_violations(report.into_violations()))
    }
}
