//! NRF Configuration Validation
//!
//! Three independent validators, each returning a [`Verdict`]:
//!
//! - [`StructuralValidator`]: strict decode, field constraints, immutable paths
//! - [`SemanticValidator`]: entry-count limits and uniqueness
//! - [`CrossSectionConsistencyValidator`]: rules across sections and against
//!   persisted state
//!
//! Validators do not build caller-facing errors; the orchestrator classifies
//! a [`ValidationFailure`] into a problem report.
//!
//! # Example
//!
//! ```rust,ignore
//! use nrf_validation::{SemanticValidator, StructuralValidator};
//!
//! let rules: NfScreeningRules = StructuralValidator::new().decode(&candidate)?;
//! SemanticValidator::new(1000).validate_screening_rules(&rules)?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod constraints;
mod cross_section;
mod failure;
mod semantic;
mod structural;

pub use constraints::{ConstraintReport, Constrained};
pub use cross_section::{
    redirect_eligible, CrossSectionConsistencyValidator, GateRule, GateState, AUTH_FEATURE_GATE,
    FORWARDING_GATE, SLF_GATE,
};
pub use failure::{ValidationFailure, ValidationStage, Verdict, Violation};
pub use semantic::{SemanticValidator, DEFAULT_MAX_COUNT};
pub use structural::StructuralValidator;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
