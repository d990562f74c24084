//! Validation report types.
//!
//! A [`ValidationReport`] is produced once per beat by the validator and
//! handed to the caller together with the compiled prompt. Validation
//! reports, never blocks: even an unrepairable prompt ships with a report
//! describing what is still wrong.

use crate::DropField;
use serde::{Deserialize, Serialize};

/// Which downstream rendering profile a compiled prompt should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RenderRoute {
    /// At least one face is visible; expression and segment passes apply
    Primary,
    /// No face visible; the simpler rendering profile suffices
    Alternate,
}

/// A repair the validator applied during the bounded repair loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum RepairAction {
    /// Injected a missing identity trigger for a character
    #[display("injected trigger for {}", _0)]
    InjectedTrigger(String),
    /// Stripped hair/face phrases from a sealed subject's description
    #[display("stripped face text for {}", _0)]
    StrippedFaceText(String),
    /// Injected a missing segment tag for a character
    #[display("injected segment tag for {}", _0)]
    InjectedSegment(String),
    /// Nulled an expression that leaked through sealed gear
    #[display("cleared expression for {}", _0)]
    ClearedExpression(String),
    /// Dropped a field to satisfy the token budget
    #[display("dropped {}", _0)]
    Dropped(DropField),
}

/// The validator's verdict on one compiled prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ValidationReport {
    /// Tokens counted in the final compiled prompt
    token_count: usize,
    /// Token budget from the spec constraints
    token_budget: u32,
    /// Whether the final prompt still exceeds its budget
    budget_exceeded: bool,
    /// Face-visible characters whose trigger is still missing
    missing_characters: Vec<String>,
    /// Face-visible characters whose segment tag is still missing
    missing_segments: Vec<String>,
    /// Whether a required vehicle is absent from the prompt
    missing_vehicle: bool,
    /// Forbidden or fabricated terms found in the prompt
    forbidden_terms: Vec<String>,
    /// Whether expression or face text survived for a sealed subject
    visor_violation: bool,
    /// Repairs applied across all iterations
    repairs: Vec<RepairAction>,
    /// How many repair-recompile iterations ran
    repair_iterations: u32,
    /// Recommended downstream rendering route
    route: RenderRoute,
}

impl ValidationReport {
    /// Assemble a report from the validator's final pass.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        token_count: usize,
        token_budget: u32,
        budget_exceeded: bool,
        missing_characters: Vec<String>,
        missing_segments: Vec<String>,
        missing_vehicle: bool,
        forbidden_terms: Vec<String>,
        visor_violation: bool,
        repairs: Vec<RepairAction>,
        repair_iterations: u32,
        route: RenderRoute,
    ) -> Self {
        Self {
            token_count,
            token_budget,
            budget_exceeded,
            missing_characters,
            missing_segments,
            missing_vehicle,
            forbidden_terms,
            visor_violation,
            repairs,
            repair_iterations,
            route,
        }
    }

    /// Whether the prompt passed every check on the final pass.
    pub fn is_clean(&self) -> bool {
        !self.budget_exceeded
            && self.missing_characters.is_empty()
            && self.missing_segments.is_empty()
            && !self.missing_vehicle
            && self.forbidden_terms.is_empty()
            && !self.visor_violation
    }
}
