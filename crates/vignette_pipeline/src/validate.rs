//! Phase D: validation and bounded repair.
//!
//! The validator checks a compiled prompt against a fixed rule set,
//! applies automatic repairs, and recompiles. The repair-recompile cycle
//! is bounded by the configured iteration cap; when issues remain after
//! the cap, the validator logs the full spec context and returns the last
//! compiled prompt anyway. Validation reports, never blocks.

use crate::compile::compile;
use regex::Regex;
use std::sync::LazyLock;
use vignette_context::PipelineConfig;
use vignette_core::{
    DropField, GearState, RenderRoute, RepairAction, ValidationReport, VisualBeatSpec,
};
use vignette_error::{PipelineError, PipelineErrorKind};
use vignette_interface::TokenCounting;

/// Hair/face vocabulary that must not describe a sealed subject.
static FACE_LEXICON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(hair|haired|eyes?|eyebrows?|face|facial|jaw|jawline|cheeks?|cheekbones?|freckles?|beard|stubble|lips|mouth|grin|smile|scowl|brow)\b",
    )
    .expect("face lexicon regex is valid")
});

/// What one detection pass found.
#[derive(Debug, Default)]
struct Detection {
    missing_triggers: Vec<String>,
    face_text: Vec<(String, String)>,
    missing_segments: Vec<String>,
    sealed_expressions: Vec<String>,
    token_count: usize,
    over_budget: bool,
    forbidden: Vec<String>,
    missing_vehicle: bool,
}

impl Detection {
    /// Whether any repairable issue is present.
    fn needs_repair(&self) -> bool {
        !self.missing_triggers.is_empty()
            || !self.face_text.is_empty()
            || !self.missing_segments.is_empty()
            || !self.sealed_expressions.is_empty()
            || self.over_budget
    }

    /// The detected issues as taxonomy conditions, for logging.
    fn conditions(&self, budget: u32) -> Vec<PipelineError> {
        let mut out = Vec::new();
        for character in &self.missing_triggers {
            out.push(PipelineError::new(PipelineErrorKind::MissingTrigger(
                character.clone(),
            )));
        }
        for (character, detail) in &self.face_text {
            out.push(PipelineError::new(
                PipelineErrorKind::GearConsistencyViolation {
                    character: character.clone(),
                    detail: detail.clone(),
                },
            ));
        }
        for character in &self.missing_segments {
            out.push(PipelineError::new(PipelineErrorKind::MissingSegment(
                character.clone(),
            )));
        }
        for character in &self.sealed_expressions {
            out.push(PipelineError::new(
                PipelineErrorKind::GearConsistencyViolation {
                    character: character.clone(),
                    detail: "expression text".to_string(),
                },
            ));
        }
        if self.over_budget {
            out.push(PipelineError::new(PipelineErrorKind::BudgetExceeded {
                count: self.token_count,
                budget,
            }));
        }
        out
    }
}

/// Validator with its injected counter and configuration.
pub struct Validator<'a> {
    config: &'a PipelineConfig,
    counter: &'a dyn TokenCounting,
    max_iterations: u32,
}

impl<'a> Validator<'a> {
    /// Create a validator using the configured iteration cap.
    pub fn new(config: &'a PipelineConfig, counter: &'a dyn TokenCounting) -> Self {
        Self {
            config,
            counter,
            max_iterations: *config.max_repair_iterations(),
        }
    }

    /// Create a validator with an explicit iteration cap (tests exercise
    /// both the repairs-within-budget and repairs-exhausted paths).
    pub fn with_max_iterations(
        config: &'a PipelineConfig,
        counter: &'a dyn TokenCounting,
        max_iterations: u32,
    ) -> Self {
        Self {
            config,
            counter,
            max_iterations,
        }
    }

    /// Validate a compiled prompt, repairing and recompiling as needed.
    ///
    /// Returns the best available prompt and the report for the final
    /// pass. A prompt that was already valid comes back byte-identical
    /// with zero recorded repairs.
    #[tracing::instrument(skip_all, fields(beat_id = %spec.beat_id()))]
    pub fn run(&self, spec: &mut VisualBeatSpec, prompt: String) -> (String, ValidationReport) {
        let mut prompt = prompt;
        let mut repairs: Vec<RepairAction> = Vec::new();
        let mut iterations = 0u32;

        loop {
            let detection = self.detect(spec, &prompt);
            if !detection.needs_repair() || iterations >= self.max_iterations {
                if detection.needs_repair() {
                    let malformed = PipelineError::new(PipelineErrorKind::MalformedSpec(
                        format!("{} issues remain after {} iterations",
                            detection.conditions(*spec.constraints().token_budget()).len(),
                            iterations),
                    ));
                    tracing::error!(
                        condition = %malformed,
                        spec = %serde_json::to_string(spec).unwrap_or_default(),
                        "Repairs exhausted, returning last compiled prompt"
                    );
                }
                let report = self.report(spec, detection, repairs, iterations);
                return (prompt, report);
            }

            for condition in detection.conditions(*spec.constraints().token_budget()) {
                tracing::debug!(%condition, "Detected prompt issue");
            }
            self.repair(spec, &detection, &mut repairs);
            prompt = compile(spec, self.config.segment());

            // Budget compaction works on the freshly repaired prompt
            if detection.over_budget {
                prompt = self.compact(spec, prompt, &mut repairs);
            }

            iterations += 1;
        }
    }

    fn detect(&self, spec: &VisualBeatSpec, prompt: &str) -> Detection {
        let mut detection = Detection::default();

        for subject in spec.subjects() {
            let sealed = *subject.gear() == GearState::Sealed;

            // 1. Face-visible subjects need their trigger in the prompt
            if *subject.face_visible()
                && (subject.trigger().is_empty() || !prompt.contains(subject.trigger().as_str()))
            {
                detection.missing_triggers.push(subject.character().clone());
            }

            // 2. No hair/face text for sealed subjects
            if sealed {
                if let Some(found) = FACE_LEXICON.find(subject.appearance()) {
                    detection
                        .face_text
                        .push((subject.character().clone(), found.as_str().to_string()));
                }
            }

            // 3. Face-visible subjects need their segment tag
            if *subject.face_visible() {
                let tag = self.config.segment().render(subject.trigger());
                if !prompt.contains(&tag) {
                    detection.missing_segments.push(subject.character().clone());
                }
            }

            // 4. No expression for sealed subjects
            if sealed && subject.expression().is_some() {
                detection
                    .sealed_expressions
                    .push(subject.character().clone());
            }
        }

        // 5. Token budget
        detection.token_count = self.counter.count_tokens(prompt).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Token counting failed, falling back to estimate");
            vignette_core::approximate_tokens(prompt)
        });
        detection.over_budget =
            detection.token_count > *spec.constraints().token_budget() as usize;

        // Report-only checks
        for term in self.config.forbidden_terms() {
            if prompt.to_lowercase().contains(&term.to_lowercase()) {
                detection.forbidden.push(term.clone());
            }
        }
        if let Some(vehicle) = spec.vehicle() {
            if !prompt.contains(vehicle.description().as_str()) {
                detection.missing_vehicle = true;
            }
        }

        detection
    }

    fn repair(
        &self,
        spec: &mut VisualBeatSpec,
        detection: &Detection,
        repairs: &mut Vec<RepairAction>,
    ) {
        for character in &detection.missing_triggers {
            let fallback = slug(character);
            for subject in spec.subjects_mut() {
                if subject.character() == character && subject.trigger().is_empty() {
                    subject.set_trigger(fallback.clone());
                }
            }
            repairs.push(RepairAction::InjectedTrigger(character.clone()));
        }

        for (character, found) in &detection.face_text {
            for subject in spec.subjects_mut() {
                if subject.character() == character {
                    let stripped = strip_face_phrases(subject.appearance());
                    subject.set_appearance(stripped);
                }
            }
            repairs.push(RepairAction::StrippedFaceText(format!(
                "{} ({})",
                character, found
            )));
        }

        for character in &detection.missing_segments {
            for subject in spec.subjects_mut() {
                if subject.character() == character {
                    subject.set_needs_segment(true);
                }
            }
            repairs.push(RepairAction::InjectedSegment(character.clone()));
        }

        for character in &detection.sealed_expressions {
            for subject in spec.subjects_mut() {
                if subject.character() == character {
                    subject.clear_expression();
                }
            }
            repairs.push(RepairAction::ClearedExpression(character.clone()));
        }
    }

    /// Drop fields in the spec's documented order, recompiling after each
    /// drop, until the prompt fits or the drop list is exhausted.
    fn compact(
        &self,
        spec: &mut VisualBeatSpec,
        prompt: String,
        repairs: &mut Vec<RepairAction>,
    ) -> String {
        let budget = *spec.constraints().token_budget() as usize;
        let drop_order = spec.constraints().drop_order().clone();
        let mut prompt = prompt;

        for field in drop_order {
            let count = self
                .counter
                .count_tokens(&prompt)
                .unwrap_or_else(|_| vignette_core::approximate_tokens(&prompt));
            if count <= budget {
                break;
            }

            let dropped = match field {
                DropField::VehiclePosition => match spec.vehicle_mut() {
                    Some(vehicle) if vehicle.position().is_some() => {
                        vehicle.clear_position();
                        true
                    }
                    _ => false,
                },
                DropField::Props => {
                    let had = !spec.environment().props().is_empty();
                    spec.environment_mut().clear_props();
                    had
                }
                DropField::Effects => {
                    let had = spec.environment().effects().is_some();
                    spec.environment_mut().clear_effects();
                    had
                }
                DropField::Atmosphere => {
                    let had = !spec.environment().atmosphere().is_empty();
                    spec.environment_mut().clear_atmosphere();
                    had
                }
                DropField::SecondaryDescription => {
                    let mut had = false;
                    for subject in spec.subjects_mut().iter_mut().skip(1) {
                        if !subject.appearance().is_empty() {
                            subject.set_appearance("");
                            had = true;
                        }
                    }
                    had
                }
            };

            if dropped {
                repairs.push(RepairAction::Dropped(field));
                prompt = compile(spec, self.config.segment());
                tracing::debug!(field = %field, "Dropped field for token budget");
            }
        }

        prompt
    }

    fn report(
        &self,
        spec: &VisualBeatSpec,
        detection: Detection,
        repairs: Vec<RepairAction>,
        iterations: u32,
    ) -> ValidationReport {
        let route = if spec.any_face_visible() {
            RenderRoute::Primary
        } else {
            RenderRoute::Alternate
        };
        let visor_violation =
            !detection.face_text.is_empty() || !detection.sealed_expressions.is_empty();

        ValidationReport::new(
            detection.token_count,
            *spec.constraints().token_budget(),
            detection.over_budget,
            detection.missing_triggers,
            detection.missing_segments,
            detection.missing_vehicle,
            detection.forbidden,
            visor_violation,
            repairs,
            iterations,
            route,
        )
    }
}

/// Drop comma-separated phrases that contain face vocabulary.
fn strip_face_phrases(appearance: &str) -> String {
    appearance
        .split(',')
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty() && !FACE_LEXICON.is_match(phrase))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Lowercase alphanumeric fallback trigger for a character reference.
fn slug(character: &str) -> String {
    character
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_face_phrases() {
        let appearance = "lean woman, copper hair, patched recon fatigues, sharp jawline";
        assert_eq!(
            strip_face_phrases(appearance),
            "lean woman, patched recon fatigues"
        );
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Mara-Kov 7"), "marakov7");
    }
}
