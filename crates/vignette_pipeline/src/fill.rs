//! Phase B: guided fill-in.
//!
//! Exactly one constrained request per beat, asking only for the
//! camera-observable slots deterministic data cannot supply: action,
//! expression, and shot composition. Any transport failure, timeout, or
//! schema-invalid response falls back to a deterministic heuristic fill.
//! This phase never errors out of the pipeline; the typed outcome tells
//! the caller which path produced the payload.

use crate::extract::{extract_json, parse_json};
use std::time::Duration;
use vignette_context::FillConfig;
use vignette_core::{Beat, FillRequest, SpecFillIn, SubjectFill, VisualBeatSpec};
use vignette_error::{PipelineError, PipelineErrorKind};
use vignette_interface::TextDriver;

/// Neutral expression used by the fallback for visible faces.
const NEUTRAL_EXPRESSION: &str = "neutral, focused expression";

/// Which path produced the fill-in payload.
#[derive(Debug, Clone, PartialEq)]
pub enum FillOutcome {
    /// The model returned a schema-valid payload
    Model(SpecFillIn),
    /// The deterministic heuristic filled in instead
    Fallback(SpecFillIn),
}

impl FillOutcome {
    /// The payload, whichever path produced it.
    pub fn payload(&self) -> &SpecFillIn {
        match self {
            Self::Model(fill) | Self::Fallback(fill) => fill,
        }
    }

    /// Whether the deterministic fallback was used.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Assemble the fill-in instructions for a beat.
///
/// The instruction block is scene-type-agnostic and contains no character
/// names; subjects are described by reference in the data section that
/// follows it.
pub fn build_instructions(spec: &VisualBeatSpec, beat: &Beat) -> String {
    let mut out = String::from(
        "You are completing a storyboard frame. Respond with ONLY valid JSON matching:\n\
         {\"subjects\": [{\"character\": \"...\", \"action\": \"...\", \"expression\": \"...\", \
         \"position\": \"...\"}], \"composition\": \"...\"}\n\
         Rules:\n\
         - action: camera-observable pose or movement only, never inner thoughts or intent\n\
         - expression: facial features only; OMIT the field entirely for any subject whose \
         face is marked not visible\n\
         - position: where the subject sits in the frame\n\
         - composition: translate the visual anchor into shot-composition language\n\n",
    );

    out.push_str("Excerpt:\n");
    out.push_str(beat.excerpt());
    out.push_str("\n\nSubjects:\n");
    for subject in spec.subjects() {
        out.push_str(&format!(
            "- {} (face {})\n",
            subject.character(),
            if *subject.face_visible() {
                "visible"
            } else {
                "not visible"
            }
        ));
    }

    if let Some(anchor) = beat.hints().as_ref().and_then(|h| h.visual_anchor().as_deref()) {
        out.push_str("\nVisual anchor: ");
        out.push_str(anchor);
        out.push('\n');
    }

    out
}

/// Deterministic heuristic fill used when the model path fails.
///
/// Action and composition derive from the beat's stored visual-guidance
/// hints; expression is a neutral default for visible faces and absent
/// otherwise; spatial position is left to whatever carried over.
pub fn fallback_fill(spec: &VisualBeatSpec, beat: &Beat) -> SpecFillIn {
    let hints = beat.hints().as_ref();
    let anchor = hints.and_then(|h| h.visual_anchor().clone());
    let positioning = hints.and_then(|h| h.positioning().clone());

    let subjects = spec
        .subjects()
        .iter()
        .map(|subject| SubjectFill {
            character: subject.character().clone(),
            action: positioning.clone(),
            expression: if *subject.face_visible() {
                Some(NEUTRAL_EXPRESSION.to_string())
            } else {
                None
            },
            position: None,
        })
        .collect();

    SpecFillIn {
        subjects,
        composition: anchor,
        vehicle: None,
        atmosphere: None,
    }
}

/// Run the guided fill-in for one beat.
///
/// Issues exactly one request, bounded by the configured timeout. There
/// is no retry: a missed enrichment degrades gracefully, so any failure
/// proceeds straight to [`fallback_fill`].
#[tracing::instrument(skip_all, fields(beat_id = %beat.id(), model = ?config.model()))]
pub async fn fill_in<D: TextDriver>(
    driver: &D,
    spec: &VisualBeatSpec,
    beat: &Beat,
    config: &FillConfig,
) -> FillOutcome {
    let request = FillRequest {
        system: None,
        prompt: build_instructions(spec, beat),
        max_tokens: Some(*config.max_tokens()),
        temperature: Some(*config.temperature()),
        model: config.model().clone(),
    };

    let response = tokio::time::timeout(
        Duration::from_millis(*config.timeout_ms()),
        driver.generate(&request),
    )
    .await;

    let text = match response {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            let condition =
                PipelineError::new(PipelineErrorKind::FillInUnavailable(e.to_string()));
            tracing::warn!(%condition, "Using fallback fill");
            return FillOutcome::Fallback(fallback_fill(spec, beat));
        }
        Err(_) => {
            let condition = PipelineError::new(PipelineErrorKind::FillInUnavailable(format!(
                "timed out after {}ms",
                config.timeout_ms()
            )));
            tracing::warn!(%condition, "Using fallback fill");
            return FillOutcome::Fallback(fallback_fill(spec, beat));
        }
    };

    match extract_json(&text).and_then(|json| parse_json::<SpecFillIn>(&json)) {
        Ok(fill) => FillOutcome::Model(fill),
        Err(e) => {
            let condition =
                PipelineError::new(PipelineErrorKind::FillInUnavailable(e.to_string()));
            tracing::warn!(%condition, "Response failed schema validation, using fallback fill");
            FillOutcome::Fallback(fallback_fill(spec, beat))
        }
    }
}

/// Merge a fill-in payload into the spec.
///
/// Subjects are matched by character reference; fills for unknown
/// characters are ignored rather than fabricating subjects. Expression
/// merging is gear-aware: [`vignette_core::Subject::set_expression`]
/// drops expression text for sealed subjects.
pub fn merge_fill(spec: &mut VisualBeatSpec, fill: &SpecFillIn) {
    for subject in spec.subjects_mut() {
        let Some(entry) = fill
            .subjects
            .iter()
            .find(|f| f.character == *subject.character())
        else {
            continue;
        };
        if entry.action.is_some() {
            subject.set_action(entry.action.clone());
        }
        if entry.expression.is_some() && *subject.face_visible() {
            subject.set_expression(entry.expression.clone());
        }
        if entry.position.is_some() {
            subject.set_position(entry.position.clone());
        }
    }

    if fill.composition.is_some() {
        spec.shot_mut().set_composition(fill.composition.clone());
    }
    // The model's spatial note replaces the derived one
    if let Some(vehicle_note) = &fill.vehicle {
        if let Some(vehicle) = spec.vehicle_mut() {
            let description = vehicle.description().clone();
            *vehicle = vignette_core::Vehicle::new(description, Some(vehicle_note.clone()));
        }
    }
    if let Some(atmosphere) = &fill.atmosphere {
        let mut current = spec.environment().atmosphere().clone();
        if !current.contains(atmosphere) {
            current.push(atmosphere.clone());
            spec.environment_mut().set_atmosphere(current);
        }
    }
}
