//! Phase A: deterministic enrichment.
//!
//! Builds the bulk of the visual beat spec from story-context data. Never
//! calls an external model; given fixed inputs and continuity state the
//! output is byte-identical across runs.

use crate::{budget::token_budget, template};
use vignette_context::{ArtifactCategory, PipelineConfig, StoryContext};
use vignette_core::{
    Beat, Constraints, Environment, GearState, SceneContinuity, SegmentPolicy, Shot, Subject,
    Vehicle, VehicleMotion, VisualBeatSpec,
};
use vignette_error::{PipelineError, PipelineErrorKind};

/// Placeholder appearance when story data has no entry for a character.
const GENERIC_APPEARANCE: &str = "figure in worn field gear";

/// Build the partial spec for a beat.
///
/// Everything except action, expression, and composition is populated
/// here; those camera-observable slots are left for guided fill-in, with
/// carryover from the previous beat pre-filling them where available.
#[tracing::instrument(skip_all, fields(beat_id = %beat.id(), scene = *beat.scene()))]
pub fn enrich(
    beat: &Beat,
    story: &StoryContext,
    config: &PipelineConfig,
    continuity: &SceneContinuity,
) -> VisualBeatSpec {
    let template = template::classify(beat, continuity);
    let (default_shot, default_angle) = template::default_framing(template, continuity);

    let hints = beat.hints().as_ref();
    let shot_type = hints.and_then(|h| *h.shot()).unwrap_or(default_shot);
    let angle = hints.and_then(|h| *h.angle()).unwrap_or(default_angle);

    let mut shot = Shot::new(shot_type, angle);
    shot.set_depth_of_field(config.depth_of_field_for(shot_type));

    let subjects = build_subjects(beat, story, config, continuity);

    let environment = build_environment(beat, story, config);

    let vehicle = continuity.vehicle().as_ref().map(|state| {
        let note = match state.motion() {
            VehicleMotion::Stationary => "parked at the edge of frame",
            VehicleMotion::Moving => "moving through the frame",
        };
        Vehicle::new(state.description().clone(), Some(note.to_string()))
    });

    let any_sealed = subjects.iter().any(|s| *s.gear() == GearState::Sealed);
    let budget = token_budget(config.budgets(), shot_type, any_sealed, vehicle.is_some());
    let constraints = Constraints::new(
        budget,
        SegmentPolicy::VisibleFaces,
        config.drop_order().clone(),
    );

    VisualBeatSpec::new(
        beat.id().clone(),
        *beat.scene(),
        shot,
        subjects,
        environment,
        vehicle,
        constraints,
        continuity.last_summary().clone(),
    )
}

fn build_subjects(
    beat: &Beat,
    story: &StoryContext,
    config: &PipelineConfig,
    continuity: &SceneContinuity,
) -> Vec<Subject> {
    let scene_location = continuity.scene_location().as_deref();

    beat.characters()
        .iter()
        .map(|name| {
            let gear = continuity.gear_for(name);
            let sheet = story.character(name);

            let (trigger, base_appearance, sealed_fragment, open_fragment) = match sheet {
                Some(sheet) => {
                    let appearance = sheet
                        .resolve_appearance(beat.location(), scene_location, beat.excerpt())
                        .map(|v| v.description().clone())
                        .unwrap_or_else(|| {
                            let gap = PipelineError::new(PipelineErrorKind::EnrichmentGap {
                                character: name.clone(),
                                location: beat.location().clone(),
                            });
                            tracing::debug!(condition = %gap, "Using placeholder appearance");
                            GENERIC_APPEARANCE.to_string()
                        });
                    (
                        sheet.trigger().clone(),
                        appearance,
                        sheet.sealed_fragment().clone(),
                        sheet.open_fragment().clone(),
                    )
                }
                None => {
                    let gap = PipelineError::new(PipelineErrorKind::EnrichmentGap {
                        character: name.clone(),
                        location: beat.location().clone(),
                    });
                    tracing::warn!(condition = %gap, "Character missing from story context");
                    (name.clone(), GENERIC_APPEARANCE.to_string(), None, None)
                }
            };

            let appearance = match gear {
                GearState::Sealed => {
                    let fragment =
                        sealed_fragment.unwrap_or_else(|| config.gear().sealed().clone());
                    format!("{}, {}", base_appearance, fragment)
                }
                GearState::Open => match open_fragment {
                    Some(fragment) => format!("{}, {}", base_appearance, fragment),
                    None => base_appearance,
                },
            };

            let mut subject = Subject::new(name.clone(), trigger, appearance, gear);

            // Carry forward last known action/expression and position
            if let Some(carry) = continuity.carry_for(name) {
                subject.set_action(carry.action().clone());
                subject.set_expression(carry.expression().clone());
            }
            if let Some(position) = continuity.position_for(name) {
                subject.set_position(Some(position.to_string()));
            }

            subject
        })
        .collect()
}

fn build_environment(beat: &Beat, story: &StoryContext, config: &PipelineConfig) -> Environment {
    let Some(location) = story.location(beat.location()) else {
        tracing::debug!(
            location = %beat.location(),
            "Location missing from story context, using bare shorthand"
        );
        return Environment::new(beat.location().clone());
    };

    let mut environment = Environment::new(location.shorthand().clone());

    let to_owned = |texts: Vec<&str>| texts.into_iter().map(String::from).collect::<Vec<_>>();
    let anchors = to_owned(location.artifacts_in(ArtifactCategory::Structural));
    environment.set_lighting(to_owned(location.artifacts_in(ArtifactCategory::Lighting)));
    environment.set_atmosphere(to_owned(location.artifacts_in(ArtifactCategory::Atmospheric)));
    environment.set_props(to_owned(location.artifacts_in(ArtifactCategory::Prop)));

    // Notable features summarize the location only when no structural
    // anchor already does
    if anchors.is_empty() && !location.notable_features().is_empty() {
        environment.set_location_visual(Some(location.notable_features().join(", ")));
    }
    environment.set_anchors(anchors);

    let grade = location.color_grade().clone().or_else(|| {
        location
            .atmosphere_category()
            .as_deref()
            .and_then(|category| config.color_grade(category))
            .map(String::from)
    });
    environment.set_color_grade(grade);

    environment
}

#[cfg(test)]
mod tests {
    use super::*;
    use vignette_core::{DepthOfField, ShotType};

    fn story() -> StoryContext {
        r#"
[[characters]]
name = "mara"
trigger = "m4r4kov"

[[characters.appearances]]
description = "lean woman in patched recon fatigues"

[[locations]]
name = "bunker"
shorthand = "abandoned signal bunker"
atmosphere_category = "BUNKER_REFUGE"
notable_features = ["dead radio racks"]

[[locations.artifacts]]
category = "lighting"
text = "single hanging work lamp"
"#
        .parse()
        .unwrap()
    }

    fn beat() -> Beat {
        Beat::builder()
            .id("s01_b01")
            .scene(1u32)
            .excerpt("Mara drops through the hatch.")
            .location("bunker")
            .characters(vec!["mara".to_string()])
            .build()
            .unwrap()
    }

    #[test]
    fn test_enrich_populates_subject_and_environment() {
        let config = PipelineConfig::default();
        let continuity = SceneContinuity::new(1);
        let spec = enrich(&beat(), &story(), &config, &continuity);

        assert_eq!(spec.subjects().len(), 1);
        let subject = &spec.subjects()[0];
        assert_eq!(subject.trigger(), "m4r4kov");
        assert!(subject.appearance().contains("recon fatigues"));
        assert!(subject.face_visible());
        assert_eq!(
            spec.environment().color_grade().as_deref(),
            Some("desaturated tactical color grade")
        );
        // No structural anchors, so notable features summarize the location
        assert_eq!(
            spec.environment().location_visual().as_deref(),
            Some("dead radio racks")
        );
    }

    #[test]
    fn test_sealed_gear_hides_face() {
        let config = PipelineConfig::default();
        let mut continuity = SceneContinuity::new(1);
        continuity.set_gear("mara", GearState::Sealed);
        let spec = enrich(&beat(), &story(), &config, &continuity);

        let subject = &spec.subjects()[0];
        assert!(!subject.face_visible());
        assert!(subject.appearance().contains("visor"));
    }

    #[test]
    fn test_unknown_character_gets_placeholder() {
        let config = PipelineConfig::default();
        let continuity = SceneContinuity::new(1);
        let b = Beat::builder()
            .id("s01_b02")
            .scene(1u32)
            .excerpt("A stranger watches from the catwalk.")
            .location("bunker")
            .characters(vec!["stranger".to_string()])
            .build()
            .unwrap();
        let spec = enrich(&b, &story(), &config, &continuity);

        let subject = &spec.subjects()[0];
        assert_eq!(subject.appearance(), GENERIC_APPEARANCE);
        assert!(!subject.trigger().is_empty());
    }

    #[test]
    fn test_hint_shot_overrides_template_default() {
        let config = PipelineConfig::default();
        let continuity = SceneContinuity::new(1);
        let b = Beat::builder()
            .id("s01_b03")
            .scene(1u32)
            .excerpt("Mara drops through the hatch.")
            .location("bunker")
            .characters(vec!["mara".to_string()])
            .hints(vignette_core::DirectorHints::new(
                Some(ShotType::Closeup),
                None,
                None,
                None,
            ))
            .build()
            .unwrap();
        let spec = enrich(&b, &story(), &config, &continuity);
        assert_eq!(*spec.shot().shot_type(), ShotType::Closeup);
        assert_eq!(
            *spec.shot().depth_of_field(),
            Some(DepthOfField::Shallow)
        );
    }

    #[test]
    fn test_budget_reflects_modifiers() {
        let config = PipelineConfig::default();
        let mut continuity = SceneContinuity::new(1);
        let base_spec = enrich(&beat(), &story(), &config, &continuity);
        let base_budget = *base_spec.constraints().token_budget();

        continuity.set_gear("mara", GearState::Sealed);
        let sealed_spec = enrich(&beat(), &story(), &config, &continuity);
        assert_eq!(
            *sealed_spec.constraints().token_budget(),
            base_budget - config.budgets().sealed_discount()
        );
    }
}
