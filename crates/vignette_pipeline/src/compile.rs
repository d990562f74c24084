//! Phase C: prompt compilation.
//!
//! Pure, order-preserving assembly of a completed spec into one prompt
//! string. Field order is deliberate: the downstream text encoder gives
//! earlier tokens more attention, so framing and subject identity come
//! before environmental decoration. Empty fields are omitted, and no
//! field is ever wrapped in parentheses (the renderer reserves those for
//! emphasis weighting, which character descriptions must not receive).

use vignette_context::SegmentTemplate;
use vignette_core::{SegmentPolicy, VisualBeatSpec};

/// Compile a spec into a single prompt string.
pub fn compile(spec: &VisualBeatSpec, segment: &SegmentTemplate) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut push = |text: &str| {
        let cleaned = strip_parens(text);
        if !cleaned.trim().is_empty() {
            parts.push(cleaned.trim().to_string());
        }
    };

    // 1. Framing
    let shot = spec.shot();
    push(shot.shot_type().prompt_text());
    if let Some(depth) = shot.depth_of_field() {
        push(depth.prompt_text());
    }
    push(shot.angle().prompt_text());
    if let Some(composition) = shot.composition() {
        push(composition);
    }

    // 2. Subjects, in list order
    for subject in spec.subjects() {
        push(subject.trigger());
        push(subject.appearance());
        if let Some(action) = subject.action() {
            push(action);
        }
        if let Some(expression) = subject.expression() {
            push(expression);
        }
        if let Some(position) = subject.position() {
            push(position);
        }
    }

    // 3.–8. Environment
    let environment = spec.environment();
    if let Some(summary) = environment.location_visual() {
        push(summary);
    }
    for anchor in environment.anchors() {
        push(anchor);
    }
    for light in environment.lighting() {
        push(light);
    }
    for atmosphere in environment.atmosphere() {
        push(atmosphere);
    }
    if let Some(effects) = environment.effects() {
        push(effects);
    }
    for prop in environment.props() {
        push(prop);
    }

    // 9. Vehicle
    if let Some(vehicle) = spec.vehicle() {
        push(vehicle.description());
        if let Some(position) = vehicle.position() {
            push(position);
        }
    }

    // 10. Color grade
    if let Some(grade) = environment.color_grade() {
        push(grade);
    }

    // 11. Segment tags, concatenated with no separator between tags
    if *spec.constraints().segment_policy() == SegmentPolicy::VisibleFaces {
        let tags: String = spec
            .subjects()
            .iter()
            .filter(|s| *s.face_visible() && *s.needs_segment())
            .map(|s| segment.render(s.trigger()))
            .collect();
        if !tags.is_empty() {
            parts.push(tags);
        }
    }

    parts.join(", ")
}

fn strip_parens(text: &str) -> String {
    if text.contains(['(', ')']) {
        text.replace(['(', ')'], "")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vignette_core::{
        CameraAngle, Constraints, Environment, GearState, SegmentPolicy, Shot, ShotType, Subject,
        VisualBeatSpec,
    };

    fn minimal_spec(subjects: Vec<Subject>) -> VisualBeatSpec {
        let mut environment = Environment::new("bunker");
        environment.set_location_visual(Some("abandoned signal bunker interior".to_string()));
        VisualBeatSpec::new(
            "b1",
            1,
            Shot::new(ShotType::Closeup, CameraAngle::EyeLevel),
            subjects,
            environment,
            None,
            Constraints::new(150, SegmentPolicy::VisibleFaces, Vec::new()),
            None,
        )
    }

    #[test]
    fn test_framing_comes_first() {
        let subject = Subject::new("mara", "m4r4kov", "lean woman in fatigues", GearState::Open);
        let spec = minimal_spec(vec![subject]);
        let prompt = compile(&spec, &SegmentTemplate::default());
        assert!(prompt.starts_with("close-up, shallow depth of field, eye level"));
        let trigger_pos = prompt.find("m4r4kov").unwrap();
        let location_pos = prompt.find("abandoned signal bunker interior").unwrap();
        assert!(trigger_pos < location_pos);
    }

    #[test]
    fn test_empty_fields_omitted() {
        let spec = minimal_spec(Vec::new());
        let prompt = compile(&spec, &SegmentTemplate::default());
        assert!(!prompt.contains(", ,"));
        assert!(!prompt.contains("segment"));
    }

    #[test]
    fn test_parentheses_never_emitted() {
        let subject = Subject::new(
            "mara",
            "m4r4kov",
            "lean woman (in fatigues)",
            GearState::Open,
        );
        let spec = minimal_spec(vec![subject]);
        let prompt = compile(&spec, &SegmentTemplate::default());
        assert!(!prompt.contains('('));
        assert!(!prompt.contains(')'));
        assert!(prompt.contains("lean woman in fatigues"));
    }

    #[test]
    fn test_adjacent_segment_tags() {
        let a = Subject::new("mara", "m4r4kov", "lean woman", GearState::Open);
        let b = Subject::new("joss", "j0ssv", "broad man", GearState::Open);
        let spec = minimal_spec(vec![a, b]);
        let prompt = compile(&spec, &SegmentTemplate::default());
        assert!(prompt.ends_with("<segment:face:m4r4kov,0.6,0.5><segment:face:j0ssv,0.6,0.5>"));
    }

    #[test]
    fn test_sealed_subject_gets_no_tag() {
        let sealed = Subject::new("mara", "m4r4kov", "lean woman, sealed helmet", GearState::Sealed);
        let spec = minimal_spec(vec![sealed]);
        let prompt = compile(&spec, &SegmentTemplate::default());
        assert!(!prompt.contains("<segment:"));
    }
}
