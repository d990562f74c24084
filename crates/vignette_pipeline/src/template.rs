//! Scene-type template classification.
//!
//! The template tag selects default framing and tunes the token budget.
//! It never alters the four-phase control flow.

use vignette_core::{Beat, CameraAngle, SceneContinuity, ShotType};

/// Closed set of scene-type templates.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum SceneTemplate {
    /// A vehicle dominates the beat
    Vehicle,
    /// Characters talking in an enclosed space
    IndoorDialogue,
    /// Active combat
    Combat,
    /// Quiet infiltration
    Stealth,
    /// Environment-first scene opener
    Establishing,
    /// Characters donning or sealing gear
    SuitUp,
    /// Anything else
    Generic,
}

const COMBAT_CUES: &[&str] = &[
    "fire", "shot", "shoot", "blast", "muzzle", "recoil", "explo", "grenade", "charges",
];
const STEALTH_CUES: &[&str] = &["slip", "creep", "crawl", "silent", "quiet", "shadow", "unseen"];
const SUIT_UP_CUES: &[&str] = &["helmet", "visor", "seal", "straps", "gears up", "suit"];
const DIALOGUE_CUES: &[&str] = &["says", "asks", "whisper", "mutters", "replies", "\""];

fn any_cue(excerpt: &str, cues: &[&str]) -> bool {
    let lowered = excerpt.to_lowercase();
    cues.iter().any(|cue| lowered.contains(cue))
}

/// Classify a beat into a scene-type template.
///
/// Signals, in precedence order: a vehicle in the scene, combat cues,
/// stealth cues, suit-up cues, an empty character list (establishing),
/// dialogue cues with more than one character, else generic.
pub fn classify(beat: &Beat, continuity: &SceneContinuity) -> SceneTemplate {
    let excerpt = beat.excerpt();
    if continuity.vehicle().is_some() {
        SceneTemplate::Vehicle
    } else if any_cue(excerpt, COMBAT_CUES) {
        SceneTemplate::Combat
    } else if any_cue(excerpt, STEALTH_CUES) {
        SceneTemplate::Stealth
    } else if any_cue(excerpt, SUIT_UP_CUES) {
        SceneTemplate::SuitUp
    } else if beat.characters().is_empty() {
        SceneTemplate::Establishing
    } else if beat.characters().len() > 1 && any_cue(excerpt, DIALOGUE_CUES) {
        SceneTemplate::IndoorDialogue
    } else {
        SceneTemplate::Generic
    }
}

/// Default shot type and camera angle for a template.
///
/// The anti-monotony rule consults the scene's rolling shot window: when
/// the default shot would repeat the last two beats, the alternate shot
/// is used instead.
pub fn default_framing(
    template: SceneTemplate,
    continuity: &SceneContinuity,
) -> (ShotType, CameraAngle) {
    let (shot, angle) = match template {
        SceneTemplate::Vehicle => (ShotType::MediumWide, CameraAngle::LowAngle),
        SceneTemplate::IndoorDialogue => (ShotType::MediumCloseup, CameraAngle::EyeLevel),
        SceneTemplate::Combat => (ShotType::Medium, CameraAngle::LowAngle),
        SceneTemplate::Stealth => (ShotType::MediumWide, CameraAngle::HighAngle),
        SceneTemplate::Establishing => (ShotType::ExtremeWide, CameraAngle::HighAngle),
        SceneTemplate::SuitUp => (ShotType::Closeup, CameraAngle::EyeLevel),
        SceneTemplate::Generic => (ShotType::Medium, CameraAngle::EyeLevel),
    };

    let recent: Vec<_> = continuity.recent_shots().collect();
    let monotonous = recent.len() >= 2 && recent[recent.len() - 2..].iter().all(|s| *s == shot);
    if monotonous {
        (alternate_shot(shot), angle)
    } else {
        (shot, angle)
    }
}

fn alternate_shot(shot: ShotType) -> ShotType {
    match shot {
        ShotType::ExtremeCloseup => ShotType::Closeup,
        ShotType::Closeup => ShotType::MediumCloseup,
        ShotType::MediumCloseup => ShotType::Medium,
        ShotType::Medium => ShotType::MediumWide,
        ShotType::TwoShot => ShotType::Medium,
        ShotType::OverShoulder => ShotType::MediumCloseup,
        ShotType::Pov => ShotType::Medium,
        ShotType::Insert => ShotType::Closeup,
        ShotType::MediumWide => ShotType::Wide,
        ShotType::Wide => ShotType::MediumWide,
        ShotType::ExtremeWide => ShotType::Wide,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vignette_core::{Beat, SceneContinuity, VehicleMotion, VehicleState};

    fn beat(excerpt: &str, characters: &[&str]) -> Beat {
        Beat::builder()
            .id("b1")
            .scene(1u32)
            .excerpt(excerpt)
            .location("bunker")
            .characters(characters.iter().map(|s| s.to_string()).collect::<Vec<_>>())
            .build()
            .unwrap()
    }

    #[test]
    fn test_vehicle_wins_over_everything() {
        let mut state = SceneContinuity::new(1);
        state.set_vehicle(Some(VehicleState::new(
            "matte gray armored rover",
            VehicleMotion::Moving,
        )));
        let b = beat("Gunfire rakes the rover as it climbs the dune.", &["mara"]);
        assert_eq!(classify(&b, &state), SceneTemplate::Vehicle);
    }

    #[test]
    fn test_combat_classification() {
        let state = SceneContinuity::new(1);
        let b = beat("Mara returns fire from behind the barricade.", &["mara"]);
        assert_eq!(classify(&b, &state), SceneTemplate::Combat);
    }

    #[test]
    fn test_establishing_without_characters() {
        let state = SceneContinuity::new(1);
        let b = beat("The ridge line at dawn, wind over empty ground.", &[]);
        assert_eq!(classify(&b, &state), SceneTemplate::Establishing);
    }

    #[test]
    fn test_dialogue_needs_two_characters() {
        let state = SceneContinuity::new(1);
        let b = beat("\"We move at dusk,\" Mara says.", &["mara", "joss"]);
        assert_eq!(classify(&b, &state), SceneTemplate::IndoorDialogue);
        let solo = beat("\"We move at dusk,\" Mara says.", &["mara"]);
        assert_eq!(classify(&solo, &state), SceneTemplate::Generic);
    }

    #[test]
    fn test_generic_fallback() {
        let state = SceneContinuity::new(1);
        let b = beat("Mara studies the map.", &["mara"]);
        assert_eq!(classify(&b, &state), SceneTemplate::Generic);
    }
}
