//! Per-scene continuity state.
//!
//! One [`SceneContinuity`] exists per scene. It is created when the first
//! beat of a scene arrives, mutated after every beat's successful
//! compilation, and discarded when the scene number changes. It is never
//! shared between scenes, so scenes can be processed concurrently with
//! independent state instances.

use crate::{CameraAngle, ShotType, VisualBeatSpec};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// How many recent shot type/angle pairs the anti-monotony window holds.
pub const SHOT_WINDOW_LEN: usize = 4;

/// Whether a character's face-obscuring gear is open or sealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GearState {
    /// Face visible; expression and face text allowed
    #[default]
    Open,
    /// Visor sealed; no expression or face text may appear
    Sealed,
}

/// Motion state of the scene's vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VehicleMotion {
    /// Parked or stationary
    #[default]
    Stationary,
    /// Moving through the scene
    Moving,
}

/// The vehicle currently present in a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct VehicleState {
    /// Vehicle description as it should appear in prompts
    description: String,
    /// Current motion state
    motion: VehicleMotion,
}

impl VehicleState {
    /// Create a vehicle state.
    pub fn new(description: impl Into<String>, motion: VehicleMotion) -> Self {
        Self {
            description: description.into(),
            motion,
        }
    }
}

/// Last known camera-observable state for one character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct CharacterCarry {
    /// Last known action text
    action: Option<String>,
    /// Last known expression text
    expression: Option<String>,
    /// Beat that set these values
    beat_id: String,
}

impl CharacterCarry {
    /// Create a carry record from a beat's final subject state.
    pub fn new(action: Option<String>, expression: Option<String>, beat_id: impl Into<String>) -> Self {
        Self {
            action,
            expression,
            beat_id: beat_id.into(),
        }
    }
}

/// Mutable continuity record for one scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct SceneContinuity {
    /// Scene number this state belongs to
    scene: u32,
    /// Vehicle present in the scene, if any
    vehicle: Option<VehicleState>,
    /// Characters currently present, in on-screen order
    present: Vec<String>,
    /// Per-character spatial position
    positions: HashMap<String, String>,
    /// Per-character gear state
    gear: HashMap<String, GearState>,
    /// Per-character carryover of action/expression
    carry: HashMap<String, CharacterCarry>,
    /// Rolling window of recent shot type/angle pairs
    shot_window: VecDeque<(ShotType, CameraAngle)>,
    /// Prose synopsis of the most recently compiled beat
    last_summary: Option<String>,
    /// Location of the scene's first beat, the scene-level fallback
    scene_location: Option<String>,
}

impl SceneContinuity {
    /// Create fresh continuity state for a scene.
    pub fn new(scene: u32) -> Self {
        Self {
            scene,
            vehicle: None,
            present: Vec::new(),
            positions: HashMap::new(),
            gear: HashMap::new(),
            carry: HashMap::new(),
            shot_window: VecDeque::with_capacity(SHOT_WINDOW_LEN),
            last_summary: None,
            scene_location: None,
        }
    }

    /// Record the scene-level location from the scene's first beat.
    ///
    /// Later beats may resolve to other locations; the first one stays the
    /// scene-level fallback for appearance resolution.
    pub fn note_location(&mut self, location: &str) {
        if self.scene_location.is_none() {
            self.scene_location = Some(location.to_string());
        }
    }

    /// Seed presence directly from a beat's character list.
    ///
    /// Presence is always taken from the beat itself, never inferred from
    /// earlier beats, so a beat's subjects can never come up empty while
    /// its character list is populated.
    pub fn seed_presence(&mut self, characters: &[String]) {
        self.present.clear();
        for name in characters {
            if !self.present.contains(name) {
                self.present.push(name.clone());
            }
        }
    }

    /// Set the scene's vehicle.
    pub fn set_vehicle(&mut self, vehicle: Option<VehicleState>) {
        self.vehicle = vehicle;
    }

    /// Gear state for a character, defaulting to open.
    pub fn gear_for(&self, character: &str) -> GearState {
        self.gear.get(character).copied().unwrap_or_default()
    }

    /// Record a gear-state change for a character.
    pub fn set_gear(&mut self, character: impl Into<String>, state: GearState) {
        self.gear.insert(character.into(), state);
    }

    /// Last known spatial position for a character.
    pub fn position_for(&self, character: &str) -> Option<&str> {
        self.positions.get(character).map(|s| s.as_str())
    }

    /// Carry record for a character.
    pub fn carry_for(&self, character: &str) -> Option<&CharacterCarry> {
        self.carry.get(character)
    }

    /// Advance continuity from a fully compiled beat.
    ///
    /// Only a spec that made it through compilation may be written back;
    /// a partially built spec must be discarded instead, so half-filled
    /// data never corrupts subsequent beats.
    pub fn advance(&mut self, spec: &VisualBeatSpec, summary: impl Into<String>) {
        for subject in spec.subjects() {
            self.carry.insert(
                subject.character().clone(),
                CharacterCarry::new(
                    subject.action().clone(),
                    subject.expression().clone(),
                    spec.beat_id().clone(),
                ),
            );
            if let Some(position) = subject.position() {
                self.positions
                    .insert(subject.character().clone(), position.clone());
            }
            self.gear.insert(subject.character().clone(), *subject.gear());
        }

        if self.shot_window.len() == SHOT_WINDOW_LEN {
            self.shot_window.pop_front();
        }
        self.shot_window
            .push_back((*spec.shot().shot_type(), *spec.shot().angle()));

        self.last_summary = Some(summary.into());
    }

    /// The most recent shot types, newest last.
    pub fn recent_shots(&self) -> impl Iterator<Item = ShotType> + '_ {
        self.shot_window.iter().map(|(shot, _)| *shot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_presence_dedups() {
        let mut state = SceneContinuity::new(1);
        state.seed_presence(&[
            "mara".to_string(),
            "joss".to_string(),
            "mara".to_string(),
        ]);
        assert_eq!(state.present(), &["mara".to_string(), "joss".to_string()]);
    }

    #[test]
    fn test_gear_defaults_open() {
        let state = SceneContinuity::new(1);
        assert_eq!(state.gear_for("mara"), GearState::Open);
    }

    #[test]
    fn test_seed_presence_replaces_previous_beat() {
        let mut state = SceneContinuity::new(1);
        state.seed_presence(&["mara".to_string(), "joss".to_string()]);
        state.seed_presence(&["joss".to_string()]);
        assert_eq!(state.present(), &["joss".to_string()]);
    }
}
