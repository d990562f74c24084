//! The visual beat spec: the pipeline's central intermediate representation.
//!
//! A [`VisualBeatSpec`] is owned exclusively by the pipeline for the
//! duration of one beat's processing. Deterministic enrichment populates
//! most of it, guided fill-in completes the camera-observable slots, the
//! compiler reads it, and the validator may mutate it during repair.

use crate::{CameraAngle, DepthOfField, GearState, ShotType};
use serde::{Deserialize, Serialize};

/// Camera framing for one beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Shot {
    /// Shot type selected by hints or template defaults
    shot_type: ShotType,
    /// Camera angle
    angle: CameraAngle,
    /// Depth of field, derived from the shot type
    depth_of_field: Option<DepthOfField>,
    /// Shot composition text, filled in by guided fill-in
    composition: Option<String>,
}

impl Shot {
    /// Create a shot; depth of field is derived, never passed in.
    pub fn new(shot_type: ShotType, angle: CameraAngle) -> Self {
        Self {
            shot_type,
            angle,
            depth_of_field: DepthOfField::derive(shot_type),
            composition: None,
        }
    }

    /// Set the composition text.
    pub fn set_composition(&mut self, composition: Option<String>) {
        self.composition = composition;
    }

    /// Override the derived depth of field (configuration path).
    pub fn set_depth_of_field(&mut self, depth_of_field: Option<DepthOfField>) {
        self.depth_of_field = depth_of_field;
    }
}

/// One on-screen character in the beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Subject {
    /// Character reference from the beat
    character: String,
    /// Identity trigger binding this subject to a learned visual identity
    trigger: String,
    /// Appearance description, plain prose
    appearance: String,
    /// Camera-observable pose or movement
    action: Option<String>,
    /// Facial expression; must stay empty under sealed gear
    expression: Option<String>,
    /// Spatial position within the frame
    position: Option<String>,
    /// Whether the face is visible (open gear)
    face_visible: bool,
    /// Whether this subject requires a segment tag in the compiled prompt
    needs_segment: bool,
    /// Gear state carried from scene continuity
    gear: GearState,
}

impl Subject {
    /// Create a subject from enrichment data.
    pub fn new(
        character: impl Into<String>,
        trigger: impl Into<String>,
        appearance: impl Into<String>,
        gear: GearState,
    ) -> Self {
        let face_visible = gear == GearState::Open;
        Self {
            character: character.into(),
            trigger: trigger.into(),
            appearance: appearance.into(),
            action: None,
            expression: None,
            position: None,
            face_visible,
            needs_segment: face_visible,
            gear,
        }
    }

    /// Set the action text.
    pub fn set_action(&mut self, action: Option<String>) {
        self.action = action;
    }

    /// Set the expression text. Ignored under sealed gear.
    pub fn set_expression(&mut self, expression: Option<String>) {
        if self.gear == GearState::Sealed {
            return;
        }
        self.expression = expression;
    }

    /// Null the expression regardless of gear state (repair path).
    pub fn clear_expression(&mut self) {
        self.expression = None;
    }

    /// Set the spatial position.
    pub fn set_position(&mut self, position: Option<String>) {
        self.position = position;
    }

    /// Replace the appearance description (repair path).
    pub fn set_appearance(&mut self, appearance: impl Into<String>) {
        self.appearance = appearance.into();
    }

    /// Replace the identity trigger (repair path).
    pub fn set_trigger(&mut self, trigger: impl Into<String>) {
        self.trigger = trigger.into();
    }

    /// Force the segment-tag requirement (repair path).
    pub fn set_needs_segment(&mut self, needs_segment: bool) {
        self.needs_segment = needs_segment;
    }
}

/// Environment detail for the beat's location.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, Default, derive_getters::Getters,
)]
pub struct Environment {
    /// Location shorthand
    location: String,
    /// Structural anchors
    anchors: Vec<String>,
    /// Prop anchors
    props: Vec<String>,
    /// Lighting anchors
    lighting: Vec<String>,
    /// Atmospheric anchors
    atmosphere: Vec<String>,
    /// Optional visual summary of the location
    location_visual: Option<String>,
    /// Optional color-grade tag derived from the atmosphere category
    color_grade: Option<String>,
    /// Optional special-effects text
    effects: Option<String>,
}

impl Environment {
    /// Create an environment with the given shorthand.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Default::default()
        }
    }

    /// Set the structural anchors.
    pub fn set_anchors(&mut self, anchors: Vec<String>) {
        self.anchors = anchors;
    }

    /// Set the prop anchors.
    pub fn set_props(&mut self, props: Vec<String>) {
        self.props = props;
    }

    /// Set the lighting anchors.
    pub fn set_lighting(&mut self, lighting: Vec<String>) {
        self.lighting = lighting;
    }

    /// Set the atmospheric anchors.
    pub fn set_atmosphere(&mut self, atmosphere: Vec<String>) {
        self.atmosphere = atmosphere;
    }

    /// Set the location visual summary.
    pub fn set_location_visual(&mut self, summary: Option<String>) {
        self.location_visual = summary;
    }

    /// Set the color-grade tag.
    pub fn set_color_grade(&mut self, grade: Option<String>) {
        self.color_grade = grade;
    }

    /// Set the special-effects text.
    pub fn set_effects(&mut self, effects: Option<String>) {
        self.effects = effects;
    }

    /// Drop the prop anchors (compaction path).
    pub fn clear_props(&mut self) {
        self.props.clear();
    }

    /// Drop the special-effects text (compaction path).
    pub fn clear_effects(&mut self) {
        self.effects = None;
    }

    /// Drop the atmospheric anchors (compaction path).
    pub fn clear_atmosphere(&mut self) {
        self.atmosphere.clear();
    }
}

/// Vehicle present in the beat, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Vehicle {
    /// Vehicle description
    description: String,
    /// Spatial note placing the vehicle in the frame
    position: Option<String>,
}

impl Vehicle {
    /// Create a vehicle entry.
    pub fn new(description: impl Into<String>, position: Option<String>) -> Self {
        Self {
            description: description.into(),
            position,
        }
    }

    /// Drop the spatial note (compaction path).
    pub fn clear_position(&mut self) {
        self.position = None;
    }
}

/// Segment-tag policy for the compiled prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SegmentPolicy {
    /// One segment tag per face-visible subject
    #[default]
    VisibleFaces,
    /// No segment tags at all
    Disabled,
}

/// A droppable prompt field, in the order compaction removes them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DropField {
    /// Vehicle spatial note
    VehiclePosition,
    /// Prop anchors
    Props,
    /// Special-effects text
    Effects,
    /// Atmospheric anchors
    Atmosphere,
    /// Appearance description of every subject after the first
    SecondaryDescription,
}

/// Budget and compaction constraints attached to the spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Constraints {
    /// Integer token allowance for the compiled prompt
    token_budget: u32,
    /// Segment-tag policy
    segment_policy: SegmentPolicy,
    /// Ordered field-drop list used for compaction
    drop_order: Vec<DropField>,
}

impl Constraints {
    /// Create constraints from their parts.
    pub fn new(token_budget: u32, segment_policy: SegmentPolicy, drop_order: Vec<DropField>) -> Self {
        Self {
            token_budget,
            segment_policy,
            drop_order,
        }
    }
}

/// The visual beat spec: everything the compiler needs for one beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct VisualBeatSpec {
    /// Beat identifier this spec was built for
    beat_id: String,
    /// Scene number this spec belongs to
    scene: u32,
    /// Camera framing
    shot: Shot,
    /// On-screen characters in list order
    subjects: Vec<Subject>,
    /// Environment detail
    environment: Environment,
    /// Vehicle, when one is present
    vehicle: Option<Vehicle>,
    /// Budget and compaction constraints
    constraints: Constraints,
    /// Short prose synopsis of the previous beat
    continuity: Option<String>,
}

impl VisualBeatSpec {
    /// Assemble a spec from its enriched parts.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        beat_id: impl Into<String>,
        scene: u32,
        shot: Shot,
        subjects: Vec<Subject>,
        environment: Environment,
        vehicle: Option<Vehicle>,
        constraints: Constraints,
        continuity: Option<String>,
    ) -> Self {
        Self {
            beat_id: beat_id.into(),
            scene,
            shot,
            subjects,
            environment,
            vehicle,
            constraints,
            continuity,
        }
    }

    /// Mutable access to the shot (fill-in merge).
    pub fn shot_mut(&mut self) -> &mut Shot {
        &mut self.shot
    }

    /// Mutable access to the subjects (fill-in merge and repair).
    pub fn subjects_mut(&mut self) -> &mut [Subject] {
        &mut self.subjects
    }

    /// Mutable access to the environment (fill-in merge and compaction).
    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    /// Mutable access to the vehicle (compaction).
    pub fn vehicle_mut(&mut self) -> Option<&mut Vehicle> {
        self.vehicle.as_mut()
    }

    /// Whether any subject's gear is sealed.
    pub fn any_sealed(&self) -> bool {
        self.subjects.iter().any(|s| *s.gear() == GearState::Sealed)
    }

    /// Whether any subject's face is visible.
    pub fn any_face_visible(&self) -> bool {
        self.subjects.iter().any(|s| *s.face_visible())
    }
}
