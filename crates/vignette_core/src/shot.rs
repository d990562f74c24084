//! Shot vocabulary: shot types, camera angles, and derived depth of field.

use serde::{Deserialize, Serialize};

/// Shot type for a beat's framing.
///
/// The snake_case serialized form is used as the key in budget tables;
/// [`ShotType::prompt_text`] is the form emitted into compiled prompts.
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
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShotType {
    /// Extreme close-up on a detail of a face or object
    ExtremeCloseup,
    /// Close-up framing a single face
    Closeup,
    /// Medium close-up, head and shoulders
    MediumCloseup,
    /// Medium shot, waist up
    Medium,
    /// Two characters sharing the frame
    TwoShot,
    /// Over-the-shoulder framing
    OverShoulder,
    /// Point-of-view framing
    Pov,
    /// Insert shot of an object or detail
    Insert,
    /// Medium wide shot, full figures with some environment
    MediumWide,
    /// Wide shot establishing figures in the environment
    Wide,
    /// Extreme wide shot dominated by the environment
    ExtremeWide,
}

impl ShotType {
    /// The phrase emitted into a compiled prompt for this shot type.
    pub fn prompt_text(&self) -> &'static str {
        match self {
            Self::ExtremeCloseup => "extreme close-up",
            Self::Closeup => "close-up",
            Self::MediumCloseup => "medium close-up",
            Self::Medium => "medium shot",
            Self::TwoShot => "two shot",
            Self::OverShoulder => "over-the-shoulder shot",
            Self::Pov => "POV shot",
            Self::Insert => "insert shot",
            Self::MediumWide => "medium wide shot",
            Self::Wide => "wide shot",
            Self::ExtremeWide => "extreme wide shot",
        }
    }

    /// Whether this shot belongs to the close-up family.
    pub fn is_closeup_family(&self) -> bool {
        matches!(
            self,
            Self::ExtremeCloseup | Self::Closeup | Self::MediumCloseup | Self::Insert
        )
    }

    /// Whether this shot belongs to the wide family.
    pub fn is_wide_family(&self) -> bool {
        matches!(self, Self::Wide | Self::ExtremeWide)
    }
}

impl std::fmt::Display for ShotType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prompt_text())
    }
}

/// Camera angle for a beat's framing.
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
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CameraAngle {
    /// Neutral eye-level angle
    EyeLevel,
    /// Camera below the subject looking up
    LowAngle,
    /// Camera above the subject looking down
    HighAngle,
    /// Tilted horizon
    DutchAngle,
    /// Directly overhead
    Overhead,
    /// Camera at ground level
    GroundLevel,
}

impl CameraAngle {
    /// The phrase emitted into a compiled prompt for this angle.
    pub fn prompt_text(&self) -> &'static str {
        match self {
            Self::EyeLevel => "eye level",
            Self::LowAngle => "low angle",
            Self::HighAngle => "high angle",
            Self::DutchAngle => "dutch angle",
            Self::Overhead => "overhead angle",
            Self::GroundLevel => "ground level angle",
        }
    }
}

impl std::fmt::Display for CameraAngle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prompt_text())
    }
}

/// Depth of field derived from the shot type, never authored directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthOfField {
    /// Close-up family shots isolate the subject
    Shallow,
    /// Wide family shots hold the whole environment in focus
    Deep,
}

impl DepthOfField {
    /// The phrase emitted into a compiled prompt.
    pub fn prompt_text(&self) -> &'static str {
        match self {
            Self::Shallow => "shallow depth of field",
            Self::Deep => "deep focus",
        }
    }

    /// Derive depth of field from a shot type.
    ///
    /// Close-up family shots yield [`DepthOfField::Shallow`], wide family
    /// shots yield [`DepthOfField::Deep`], and everything else derives
    /// no depth-of-field text at all.
    pub fn derive(shot: ShotType) -> Option<Self> {
        if shot.is_closeup_family() {
            Some(Self::Shallow)
        } else if shot.is_wide_family() {
            Some(Self::Deep)
        } else {
            None
        }
    }
}

impl std::fmt::Display for DepthOfField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prompt_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_depth_of_field_derivation() {
        assert_eq!(
            DepthOfField::derive(ShotType::Closeup),
            Some(DepthOfField::Shallow)
        );
        assert_eq!(
            DepthOfField::derive(ShotType::Wide),
            Some(DepthOfField::Deep)
        );
        assert_eq!(DepthOfField::derive(ShotType::Medium), None);
        assert_eq!(DepthOfField::derive(ShotType::TwoShot), None);
    }

    #[test]
    fn test_shot_type_parses_snake_case() {
        assert_eq!(
            ShotType::from_str("extreme_closeup").unwrap(),
            ShotType::ExtremeCloseup
        );
        assert_eq!(ShotType::from_str("two_shot").unwrap(), ShotType::TwoShot);
    }

    #[test]
    fn test_prompt_text() {
        assert_eq!(ShotType::Closeup.prompt_text(), "close-up");
        assert_eq!(DepthOfField::Shallow.prompt_text(), "shallow depth of field");
        assert_eq!(DepthOfField::Deep.prompt_text(), "deep focus");
        assert_eq!(CameraAngle::LowAngle.prompt_text(), "low angle");
    }
}
