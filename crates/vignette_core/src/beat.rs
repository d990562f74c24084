//! Narrative beat types.
//!
//! Beats are produced by the external segmentation collaborator and are
//! immutable once built. The pipeline never edits a beat; it only reads
//! one beat at a time, in narrative order within a scene.

use crate::{CameraAngle, ShotType};
use serde::{Deserialize, Serialize};

/// What the segmentation collaborator decided about imagery for this beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageDecision {
    /// Generate a fresh image for this beat
    #[default]
    New,
    /// Reuse the previous beat's image
    ReusePrevious,
    /// No image for this beat
    None,
}

/// Director-style hints attached to a beat by the segmentation collaborator.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, Default, derive_getters::Getters,
)]
pub struct DirectorHints {
    /// Suggested shot type
    shot: Option<ShotType>,
    /// Suggested camera angle
    angle: Option<CameraAngle>,
    /// One-line visual anchor for the beat
    visual_anchor: Option<String>,
    /// Free-form positioning guidance
    positioning: Option<String>,
}

impl DirectorHints {
    /// Create hints from their parts.
    pub fn new(
        shot: Option<ShotType>,
        angle: Option<CameraAngle>,
        visual_anchor: Option<String>,
        positioning: Option<String>,
    ) -> Self {
        Self {
            shot,
            angle,
            visual_anchor,
            positioning,
        }
    }
}

/// The smallest narrative unit the pipeline operates on: one "shot" of story.
///
/// # Examples
///
/// ```
/// use vignette_core::{Beat, ImageDecision};
///
/// let beat = Beat::builder()
///     .id("s03_b01")
///     .scene(3u32)
///     .excerpt("Mara drops through the hatch into the bunker.")
///     .location("bunker")
///     .characters(vec!["mara".to_string()])
///     .build()
///     .unwrap();
///
/// assert_eq!(*beat.scene(), 3);
/// assert_eq!(*beat.image(), ImageDecision::New);
/// ```
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters, derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct Beat {
    /// Identifier assigned by the segmentation collaborator
    id: String,
    /// Scene number; drives continuity-state lifecycle
    scene: u32,
    /// Verbatim script excerpt for this beat
    excerpt: String,
    /// Image-generation decision
    #[builder(default)]
    image: ImageDecision,
    /// Optional camera/positioning hints
    #[builder(default, setter(into, strip_option))]
    hints: Option<DirectorHints>,
    /// Resolved location reference
    location: String,
    /// Participating character references, in on-screen order
    characters: Vec<String>,
}

impl Beat {
    /// Create a new beat builder.
    pub fn builder() -> BeatBuilder {
        BeatBuilder::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beat_builder_defaults() {
        let beat = Beat::builder()
            .id("b1")
            .scene(1u32)
            .excerpt("text")
            .location("bunker")
            .characters(vec!["mara".to_string()])
            .build()
            .unwrap();
        assert_eq!(*beat.image(), ImageDecision::New);
        assert!(beat.hints().is_none());
    }

    #[test]
    fn test_beat_builder_missing_field() {
        let result = Beat::builder().id("b1").build();
        assert!(result.is_err());
    }
}
