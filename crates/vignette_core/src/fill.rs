//! Guided fill-in payloads.
//!
//! [`SpecFillIn`] is the shape the text-generation model is asked to
//! return, and the shape the deterministic fallback produces. It is merged
//! into the beat spec and then discarded.

use serde::{Deserialize, Serialize};

/// Fill-in values for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectFill {
    /// Character this fill applies to
    pub character: String,
    /// Camera-observable pose or movement
    #[serde(default)]
    pub action: Option<String>,
    /// Facial expression; omitted when the face is not visible
    #[serde(default)]
    pub expression: Option<String>,
    /// Spatial position within the frame
    #[serde(default)]
    pub position: Option<String>,
}

/// Fill-in values for one beat, as returned by the model or the fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SpecFillIn {
    /// Per-subject fills
    #[serde(default)]
    pub subjects: Vec<SubjectFill>,
    /// Shot-composition language translated from the visual anchor
    #[serde(default)]
    pub composition: Option<String>,
    /// Optional vehicle text
    #[serde(default)]
    pub vehicle: Option<String>,
    /// Optional atmosphere text
    #[serde(default)]
    pub atmosphere: Option<String>,
}

impl SpecFillIn {
    /// Look up the fill for a character, if the payload includes one.
    pub fn subject(&self, character: &str) -> Option<&SubjectFill> {
        self.subjects.iter().find(|s| s.character == character)
    }
}
