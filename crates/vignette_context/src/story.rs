//! Story context tables supplied by the upstream collaborator.
//!
//! The story database arrives as data, not code: a table of character
//! appearance variants keyed by (character, location, optional
//! phase-trigger condition), and a table of location artifacts keyed by
//! category.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use vignette_error::{ContextError, ContextErrorKind};

/// Category of a location artifact.
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
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ArtifactCategory {
    /// Load-bearing set detail: walls, doors, terrain
    Structural,
    /// Light sources and quality
    Lighting,
    /// Haze, dust, weather
    Atmospheric,
    /// Smaller set dressing
    Prop,
}

/// One visual detail attached to a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Artifact {
    /// Which environment slot this artifact fills
    category: ArtifactCategory,
    /// The prompt text for this artifact
    text: String,
}

impl Artifact {
    /// Create an artifact.
    pub fn new(category: ArtifactCategory, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
        }
    }
}

/// One stored appearance variant for a character.
///
/// A variant with no `location` applies at any location; a variant with a
/// `when` keyword applies only while that keyword appears in the beat's
/// excerpt (the phase-trigger condition).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct AppearanceVariant {
    /// Location this variant is specific to, if any
    #[serde(default)]
    location: Option<String>,
    /// Phase label for this variant (informational)
    #[serde(default)]
    phase: Option<String>,
    /// Keyword in the beat excerpt that activates this variant
    #[serde(default)]
    when: Option<String>,
    /// Appearance description, plain prose
    description: String,
}

impl AppearanceVariant {
    /// Create a variant.
    pub fn new(
        location: Option<String>,
        phase: Option<String>,
        when: Option<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            location,
            phase,
            when,
            description: description.into(),
        }
    }

    fn matches_location(&self, location: &str) -> bool {
        self.location.as_deref() == Some(location)
    }

    fn triggered_by(&self, excerpt: &str) -> bool {
        match &self.when {
            Some(keyword) => excerpt.to_lowercase().contains(&keyword.to_lowercase()),
            None => true,
        }
    }
}

/// One character's story data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct CharacterSheet {
    /// Character reference used by beats
    name: String,
    /// Identity trigger token for the renderer
    trigger: String,
    /// Face-hidden description fragment used while gear is sealed
    #[serde(default)]
    sealed_fragment: Option<String>,
    /// Open-face fragment used while gear is open
    #[serde(default)]
    open_fragment: Option<String>,
    /// Stored appearance variants
    #[serde(default)]
    appearances: Vec<AppearanceVariant>,
}

impl CharacterSheet {
    /// Create a character sheet.
    pub fn new(
        name: impl Into<String>,
        trigger: impl Into<String>,
        appearances: Vec<AppearanceVariant>,
    ) -> Self {
        Self {
            name: name.into(),
            trigger: trigger.into(),
            sealed_fragment: None,
            open_fragment: None,
            appearances,
        }
    }

    /// Resolve the most contextually appropriate appearance variant.
    ///
    /// Resolution order:
    /// 1. a variant for the beat's location whose phase trigger matches
    /// 2. a variant for the scene's location whose phase trigger matches
    /// 3. a location-agnostic variant whose phase trigger matches
    ///
    /// Within each step, triggered variants win over untriggered ones.
    pub fn resolve_appearance(
        &self,
        beat_location: &str,
        scene_location: Option<&str>,
        excerpt: &str,
    ) -> Option<&AppearanceVariant> {
        let at_beat: Vec<_> = self
            .appearances
            .iter()
            .filter(|v| v.matches_location(beat_location))
            .collect();
        if let Some(variant) = pick_variant(at_beat, excerpt) {
            return Some(variant);
        }

        if let Some(scene_loc) = scene_location {
            let at_scene: Vec<_> = self
                .appearances
                .iter()
                .filter(|v| v.matches_location(scene_loc))
                .collect();
            if let Some(variant) = pick_variant(at_scene, excerpt) {
                return Some(variant);
            }
        }

        let anywhere: Vec<_> = self
            .appearances
            .iter()
            .filter(|v| v.location.is_none())
            .collect();
        pick_variant(anywhere, excerpt)
    }
}

/// Prefer a variant whose phase trigger fires; fall back to the
/// untriggered variant in the same bucket.
fn pick_variant<'a>(
    candidates: Vec<&'a AppearanceVariant>,
    excerpt: &str,
) -> Option<&'a AppearanceVariant> {
    candidates
        .iter()
        .find(|v| v.when.is_some() && v.triggered_by(excerpt))
        .or_else(|| candidates.iter().find(|v| v.when.is_none()))
        .copied()
}

/// One location's story data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct LocationSheet {
    /// Location reference used by beats
    name: String,
    /// Short prompt-ready phrase for the location
    shorthand: String,
    /// Atmosphere category used for color-grade lookup
    #[serde(default)]
    atmosphere_category: Option<String>,
    /// Explicit color-grade override, beats the category lookup
    #[serde(default)]
    color_grade: Option<String>,
    /// Notable features used for the location-visual summary
    #[serde(default)]
    notable_features: Vec<String>,
    /// Visual artifacts bucketed by category
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

impl LocationSheet {
    /// Create a location sheet.
    pub fn new(name: impl Into<String>, shorthand: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shorthand: shorthand.into(),
            atmosphere_category: None,
            color_grade: None,
            notable_features: Vec::new(),
            artifacts: Vec::new(),
        }
    }

    /// Artifact texts for one category, in table order.
    pub fn artifacts_in(&self, category: ArtifactCategory) -> Vec<&str> {
        self.artifacts
            .iter()
            .filter(|a| *a.category() == category)
            .map(|a| a.text().as_str())
            .collect()
    }
}

/// The full story context for one story.
///
/// # Example TOML Structure
///
/// ```toml
/// [[characters]]
/// name = "mara"
/// trigger = "m4r4kov"
///
/// [[characters.appearances]]
/// location = "bunker"
/// description = "lean woman in patched recon fatigues"
///
/// [[locations]]
/// name = "bunker"
/// shorthand = "abandoned signal bunker"
/// atmosphere_category = "BUNKER_REFUGE"
///
/// [[locations.artifacts]]
/// category = "structural"
/// text = "rusted blast door"
/// ```
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, Default, derive_getters::Getters,
)]
pub struct StoryContext {
    /// Character sheets
    #[serde(default)]
    characters: Vec<CharacterSheet>,
    /// Location sheets
    #[serde(default)]
    locations: Vec<LocationSheet>,
}

impl StoryContext {
    /// Create a story context from already-built tables.
    pub fn new(characters: Vec<CharacterSheet>, locations: Vec<LocationSheet>) -> Self {
        Self {
            characters,
            locations,
        }
    }

    /// Loads a story context from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is invalid,
    /// or validation fails.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ContextError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ContextError::new(ContextErrorKind::FileRead(e.to_string())))?;
        content.parse()
    }

    /// Look up a character sheet.
    pub fn character(&self, name: &str) -> Option<&CharacterSheet> {
        self.characters.iter().find(|c| c.name() == name)
    }

    /// Look up a location sheet.
    pub fn location(&self, name: &str) -> Option<&LocationSheet> {
        self.locations.iter().find(|l| l.name() == name)
    }

    /// Validates the loaded tables.
    ///
    /// Ensures every character carries a non-empty identity trigger and
    /// every location a non-empty shorthand.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn validate(&self) -> Result<(), ContextError> {
        for character in &self.characters {
            if character.trigger().trim().is_empty() {
                return Err(ContextError::new(ContextErrorKind::MissingTrigger(
                    character.name().clone(),
                )));
            }
        }
        for location in &self.locations {
            if location.shorthand().trim().is_empty() {
                return Err(ContextError::new(ContextErrorKind::Validation(format!(
                    "location '{}' has an empty shorthand",
                    location.name()
                ))));
            }
        }
        Ok(())
    }
}

impl FromStr for StoryContext {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let context: Self = toml::from_str(s)
            .map_err(|e| ContextError::new(ContextErrorKind::TomlParse(e.to_string())))?;
        context.validate()?;
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORY: &str = r#"
[[characters]]
name = "mara"
trigger = "m4r4kov"

[[characters.appearances]]
description = "lean woman in patched recon fatigues"

[[characters.appearances]]
location = "bunker"
description = "lean woman, fatigues streaked with concrete dust"

[[characters.appearances]]
location = "bunker"
phase = "wounded"
when = "wound"
description = "lean woman, field dressing taped over her shoulder"

[[locations]]
name = "bunker"
shorthand = "abandoned signal bunker"
atmosphere_category = "BUNKER_REFUGE"
notable_features = ["dead radio racks", "painted-over blast markings"]

[[locations.artifacts]]
category = "structural"
text = "rusted blast door"

[[locations.artifacts]]
category = "lighting"
text = "single hanging work lamp"
"#;

    #[test]
    fn test_parse_story_toml() {
        let story: StoryContext = STORY.parse().unwrap();
        assert_eq!(story.characters().len(), 1);
        assert_eq!(story.locations().len(), 1);
        assert_eq!(
            story.location("bunker").unwrap().atmosphere_category(),
            &Some("BUNKER_REFUGE".to_string())
        );
    }

    #[test]
    fn test_appearance_prefers_beat_location() {
        let story: StoryContext = STORY.parse().unwrap();
        let mara = story.character("mara").unwrap();
        let variant = mara
            .resolve_appearance("bunker", None, "Mara checks the door.")
            .unwrap();
        assert!(variant.description().contains("concrete dust"));
    }

    #[test]
    fn test_appearance_phase_trigger() {
        let story: StoryContext = STORY.parse().unwrap();
        let mara = story.character("mara").unwrap();
        let variant = mara
            .resolve_appearance("bunker", None, "The wound reopens as she climbs.")
            .unwrap();
        assert!(variant.description().contains("field dressing"));
    }

    #[test]
    fn test_appearance_falls_back_to_agnostic() {
        let story: StoryContext = STORY.parse().unwrap();
        let mara = story.character("mara").unwrap();
        let variant = mara
            .resolve_appearance("rooftop", None, "Mara waits.")
            .unwrap();
        assert!(variant.description().contains("patched recon fatigues"));
    }

    #[test]
    fn test_empty_trigger_rejected() {
        let bad = r#"
[[characters]]
name = "mara"
trigger = " "
"#;
        assert!(bad.parse::<StoryContext>().is_err());
    }

    #[test]
    fn test_artifacts_bucketed() {
        let story: StoryContext = STORY.parse().unwrap();
        let bunker = story.location("bunker").unwrap();
        assert_eq!(
            bunker.artifacts_in(ArtifactCategory::Structural),
            vec!["rusted blast door"]
        );
        assert!(bunker.artifacts_in(ArtifactCategory::Prop).is_empty());
    }
}
