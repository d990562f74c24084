//! Pipeline configuration tables.
//!
//! These are tunables, not logic: token budgets by shot type, the
//! compaction drop order, the color-grade lookup, the segment-tag
//! template, and the fill-in call parameters. Compiled-in defaults make
//! the pipeline usable with no external file; a TOML file overrides them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use vignette_core::{DepthOfField, DropField, ShotType};
use vignette_error::{ConfigError, ContextError, ContextErrorKind};

/// Token budgets by shot type, with fixed modifier adjustments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(deny_unknown_fields)]
pub struct BudgetTable {
    /// Budget used when a shot type has no entry
    #[serde(default = "default_budget")]
    fallback: u32,
    /// Downward adjustment when any subject's gear is sealed
    #[serde(default = "default_sealed_discount")]
    sealed_discount: u32,
    /// Upward adjustment when a vehicle is present
    #[serde(default = "default_vehicle_bonus")]
    vehicle_bonus: u32,
    /// Per-shot-type base budgets
    #[serde(default)]
    by_shot: HashMap<ShotType, u32>,
}

fn default_budget() -> u32 {
    170
}

fn default_sealed_discount() -> u32 {
    15
}

fn default_vehicle_bonus() -> u32 {
    25
}

impl Default for BudgetTable {
    fn default() -> Self {
        let by_shot = HashMap::from([
            (ShotType::ExtremeCloseup, 140),
            (ShotType::Closeup, 150),
            (ShotType::MediumCloseup, 160),
            (ShotType::Insert, 140),
            (ShotType::Medium, 170),
            (ShotType::OverShoulder, 170),
            (ShotType::Pov, 170),
            (ShotType::TwoShot, 185),
            (ShotType::MediumWide, 185),
            (ShotType::Wide, 200),
            (ShotType::ExtremeWide, 210),
        ]);
        Self {
            fallback: default_budget(),
            sealed_discount: default_sealed_discount(),
            vehicle_bonus: default_vehicle_bonus(),
            by_shot,
        }
    }
}

impl BudgetTable {
    /// Base budget for a shot type.
    pub fn base_for(&self, shot: ShotType) -> u32 {
        self.by_shot.get(&shot).copied().unwrap_or(self.fallback)
    }
}

/// Segment-tag template for the renderer's detail pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(deny_unknown_fields)]
pub struct SegmentTemplate {
    /// Identity-detector model id
    #[serde(default = "default_detector")]
    detector: String,
    /// Creativity value passed to the detail pass
    #[serde(default = "default_creativity")]
    creativity: f32,
    /// Confidence threshold for region detection
    #[serde(default = "default_threshold")]
    threshold: f32,
}

fn default_detector() -> String {
    "face".to_string()
}

fn default_creativity() -> f32 {
    0.6
}

fn default_threshold() -> f32 {
    0.5
}

impl Default for SegmentTemplate {
    fn default() -> Self {
        Self {
            detector: default_detector(),
            creativity: default_creativity(),
            threshold: default_threshold(),
        }
    }
}

impl SegmentTemplate {
    /// Render the segment tag for an identity trigger.
    ///
    /// Tags are self-contained so the compiler can concatenate them with
    /// no separating character between tags.
    pub fn render(&self, trigger: &str) -> String {
        format!(
            "<segment:{}:{},{:.1},{:.1}>",
            self.detector, trigger, self.creativity, self.threshold
        )
    }
}

/// Default gear fragments used when a character sheet supplies none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(deny_unknown_fields)]
pub struct GearFragments {
    /// Face-hidden fragment appended while gear is sealed
    #[serde(default = "default_sealed_fragment")]
    sealed: String,
    /// Open-face fragment appended while gear is open
    #[serde(default = "default_open_fragment")]
    open: String,
}

fn default_sealed_fragment() -> String {
    "sealed helmet with mirrored visor down".to_string()
}

fn default_open_fragment() -> String {
    "visor raised, face visible".to_string()
}

impl Default for GearFragments {
    fn default() -> Self {
        Self {
            sealed: default_sealed_fragment(),
            open: default_open_fragment(),
        }
    }
}

/// Parameters for the guided fill-in call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(deny_unknown_fields)]
pub struct FillConfig {
    /// Model identifier handed to the driver, if overridden
    #[serde(default)]
    model: Option<String>,
    /// Sampling temperature
    #[serde(default = "default_fill_temperature")]
    temperature: f32,
    /// Output token cap for the fill-in response
    #[serde(default = "default_fill_max_tokens")]
    max_tokens: u32,
    /// Bound on the fill-in call before the fallback takes over
    #[serde(default = "default_fill_timeout_ms")]
    timeout_ms: u64,
}

fn default_fill_temperature() -> f32 {
    0.4
}

fn default_fill_max_tokens() -> u32 {
    320
}

fn default_fill_timeout_ms() -> u64 {
    8_000
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: default_fill_temperature(),
            max_tokens: default_fill_max_tokens(),
            timeout_ms: default_fill_timeout_ms(),
        }
    }
}

/// The immutable configuration object injected into the pipeline phases.
///
/// # Examples
///
/// ```
/// use vignette_context::PipelineConfig;
///
/// let config = PipelineConfig::default();
/// assert_eq!(*config.max_repair_iterations(), 2);
/// assert_eq!(
///     config.color_grade("BUNKER_REFUGE"),
///     Some("desaturated tactical color grade")
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Token budgets by shot type
    #[serde(default)]
    budgets: BudgetTable,
    /// Ordered field-drop list used for compaction
    #[serde(default = "default_drop_order")]
    drop_order: Vec<DropField>,
    /// Depth-of-field overrides by shot type; family derivation otherwise
    #[serde(default)]
    depth_of_field: HashMap<ShotType, DepthOfField>,
    /// Color grade by atmosphere category
    #[serde(default = "default_color_grades")]
    color_grades: HashMap<String, String>,
    /// Segment-tag template
    #[serde(default)]
    segment: SegmentTemplate,
    /// Default gear fragments
    #[serde(default)]
    gear: GearFragments,
    /// Fill-in call parameters
    #[serde(default)]
    fill: FillConfig,
    /// Repair-recompile iteration cap
    #[serde(default = "default_max_repair_iterations")]
    max_repair_iterations: u32,
    /// Terms that must never appear in a compiled prompt
    #[serde(default)]
    forbidden_terms: Vec<String>,
}

fn default_drop_order() -> Vec<DropField> {
    vec![
        DropField::VehiclePosition,
        DropField::Props,
        DropField::Effects,
        DropField::Atmosphere,
        DropField::SecondaryDescription,
    ]
}

fn default_color_grades() -> HashMap<String, String> {
    HashMap::from([
        (
            "BUNKER_REFUGE".to_string(),
            "desaturated tactical color grade".to_string(),
        ),
        (
            "NIGHT_OPS".to_string(),
            "cool low-key color grade".to_string(),
        ),
        (
            "DESERT_TRANSIT".to_string(),
            "warm sun-bleached color grade".to_string(),
        ),
        (
            "NEON_DISTRICT".to_string(),
            "teal and magenta neon color grade".to_string(),
        ),
    ])
}

fn default_max_repair_iterations() -> u32 {
    2
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            budgets: BudgetTable::default(),
            drop_order: default_drop_order(),
            depth_of_field: HashMap::new(),
            color_grades: default_color_grades(),
            segment: SegmentTemplate::default(),
            gear: GearFragments::default(),
            fill: FillConfig::default(),
            max_repair_iterations: default_max_repair_iterations(),
            forbidden_terms: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Loads a pipeline configuration from a TOML file.
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

    /// Replace this configuration with a freshly loaded file.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails; on error `self` is unchanged.
    pub fn reload<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ContextError> {
        *self = Self::from_file(path)?;
        Ok(())
    }

    /// Depth of field for a shot type: config override, else family derivation.
    pub fn depth_of_field_for(&self, shot: ShotType) -> Option<DepthOfField> {
        self.depth_of_field
            .get(&shot)
            .copied()
            .or_else(|| DepthOfField::derive(shot))
    }

    /// Color grade for an atmosphere category.
    pub fn color_grade(&self, category: &str) -> Option<&str> {
        self.color_grades.get(category).map(|s| s.as_str())
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the drop order is empty or contains duplicates,
    /// the repair cap is zero, or the segment threshold is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.drop_order.is_empty() {
            return Err(ConfigError::new("drop_order cannot be empty"));
        }
        let mut seen = std::collections::HashSet::new();
        for field in &self.drop_order {
            if !seen.insert(field) {
                return Err(ConfigError::new(format!(
                    "drop_order lists '{}' twice",
                    field
                )));
            }
        }
        if self.max_repair_iterations == 0 {
            return Err(ConfigError::new("max_repair_iterations must be at least 1"));
        }
        let threshold = *self.segment.threshold();
        if !(0.0..=1.0).contains(&threshold) || threshold == 0.0 {
            return Err(ConfigError::new(format!(
                "segment threshold must be in (0.0, 1.0], got {}",
                threshold
            )));
        }
        Ok(())
    }
}

impl FromStr for PipelineConfig {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Self = toml::from_str(s)
            .map_err(|e| ContextError::new(ContextErrorKind::TomlParse(e.to_string())))?;
        config
            .validate()
            .map_err(|e| ContextError::new(ContextErrorKind::Validation(e.message)))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_drop_order_starts_with_vehicle_position() {
        let config = PipelineConfig::default();
        assert_eq!(config.drop_order()[0], DropField::VehiclePosition);
        assert_eq!(
            config.drop_order().last(),
            Some(&DropField::SecondaryDescription)
        );
    }

    #[test]
    fn test_bunker_refuge_color_grade() {
        let config = PipelineConfig::default();
        assert_eq!(
            config.color_grade("BUNKER_REFUGE"),
            Some("desaturated tactical color grade")
        );
        assert_eq!(config.color_grade("UNKNOWN_CATEGORY"), None);
    }

    #[test]
    fn test_budget_table_lookup() {
        let budgets = BudgetTable::default();
        assert_eq!(budgets.base_for(ShotType::Closeup), 150);
        assert_eq!(budgets.base_for(ShotType::Wide), 200);
    }

    #[test]
    fn test_parse_overrides() {
        let toml = r#"
drop_order = ["vehicle_position", "props"]
max_repair_iterations = 3

[budgets]
fallback = 160

[budgets.by_shot]
closeup = 120

[segment]
detector = "face_yolov9"
"#;
        let config: PipelineConfig = toml.parse().unwrap();
        assert_eq!(config.budgets().base_for(ShotType::Closeup), 120);
        assert_eq!(config.budgets().base_for(ShotType::Wide), 160);
        assert_eq!(*config.max_repair_iterations(), 3);
        assert!(config.segment().render("m4r4").starts_with("<segment:face_yolov9:m4r4"));
    }

    #[test]
    fn test_duplicate_drop_order_rejected() {
        let toml = r#"
drop_order = ["props", "props"]
"#;
        assert!(toml.parse::<PipelineConfig>().is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let toml = r#"
unknown_key = true
"#;
        assert!(toml.parse::<PipelineConfig>().is_err());
    }

    #[test]
    fn test_segment_tag_render() {
        let segment = SegmentTemplate::default();
        assert_eq!(segment.render("m4r4kov"), "<segment:face:m4r4kov,0.6,0.5>");
    }

    #[test]
    fn test_reload_replaces_tables() {
        let path = std::env::temp_dir().join("vignette_config_reload_test.toml");
        std::fs::write(&path, "max_repair_iterations = 5\n").unwrap();

        let mut config = PipelineConfig::default();
        assert_eq!(*config.max_repair_iterations(), 2);
        config.reload(&path).unwrap();
        assert_eq!(*config.max_repair_iterations(), 5);

        std::fs::remove_file(&path).ok();
    }
}
