//! Story context and configuration tables for the Vignette prompt pipeline.
//!
//! Two immutable objects are loaded once at startup and injected into the
//! pipeline: [`StoryContext`] (character appearance variants and location
//! artifacts, supplied per story by the upstream collaborator) and
//! [`PipelineConfig`] (budget tables, derivation maps, segment-tag
//! template, and tunables). Both parse from TOML, validate after parse,
//! and expose an explicit `reload()` rather than any ambient cache.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod story;

pub use config::{
    BudgetTable, FillConfig, GearFragments, PipelineConfig, SegmentTemplate,
};
pub use story::{
    AppearanceVariant, Artifact, ArtifactCategory, CharacterSheet, LocationSheet, StoryContext,
};
