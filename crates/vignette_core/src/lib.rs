//! Core data types for the Vignette prompt pipeline.
//!
//! This crate provides the foundation data types used across the pipeline:
//! narrative beats, the visual beat spec intermediate representation,
//! per-scene continuity state, fill-in payloads, and validation reports.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod beat;
mod continuity;
mod fill;
mod request;
mod shot;
mod spec;
mod telemetry;
mod token_counting;
mod validation;

pub use beat::{Beat, BeatBuilder, DirectorHints, ImageDecision};
pub use continuity::{
    CharacterCarry, GearState, SceneContinuity, VehicleMotion, VehicleState, SHOT_WINDOW_LEN,
};
pub use fill::{SpecFillIn, SubjectFill};
pub use request::{FillRequest, FillRequestBuilder};
pub use shot::{CameraAngle, DepthOfField, ShotType};
pub use spec::{
    Constraints, DropField, Environment, SegmentPolicy, Shot, Subject, Vehicle, VisualBeatSpec,
};
pub use telemetry::init_tracing;
pub use token_counting::{approximate_tokens, get_tokenizer};
pub use validation::{RenderRoute, RepairAction, ValidationReport};
