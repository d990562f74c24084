//! Vignette - Narrative beat to image-prompt compiler
//!
//! Vignette turns structured narrative beats into validated,
//! budget-constrained image-generation prompts through a four-phase
//! pipeline: deterministic enrichment, guided fill-in, compilation, and
//! validation with bounded auto-repair. Cross-beat continuity is tracked
//! per scene and feeds each beat's enrichment.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vignette::{Beat, HeuristicCounter, PipelineConfig, ScenePipeline, StoryContext};
//!
//! #[tokio::main]
//! async fn main() {
//!     let story = StoryContext::from_file("story.toml").unwrap();
//!     let config = PipelineConfig::default();
//!     let mut pipeline = ScenePipeline::new(driver, HeuristicCounter, story, config);
//!
//!     let beat = Beat::builder()
//!         .id("s01_b01")
//!         .scene(1u32)
//!         .excerpt("Mara drops through the hatch into the bunker.")
//!         .location("bunker")
//!         .characters(vec!["mara".to_string()])
//!         .build()
//!         .unwrap();
//!
//!     let output = pipeline.process(&beat).await;
//!     println!("{}", output.prompt().as_deref().unwrap_or(""));
//! }
//! ```
//!
//! # Architecture
//!
//! Vignette is organized as a workspace with focused crates:
//!
//! - `vignette_core` - Beat, spec, continuity, and validation data types
//! - `vignette_interface` - TextDriver and TokenCounting trait seams
//! - `vignette_error` - Error types
//! - `vignette_context` - Story context and configuration tables
//! - `vignette_pipeline` - The four-phase pipeline and scene orchestrator
//!
//! This crate (`vignette`) re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use vignette_context::*;
pub use vignette_core::*;
pub use vignette_error::*;
pub use vignette_interface::*;
pub use vignette_pipeline::*;
