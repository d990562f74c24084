//! Four-phase beat-to-prompt compiler pipeline.
//!
//! One narrative beat plus structured story context goes in; a validated,
//! budget-constrained image-generation prompt comes out. The phases run
//! strictly in order for each beat:
//!
//! - **Phase A** ([`enrich`]) — deterministic enrichment from story data
//! - **Phase B** ([`fill_in`]) — one guided fill-in call, with a
//!   deterministic fallback that never blocks the beat
//! - **Phase C** ([`compile`]) — pure, order-preserving prompt assembly
//! - **Phase D** ([`Validator`]) — rule checks with bounded auto-repair
//!
//! [`ScenePipeline`] drives beats through the phases in narrative order
//! and owns the per-scene continuity state between them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod budget;
mod compile;
mod enrich;
mod extract;
mod fill;
mod scene;
mod template;
mod tokens;
mod validate;

pub use budget::token_budget;
pub use compile::compile;
pub use enrich::enrich;
pub use extract::{extract_json, parse_json};
pub use fill::{build_instructions, fallback_fill, fill_in, merge_fill, FillOutcome};
pub use scene::{BeatOutput, ScenePipeline};
pub use template::{classify, default_framing, SceneTemplate};
pub use tokens::{BpeCounter, HeuristicCounter};
pub use validate::Validator;
