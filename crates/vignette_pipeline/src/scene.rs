//! Scene-level orchestration.
//!
//! A [`ScenePipeline`] drives beats through the four phases in narrative
//! order and owns the continuity state for the scene currently being
//! processed. Beats within one scene must arrive in order; beats from
//! different scenes have disjoint state and can be handled by separate
//! pipeline instances concurrently with no coordination.

use crate::{compile::compile, enrich::enrich, fill, validate::Validator};
use vignette_context::{PipelineConfig, StoryContext};
use vignette_core::{
    Beat, ImageDecision, SceneContinuity, ValidationReport, VehicleState, VisualBeatSpec,
};
use vignette_interface::{TextDriver, TokenCounting};

/// How many excerpt words the continuity synopsis keeps.
const SUMMARY_WORDS: usize = 18;

/// Everything the caller gets back for one beat.
#[derive(Debug, Clone, derive_getters::Getters)]
pub struct BeatOutput {
    /// Compiled prompt; absent when the beat requested no new image
    prompt: Option<String>,
    /// Validation report for the compiled prompt
    report: Option<ValidationReport>,
    /// The final spec, for inspection and persistence
    spec: Option<VisualBeatSpec>,
    /// Whether the deterministic fill-in fallback was used
    fallback_used: bool,
}

impl BeatOutput {
    fn skipped() -> Self {
        Self {
            prompt: None,
            report: None,
            spec: None,
            fallback_used: false,
        }
    }
}

/// Beat-at-a-time pipeline for one scene at a time.
///
/// Continuity state is scoped to the current scene: a beat carrying a new
/// scene number discards the old state and starts fresh, so nothing leaks
/// across scene boundaries. Dropping the `process` future before it
/// completes discards the in-flight spec without touching continuity;
/// carry state only ever advances from a fully compiled beat.
pub struct ScenePipeline<D, C> {
    driver: D,
    counter: C,
    story: StoryContext,
    config: PipelineConfig,
    state: Option<SceneContinuity>,
}

impl<D, C> ScenePipeline<D, C>
where
    D: TextDriver,
    C: TokenCounting,
{
    /// Create a pipeline over a story's context and configuration.
    pub fn new(driver: D, counter: C, story: StoryContext, config: PipelineConfig) -> Self {
        Self {
            driver,
            counter,
            story,
            config,
            state: None,
        }
    }

    /// Continuity state for the scene currently in progress.
    pub fn continuity(&self) -> Option<&SceneContinuity> {
        self.state.as_ref()
    }

    /// Mutable continuity access, for gear and vehicle transitions the
    /// upstream collaborator signals between beats.
    pub fn continuity_mut(&mut self) -> Option<&mut SceneContinuity> {
        self.state.as_mut()
    }

    /// Set the current scene's vehicle, creating state for the scene if
    /// this is the first signal for it.
    pub fn set_vehicle(&mut self, scene: u32, vehicle: Option<VehicleState>) {
        let state = self.ensure_scene(scene);
        state.set_vehicle(vehicle);
    }

    fn ensure_scene(&mut self, scene: u32) -> &mut SceneContinuity {
        let stale = self
            .state
            .as_ref()
            .is_none_or(|state| *state.scene() != scene);
        if stale {
            if let Some(old) = &self.state {
                tracing::debug!(
                    old_scene = *old.scene(),
                    new_scene = scene,
                    "Scene change, resetting continuity state"
                );
            }
            self.state = Some(SceneContinuity::new(scene));
        }
        self.state.as_mut().expect("state was just ensured")
    }

    /// Process one beat through the four phases.
    ///
    /// Beats that request no new image (`ReusePrevious` / `None`) still
    /// seed presence for continuity but produce no prompt. Failures in
    /// fill-in or validation degrade to fallbacks and warnings; the
    /// caller always gets a `BeatOutput`, never an error, for any beat
    /// that requested imagery.
    #[tracing::instrument(skip_all, fields(beat_id = %beat.id(), scene = *beat.scene()))]
    pub async fn process(&mut self, beat: &Beat) -> BeatOutput {
        {
            let state = self.ensure_scene(*beat.scene());
            state.seed_presence(beat.characters());
            state.note_location(beat.location());
        }

        if *beat.image() != ImageDecision::New {
            tracing::debug!(decision = ?beat.image(), "Beat requests no new image");
            return BeatOutput::skipped();
        }

        // Phase A: deterministic enrichment
        let state = self.state.as_ref().expect("scene state was just ensured");
        let mut spec = enrich(beat, &self.story, &self.config, state);

        // Phase B: guided fill-in, with deterministic fallback
        let outcome = fill::fill_in(&self.driver, &spec, beat, self.config.fill()).await;
        let fallback_used = outcome.is_fallback();
        fill::merge_fill(&mut spec, outcome.payload());

        // Phase C: compile
        let prompt = compile(&spec, self.config.segment());

        // Phase D: validate and repair
        let validator = Validator::new(&self.config, &self.counter);
        let (prompt, report) = validator.run(&mut spec, prompt);

        // Continuity advances even from a degraded beat, so downstream
        // beats still see carryover
        let summary = summarize(beat, &spec);
        let state = self.ensure_scene(*beat.scene());
        state.advance(&spec, summary);

        BeatOutput {
            prompt: Some(prompt),
            report: Some(report),
            spec: Some(spec),
            fallback_used,
        }
    }
}

/// Short fixed-length synopsis of a beat for the next beat's continuity.
fn summarize(beat: &Beat, spec: &VisualBeatSpec) -> String {
    let mut words: Vec<&str> = beat.excerpt().split_whitespace().collect();
    let truncated = words.len() > SUMMARY_WORDS;
    words.truncate(SUMMARY_WORDS);
    let mut summary = words.join(" ");
    if truncated {
        summary.push('…');
    }

    if let Some(primary) = spec.subjects().first() {
        if let Some(action) = primary.action() {
            summary.push_str(&format!(" ({}: {})", primary.character(), action));
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_truncates() {
        let beat = Beat::builder()
            .id("b1")
            .scene(1u32)
            .excerpt(
                "one two three four five six seven eight nine ten eleven twelve thirteen \
                 fourteen fifteen sixteen seventeen eighteen nineteen twenty",
            )
            .location("bunker")
            .characters(Vec::<String>::new())
            .build()
            .unwrap();
        let spec = crate::enrich(
            &beat,
            &StoryContext::default(),
            &PipelineConfig::default(),
            &SceneContinuity::new(1),
        );
        let summary = summarize(&beat, &spec);
        assert!(summary.ends_with('…'));
        assert_eq!(summary.split_whitespace().count(), SUMMARY_WORDS);
    }
}
