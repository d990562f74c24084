//! Pipeline error types.
//!
//! These are conditions, not hard failures: every kind below is handled
//! inside the pipeline by a fallback or a bounded repair, and surfaces to
//! the caller only inside a validation report or a log line.

/// Specific error conditions for pipeline operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// Requested character/location pairing absent from story data
    #[display("No appearance for character '{}' at location '{}'", character, location)]
    EnrichmentGap {
        /// Character name
        character: String,
        /// Location shorthand
        location: String,
    },
    /// Guided fill-in request failed transport or schema validation
    #[display("Fill-in unavailable: {}", _0)]
    FillInUnavailable(String),
    /// Compiled prompt exceeds the token budget
    #[display("Prompt at {} tokens exceeds budget of {}", count, budget)]
    BudgetExceeded {
        /// Counted tokens in the compiled prompt
        count: usize,
        /// Token budget from the spec constraints
        budget: u32,
    },
    /// A face-visible subject has no identity trigger in the prompt
    #[display("Missing identity trigger for '{}'", _0)]
    MissingTrigger(String),
    /// A face-visible subject has no segment tag in the prompt
    #[display("Missing segment tag for '{}'", _0)]
    MissingSegment(String),
    /// Expression or face text present for a sealed-gear subject
    #[display("Gear consistency violation for '{}': {}", character, detail)]
    GearConsistencyViolation {
        /// Character name
        character: String,
        /// What leaked through the sealed visor
        detail: String,
    },
    /// Internal invariant breach in the beat spec after repair
    #[display("Malformed beat spec: {}", _0)]
    MalformedSpec(String),
}

/// Error type for pipeline operations.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The specific error condition
    pub kind: PipelineErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
