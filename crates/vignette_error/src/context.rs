//! Story-context error types.

/// Specific error conditions for story-context operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ContextErrorKind {
    /// Failed to read a context file
    #[display("Failed to read context file: {}", _0)]
    FileRead(String),
    /// Failed to parse TOML content
    #[display("Failed to parse TOML: {}", _0)]
    TomlParse(String),
    /// Character is not present in the story context
    #[display("Character '{}' not found in story context", _0)]
    MissingCharacter(String),
    /// Location is not present in the story context
    #[display("Location '{}' not found in story context", _0)]
    MissingLocation(String),
    /// Character has no identity trigger configured
    #[display("Character '{}' has no identity trigger", _0)]
    MissingTrigger(String),
    /// Budget table has no entry and no default
    #[display("No token budget configured for shot type '{}'", _0)]
    MissingBudget(String),
    /// Compaction drop order is empty or references unknown fields
    #[display("Invalid compaction drop order: {}", _0)]
    InvalidDropOrder(String),
    /// Validation of a loaded table failed
    #[display("Context validation failed: {}", _0)]
    Validation(String),
}

/// Error type for story-context operations.
///
/// # Examples
///
/// ```
/// use vignette_error::{ContextError, ContextErrorKind};
///
/// let err = ContextError::new(ContextErrorKind::MissingCharacter("mara".into()));
/// assert!(format!("{}", err).contains("mara"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Context Error: {} at line {} in {}", kind, line, file)]
pub struct ContextError {
    /// The specific error condition
    pub kind: ContextErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ContextError {
    /// Create a new ContextError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ContextErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
