//! Trait definitions for pipeline seams.

use async_trait::async_trait;
use vignette_core::FillRequest;
use vignette_error::VignetteResult;

/// The text-generation boundary used by guided fill-in.
///
/// This is the only operation in the pipeline that may suspend. One
/// request is issued per beat; the caller bounds it with a timeout and
/// falls back deterministically on any error, so implementations should
/// not retry internally.
#[async_trait]
pub trait TextDriver: Send + Sync {
    /// Generate model output for a fill-in request.
    async fn generate(&self, req: &FillRequest) -> VignetteResult<String>;

    /// Provider name (e.g., "gemini", "local").
    fn provider_name(&self) -> &'static str;

    /// Model identifier.
    fn model_name(&self) -> &str;
}

/// Counts tokens the way the downstream text encoder will.
pub trait TokenCounting: Send + Sync {
    /// Count tokens in a compiled prompt.
    fn count_tokens(&self, text: &str) -> VignetteResult<usize>;
}
