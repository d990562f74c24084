//! Token counter implementations.

use std::sync::Arc;
use tiktoken_rs::CoreBPE;
use vignette_core::{approximate_tokens, get_tokenizer};
use vignette_error::{BackendError, VignetteResult};
use vignette_interface::TokenCounting;

/// Deterministic word-based estimator.
///
/// Useful in tests and in environments without BPE data; the estimate
/// tracks how diffusion text encoders tokenize prompt prose.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicCounter;

impl TokenCounting for HeuristicCounter {
    fn count_tokens(&self, text: &str) -> VignetteResult<usize> {
        Ok(approximate_tokens(text))
    }
}

/// BPE-backed counter using a real tokenizer.
#[derive(Clone)]
pub struct BpeCounter {
    encoder: Arc<CoreBPE>,
}

impl BpeCounter {
    /// Create a counter for the given model's tokenizer.
    ///
    /// # Errors
    ///
    /// Returns an error if no tokenizer is available for the model.
    pub fn new(model: &str) -> VignetteResult<Self> {
        let encoder = get_tokenizer(model).map_err(|e| BackendError::new(e.to_string()))?;
        Ok(Self { encoder })
    }
}

impl std::fmt::Debug for BpeCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BpeCounter").finish_non_exhaustive()
    }
}

impl TokenCounting for BpeCounter {
    fn count_tokens(&self, text: &str) -> VignetteResult<usize> {
        Ok(self.encoder.encode_with_special_tokens(text).len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristic_counter() {
        let counter = HeuristicCounter;
        assert_eq!(counter.count_tokens("one two three").unwrap(), 4);
    }

    #[test]
    fn test_bpe_counter() {
        let counter = BpeCounter::new("gpt-4").unwrap();
        assert!(counter.count_tokens("close-up, shallow depth of field").unwrap() > 0);
    }
}
