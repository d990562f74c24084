/// Token counting helpers for prompt budgets.
use std::sync::Arc;

use tiktoken_rs::CoreBPE;

/// Helper function to get a tokenizer by model name.
///
/// Returns an encoder for the specified model, or an error if the model
/// is not supported by tiktoken-rs.
///
/// # Errors
///
/// Returns an error if the tokenizer cannot be loaded for the specified model.
pub fn get_tokenizer(model: &str) -> Result<Arc<CoreBPE>, Box<dyn std::error::Error + Send + Sync>> {
    tiktoken_rs::get_bpe_from_model(model)
        .map(Arc::new)
        .map_err(|e| format!("Failed to get tokenizer for {}: {}", model, e).into())
}

/// Deterministic token estimate for environments without BPE data.
///
/// Diffusion text encoders average roughly four tokens for every three
/// words of prompt prose, so the estimate is `ceil(words * 4 / 3)`.
pub fn approximate_tokens(text: &str) -> usize {
    let words = text.split_whitespace().count();
    words.div_ceil(3) + words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approximate_tokens_empty() {
        assert_eq!(approximate_tokens(""), 0);
        assert_eq!(approximate_tokens("   "), 0);
    }

    #[test]
    fn test_approximate_tokens_scales_with_words() {
        // 3 words -> 4 tokens, 6 words -> 8 tokens
        assert_eq!(approximate_tokens("one two three"), 4);
        assert_eq!(approximate_tokens("one two three four five six"), 8);
    }

    #[test]
    fn test_get_tokenizer() {
        let encoder = get_tokenizer("gpt-4").expect("Should get encoder");
        let tokens = encoder.encode_with_special_tokens("Hello, world!");
        assert!(!tokens.is_empty());
    }
}
