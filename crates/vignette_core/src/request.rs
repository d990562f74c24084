//! Request type for the guided fill-in call.

use serde::{Deserialize, Serialize};

/// A single constrained text-generation request.
///
/// # Examples
///
/// ```
/// use vignette_core::FillRequest;
///
/// let request = FillRequest::builder()
///     .prompt("Describe the pose.".to_string())
///     .max_tokens(Some(256))
///     .temperature(Some(0.4))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.max_tokens, Some(256));
/// ```
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, Default, derive_builder::Builder,
)]
#[builder(default)]
pub struct FillRequest {
    /// Optional system instruction
    pub system: Option<String>,
    /// The assembled fill-in instructions
    pub prompt: String,
    /// Maximum number of tokens to generate
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0 to 1.0)
    pub temperature: Option<f32>,
    /// Model identifier to use
    pub model: Option<String>,
}

impl FillRequest {
    /// Create a new request builder.
    pub fn builder() -> FillRequestBuilder {
        FillRequestBuilder::default()
    }
}
