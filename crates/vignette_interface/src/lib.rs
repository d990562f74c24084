//! Trait definitions for the Vignette prompt pipeline.
//!
//! The pipeline has exactly two seams that callers plug into: the
//! text-generation backend used by guided fill-in, and the token counter
//! used by the budget validator. Everything else is plain data.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{TextDriver, TokenCounting};
