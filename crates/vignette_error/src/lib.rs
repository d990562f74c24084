//! Error types for the Vignette prompt pipeline.
//!
//! This crate provides the foundation error types used throughout the
//! Vignette workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use vignette_error::{VignetteResult, BackendError};
//!
//! fn fetch_fill() -> VignetteResult<String> {
//!     Err(BackendError::new("Connection refused"))?
//! }
//!
//! match fetch_fill() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod config;
mod context;
mod error;
mod json;
mod pipeline;

pub use backend::BackendError;
pub use config::ConfigError;
pub use context::{ContextError, ContextErrorKind};
pub use error::{VignetteError, VignetteErrorKind, VignetteResult};
pub use json::JsonError;
pub use pipeline::{PipelineError, PipelineErrorKind};
