//! Foundation utilities for lmgen
//!
//! This crate holds the pieces every other lmgen crate leans on: the error
//! taxonomy, shared type aliases for kwargs-style payloads, and tracing
//! initialization.

pub mod error;
pub mod logging;
pub mod types;

pub use error::{ClientError, ConfigError, GeneratorError, ProcessorError, PromptError};
pub use types::{ApiKwargs, Completion, ModelKwargs, ModelType, PromptKwargs};
