//! Generator orchestration core
//!
//! Ties a prompt template, trainable parameters, and an output-processor
//! chain around a model client. The [`Generator`] is the single entry point;
//! everything else in this crate exists to serve its call paths.

pub mod functional;
pub mod generator;
pub mod output;
pub mod parameter;
pub mod processor;

pub use functional::compose_model_kwargs;
pub use generator::{Generator, GeneratorBuilder, GeneratorMode, ParamPrecedence};
pub use output::GeneratorOutput;
pub use parameter::Parameter;
pub use processor::{
    ChainFailure, ExtractCodeFence, JsonParse, OutputProcessor, ProcessorChain, TrimWhitespace,
};
