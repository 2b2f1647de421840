//! lmgen - Generator orchestration for LLM backends
//!
//! This crate wraps a prompt template, default model arguments, optional
//! trainable parameters, and an output-processing chain around any model
//! backend implementing [`ModelClient`]. One [`Generator`] serves both
//! synchronous and asynchronous call paths with identical semantics and
//! returns a structured [`GeneratorOutput`] instead of raising on backend
//! hiccups.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use lmgen::{Generator, ModelKwargs, OpenAiClient, PromptKwargs, SamplingDefaults};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(OpenAiClient::new(
//!     "sk-...".to_string(),
//!     None,
//!     Some("gpt-4o-mini".to_string()),
//!     SamplingDefaults::default(),
//! )?);
//!
//! let mut model_kwargs = ModelKwargs::new();
//! model_kwargs.insert("model".to_string(), json!("gpt-4o-mini"));
//!
//! let generator = Generator::builder(client, model_kwargs)
//!     .template("Answer concisely: {{context_str}}")
//!     .build()?;
//!
//! let mut prompt_kwargs = PromptKwargs::new();
//! prompt_kwargs.insert("context_str".to_string(), json!("What is the capital of France?"));
//!
//! let output = generator.call(&prompt_kwargs, &ModelKwargs::new())?;
//! match output.error_message {
//!     None => println!("{:?}", output.data),
//!     Some(reason) => eprintln!("generation degraded: {reason}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! Backends can also be assembled from a TOML file via [`Config`] and
//! [`client_from_config`]:
//!
//! ```toml
//! [llm]
//! provider = "openai"
//!
//! [llm.openai]
//! base_url = "https://api.openai.com/v1"
//! api_key_env = "OPENAI_API_KEY"
//! model = "gpt-4o-mini"
//! ```
//!
//! # Error policy
//!
//! Construction and rendering mistakes raise [`GeneratorError`]; everything
//! at or past the backend boundary (transport, provider status, completion
//! parsing, post-processing) is recovered into the `error_message` field of
//! the returned [`GeneratorOutput`].

pub use lmgen_client::{ModelClient, OpenAiClient, SamplingDefaults, client_from_config};
pub use lmgen_config::{Config, LlmConfig, OpenAiConfig};
pub use lmgen_core::{
    ChainFailure, ExtractCodeFence, Generator, GeneratorBuilder, GeneratorMode, GeneratorOutput,
    JsonParse, OutputProcessor, ParamPrecedence, Parameter, ProcessorChain, TrimWhitespace,
    compose_model_kwargs,
};
pub use lmgen_prompt::{DEFAULT_SYSTEM_TEMPLATE, Prompt};
pub use lmgen_utils::{
    ApiKwargs, ClientError, Completion, ConfigError, GeneratorError, ModelKwargs, ModelType,
    ProcessorError, PromptError, PromptKwargs,
};
pub use lmgen_utils::logging::init_tracing;
