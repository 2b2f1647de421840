//! Generator orchestrator
//!
//! A [`Generator`] wires a prompt template, default model kwargs, optional
//! trainable parameters, and an output-processor chain around a
//! [`ModelClient`]. Each call renders the prompt, composes backend arguments,
//! invokes the client, and folds everything downstream of the backend into a
//! [`GeneratorOutput`] rather than raising.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use lmgen_client::ModelClient;
use lmgen_prompt::{DEFAULT_SYSTEM_TEMPLATE, Prompt};
use lmgen_utils::{ApiKwargs, GeneratorError, ModelKwargs, ModelType, PromptKwargs};

use crate::functional::compose_model_kwargs;
use crate::output::GeneratorOutput;
use crate::parameter::Parameter;
use crate::processor::ProcessorChain;

/// Execution mode, fixed at construction.
///
/// In `Training` mode, trainable parameter values are injected into the
/// prompt kwargs on every call; in `Inference` mode parameters are ignored
/// entirely. Swapping modes means building a second Generator with the same
/// client; [`GeneratorBuilder::shared_parameter`] lets it reuse the first
/// one's parameter slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeneratorMode {
    #[default]
    Inference,
    Training,
}

impl std::fmt::Display for GeneratorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorMode::Inference => write!(f, "inference"),
            GeneratorMode::Training => write!(f, "training"),
        }
    }
}

/// Who wins when a trained parameter and a caller-supplied prompt kwarg name
/// the same variable in `Training` mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamPrecedence {
    /// The trained value replaces the caller's value.
    #[default]
    TrainedWins,
    /// The caller's value is kept; the trained value fills gaps only.
    CallerWins,
}

/// Builder for [`Generator`]. The client and model kwargs are required up
/// front; everything else has a default.
pub struct GeneratorBuilder {
    model_client: Arc<dyn ModelClient>,
    model_kwargs: ModelKwargs,
    template: String,
    preset_prompt_kwargs: Option<PromptKwargs>,
    trainable_names: Vec<String>,
    shared_slots: Vec<(String, Arc<Parameter>)>,
    mode: GeneratorMode,
    precedence: ParamPrecedence,
    output_processors: Option<ProcessorChain>,
}

impl GeneratorBuilder {
    fn new(model_client: Arc<dyn ModelClient>, model_kwargs: ModelKwargs) -> Self {
        Self {
            model_client,
            model_kwargs,
            template: DEFAULT_SYSTEM_TEMPLATE.to_string(),
            preset_prompt_kwargs: None,
            trainable_names: Vec::new(),
            shared_slots: Vec::new(),
            mode: GeneratorMode::default(),
            precedence: ParamPrecedence::default(),
            output_processors: None,
        }
    }

    /// Replace the default system template.
    #[must_use]
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Preset values available to every render (callers can override them
    /// per call).
    #[must_use]
    pub fn preset_prompt_kwargs(mut self, preset: PromptKwargs) -> Self {
        self.preset_prompt_kwargs = Some(preset);
        self
    }

    /// Declare which template variables are trainable. Each name must be a
    /// declared variable of the template; `build` verifies this.
    #[must_use]
    pub fn trainable_params<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trainable_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Reuse an existing parameter slot for a trainable name instead of
    /// creating a fresh one, so a second Generator (e.g. after a mode swap)
    /// keeps observing values an optimizer writes through the first one's
    /// handle. The name must still appear in `trainable_params`.
    #[must_use]
    pub fn shared_parameter(mut self, name: impl Into<String>, slot: Arc<Parameter>) -> Self {
        self.shared_slots.push((name.into(), slot));
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: GeneratorMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn precedence(mut self, precedence: ParamPrecedence) -> Self {
        self.precedence = precedence;
        self
    }

    #[must_use]
    pub fn output_processors(mut self, processors: ProcessorChain) -> Self {
        self.output_processors = Some(processors);
        self
    }

    /// Validate the configuration and assemble the Generator. Performs no
    /// backend contact.
    pub fn build(self) -> Result<Generator, GeneratorError> {
        if !self.model_kwargs.contains_key("model") {
            return Err(GeneratorError::MissingModel);
        }

        let system_prompt = Prompt::new(&self.template, self.preset_prompt_kwargs)?;

        let mut trainable = Vec::with_capacity(self.trainable_names.len());
        for name in self.trainable_names {
            if !system_prompt.prompt_variables().contains(&name) {
                let available = system_prompt
                    .prompt_variables()
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(GeneratorError::UnknownTrainableParam { name, available });
            }
            let slot = self
                .shared_slots
                .iter()
                .find(|(shared, _)| *shared == name)
                .map(|(_, slot)| Arc::clone(slot))
                .unwrap_or_else(|| {
                    Arc::new(Parameter::new(system_prompt.preset_value(&name).cloned()))
                });
            trainable.push((name, slot));
        }

        debug!(
            provider = self.model_client.provider(),
            mode = %self.mode,
            trainable = trainable.len(),
            "generator assembled"
        );

        Ok(Generator {
            model_client: self.model_client,
            model_kwargs: self.model_kwargs,
            system_prompt,
            trainable,
            mode: self.mode,
            precedence: self.precedence,
            output_processors: self.output_processors,
            model_type: ModelType::Llm,
        })
    }
}

/// Orchestrates one model backend behind a prompt template.
///
/// Immutable after construction; safe to share across threads and to drive
/// with concurrent `acall`s.
pub struct Generator {
    model_client: Arc<dyn ModelClient>,
    model_kwargs: ModelKwargs,
    system_prompt: Prompt,
    trainable: Vec<(String, Arc<Parameter>)>,
    mode: GeneratorMode,
    precedence: ParamPrecedence,
    output_processors: Option<ProcessorChain>,
    model_type: ModelType,
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("model_kwargs", &self.model_kwargs)
            .field("system_prompt", &self.system_prompt)
            .field("trainable", &self.trainable)
            .field("mode", &self.mode)
            .field("precedence", &self.precedence)
            .field("model_type", &self.model_type)
            .finish_non_exhaustive()
    }
}

impl Generator {
    /// Start building a Generator around `model_client`. `model_kwargs` must
    /// contain a `"model"` entry by the time `build` runs.
    #[must_use]
    pub fn builder(
        model_client: Arc<dyn ModelClient>,
        model_kwargs: ModelKwargs,
    ) -> GeneratorBuilder {
        GeneratorBuilder::new(model_client, model_kwargs)
    }

    #[must_use]
    pub fn mode(&self) -> GeneratorMode {
        self.mode
    }

    #[must_use]
    pub fn model_kwargs(&self) -> &ModelKwargs {
        &self.model_kwargs
    }

    /// Current `(name, value)` snapshot of every trainable parameter, in
    /// declaration order.
    #[must_use]
    pub fn trainable_state(&self) -> Vec<(String, Option<Value>)> {
        self.trainable
            .iter()
            .map(|(name, param)| (name.clone(), param.data()))
            .collect()
    }

    /// Hand out the shared parameter slot for `name` so an external
    /// optimizer can write it between calls.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<Arc<Parameter>> {
        self.trainable
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, param)| Arc::clone(param))
    }

    /// Caller kwargs plus trained values when in `Training` mode. Unset
    /// parameters are never injected.
    fn effective_prompt_kwargs(&self, prompt_kwargs: &PromptKwargs) -> PromptKwargs {
        let mut merged = prompt_kwargs.clone();
        if self.mode != GeneratorMode::Training {
            return merged;
        }
        for (name, param) in &self.trainable {
            let Some(value) = param.data() else { continue };
            match self.precedence {
                ParamPrecedence::TrainedWins => {
                    merged.insert(name.clone(), value);
                }
                ParamPrecedence::CallerWins => {
                    merged.entry(name.clone()).or_insert(value);
                }
            }
        }
        merged
    }

    /// Render the prompt and build backend call arguments. Raises on render
    /// and conversion failures; both mean the caller misconfigured the call.
    fn pre_call(
        &self,
        prompt_kwargs: &PromptKwargs,
        model_kwargs: &ModelKwargs,
    ) -> Result<ApiKwargs, GeneratorError> {
        let effective = self.effective_prompt_kwargs(prompt_kwargs);
        let rendered = self.system_prompt.render(&effective)?;
        let rendered = rendered.trim();
        let composed = compose_model_kwargs(&self.model_kwargs, model_kwargs);
        debug!(
            provider = self.model_client.provider(),
            model_type = %self.model_type,
            prompt_len = rendered.len(),
            "prepared backend call"
        );
        self.model_client
            .convert_inputs_to_api_kwargs(rendered, &composed, self.model_type)
            .map_err(GeneratorError::ApiKwargs)
    }

    /// Fold a completion into a [`GeneratorOutput`]. Never returns `Err` and
    /// never panics: parse and processor failures land in `error_message`.
    fn post_call(&self, completion: Value) -> GeneratorOutput {
        let parsed = match self.model_client.parse_chat_completion(&completion) {
            Ok(parsed) => parsed,
            Err(error) => {
                warn!(
                    provider = self.model_client.provider(),
                    error = %error,
                    "completion parse failed"
                );
                let raw = match completion {
                    Value::String(s) => Value::String(s),
                    other => Value::String(other.to_string()),
                };
                return GeneratorOutput::from_parse_failure(raw, error.to_string());
            }
        };

        let mut output = GeneratorOutput::new(parsed.clone());
        match &self.output_processors {
            Some(chain) if !chain.is_empty() => match chain.run(parsed) {
                Ok(data) => output.data = Some(data),
                Err(failure) => {
                    warn!(
                        stage = failure.stage.as_str(),
                        error = %failure.error,
                        "output processing failed"
                    );
                    output.data = Some(failure.partial.clone());
                    output.error_message = Some(failure.to_string());
                }
            },
            _ => output.data = Some(parsed),
        }
        output
    }

    /// Synchronous generation. Blocks the calling thread for the duration of
    /// the backend request.
    ///
    /// Returns `Err` only for configuration or rendering mistakes; backend
    /// failures are reported through `error_message` on the output.
    pub fn call(
        &self,
        prompt_kwargs: &PromptKwargs,
        model_kwargs: &ModelKwargs,
    ) -> Result<GeneratorOutput, GeneratorError> {
        let api_kwargs = self.pre_call(prompt_kwargs, model_kwargs)?;
        let output = match self.model_client.call(&api_kwargs, self.model_type) {
            Ok(completion) => self.post_call(completion),
            Err(error) => {
                warn!(
                    provider = self.model_client.provider(),
                    error = %error,
                    "backend call failed"
                );
                GeneratorOutput::from_call_failure(error.to_string())
            }
        };
        info!(
            provider = self.model_client.provider(),
            mode = %self.mode,
            ok = !output.is_error(),
            "generation finished"
        );
        Ok(output)
    }

    /// Asynchronous generation; same contract as [`Generator::call`],
    /// suspending only at the client boundary.
    pub async fn acall(
        &self,
        prompt_kwargs: &PromptKwargs,
        model_kwargs: &ModelKwargs,
    ) -> Result<GeneratorOutput, GeneratorError> {
        let api_kwargs = self.pre_call(prompt_kwargs, model_kwargs)?;
        let output = match self.model_client.acall(&api_kwargs, self.model_type).await {
            Ok(completion) => self.post_call(completion),
            Err(error) => {
                warn!(
                    provider = self.model_client.provider(),
                    error = %error,
                    "backend call failed"
                );
                GeneratorOutput::from_call_failure(error.to_string())
            }
        };
        info!(
            provider = self.model_client.provider(),
            mode = %self.mode,
            ok = !output.is_error(),
            "generation finished"
        );
        Ok(output)
    }
}

impl std::fmt::Display for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let model = self
            .model_kwargs
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or("?");
        write!(
            f,
            "Generator(provider={}, model={}, model_type={}, mode={}, trainable=[{}])",
            self.model_client.provider(),
            model,
            self.model_type,
            self.mode,
            self.trainable
                .iter()
                .map(|(n, _)| n.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}
