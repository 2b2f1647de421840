//! OpenAI-compatible HTTP model client
//!
//! Speaks the chat-completions wire format, which also covers self-hosted
//! OpenAI-compatible servers (vLLM, LM Studio, OpenRouter) via a custom base
//! URL. Provides both transports of the [`ModelClient`] contract: `acall`
//! rides the shared retrying async client, `call` uses a blocking client and
//! must not run inside an async runtime.

use crate::transport::{AsyncTransport, status_error};
use crate::types::ModelClient;
use async_trait::async_trait;
use lmgen_config::Config;
use lmgen_utils::error::ClientError;
use lmgen_utils::types::{ApiKwargs, Completion, ModelKwargs, ModelType};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

/// Default OpenAI API base URL
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default per-request timeout
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Default sampling parameters applied when model kwargs omit them
#[derive(Debug, Clone)]
pub struct SamplingDefaults {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for SamplingDefaults {
    fn default() -> Self {
        Self {
            max_tokens: 2048,
            temperature: 0.2,
        }
    }
}

/// OpenAI-compatible backend
pub struct OpenAiClient {
    transport: AsyncTransport,
    blocking: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    default_model: Option<String>,
    defaults: SamplingDefaults,
    timeout: Duration,
}

impl OpenAiClient {
    /// Create a new OpenAI-compatible client
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Misconfiguration` if either HTTP client cannot
    /// be constructed
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        default_model: Option<String>,
        defaults: SamplingDefaults,
    ) -> Result<Self, ClientError> {
        let transport = AsyncTransport::new()?;
        let blocking = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .use_rustls_tls()
            .build()
            .map_err(|e| {
                ClientError::Misconfiguration(format!("Failed to build blocking HTTP client: {}", e))
            })?;

        Ok(Self {
            transport,
            blocking,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            default_model,
            defaults,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Create a new client from configuration
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Misconfiguration` if the API key environment
    /// variable is not set or a client cannot be constructed
    pub fn new_from_config(config: &Config) -> Result<Self, ClientError> {
        let api_key_env = config
            .llm
            .openai
            .as_ref()
            .and_then(|o| o.api_key_env.as_deref())
            .unwrap_or("OPENAI_API_KEY");

        let api_key = std::env::var(api_key_env).map_err(|_| {
            ClientError::Misconfiguration(format!(
                "OpenAI API key not found in environment variable '{}'. \
                 Please set this variable or configure a different api_key_env in [llm.openai].",
                api_key_env
            ))
        })?;

        let base_url = config.llm.openai.as_ref().and_then(|o| o.base_url.clone());
        let default_model = config.llm.openai.as_ref().and_then(|o| o.model.clone());

        let defaults = SamplingDefaults {
            max_tokens: config
                .llm
                .openai
                .as_ref()
                .and_then(|o| o.max_tokens)
                .unwrap_or(2048),
            temperature: config
                .llm
                .openai
                .as_ref()
                .and_then(|o| o.temperature)
                .unwrap_or(0.2),
        };

        Self::new(api_key, base_url, default_model, defaults)
    }

    /// Endpoint URL for a model type.
    fn endpoint(&self, model_type: ModelType) -> String {
        let base = self.base_url.trim_end_matches('/');
        match model_type {
            ModelType::Llm => format!("{base}/chat/completions"),
            ModelType::Embedder => format!("{base}/embeddings"),
        }
    }

    /// Check an HTTP status and decode the body as JSON.
    fn decode_blocking(
        response: reqwest::blocking::Response,
    ) -> Result<Completion, ClientError> {
        if let Some(error) = status_error(response.status(), "openai") {
            return Err(error);
        }

        response
            .json::<Completion>()
            .map_err(|e| ClientError::Transport(format!("openai reply was not JSON: {e}")))
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    fn provider(&self) -> &str {
        "openai"
    }

    fn convert_inputs_to_api_kwargs(
        &self,
        input: &str,
        model_kwargs: &ModelKwargs,
        model_type: ModelType,
    ) -> Result<ApiKwargs, ClientError> {
        // Model resolution: caller kwargs win over the configured default.
        let model = model_kwargs
            .get("model")
            .cloned()
            .or_else(|| self.default_model.clone().map(Value::String))
            .ok_or_else(|| {
                ClientError::Misconfiguration(
                    "No model specified: model_kwargs lacks 'model' and no default model \
                     is configured in [llm.openai]."
                        .to_string(),
                )
            })?;

        let mut api_kwargs = ApiKwargs::new();
        api_kwargs.insert("model".to_string(), model);
        for (key, value) in model_kwargs {
            if key != "model" {
                api_kwargs.insert(key.clone(), value.clone());
            }
        }

        match model_type {
            ModelType::Llm => {
                if !api_kwargs.contains_key("max_tokens") {
                    api_kwargs.insert("max_tokens".to_string(), json!(self.defaults.max_tokens));
                }
                if !api_kwargs.contains_key("temperature") {
                    api_kwargs.insert("temperature".to_string(), json!(self.defaults.temperature));
                }
                api_kwargs.insert(
                    "messages".to_string(),
                    json!([{"role": "system", "content": input}]),
                );
            }
            ModelType::Embedder => {
                api_kwargs.insert("input".to_string(), json!(input));
            }
        }

        Ok(api_kwargs)
    }

    fn call(
        &self,
        api_kwargs: &ApiKwargs,
        model_type: ModelType,
    ) -> Result<Completion, ClientError> {
        let url = self.endpoint(model_type);

        debug!(
            provider = "openai",
            endpoint = %url,
            model_type = %model_type,
            "Dispatching blocking request"
        );

        let response = self
            .blocking
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(api_kwargs)
            .timeout(self.timeout)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout {
                        duration: self.timeout,
                    }
                } else {
                    ClientError::Transport(format!("openai request failed: {}", e))
                }
            })?;

        Self::decode_blocking(response)
    }

    async fn acall(
        &self,
        api_kwargs: &ApiKwargs,
        model_type: ModelType,
    ) -> Result<Completion, ClientError> {
        let url = self.endpoint(model_type);

        debug!(
            provider = "openai",
            endpoint = %url,
            model_type = %model_type,
            timeout_secs = self.timeout.as_secs(),
            "Dispatching async request"
        );

        self.transport
            .post_json(&url, &self.api_key, api_kwargs, self.timeout, "openai")
            .await
    }

    fn parse_chat_completion(&self, completion: &Completion) -> Result<Value, ClientError> {
        let content = completion
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ClientError::Parse(
                    "Completion missing choices[0].message.content".to_string(),
                )
            })?;

        Ok(Value::String(content.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_client() -> OpenAiClient {
        OpenAiClient::new(
            "test-key".to_string(),
            None,
            Some("default-model".to_string()),
            SamplingDefaults {
                max_tokens: 1024,
                temperature: 0.5,
            },
        )
        .unwrap()
    }

    fn kwargs(pairs: &[(&str, serde_json::Value)]) -> ModelKwargs {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_endpoint_by_model_type() {
        let client = test_client();
        assert_eq!(
            client.endpoint(ModelType::Llm),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            client.endpoint(ModelType::Embedder),
            "https://api.openai.com/v1/embeddings"
        );
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = OpenAiClient::new(
            "test-key".to_string(),
            Some("http://localhost:1234/v1/".to_string()),
            None,
            SamplingDefaults::default(),
        )
        .unwrap();
        assert_eq!(
            client.endpoint(ModelType::Llm),
            "http://localhost:1234/v1/chat/completions"
        );
    }

    #[test]
    fn test_convert_llm_builds_chat_shape() {
        let client = test_client();
        let api_kwargs = client
            .convert_inputs_to_api_kwargs(
                "You are helpful.",
                &kwargs(&[("model", json!("gpt-4o-mini"))]),
                ModelType::Llm,
            )
            .unwrap();

        assert_eq!(api_kwargs["model"], json!("gpt-4o-mini"));
        assert_eq!(
            api_kwargs["messages"],
            json!([{"role": "system", "content": "You are helpful."}])
        );
        // Sampling defaults fill in when kwargs omit them
        assert_eq!(api_kwargs["max_tokens"], json!(1024));
        assert_eq!(api_kwargs["temperature"], json!(0.5));
    }

    #[test]
    fn test_convert_kwargs_override_sampling_defaults() {
        let client = test_client();
        let api_kwargs = client
            .convert_inputs_to_api_kwargs(
                "prompt",
                &kwargs(&[
                    ("model", json!("m")),
                    ("max_tokens", json!(64)),
                    ("temperature", json!(0.9)),
                ]),
                ModelType::Llm,
            )
            .unwrap();

        assert_eq!(api_kwargs["max_tokens"], json!(64));
        assert_eq!(api_kwargs["temperature"], json!(0.9));
    }

    #[test]
    fn test_convert_falls_back_to_default_model() {
        let client = test_client();
        let api_kwargs = client
            .convert_inputs_to_api_kwargs("prompt", &ModelKwargs::new(), ModelType::Llm)
            .unwrap();
        assert_eq!(api_kwargs["model"], json!("default-model"));
    }

    #[test]
    fn test_convert_without_any_model_fails() {
        let client = OpenAiClient::new(
            "test-key".to_string(),
            None,
            None,
            SamplingDefaults::default(),
        )
        .unwrap();

        let result =
            client.convert_inputs_to_api_kwargs("prompt", &ModelKwargs::new(), ModelType::Llm);
        match result {
            Err(ClientError::Misconfiguration(msg)) => assert!(msg.contains("model")),
            other => panic!("Expected Misconfiguration, got {other:?}"),
        }
    }

    #[test]
    fn test_convert_embedder_builds_input_shape() {
        let client = test_client();
        let api_kwargs = client
            .convert_inputs_to_api_kwargs(
                "some document",
                &kwargs(&[("model", json!("text-embedding-3-small"))]),
                ModelType::Embedder,
            )
            .unwrap();

        assert_eq!(api_kwargs["input"], json!("some document"));
        assert!(!api_kwargs.contains_key("messages"));
        // Embedding requests carry no sampling parameters
        assert!(!api_kwargs.contains_key("temperature"));
    }

    #[test]
    fn test_parse_chat_completion_extracts_content() {
        let client = test_client();
        let completion = json!({
            "choices": [{"message": {"role": "assistant", "content": "Paris"}}],
            "usage": {"prompt_tokens": 5, "completion_tokens": 1}
        });

        let parsed = client.parse_chat_completion(&completion).unwrap();
        assert_eq!(parsed, json!("Paris"));
    }

    #[test]
    fn test_parse_chat_completion_missing_content_fails() {
        let client = test_client();
        for completion in [
            json!({}),
            json!({"choices": []}),
            json!({"choices": [{"message": {"role": "assistant"}}]}),
            json!({"choices": [{"message": {"content": 42}}]}),
        ] {
            match client.parse_chat_completion(&completion) {
                Err(ClientError::Parse(msg)) => {
                    assert!(msg.contains("choices[0].message.content"));
                }
                other => panic!("Expected Parse error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_new_from_config_missing_api_key() {
        let test_env_var = "OPENAI_API_KEY_TEST_MISSING";

        // SAFETY: test-scoped env manipulation with a unique variable name
        unsafe {
            std::env::remove_var(test_env_var);
        }

        let mut config = Config::minimal_for_testing();
        config.llm.openai = Some(lmgen_config::OpenAiConfig {
            base_url: None,
            api_key_env: Some(test_env_var.to_string()),
            model: Some("test-model".to_string()),
            max_tokens: None,
            temperature: None,
        });

        match OpenAiClient::new_from_config(&config) {
            Err(ClientError::Misconfiguration(msg)) => {
                assert!(msg.contains(test_env_var));
                assert!(msg.contains("not found"));
            }
            _ => panic!("Expected Misconfiguration error for missing API key"),
        }
    }

    #[test]
    fn test_new_from_config_reads_defaults() {
        let test_env_var = "OPENAI_API_KEY_TEST_DEFAULTS";

        // SAFETY: test-scoped env manipulation with a unique variable name
        unsafe {
            std::env::set_var(test_env_var, "test-key");
        }

        let mut config = Config::minimal_for_testing();
        config.llm.openai = Some(lmgen_config::OpenAiConfig {
            base_url: Some("http://localhost:1234/v1".to_string()),
            api_key_env: Some(test_env_var.to_string()),
            model: Some("local-model".to_string()),
            max_tokens: Some(256),
            temperature: Some(0.7),
        });

        let client = OpenAiClient::new_from_config(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:1234/v1");
        assert_eq!(client.default_model.as_deref(), Some("local-model"));
        assert_eq!(client.defaults.max_tokens, 256);
        assert_eq!(client.defaults.temperature, 0.7);

        // SAFETY: cleaning up the variable we set above
        unsafe {
            std::env::remove_var(test_env_var);
        }
    }
}
