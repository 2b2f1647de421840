//! Scriptable model client for tests
//!
//! Implements the full [`ModelClient`] capability set without any network.
//! By default it echoes the rendered prompt back as the completion; fixed
//! completions and failure injection for the call and parse stages are
//! available for exercising recovery paths.

use crate::types::ModelClient;
use async_trait::async_trait;
use lmgen_utils::error::ClientError;
use lmgen_utils::types::{ApiKwargs, Completion, ModelKwargs, ModelType};
use serde_json::{Value, json};
use std::sync::{Mutex, PoisonError};

/// In-process stand-in for a model backend.
#[derive(Default)]
pub struct MockClient {
    completion: Option<Completion>,
    call_error: Option<String>,
    parse_error: Option<String>,
    requests: Mutex<Vec<ApiKwargs>>,
}

impl MockClient {
    /// A client that echoes the rendered prompt back as its completion.
    #[must_use]
    pub fn echo() -> Self {
        Self::default()
    }

    /// A client that always returns the given completion.
    #[must_use]
    pub fn with_completion(completion: Completion) -> Self {
        Self {
            completion: Some(completion),
            ..Self::default()
        }
    }

    /// Make `call`/`acall` fail with a transport error.
    #[must_use]
    pub fn failing_call(mut self, message: impl Into<String>) -> Self {
        self.call_error = Some(message.into());
        self
    }

    /// Make `parse_chat_completion` fail with a parse error.
    #[must_use]
    pub fn failing_parse(mut self, message: impl Into<String>) -> Self {
        self.parse_error = Some(message.into());
        self
    }

    /// Backend call arguments recorded by every `call`/`acall` so far.
    #[must_use]
    pub fn requests(&self) -> Vec<ApiKwargs> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, api_kwargs: &ApiKwargs) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(api_kwargs.clone());
    }

    fn completion_for(&self, api_kwargs: &ApiKwargs) -> Result<Completion, ClientError> {
        if let Some(message) = &self.call_error {
            return Err(ClientError::Transport(message.clone()));
        }
        Ok(self
            .completion
            .clone()
            .unwrap_or_else(|| api_kwargs.get("input").cloned().unwrap_or(Value::Null)))
    }
}

#[async_trait]
impl ModelClient for MockClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn convert_inputs_to_api_kwargs(
        &self,
        input: &str,
        model_kwargs: &ModelKwargs,
        _model_type: ModelType,
    ) -> Result<ApiKwargs, ClientError> {
        let mut api_kwargs = ApiKwargs::new();
        api_kwargs.insert(
            "model".to_string(),
            model_kwargs
                .get("model")
                .cloned()
                .unwrap_or_else(|| json!("mock-model")),
        );
        for (key, value) in model_kwargs {
            if key != "model" {
                api_kwargs.insert(key.clone(), value.clone());
            }
        }
        api_kwargs.insert("input".to_string(), json!(input));
        Ok(api_kwargs)
    }

    fn call(
        &self,
        api_kwargs: &ApiKwargs,
        _model_type: ModelType,
    ) -> Result<Completion, ClientError> {
        self.record(api_kwargs);
        self.completion_for(api_kwargs)
    }

    async fn acall(
        &self,
        api_kwargs: &ApiKwargs,
        _model_type: ModelType,
    ) -> Result<Completion, ClientError> {
        self.record(api_kwargs);
        self.completion_for(api_kwargs)
    }

    fn parse_chat_completion(&self, completion: &Completion) -> Result<Value, ClientError> {
        if let Some(message) = &self.parse_error {
            return Err(ClientError::Parse(message.clone()));
        }
        Ok(completion.clone())
    }
}
