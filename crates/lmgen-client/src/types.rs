//! Model client capability trait

use async_trait::async_trait;
use lmgen_utils::error::ClientError;
use lmgen_utils::types::{ApiKwargs, Completion, ModelKwargs, ModelType};

/// Abstraction over a generative-model backend's request/response protocol.
///
/// A client owns four capabilities: converting a rendered prompt plus model
/// kwargs into backend-specific call arguments, invoking the backend
/// (blocking or suspending), and parsing a raw completion into a usable
/// response. The orchestrator works against this trait and never sees
/// provider wire formats.
///
/// Implementations must be safe for concurrent invocation; the orchestrator
/// passes that requirement through rather than enforcing it.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Provider name for logging and diagnostics.
    fn provider(&self) -> &str;

    /// Convert a rendered prompt and composed model kwargs into the
    /// backend's wire-format call arguments for the given model type.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Misconfiguration` when the inputs cannot name a
    /// model, and `ClientError::Unsupported` for model types the backend
    /// does not implement.
    fn convert_inputs_to_api_kwargs(
        &self,
        input: &str,
        model_kwargs: &ModelKwargs,
        model_type: ModelType,
    ) -> Result<ApiKwargs, ClientError>;

    /// Invoke the backend, blocking the calling thread until it responds.
    ///
    /// Must not be used from inside an async runtime; use [`acall`] there.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` for transport failures, provider errors
    /// (auth, quota, outage), and timeouts.
    ///
    /// [`acall`]: ModelClient::acall
    fn call(&self, api_kwargs: &ApiKwargs, model_type: ModelType) -> Result<Completion, ClientError>;

    /// Invoke the backend, suspending the calling task until it responds.
    ///
    /// # Errors
    ///
    /// Same failure surface as [`call`](ModelClient::call).
    async fn acall(
        &self,
        api_kwargs: &ApiKwargs,
        model_type: ModelType,
    ) -> Result<Completion, ClientError>;

    /// Parse a raw completion into the response payload.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Parse` when the completion does not carry a
    /// usable response.
    fn parse_chat_completion(
        &self,
        completion: &Completion,
    ) -> Result<serde_json::Value, ClientError>;
}
