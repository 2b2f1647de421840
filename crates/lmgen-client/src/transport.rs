//! Async HTTP transport shared by provider backends
//!
//! One pooled client per backend instance. A request is re-sent on a short
//! fixed backoff schedule when the provider reports an outage or the network
//! drops it; credential and quota rejections and timeouts are final on the
//! first occurrence.

use lmgen_utils::error::ClientError;
use lmgen_utils::types::{ApiKwargs, Completion};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Pauses taken before each re-send; the schedule length caps the retries.
const RETRY_SCHEDULE: [Duration; 2] = [Duration::from_secs(1), Duration::from_secs(2)];

/// Ceiling any per-request timeout is clamped to.
const TIMEOUT_CEILING: Duration = Duration::from_secs(300);

pub(crate) struct AsyncTransport {
    client: Client,
}

impl AsyncTransport {
    /// # Errors
    ///
    /// Returns `ClientError::Misconfiguration` when the underlying client
    /// cannot be assembled (TLS setup, resolver setup).
    pub(crate) fn new() -> Result<Self, ClientError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .use_rustls_tls()
            .build()
            .map_err(|e| {
                ClientError::Misconfiguration(format!("HTTP client setup failed: {e}"))
            })?;
        Ok(Self { client })
    }

    /// POST a JSON body and decode the JSON reply.
    ///
    /// Each attempt rebuilds the request from the same parts, so nothing has
    /// to be cloned across retries. The reply body is only decoded once a
    /// usable status arrives.
    ///
    /// # Errors
    ///
    /// Returns the status-mapped `ClientError` for provider rejections, the
    /// last recorded error once the retry schedule is exhausted, and
    /// `ClientError::Timeout` as soon as an attempt times out.
    pub(crate) async fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &ApiKwargs,
        timeout: Duration,
        provider: &str,
    ) -> Result<Completion, ClientError> {
        let timeout = timeout.min(TIMEOUT_CEILING);
        let mut last_error = ClientError::Transport(format!("{provider}: no request attempted"));

        for attempt in 0..=RETRY_SCHEDULE.len() {
            if attempt > 0 {
                tokio::time::sleep(RETRY_SCHEDULE[attempt - 1]).await;
            }
            debug!(provider, url, attempt, "sending request");

            let sent = self
                .client
                .post(url)
                .bearer_auth(api_key)
                .json(body)
                .timeout(timeout)
                .send()
                .await;

            match sent {
                Ok(response) => match status_error(response.status(), provider) {
                    None => {
                        return response.json::<Completion>().await.map_err(|e| {
                            ClientError::Transport(format!("{provider} reply was not JSON: {e}"))
                        });
                    }
                    Some(error) if is_retriable(&error) => {
                        warn!(provider, attempt, error = %error, "provider error, re-sending");
                        last_error = error;
                    }
                    Some(error) => return Err(error),
                },
                Err(e) if e.is_timeout() => {
                    return Err(ClientError::Timeout { duration: timeout });
                }
                Err(e) => {
                    warn!(provider, attempt, error = %e, "network error, re-sending");
                    last_error = ClientError::Transport(format!("{provider} request failed: {e}"));
                }
            }
        }

        Err(last_error)
    }
}

/// Classify a response status: `None` for a usable reply, otherwise the
/// error the caller should see. 401/403 are credential rejections, 429 is a
/// quota rejection, 5xx is an outage, any other 4xx is a request our side
/// built wrong.
pub(crate) fn status_error(status: StatusCode, provider: &str) -> Option<ClientError> {
    match status.as_u16() {
        200..=399 => None,
        401 | 403 => Some(ClientError::ProviderAuth(format!(
            "{provider} rejected the request credentials ({status})"
        ))),
        429 => Some(ClientError::ProviderQuota(format!(
            "{provider} throttled the request ({status})"
        ))),
        500..=599 => Some(ClientError::ProviderOutage(format!(
            "{provider} is currently unavailable ({status})"
        ))),
        _ => Some(ClientError::Transport(format!(
            "{provider} refused the request ({status})"
        ))),
    }
}

/// Only outages are worth re-sending; every other rejection will repeat.
fn is_retriable(error: &ClientError) -> bool {
    matches!(error, ClientError::ProviderOutage(_))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(code: u16) -> Option<ClientError> {
        status_error(StatusCode::from_u16(code).unwrap(), "openai")
    }

    #[test]
    fn test_usable_statuses_produce_no_error() {
        for code in [200, 201, 204] {
            assert!(classify(code).is_none(), "{code} should be usable");
        }
    }

    #[test]
    fn test_credential_rejections() {
        for code in [401, 403] {
            let error = classify(code).unwrap();
            assert!(
                matches!(error, ClientError::ProviderAuth(_)),
                "{code} should reject credentials, got {error:?}"
            );
            assert!(error.to_string().contains("openai"));
        }
    }

    #[test]
    fn test_quota_rejection() {
        let error = classify(429).unwrap();
        match error {
            ClientError::ProviderQuota(msg) => assert!(msg.contains("throttled")),
            other => panic!("Expected ProviderQuota, got {other:?}"),
        }
    }

    #[test]
    fn test_outages_are_retriable() {
        for code in [500, 502, 503] {
            let error = classify(code).unwrap();
            assert!(matches!(error, ClientError::ProviderOutage(_)));
            assert!(is_retriable(&error), "{code} should be re-sent");
        }
    }

    #[test]
    fn test_caller_side_rejections_are_final() {
        for code in [400, 404, 422] {
            let error = classify(code).unwrap();
            assert!(matches!(error, ClientError::Transport(_)));
            assert!(!is_retriable(&error), "{code} must not be re-sent");
        }
    }

    #[test]
    fn test_retry_schedule_backs_off() {
        assert!(RETRY_SCHEDULE.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_transport_assembles() {
        assert!(AsyncTransport::new().is_ok());
    }
}
