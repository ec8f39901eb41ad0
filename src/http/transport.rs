//! Resilient request sending.

use std::time::Instant;

use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{Error, Result};
use crate::http::request::PreparedRequest;
use crate::http::retry::{pause, Backoff, RetryDecision, RetryPolicy};

/// A response from the transport.
///
/// Responses with a status of 400 or above are returned rather than raised;
/// callers check [`Response::is_invalid`] before using the body.
#[derive(Debug)]
pub struct Response {
    inner: reqwest::Response,
}

impl Response {
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Whether the server answered with a client or server error.
    pub fn is_invalid(&self) -> bool {
        self.inner.status().as_u16() >= 400
    }

    /// Final URL after redirects.
    pub fn url(&self) -> &Url {
        self.inner.url()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Declared body length, if the server sent one.
    pub fn content_length(&self) -> Option<u64> {
        self.inner.content_length()
    }

    pub async fn text(self) -> Result<String> {
        Ok(self.inner.text().await?)
    }

    /// Access to the underlying response for streaming the body.
    pub fn into_inner(self) -> reqwest::Response {
        self.inner
    }
}

/// Sends prepared requests with bounded retries.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl Transport {
    pub fn new(client: Client, policy: RetryPolicy, cancel: CancellationToken) -> Self {
        Self {
            client,
            policy,
            cancel,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Sends `request`, retrying transient failures and HTTP 429.
    ///
    /// `outer_deadline` lets an enclosing retry loop cap the time spent here.
    pub async fn send(
        &self,
        request: &PreparedRequest,
        outer_deadline: Option<Instant>,
    ) -> Result<Response> {
        let url = request.url().as_str();
        let deadline = self.policy.deadline(Instant::now(), outer_deadline);
        let mut attempt = 1;

        loop {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            tracing::debug!("{} {} (attempt {})", request.method(), url, attempt);

            let outcome = tokio::select! {
                outcome = request.to_builder(&self.client).send() => outcome,
                _ = self.cancel.cancelled() => return Err(Error::Cancelled),
            };

            let (backoff, message) = match outcome {
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    (Backoff::RateLimited, "HTTP 429 Too Many Requests".to_string())
                }
                Ok(response) => {
                    let status = response.status();
                    tracing::debug!("Response status: {}", status);
                    if status.as_u16() >= 400 {
                        tracing::debug!("Invalid response from {}: HTTP {}", url, status);
                    }
                    return Ok(Response { inner: response });
                }
                Err(e) if e.is_builder() => return Err(Error::Http(e)),
                Err(e) => (Backoff::Transient, e.to_string()),
            };

            match self.policy.should_retry(backoff, attempt, deadline) {
                RetryDecision::Retry {
                    delay,
                    attempt: next,
                } => {
                    tracing::warn!(
                        "{} failed ({}), retrying in {:?} (attempt {}/{})",
                        url,
                        message,
                        delay,
                        next,
                        self.policy.max_attempts()
                    );
                    pause(delay, &self.cancel).await?;
                    attempt = next;
                }
                RetryDecision::DoNotRetry { reason } => {
                    tracing::debug!("Giving up on {}: {}", url, reason);
                    return Err(match backoff {
                        Backoff::RateLimited => Error::RateLimited {
                            url: url.to_string(),
                            attempts: attempt,
                        },
                        Backoff::Transient => Error::Transport {
                            url: url.to_string(),
                            attempts: attempt,
                            message: format!("{} ({})", message, reason),
                        },
                    });
                }
            }
        }
    }
}
