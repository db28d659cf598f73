//! HTTP transport seam.
//!
//! The broker never talks to the network directly; it goes through the
//! `HttpTransport` trait so that hosts can inject a shared client and
//! tests can script replies. `ReqwestTransport` is the production
//! implementation: one long-lived handle owned by the composition root,
//! not a process-wide global.

use crate::error::AuthFailure;
use async_trait::async_trait;
use std::time::Duration;

/// Default request deadline for the production transport.
///
/// Every call the broker makes is bounded by a request or background-task
/// deadline; unbounded blocking is not allowed.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A raw HTTP reply: status code plus body text.
///
/// Status interpretation is left to the caller; the transport reports
/// non-2xx replies as data, not as errors.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    /// Returns true for any 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for the HTTP calls the broker needs.
///
/// No retries and no connection-pooling contract are imposed here; a
/// transport error means the request never produced a reply.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Performs a GET request.
    async fn get(&self, url: &str) -> std::result::Result<HttpReply, AuthFailure>;

    /// Performs a GET request with a bearer token.
    async fn get_bearer(
        &self,
        url: &str,
        token: &str,
    ) -> std::result::Result<HttpReply, AuthFailure>;

    /// Performs a POST request with a JSON body.
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> std::result::Result<HttpReply, AuthFailure>;

    /// Performs a POST request with a form-encoded body.
    async fn post_form(
        &self,
        url: &str,
        fields: &[(&str, &str)],
    ) -> std::result::Result<HttpReply, AuthFailure>;
}

/// Production transport backed by a long-lived `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with the default deadline.
    pub fn new() -> crate::error::Result<Self, AuthFailure> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a transport with an explicit per-request deadline.
    pub fn with_timeout(timeout: Duration) -> crate::error::Result<Self, AuthFailure> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|e| AuthFailure::Transport {
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self { client })
    }

    /// Wraps an existing client handle owned by the host.
    #[must_use]
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn read_reply(
        response: std::result::Result<reqwest::Response, reqwest::Error>,
    ) -> std::result::Result<HttpReply, AuthFailure> {
        let response = response.map_err(|e| AuthFailure::Transport {
            reason: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| AuthFailure::Transport {
            reason: format!("failed to read response body: {e}"),
        })?;

        Ok(HttpReply { status, body })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> std::result::Result<HttpReply, AuthFailure> {
        Self::read_reply(self.client.get(url).send().await).await
    }

    async fn get_bearer(
        &self,
        url: &str,
        token: &str,
    ) -> std::result::Result<HttpReply, AuthFailure> {
        Self::read_reply(self.client.get(url).bearer_auth(token).send().await).await
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> std::result::Result<HttpReply, AuthFailure> {
        Self::read_reply(self.client.post(url).json(body).send().await).await
    }

    async fn post_form(
        &self,
        url: &str,
        fields: &[(&str, &str)],
    ) -> std::result::Result<HttpReply, AuthFailure> {
        Self::read_reply(self.client.post(url).form(fields).send().await).await
    }
}
