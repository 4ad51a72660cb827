//! Authenticated HTTP plumbing for the document chat backend
//!
//! Every protected endpoint goes through [`AuthenticatedClient::send`], which
//! attaches the stored bearer token and recovers from an expired access token
//! exactly once per call: 401, refresh the pair, retry, done. The refresh
//! itself is serialized behind a gate so concurrent 401s trigger a single
//! token exchange instead of racing each other.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tokio::sync::Mutex;

use crate::api::types::{RefreshRequest, TokenResponse};
use crate::auth::TokenStore;
use crate::config::BackendConfig;
use crate::error::{AskdocsError, Result};

/// HTTP client bound to one backend base URL and one token store.
///
/// The base URL and timeout come from configuration resolved once at
/// startup; the token store is injected so tests can observe and seed
/// credentials without touching the OS keyring.
pub struct AuthenticatedClient {
    client: Client,
    api_base: String,
    tokens: Arc<dyn TokenStore>,
    refresh_gate: Mutex<()>,
}

impl AuthenticatedClient {
    /// Creates a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &BackendConfig, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("askdocs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AskdocsError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            tokens,
            refresh_gate: Mutex::new(()),
        })
    }

    /// Joins a path onto the configured API base.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    /// Sends a request with the current access token attached.
    ///
    /// The request is described by a builder closure rather than a finished
    /// request so that the single retry can rebuild it from scratch
    /// (multipart bodies cannot be cloned once built).
    ///
    /// Behavior on 401: refresh the token pair once, retry once with the
    /// fresh token, and hand the retry response back untouched even if it is
    /// another 401. When the refresh itself fails the store is already
    /// cleared and the call resolves to [`AskdocsError::SessionExpired`].
    ///
    /// Any other status, success or failure, is returned unmodified; mapping
    /// failures to errors is the caller's job.
    pub(crate) async fn send<F>(&self, build: F) -> Result<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let sent_with = self.tokens.access_token();
        let response = self.dispatch(&build, sent_with.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::warn!("Backend returned 401 Unauthorized, attempting token refresh");
        if !self.refresh_access_token(sent_with.as_deref()).await {
            return Err(AskdocsError::SessionExpired.into());
        }

        let fresh = self.tokens.access_token();
        self.dispatch(&build, fresh.as_deref()).await
    }

    /// Sends a request without credentials and without retry.
    ///
    /// Used by login, signup and the health probe.
    pub(crate) async fn send_unauthenticated<F>(&self, build: F) -> Result<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        Ok(build(&self.client).send().await?)
    }

    async fn dispatch<F>(&self, build: &F, token: Option<&str>) -> Result<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut request = build(&self.client);
        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        Ok(request.send().await?)
    }

    /// Exchanges the stored refresh token for a new pair. Returns `true` on
    /// success.
    ///
    /// Single attempt, no backoff. On any failure (no refresh token, network
    /// error, rejection, malformed body) the store is cleared entirely so a
    /// half-valid pair never lingers.
    ///
    /// `stale_access` is the access token the failing request was sent with.
    /// Callers that queue behind an in-flight refresh find a different token
    /// stored once they hold the gate and skip the exchange, so concurrent
    /// 401s collapse into one refresh shared by all waiters.
    pub(crate) async fn refresh_access_token(&self, stale_access: Option<&str>) -> bool {
        let _gate = self.refresh_gate.lock().await;

        if self.tokens.access_token().as_deref() != stale_access {
            tracing::debug!("Access token already refreshed by a concurrent request");
            return true;
        }

        let refresh_token = match self.tokens.refresh_token() {
            Some(token) if !token.is_empty() => token,
            _ => {
                tracing::warn!("No refresh token stored, clearing credentials");
                self.tokens.clear();
                return false;
            }
        };

        let url = self.endpoint("auth/refresh");
        let request = RefreshRequest { refresh_token };
        let response = match self.client.post(&url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Token refresh request failed: {}", e);
                self.tokens.clear();
                return false;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Token refresh rejected with {}: {}", status, error_text);
            self.tokens.clear();
            return false;
        }

        match response.json::<TokenResponse>().await {
            Ok(parsed) => {
                self.tokens.set_tokens(&parsed.into_pair());
                tracing::info!("Access token refreshed");
                true
            }
            Err(e) => {
                tracing::error!("Malformed token refresh response: {}", e);
                self.tokens.clear();
                false
            }
        }
    }
}
