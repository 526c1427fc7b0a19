// Authenticated HTTP client
//
// Wraps `reqwest::Client` with bearer-token attachment and a single
// refresh-and-retry on HTTP 401. Endpoint modules (dashboard, auth) are
// implemented as inherent methods in separate files to keep this module
// focused on the request path.

use std::fmt;
use std::sync::Arc;

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::Error;
use crate::models::{AccessToken, TokenPair};
use crate::navigation::{LOGIN_PATH, Navigator};
use crate::paths;
use crate::token::{TokenStore, same_token};
use crate::transport::TransportConfig;

// ── Request descriptor ──────────────────────────────────────────────

/// Everything needed to issue a request again.
///
/// Every call made through [`ApiClient::execute`] carries one, which is
/// what makes it eligible for the refresh-retry. The token endpoints are
/// sent without a descriptor and are therefore never retried.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn with_json(mut self, body: &impl Serialize) -> Result<Self, Error> {
        let value = serde_json::to_value(body).map_err(|e| Error::Deserialization {
            message: format!("failed to encode request body: {e}"),
            body: String::new(),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Append a query parameter.
    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }
}

// ── Client ──────────────────────────────────────────────────────────

/// HTTP client for the authenticated dashboard API.
///
/// Reads credentials from a [`TokenStore`] on every request and recovers
/// from one class of failure: an HTTP 401 on a resendable request is
/// answered by exactly one refresh attempt followed by exactly one retry.
/// A failed refresh clears both tokens and navigates to [`LOGIN_PATH`].
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    /// Serialises the refresh step so concurrent 401s share one refresh.
    refresh_gate: Mutex<()>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(
        base_url: Url,
        transport: &TransportConfig,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, tokens, navigator))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            http,
            base_url,
            tokens,
            navigator,
            refresh_gate: Mutex::new(()),
        }
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The durable token slots this client reads from.
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Build a full URL from an absolute API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        join_url(&self.base_url, path)
    }

    // ── Request path ─────────────────────────────────────────────────

    /// Send a request, recovering once from HTTP 401.
    ///
    /// Returns the successful response, or the terminal error. When the
    /// 401 could not be recovered the *original* 401 is returned; a 401
    /// on the retried request is returned as-is and never intercepted.
    pub async fn execute(&self, spec: &RequestSpec) -> Result<reqwest::Response, Error> {
        let sent_with = self.tokens.access_token();
        let resp = self.send(spec, sent_with.as_ref()).await?;

        if resp.status() != StatusCode::UNAUTHORIZED {
            return check_status(resp, &spec.path).await;
        }

        let original = error_from(resp, &spec.path).await;
        debug!(path = %spec.path, "received 401, attempting token refresh");
        self.recover_unauthorized(spec, sent_with, original).await
    }

    async fn recover_unauthorized(
        &self,
        spec: &RequestSpec,
        sent_with: Option<SecretString>,
        original: Error,
    ) -> Result<reqwest::Response, Error> {
        let access = {
            let _gate = self.refresh_gate.lock().await;

            match self.tokens.access_token() {
                // Another request refreshed while this one was in flight.
                Some(current) if !same_token(Some(&current), sent_with.as_ref()) => {
                    debug!("access token already refreshed, retrying");
                    current
                }
                _ => {
                    let Some(refresh) = self.tokens.refresh_token() else {
                        debug!("no refresh token stored, giving up");
                        return Err(original);
                    };
                    match self.refresh_access_token(&refresh).await {
                        Ok(token) => {
                            let access = SecretString::from(token.access);
                            self.tokens.set_access_token(access.clone());
                            debug!("access token refreshed");
                            access
                        }
                        Err(e) => {
                            warn!(error = %e, "token refresh failed, clearing session");
                            self.tokens.clear();
                            self.navigator.navigate(LOGIN_PATH);
                            return Err(original);
                        }
                    }
                }
            }
        };

        let resp = self.send(spec, Some(&access)).await?;
        check_status(resp, &spec.path).await
    }

    async fn send(
        &self,
        spec: &RequestSpec,
        token: Option<&SecretString>,
    ) -> Result<reqwest::Response, Error> {
        let url = self.url(&spec.path)?;
        debug!("{} {}", spec.method, url);

        let mut builder = self.http.request(spec.method.clone(), url);
        if !spec.query.is_empty() {
            builder = builder.query(&spec.query);
        }
        if let Some(ref body) = spec.body {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token.expose_secret());
        }

        builder.send().await.map_err(Error::Transport)
    }

    // ── Typed helpers ────────────────────────────────────────────────

    /// Execute and decode a JSON response.
    pub async fn request_json<T: DeserializeOwned>(&self, spec: &RequestSpec) -> Result<T, Error> {
        let resp = self.execute(spec).await?;
        decode_json(resp).await
    }

    /// Execute, discarding the response body (DELETE → 204).
    pub async fn request_empty(&self, spec: &RequestSpec) -> Result<(), Error> {
        let resp = self.execute(spec).await?;
        trace!(status = %resp.status(), "discarding response body");
        Ok(())
    }

    // ── Token exchange ───────────────────────────────────────────────

    /// Exchange email + password for a token pair.
    ///
    /// `POST /api/token/`. Sent without credentials and without a
    /// request descriptor, so a 401 here is never refreshed.
    pub async fn obtain_token_pair(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<TokenPair, Error> {
        let url = self.url(paths::TOKEN)?;
        debug!("requesting token pair at {}", url);

        let body = json!({
            "email": email,
            "password": password.expose_secret(),
        });

        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("token request failed (HTTP {status}): {body}"),
            });
        }

        decode_json(resp).await
    }

    /// Obtain a new access token from a refresh token.
    ///
    /// `POST /api/v0/token/refresh/`, unauthenticated.
    pub async fn refresh_access_token(&self, refresh: &SecretString) -> Result<AccessToken, Error> {
        let url = self.url(paths::TOKEN_REFRESH)?;
        debug!("refreshing access token at {}", url);

        let resp = self
            .http
            .post(url)
            .json(&json!({ "refresh": refresh.expose_secret() }))
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("token refresh failed (HTTP {status}): {body}"),
            });
        }

        decode_json(resp).await
    }
}

// ── Shared response helpers ─────────────────────────────────────────

pub(crate) fn join_url(base: &Url, path: &str) -> Result<Url, Error> {
    let base = base.as_str().trim_end_matches('/');
    let full = format!("{base}{path}");
    Url::parse(&full).map_err(Error::InvalidUrl)
}

/// Pass successful responses through, turn the rest into errors.
pub(crate) async fn check_status(
    resp: reqwest::Response,
    path: &str,
) -> Result<reqwest::Response, Error> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        Err(error_from(resp, path).await)
    }
}

async fn error_from(resp: reqwest::Response, path: &str) -> Error {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Error::from_response(status, path, body)
}

pub(crate) async fn decode_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let body = resp.text().await.map_err(Error::Transport)?;
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.clone(),
        }
    })
}
