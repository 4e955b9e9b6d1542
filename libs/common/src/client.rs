//! HTTP client for the portfolio API
//!
//! Thin wrapper around `reqwest` that attaches bearer credentials, decodes
//! JSON bodies and maps non-2xx responses onto [`ApiError`] using the
//! server's `detail` message.

use reqwest::{Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::config::AdminConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::{ErrorBody, Identity, LoginRequest, TokenResponse};

/// Identity endpoint
pub const ME_PATH: &str = "/api/auth/me";

/// Password login endpoint
pub const LOGIN_PATH: &str = "/api/auth/login";

/// Portfolio API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client from the configuration
    pub fn new(config: &AdminConfig) -> ApiResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ApiError::Transport)?;

        Ok(Self::with_http(&config.api_url, http))
    }

    /// Build a client around an existing `reqwest::Client`
    pub fn with_http(base_url: &str, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, bearer: Option<&str>) -> RequestBuilder {
        let request = self.http.request(method, format!("{}{}", self.base_url, path));
        match bearer {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// GET `path` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&str>,
    ) -> ApiResult<T> {
        debug!("GET {}", path);
        let response = self.request(Method::GET, path, bearer).send().await?;
        let response = check(response).await?;
        Ok(response.json().await?)
    }

    /// Send `body` as JSON with `method` and decode the JSON response
    pub async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        body: &B,
    ) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("{} {}", method, path);
        let response = self.request(method, path, bearer).json(body).send().await?;
        let response = check(response).await?;
        Ok(response.json().await?)
    }

    /// DELETE `path`, ignoring any response body
    pub async fn delete(&self, path: &str, bearer: &str) -> ApiResult<()> {
        debug!("DELETE {}", path);
        let response = self
            .request(Method::DELETE, path, Some(bearer))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// Resolve a credential to the identity it represents
    pub async fn current_user(&self, credential: &str) -> ApiResult<Identity> {
        self.get_json(ME_PATH, Some(credential)).await
    }

    /// Exchange a username and password for a credential
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<TokenResponse> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.send_json(Method::POST, LOGIN_PATH, None, &body).await
    }
}

/// Turn a non-2xx response into an error carrying the server's message
async fn check(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.message())
        .or_else(|| {
            let text = text.trim();
            (!text.is_empty() && !text.starts_with('{')).then(|| text.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    debug!("Request failed with {}: {}", status, detail);
    Err(ApiError::from_status(status, detail))
}
