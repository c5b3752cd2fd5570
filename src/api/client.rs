//! HTTP transport for the platform backend
//!
//! Every request carries the stored bearer token. A 401 triggers one token
//! refresh followed by one retry; if the refresh fails the stored session is
//! cleared and the caller gets [`AppError::SessionExpired`].

use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::Envelope;
use crate::store::{SessionStore, Tokens};

/// Client for the platform REST API
pub struct ApiClient {
    http: Client,
    base_url: Url,
    store: SessionStore,
    refresh_lock: Mutex<()>,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    #[serde(rename = "refreshToken")]
    refresh_token: &'a str,
}

/// Token pair as returned by `/auth/refresh`
#[derive(Debug, Deserialize)]
pub(crate) struct TokenPair {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

impl From<TokenPair> for Tokens {
    fn from(pair: TokenPair) -> Self {
        Tokens {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }
    }
}

impl ApiClient {
    pub fn new(base_url: Url, store: SessionStore) -> Self {
        Self {
            http: Client::new(),
            base_url,
            store,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &Config, store: SessionStore) -> Self {
        Self::new(config.api_url.clone(), store)
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::Config(format!("invalid request path '{}': {}", path, e)))
    }

    /// Send a request without credentials (login, refresh)
    pub(crate) async fn send_anonymous(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Response> {
        let response = self.execute(method, path, body, None).await?;
        check_status(response).await
    }

    /// Send an authenticated request, refreshing the token once on 401
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Response> {
        let tokens = self.store.tokens().await?.ok_or(AppError::NotAuthenticated)?;

        let response = self
            .execute(method.clone(), path, body.clone(), Some(&tokens.access_token))
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return check_status(response).await;
        }

        tracing::debug!(path, "Access token rejected, refreshing");
        let refreshed = self.refresh(&tokens).await?;

        let response = self
            .execute(method, path, body, Some(&refreshed.access_token))
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(path, "Request still unauthorized after refresh");
            self.store.clear().await?;
            return Err(AppError::SessionExpired);
        }

        check_status(response).await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        access_token: Option<&str>,
    ) -> Result<Response> {
        let url = self.url(path)?;
        let request_id = Uuid::new_v4();
        tracing::debug!(%method, %url, %request_id, "Sending request");

        let mut request = self
            .http
            .request(method, url)
            .header("X-Request-Id", request_id.to_string());

        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        Ok(request.send().await?)
    }

    /// Exchange the refresh token for a new pair
    ///
    /// Concurrent callers that hit 401 with the same stale token share one
    /// refresh: whoever takes the lock second sees the rotated tokens.
    async fn refresh(&self, stale: &Tokens) -> Result<Tokens> {
        let _guard = self.refresh_lock.lock().await;

        match self.store.tokens().await? {
            Some(current) if current.access_token != stale.access_token => return Ok(current),
            Some(_) => {}
            None => return Err(AppError::SessionExpired),
        }

        let body = serde_json::to_value(RefreshRequest {
            refresh_token: &stale.refresh_token,
        })?;

        let outcome = match self.send_anonymous(Method::POST, "/auth/refresh", Some(body)).await {
            Ok(response) => decode::<TokenPair>(response).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(pair) => {
                let tokens: Tokens = pair.into();
                self.store.update_tokens(&tokens).await?;
                tracing::debug!("Access token refreshed");
                Ok(tokens)
            }
            Err(e) => {
                tracing::warn!("Token refresh failed, clearing session: {}", e);
                self.store.clear().await?;
                Err(AppError::SessionExpired)
            }
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(Method::GET, path, None).await?;
        decode(response).await
    }

    /// GET a `{ "data": [...] }` collection
    pub(crate) async fn get_collection<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let envelope: Envelope<T> = self.get_json(path).await?;
        Ok(envelope.data)
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let response = self.send(Method::POST, path, Some(body)).await?;
        decode(response).await
    }

    /// POST and ignore the response body
    pub(crate) async fn post_unit<B>(&self, path: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let body = body.map(serde_json::to_value).transpose()?;
        self.send(Method::POST, path, body).await?;
        Ok(())
    }

    /// PUT and ignore the response body
    pub(crate) async fn put_unit<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.send(Method::PUT, path, Some(body)).await?;
        Ok(())
    }
}

/// Read the whole body and decode it, keeping malformed payloads apart from
/// transport failures
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    Err(AppError::from_response_body(status, &text))
}
