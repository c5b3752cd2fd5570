//! Login, logout and the current user

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::client::decode;
use super::ApiClient;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::store::Tokens;

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub senha: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    #[serde(rename = "usuario", default)]
    pub user: Option<User>,
}

impl ApiClient {
    /// Authenticate and persist the session
    pub async fn login(&self, email: &str, password: &str) -> Result<Option<User>> {
        let body = serde_json::to_value(LoginRequest {
            email: email.to_string(),
            senha: password.to_string(),
        })?;

        let response = self
            .send_anonymous(Method::POST, "/auth/login", Some(body))
            .await?;
        let login: LoginResponse = decode(response).await?;

        let tokens = Tokens {
            access_token: login.access_token,
            refresh_token: login.refresh_token,
        };
        self.store().save(&tokens, login.user.as_ref()).await?;

        tracing::info!(email, "Logged in");
        Ok(login.user)
    }

    /// End the session on the backend (best effort) and forget it locally
    pub async fn logout(&self) -> Result<()> {
        if self.store().tokens().await?.is_some() {
            if let Err(e) = self.post_unit::<()>("/auth/logout", None).await {
                tracing::warn!("Logout request failed: {}", e);
            }
        }
        self.store().clear().await
    }

    /// Fetch the logged-in user's profile
    pub async fn current_user(&self) -> Result<User> {
        self.get_json("/api/usuarios/me").await
    }

    /// The stored user, falling back to the backend when none was saved
    pub async fn session_user(&self) -> Result<User> {
        let session = self
            .store()
            .load()
            .await?
            .ok_or(AppError::NotAuthenticated)?;

        match session.user {
            Some(user) => Ok(user),
            None => {
                let user = self.current_user().await?;
                self.store().save(&session.tokens, Some(&user)).await?;
                Ok(user)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_serialization() {
        let body = LoginRequest {
            email: "ana@example.org".to_string(),
            senha: "segredo".to_string(),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"senha\":\"segredo\""));
    }

    #[test]
    fn test_login_response_without_user() {
        let json = r#"{"accessToken": "a", "refreshToken": "r"}"#;
        let login: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(login.access_token, "a");
        assert!(login.user.is_none());
    }
}
