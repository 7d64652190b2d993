//! Email/password identity provider (Firebase Identity Toolkit REST API)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;

use returns_common::UserData;

#[derive(Debug, Error)]
pub enum IdentityError {
    /// Error code reported by the provider, e.g. `EMAIL_EXISTS`
    #[error("identity provider refused the request: {0}")]
    Provider(String),

    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed identity provider response: {0}")]
    Malformed(String),
}

impl IdentityError {
    pub fn code(&self) -> Option<&str> {
        match self {
            IdentityError::Provider(code) => Some(code.as_str()),
            _ => None,
        }
    }

    /// Message shown to the user; `fallback` when the code has no wording.
    pub fn user_message(&self, fallback: &str) -> String {
        self.code()
            .and_then(friendly_message)
            .unwrap_or(fallback)
            .to_string()
    }

    /// HTTP status the API answers with.
    pub fn status(&self) -> u16 {
        match self.code() {
            Some("EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS") => 401,
            Some("TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "USER_DISABLED" | "USER_NOT_FOUND") => 401,
            Some("TOO_MANY_ATTEMPTS_TRY_LATER") => 429,
            Some("EMAIL_EXISTS") => 409,
            Some(_) => 400,
            None => 502,
        }
    }
}

pub fn friendly_message(code: &str) -> Option<&'static str> {
    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            Some("Invalid email or password")
        }
        "TOO_MANY_ATTEMPTS_TRY_LATER" => {
            Some("Too many failed login attempts. Please try again later.")
        }
        "EMAIL_EXISTS" => Some("Email already in use"),
        "WEAK_PASSWORD" => Some("Password is too weak"),
        "INVALID_EMAIL" => Some("Invalid email address"),
        _ => None,
    }
}

/// Signed-in user with provider tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySession {
    pub user: UserData,
    pub id_token: String,
    pub refresh_token: String,
}

/// Result of exchanging a refresh token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedTokens {
    pub uid: String,
    pub id_token: String,
    pub refresh_token: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentitySession, IdentityError>;

    /// Create the account, then set its display name if one is given.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<IdentitySession, IdentityError>;

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, IdentityError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: String,
    refresh_token: String,
    user_id: String,
}

/// `"WEAK_PASSWORD : Password should be at least 6 characters"` → `WEAK_PASSWORD`
fn error_code(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(str::to_string))
        .map(|message| {
            message
                .split(" : ")
                .next()
                .unwrap_or_default()
                .trim()
                .to_string()
        })
        .filter(|code| !code.is_empty())
        .unwrap_or_else(|| "UNKNOWN_ERROR".to_string())
}

pub struct FirebaseIdentity {
    client: Client,
    api_key: String,
    auth_base_url: String,
    token_base_url: String,
}

impl FirebaseIdentity {
    pub fn new(
        api_key: &str,
        auth_base_url: &str,
        token_base_url: &str,
        timeout_secs: u64,
    ) -> Result<Self, IdentityError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            auth_base_url: auth_base_url.trim_end_matches('/').to_string(),
            token_base_url: token_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn key_query(&self) -> String {
        format!("key={}", urlencoding::encode(&self.api_key))
    }

    async fn read<T: DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> Result<T, IdentityError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let code = error_code(&body);
            tracing::warn!("{} refused: {} {}", what, status, code);
            return Err(IdentityError::Provider(code));
        }

        serde_json::from_str(&body).map_err(|e| IdentityError::Malformed(format!("{}: {}", what, e)))
    }

    async fn accounts(&self, method: &str, body: Value) -> Result<AccountResponse, IdentityError> {
        let url = format!("{}/accounts:{}?{}", self.auth_base_url, method, self.key_query());
        let response = self.client.post(url).json(&body).send().await?;
        Self::read(response, method).await
    }
}

impl AccountResponse {
    fn into_session(self) -> Result<IdentitySession, IdentityError> {
        let id_token = self
            .id_token
            .ok_or_else(|| IdentityError::Malformed("account response without idToken".to_string()))?;
        Ok(IdentitySession {
            user: UserData {
                uid: self.local_id,
                display_name: self.display_name.filter(|n| !n.is_empty()),
                email: self.email,
                email_verified: self.email_verified,
            },
            id_token,
            refresh_token: self.refresh_token.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentitySession, IdentityError> {
        let account = self
            .accounts(
                "signInWithPassword",
                json!({"email": email, "password": password, "returnSecureToken": true}),
            )
            .await?;
        tracing::info!("User {} signed in", account.local_id);
        account.into_session()
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<IdentitySession, IdentityError> {
        let mut session = self
            .accounts(
                "signUp",
                json!({"email": email, "password": password, "returnSecureToken": true}),
            )
            .await?
            .into_session()?;
        tracing::info!("User {} registered", session.user.uid);

        if let Some(name) = display_name.map(str::trim).filter(|n| !n.is_empty()) {
            let updated = self
                .accounts(
                    "update",
                    json!({"idToken": session.id_token, "displayName": name, "returnSecureToken": true}),
                )
                .await?;
            session.user.display_name = updated.display_name.or_else(|| Some(name.to_string()));
            if let Some(id_token) = updated.id_token {
                session.id_token = id_token;
            }
            if let Some(refresh_token) = updated.refresh_token {
                session.refresh_token = refresh_token;
            }
        }

        Ok(session)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, IdentityError> {
        let url = format!("{}/token?{}", self.token_base_url, self.key_query());
        let body = format!(
            "grant_type=refresh_token&refresh_token={}",
            urlencoding::encode(refresh_token)
        );
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        let tokens: TokenResponse = Self::read(response, "token refresh").await?;
        Ok(RefreshedTokens {
            uid: tokens.user_id,
            id_token: tokens.id_token,
            refresh_token: tokens.refresh_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn provider(server: &mockito::Server) -> FirebaseIdentity {
        FirebaseIdentity::new("web-key", &server.url(), &server.url(), 5).unwrap()
    }

    #[test]
    fn test_error_code_and_messages() {
        let body = r#"{"error": {"code": 400, "message": "WEAK_PASSWORD : Password should be at least 6 characters"}}"#;
        assert_eq!(error_code(body), "WEAK_PASSWORD");
        assert_eq!(error_code("not json"), "UNKNOWN_ERROR");

        let err = IdentityError::Provider("INVALID_LOGIN_CREDENTIALS".into());
        assert_eq!(err.user_message("x"), "Invalid email or password");
        assert_eq!(err.status(), 401);

        let err = IdentityError::Provider("TOO_MANY_ATTEMPTS_TRY_LATER".into());
        assert_eq!(
            err.user_message("x"),
            "Too many failed login attempts. Please try again later."
        );
        assert_eq!(err.status(), 429);

        let err = IdentityError::Provider("OPERATION_NOT_ALLOWED".into());
        assert_eq!(err.user_message("Failed to create account"), "Failed to create account");
        assert_eq!(err.status(), 400);
    }

    #[tokio::test]
    async fn test_sign_in() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/accounts:signInWithPassword")
            .match_query(Matcher::UrlEncoded("key".into(), "web-key".into()))
            .match_body(Matcher::PartialJson(json!({"email": "ops@example.com", "returnSecureToken": true})))
            .with_status(200)
            .with_body(r#"{"localId": "u1", "email": "ops@example.com", "displayName": "", "idToken": "id-1", "refreshToken": "rf-1", "expiresIn": "3600", "registered": true}"#)
            .create_async()
            .await;

        let session = provider(&server).sign_in("ops@example.com", "secret1").await.unwrap();
        mock.assert_async().await;
        assert_eq!(session.user.uid, "u1");
        assert_eq!(session.user.display_name, None);
        assert_eq!(session.id_token, "id-1");
        assert_eq!(session.refresh_token, "rf-1");
    }

    #[tokio::test]
    async fn test_sign_in_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/accounts:signInWithPassword")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error": {"code": 400, "message": "EMAIL_NOT_FOUND", "errors": []}}"#)
            .create_async()
            .await;

        let err = provider(&server).sign_in("who@example.com", "pw").await.unwrap_err();
        assert_eq!(err.code(), Some("EMAIL_NOT_FOUND"));
        assert_eq!(err.user_message("x"), "Invalid email or password");
    }

    #[tokio::test]
    async fn test_sign_up_sets_display_name() {
        let mut server = mockito::Server::new_async().await;
        let sign_up = server
            .mock("POST", "/accounts:signUp")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"localId": "u2", "email": "new@example.com", "idToken": "id-2", "refreshToken": "rf-2", "expiresIn": "3600"}"#)
            .create_async()
            .await;
        let update = server
            .mock("POST", "/accounts:update")
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(json!({"idToken": "id-2", "displayName": "Asha"})))
            .with_status(200)
            .with_body(r#"{"localId": "u2", "email": "new@example.com", "displayName": "Asha"}"#)
            .create_async()
            .await;

        let session = provider(&server)
            .sign_up("new@example.com", "secret1", Some("Asha"))
            .await
            .unwrap();
        sign_up.assert_async().await;
        update.assert_async().await;
        assert_eq!(session.user.display_name.as_deref(), Some("Asha"));
        assert_eq!(session.id_token, "id-2");
    }

    #[tokio::test]
    async fn test_refresh_uses_form_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_query(Matcher::UrlEncoded("key".into(), "web-key".into()))
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::Exact("grant_type=refresh_token&refresh_token=rf-1".into()))
            .with_status(200)
            .with_body(r#"{"expires_in": "3600", "token_type": "Bearer", "refresh_token": "rf-9", "id_token": "id-9", "user_id": "u1", "project_id": "p"}"#)
            .create_async()
            .await;

        let tokens = provider(&server).refresh("rf-1").await.unwrap();
        mock.assert_async().await;
        assert_eq!(tokens.uid, "u1");
        assert_eq!(tokens.id_token, "id-9");
        assert_eq!(tokens.refresh_token, "rf-9");
    }
}
