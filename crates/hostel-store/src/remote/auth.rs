//! Password-grant auth against the hosted auth endpoint.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::client::{RemoteBackend, RemoteConfig, api_message};
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Tokens returned by a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

/// Profile metadata stored with a new account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignUpData {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
}

/// Client for `{url}/auth/v1`.
#[derive(Debug, Clone)]
pub struct AuthClient {
    backend: RemoteBackend,
}

impl AuthClient {
    pub fn new(config: &RemoteConfig) -> StoreResult<Self> {
        Ok(Self {
            backend: RemoteBackend::new(config)?,
        })
    }

    pub(crate) fn auth_url(&self, path: &str) -> StoreResult<Url> {
        Url::parse(&format!("{}/auth/v1{path}", self.backend.base_url()))
            .map_err(|e| StoreError::Config(format!("invalid backend url: {e}")))
    }

    async fn post(
        &self,
        url: Url,
        bearer: Option<&str>,
        body: &serde_json::Value,
    ) -> StoreResult<reqwest::Response> {
        let client = match bearer {
            Some(token) => self.backend.clone().with_access_token(token),
            None => self.backend.clone(),
        };
        let resp = client.raw(reqwest::Method::POST, url).json(body).send().await?;
        auth_status(resp).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> StoreResult<AuthTokens> {
        let mut url = self.auth_url("/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let resp = self
            .post(url, None, &json!({ "email": email, "password": password }))
            .await?;
        let tokens: AuthTokens = resp.json().await?;
        info!(user_id = %tokens.user.id, "Signed in");
        Ok(tokens)
    }

    /// Register a student account. The role is always `student`.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        data: &SignUpData,
    ) -> StoreResult<AuthUser> {
        let mut metadata = serde_json::to_value(data)?;
        if let Some(obj) = metadata.as_object_mut() {
            obj.insert("role".into(), json!("student"));
        }
        let body = json!({ "email": email, "password": password, "data": metadata });

        let resp = self.post(self.auth_url("/signup")?, None, &body).await?;
        let value: serde_json::Value = resp.json().await?;
        // Depending on email confirmation the user is top-level or nested.
        let user = value.get("user").cloned().unwrap_or(value);
        Ok(serde_json::from_value(user)?)
    }

    pub async fn sign_out(&self, access_token: &str) -> StoreResult<()> {
        self.post(self.auth_url("/logout")?, Some(access_token), &json!({}))
            .await?;
        info!("Signed out");
        Ok(())
    }

    pub async fn update_password(&self, access_token: &str, password: &str) -> StoreResult<()> {
        let client = self.backend.clone().with_access_token(access_token);
        let resp = client
            .raw(reqwest::Method::PUT, self.auth_url("/user")?)
            .json(&json!({ "password": password }))
            .send()
            .await?;
        auth_status(resp).await?;
        Ok(())
    }
}

/// Auth endpoints answer bad credentials with 400, so every failure here is an auth failure.
async fn auth_status(resp: reqwest::Response) -> StoreResult<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = api_message(&body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string());
    if status.is_client_error() {
        Err(StoreError::Auth(message))
    } else {
        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
