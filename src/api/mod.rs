//! Async HTTP client for the NextMove gateway. The three services sit
//! behind one base URL; routing happens on the path prefix
//! (`/auth-service`, `/user-service`, `/transaction-service`).

mod error;

pub(crate) use error::ApiError;

use std::sync::RwLock;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::models::{NewTransaction, Transaction, TransactionPatch};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransactionPage {
    #[serde(default)]
    content: Vec<Transaction>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UserProfile {
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) username: Option<String>,
}

/// Error body shape used by the services; both keys are seen in the wild.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ApiClient {
    pub(crate) fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    pub(crate) fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            "X-Requested-With",
            HeaderValue::from_static("XMLHttpRequest"),
        );

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    pub(crate) fn set_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = token;
        }
    }

    pub(crate) fn has_token(&self) -> bool {
        self.token.read().map(|t| t.is_some()).unwrap_or(false)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer token, failing fast when none is held.
    fn authed(&self, builder: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self
            .token
            .read()
            .ok()
            .and_then(|t| t.clone())
            .ok_or(ApiError::AuthRequired)?;
        Ok(builder.bearer_auth(token))
    }

    // ── auth-service ──────────────────────────────────────────

    /// Exchange credentials for a token. A 2xx answer without a token
    /// field is treated as a failure, not a silent half-login.
    pub(crate) async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        tracing::debug!(username, "POST /auth-service/auth/login");
        let response = self
            .http
            .post(self.url("/auth-service/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        let body: LoginResponse = Self::check(response).await?.json().await?;
        body.token.ok_or(ApiError::MissingToken)
    }

    pub(crate) async fn register(
        &self,
        name: &str,
        username: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        tracing::debug!(username, "POST /auth-service/auth/register");
        let response = self
            .http
            .post(self.url("/auth-service/auth/register"))
            .json(&json!({ "name": name, "username": username, "password": password }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub(crate) async fn logout(&self) -> Result<(), ApiError> {
        tracing::debug!("POST /auth-service/auth/logout");
        let request = self.authed(self.http.post(self.url("/auth-service/auth/logout")))?;
        Self::check(request.send().await?).await?;
        Ok(())
    }

    pub(crate) async fn validate(&self) -> Result<bool, ApiError> {
        tracing::debug!("GET /auth-service/auth/validate");
        let request = self.authed(self.http.get(self.url("/auth-service/auth/validate")))?;
        let response = request.send().await?;
        Ok(response.status().is_success())
    }

    // ── user-service ──────────────────────────────────────────

    pub(crate) async fn profile(&self) -> Result<UserProfile, ApiError> {
        tracing::debug!("GET /user-service/user/profile");
        let request = self.authed(self.http.get(self.url("/user-service/user/profile")))?;
        let profile = Self::check(request.send().await?).await?.json().await?;
        Ok(profile)
    }

    // ── transaction-service ───────────────────────────────────

    pub(crate) async fn list_transactions(&self) -> Result<Vec<Transaction>, ApiError> {
        tracing::debug!("GET /transaction-service/transaction");
        let request = self.authed(self.http.get(self.url("/transaction-service/transaction")))?;
        let page: TransactionPage = Self::check(request.send().await?).await?.json().await?;
        Ok(page.content)
    }

    pub(crate) async fn create_transaction(&self, txn: &NewTransaction) -> Result<(), ApiError> {
        tracing::debug!(title = %txn.title, "POST /transaction-service/transaction");
        let request = self.authed(
            self.http
                .post(self.url("/transaction-service/transaction"))
                .json(txn),
        )?;
        Self::check(request.send().await?).await?;
        Ok(())
    }

    pub(crate) async fn update_transaction(
        &self,
        id: &str,
        patch: &TransactionPatch,
    ) -> Result<(), ApiError> {
        tracing::debug!(id, "PUT /transaction-service/transaction/{{id}}");
        let request = self.authed(
            self.http
                .put(self.url(&format!("/transaction-service/transaction/{id}")))
                .json(patch),
        )?;
        Self::check(request.send().await?).await?;
        Ok(())
    }

    pub(crate) async fn delete_transaction(&self, id: &str) -> Result<(), ApiError> {
        tracing::debug!(id, "DELETE /transaction-service/transaction/{{id}}");
        let request = self.authed(
            self.http
                .delete(self.url(&format!("/transaction-service/transaction/{id}"))),
        )?;
        Self::check(request.send().await?).await?;
        Ok(())
    }

    // ── gateway ───────────────────────────────────────────────

    /// Unauthenticated liveness probe.
    pub(crate) async fn health(&self) -> Result<(), ApiError> {
        let response = self.http.get(self.url("/health")).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Turn a non-2xx answer into `ApiError::Server`, preferring whatever
    /// message the body carries over the bare status reason.
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or_else(|| status_reason(status));
        tracing::debug!(status = status.as_u16(), %message, "request failed");
        Err(ApiError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

fn status_reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(|r| r.to_string())
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

#[cfg(test)]
mod tests;
