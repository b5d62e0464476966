//! Blocking facade over the async HTTP client. The TUI event loop is
//! synchronous, so the backend owns a tokio runtime and exposes plain
//! methods that block on each call. The 30-second health poll is the one
//! long-lived task, spawned on that runtime and aborted on shutdown.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

use crate::api::{ApiClient, ApiError};
use crate::config::Config;
use crate::models::{NewTransaction, Transaction, TransactionPatch, User};
use crate::session::{Session, SessionState, TokenStore};

const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HealthStatus {
    Checking,
    Online,
    Offline,
}

/// Written by the poll task, read by the render loop.
struct HealthShared {
    // 0 = checking, 1 = online, 2 = offline
    status: AtomicU8,
    latency_ms: AtomicU64,
}

pub(crate) struct Backend {
    runtime: Runtime,
    api: Arc<ApiClient>,
    pub(crate) session: Session,
    health: Arc<HealthShared>,
    health_task: Option<JoinHandle<()>>,
}

impl Backend {
    pub(crate) fn new(config: &Config, store: TokenStore) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("Failed to start async runtime")?;
        let api = Arc::new(ApiClient::new(&config.api_url)?);

        let mut session = Session::new(store);
        if let Some(token) = session.bootstrap() {
            api.set_token(Some(token));
        }

        Ok(Self {
            runtime,
            api,
            session,
            health: Arc::new(HealthShared {
                status: AtomicU8::new(0),
                latency_ms: AtomicU64::new(0),
            }),
            health_task: None,
        })
    }

    pub(crate) fn state(&self) -> &SessionState {
        &self.session.state
    }

    // ── auth ──────────────────────────────────────────────────

    pub(crate) fn login(&mut self, username: &str, password: &str) -> Result<User> {
        let token = self.runtime.block_on(self.api.login(username, password))?;
        let mut user = self.session.login_succeeded(&token, username)?;
        self.api.set_token(Some(token));

        // Best effort: the user-service may hold a nicer display name than
        // the token claims. Failure here must not fail the login.
        if let Ok(profile) = self.runtime.block_on(self.api.profile()) {
            if let Some(name) = profile.name.filter(|n| !n.is_empty()) {
                user.name = name;
                self.session.state = SessionState::Authenticated(user.clone());
            }
        }
        Ok(user)
    }

    /// Registration only reports the outcome; it never signs the user in.
    pub(crate) fn register(&mut self, name: &str, username: &str, password: &str) -> Result<()> {
        self.runtime
            .block_on(self.api.register(name, username, password))?;
        Ok(())
    }

    /// Check a restored token against the auth-service. An explicit
    /// rejection clears the session; an unreachable server keeps it, the
    /// next authenticated call will sort it out.
    pub(crate) fn validate_session(&mut self) -> bool {
        if !self.session.state.is_authenticated() {
            return false;
        }
        match self.runtime.block_on(self.api.validate()) {
            Ok(true) | Err(ApiError::Timeout) | Err(ApiError::Connection) => true,
            Ok(false) | Err(_) => {
                tracing::debug!("stored token rejected by auth-service");
                self.session.clear_local();
                self.api.set_token(None);
                false
            }
        }
    }

    /// The remote call is courtesy only; local state is cleared no matter
    /// what the server answers.
    pub(crate) fn logout(&mut self) {
        if self.api.has_token() {
            if let Err(err) = self.runtime.block_on(self.api.logout()) {
                tracing::debug!(%err, "remote logout failed, clearing locally anyway");
            }
        }
        self.session.clear_local();
        self.api.set_token(None);
    }

    // ── transactions ──────────────────────────────────────────

    pub(crate) fn transactions(&mut self) -> Result<Vec<Transaction>> {
        let result = self.runtime.block_on(self.api.list_transactions());
        self.guard(result)
    }

    pub(crate) fn create_transaction(&mut self, txn: &NewTransaction) -> Result<()> {
        let result = self.runtime.block_on(self.api.create_transaction(txn));
        self.guard(result)
    }

    pub(crate) fn update_transaction(&mut self, id: &str, patch: &TransactionPatch) -> Result<()> {
        let result = self.runtime.block_on(self.api.update_transaction(id, patch));
        self.guard(result)
    }

    pub(crate) fn delete_transaction(&mut self, id: &str) -> Result<()> {
        let result = self.runtime.block_on(self.api.delete_transaction(id));
        self.guard(result)
    }

    /// A 401/403 means the token is dead: drop the session locally before
    /// surfacing the error so the UI lands back on the login view.
    fn guard<T>(&mut self, result: Result<T, ApiError>) -> Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                if err.is_auth_error() {
                    tracing::debug!("authenticated call rejected, forcing local logout");
                    self.session.clear_local();
                    self.api.set_token(None);
                }
                Err(err.into())
            }
        }
    }

    // ── connectivity monitor ──────────────────────────────────

    pub(crate) fn start_health_poll(&mut self) {
        if self.health_task.is_some() {
            return;
        }
        let api = Arc::clone(&self.api);
        let shared = Arc::clone(&self.health);
        self.health_task = Some(self.runtime.spawn(async move {
            loop {
                let started = Instant::now();
                match api.health().await {
                    Ok(()) => {
                        let ms = started.elapsed().as_millis().min(u64::MAX as u128) as u64;
                        shared.latency_ms.store(ms, Ordering::Relaxed);
                        shared.status.store(1, Ordering::Relaxed);
                    }
                    Err(_) => shared.status.store(2, Ordering::Relaxed),
                }
                tokio::time::sleep(HEALTH_POLL_INTERVAL).await;
            }
        }));
    }

    pub(crate) fn stop_health_poll(&mut self) {
        if let Some(task) = self.health_task.take() {
            task.abort();
        }
    }

    pub(crate) fn health_status(&self) -> (HealthStatus, Option<u64>) {
        match self.health.status.load(Ordering::Relaxed) {
            1 => (
                HealthStatus::Online,
                Some(self.health.latency_ms.load(Ordering::Relaxed)),
            ),
            2 => (HealthStatus::Offline, None),
            _ => (HealthStatus::Checking, None),
        }
    }
}

impl Drop for Backend {
    fn drop(&mut self) {
        self.stop_health_poll();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::models::TransactionStatus;

    fn fake_token(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#);
        format!("{header}.{}.sig", URL_SAFE_NO_PAD.encode(payload))
    }

    fn config_for(api_url: String) -> Config {
        Config {
            api_url,
            app_name: "NextMove".into(),
            app_version: "0.0.0".into(),
            is_development: false,
        }
    }

    /// Token store seeded with a decodable token, so the backend boots
    /// into the authenticated state.
    fn seeded_store(dir: &tempfile::TempDir) -> TokenStore {
        let store = TokenStore::new(dir.path().join("auth_token"));
        store
            .save(&fake_token(r#"{"id":"u1","sub":"ana@example.com"}"#))
            .unwrap();
        store
    }

    #[test]
    fn test_rejected_call_clears_session_and_token_file() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        rt.block_on(
            Mock::given(method("GET"))
                .and(path("/transaction-service/transaction"))
                .respond_with(
                    ResponseTemplate::new(401).set_body_json(json!({ "message": "expired" })),
                )
                .mount(&server),
        );

        let dir = tempfile::tempdir().unwrap();
        let mut backend = Backend::new(&config_for(server.uri()), seeded_store(&dir)).unwrap();
        assert!(backend.state().is_authenticated());

        let err = backend.transactions().unwrap_err();
        assert!(err.to_string().contains("expired"));
        // The dead token must be gone locally before the error surfaces.
        assert!(!backend.state().is_authenticated());
        assert!(!dir.path().join("auth_token").exists());
    }

    #[test]
    fn test_validate_session_clears_rejected_token() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        rt.block_on(
            Mock::given(method("GET"))
                .and(path("/auth-service/auth/validate"))
                .respond_with(ResponseTemplate::new(401))
                .mount(&server),
        );

        let dir = tempfile::tempdir().unwrap();
        let mut backend = Backend::new(&config_for(server.uri()), seeded_store(&dir)).unwrap();

        assert!(!backend.validate_session());
        assert!(!backend.state().is_authenticated());
        assert!(!dir.path().join("auth_token").exists());
    }

    #[test]
    fn test_validate_session_keeps_session_when_server_unreachable() {
        // Bind then drop a listener so the port is known to be closed.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let dir = tempfile::tempdir().unwrap();
        let mut backend =
            Backend::new(&config_for(format!("http://127.0.0.1:{port}")), seeded_store(&dir))
                .unwrap();

        assert!(backend.validate_session());
        assert!(backend.state().is_authenticated());
        assert!(dir.path().join("auth_token").exists());
    }

    #[test]
    fn test_status_cycle_sends_a_status_only_patch() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        rt.block_on(
            Mock::given(method("PUT"))
                .and(path("/transaction-service/transaction/t1"))
                .and(body_json(json!({ "status": "COMPLETED" })))
                .respond_with(ResponseTemplate::new(200))
                .expect(1)
                .mount(&server),
        );

        let dir = tempfile::tempdir().unwrap();
        let mut backend = Backend::new(&config_for(server.uri()), seeded_store(&dir)).unwrap();

        let patch = TransactionPatch::status_only(TransactionStatus::Pending.cycled());
        backend.update_transaction("t1", &patch).unwrap();
        assert!(backend.state().is_authenticated());
    }
}
