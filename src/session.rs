use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

use crate::models::User;

pub(crate) const MIN_PASSWORD_LEN: usize = 6;

// Same loose shape check the login form always used. Real validation is
// the auth-service's job.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // literal pattern, cannot fail
    Regex::new(r"^\S+@\S+\.\S+$").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SessionState {
    Unauthenticated,
    Checking,
    Authenticated(User),
}

impl SessionState {
    pub(crate) fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub(crate) fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// The only state persisted on disk: the raw bearer token, in a file
/// under the platform data directory.
pub(crate) struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn load(&self) -> Option<String> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let token = raw.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    pub(crate) fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&self.path, token)
            .with_context(|| format!("Failed to write token file {}", self.path.display()))
    }

    pub(crate) fn clear(&self) {
        // A missing file is already the state we want.
        let _ = fs::remove_file(&self.path);
    }
}

pub(crate) struct Session {
    pub(crate) state: SessionState,
    store: TokenStore,
}

impl Session {
    pub(crate) fn new(store: TokenStore) -> Self {
        Self {
            state: SessionState::Unauthenticated,
            store,
        }
    }

    /// Restore a session from the stored token, if any. The token is only
    /// decoded locally; an undecodable token is discarded, not reported.
    /// Returns the token so the caller can arm the HTTP client with it.
    pub(crate) fn bootstrap(&mut self) -> Option<String> {
        let token = self.store.load()?;
        self.state = SessionState::Checking;
        match User::from_stored_token(&token) {
            Some(user) => {
                tracing::debug!(username = %user.username, "session restored from stored token");
                self.state = SessionState::Authenticated(user);
                Some(token)
            }
            None => {
                tracing::debug!("stored token is not decodable, discarding");
                self.store.clear();
                self.state = SessionState::Unauthenticated;
                None
            }
        }
    }

    /// Record a successful login: persist the token and derive the user
    /// from its claims, with the typed username as the fallback identity.
    pub(crate) fn login_succeeded(&mut self, token: &str, username: &str) -> Result<User> {
        let user = User::from_login(token, username)
            .ok_or_else(|| anyhow::anyhow!("Received an undecodable token from the server"))?;
        self.store.save(token)?;
        self.state = SessionState::Authenticated(user.clone());
        Ok(user)
    }

    /// Drop all local session state. Used by both voluntary logout and the
    /// forced logout on a 401/403; remote failures never block this.
    pub(crate) fn clear_local(&mut self) {
        self.store.clear();
        self.state = SessionState::Unauthenticated;
    }
}

pub(crate) fn validate_login(username: &str, password: &str) -> Result<(), String> {
    if !EMAIL_RE.is_match(username.trim()) {
        return Err("Enter a valid email address".into());
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    Ok(())
}

pub(crate) fn validate_registration(
    name: &str,
    username: &str,
    password: &str,
) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".into());
    }
    validate_login(username, password)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    use super::*;

    fn fake_token(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#);
        format!("{header}.{}.sig", URL_SAFE_NO_PAD.encode(payload))
    }

    fn temp_store() -> (tempfile::TempDir, TokenStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("auth_token"));
        (dir, store)
    }

    #[test]
    fn test_bootstrap_without_token_stays_unauthenticated() {
        let (_dir, store) = temp_store();
        let mut session = Session::new(store);
        assert_eq!(session.bootstrap(), None);
        assert_eq!(session.state, SessionState::Unauthenticated);
    }

    #[test]
    fn test_bootstrap_restores_user_from_stored_token() {
        let (_dir, store) = temp_store();
        let token = fake_token(r#"{"id":"u1","sub":"ana@example.com","name":"Ana"}"#);
        store.save(&token).unwrap();

        let mut session = Session::new(store);
        assert_eq!(session.bootstrap(), Some(token));
        let user = session.state.user().unwrap();
        assert_eq!(user.name, "Ana");
        assert_eq!(user.username, "ana@example.com");
    }

    #[test]
    fn test_bootstrap_discards_undecodable_token() {
        let (_dir, store) = temp_store();
        store.save("garbage").unwrap();

        let mut session = Session::new(store);
        assert_eq!(session.bootstrap(), None);
        assert_eq!(session.state, SessionState::Unauthenticated);
        // The bad token must not survive for the next start.
        assert!(session.store.load().is_none());
    }

    #[test]
    fn test_login_persists_token_and_clear_removes_it() {
        let (_dir, store) = temp_store();
        let mut session = Session::new(store);
        let token = fake_token(r#"{"id":"u2"}"#);

        let user = session.login_succeeded(&token, "bob@example.com").unwrap();
        assert_eq!(user.name, "bob");
        assert!(session.state.is_authenticated());
        assert_eq!(session.store.load(), Some(token));

        session.clear_local();
        assert_eq!(session.state, SessionState::Unauthenticated);
        assert!(session.store.load().is_none());
    }

    #[test]
    fn test_login_validation() {
        assert!(validate_login("ana@example.com", "secret1").is_ok());
        assert!(validate_login("not-an-email", "secret1").is_err());
        assert!(validate_login("ana@example.com", "short").is_err());
        // Exactly the minimum length passes.
        assert!(validate_login("ana@example.com", "123456").is_ok());
    }

    #[test]
    fn test_registration_requires_name() {
        assert!(validate_registration("", "ana@example.com", "secret1").is_err());
        assert!(validate_registration("  ", "ana@example.com", "secret1").is_err());
        assert!(validate_registration("Ana", "ana@example.com", "secret1").is_ok());
    }
}
