//! Session service
//!
//! Tracks who is signed in: anonymous, an operation in flight, or an
//! authenticated session. Login and signup errors reach the caller; a failed
//! silent refresh just signs the user out.

use crate::auth::{CredentialBackend, LoginCredentials, Session, SignupCredentials};
use crate::database::Repository;
use crate::error::AuthError;
use crate::services::credentials::SessionVault;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    /// Login, signup, refresh or logout in flight
    Pending,
    Authenticated(Session),
}

/// [`SessionState`] without the session payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Pending,
    Authenticated,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionState::Anonymous => SessionPhase::Anonymous,
            SessionState::Pending => SessionPhase::Pending,
            SessionState::Authenticated(_) => SessionPhase::Authenticated,
        }
    }
}

/// Owns the session state and the backend that produces sessions.
///
/// Concurrent operations are not serialized: each sets `Pending` when it
/// starts and writes its own outcome when it finishes, so the last one to
/// finish wins.
pub struct SessionManager {
    backend: Arc<dyn CredentialBackend>,
    vault: Arc<dyn SessionVault>,
    users: Option<Repository>,
    request_timeout: Option<Duration>,
    state: RwLock<SessionState>,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn CredentialBackend>, vault: Arc<dyn SessionVault>) -> Self {
        Self {
            backend,
            vault,
            users: None,
            request_timeout: None,
            state: RwLock::new(SessionState::Anonymous),
        }
    }

    /// Abort backend calls that take longer than `timeout`.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Mirror every signed-in user into the local account table.
    pub fn with_user_records(mut self, repo: Repository) -> Self {
        self.users = Some(repo);
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub async fn phase(&self) -> SessionPhase {
        self.state.read().await.phase()
    }

    async fn set_state(&self, state: SessionState) {
        *self.state.write().await = state;
    }

    async fn call<T, F>(&self, operation: F) -> Result<T, AuthError>
    where
        F: Future<Output = Result<T, AuthError>>,
    {
        match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, operation)
                .await
                .map_err(|_| AuthError::Timeout(limit))?,
            None => operation.await,
        }
    }

    /// Adopt a session: persist it, mirror the user, then publish it.
    async fn establish(&self, session: &Session) {
        if let Err(e) = self.vault.store(session) {
            tracing::warn!("Failed to persist session: {}", e);
        }

        if let Some(repo) = &self.users {
            if let Err(e) = repo.upsert_user(session.user.to_record()).await {
                tracing::warn!("Failed to mirror user {}: {}", session.user.user_uuid, e);
            }
        }

        self.set_state(SessionState::Authenticated(session.clone()))
            .await;
    }

    async fn drop_session(&self) {
        if let Err(e) = self.vault.clear() {
            tracing::warn!("Failed to clear stored session: {}", e);
        }
        self.set_state(SessionState::Anonymous).await;
    }

    /// Pick up where the last run left off.
    ///
    /// Prefers the session in the vault, then whatever the backend itself
    /// remembers. An expired session is kept and refreshed on first use.
    pub async fn restore(&self) -> SessionPhase {
        let stored = match self.vault.load() {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Failed to read stored session: {}", e);
                None
            }
        };

        let restored = match stored {
            Some(session) => Some(session),
            None => match self.call(self.backend.current_session()).await {
                Ok(session) => session,
                Err(e) => {
                    tracing::warn!("Backend session lookup failed: {}", e);
                    None
                }
            },
        };

        match restored {
            Some(session) => {
                tracing::info!("Restored session for user {}", session.user.user_id);
                self.establish(&session).await;
            }
            None => self.set_state(SessionState::Anonymous).await,
        }

        self.phase().await
    }

    pub async fn login(&self, identifier: &str, secret: &str) -> Result<Session, AuthError> {
        let credentials = LoginCredentials {
            email: identifier.to_string(),
            password: secret.to_string(),
        };

        self.set_state(SessionState::Pending).await;
        match self.call(self.backend.login(&credentials)).await {
            Ok(session) => {
                tracing::info!("Signed in as user {}", session.user.user_id);
                self.establish(&session).await;
                Ok(session)
            }
            Err(e) => {
                tracing::debug!("Login failed: {}", e);
                self.set_state(SessionState::Anonymous).await;
                Err(e)
            }
        }
    }

    pub async fn signup(
        &self,
        identifier: &str,
        secret: &str,
        display_name: Option<String>,
    ) -> Result<Session, AuthError> {
        let credentials = SignupCredentials {
            email: identifier.to_string(),
            password: secret.to_string(),
            name: display_name,
        };

        self.set_state(SessionState::Pending).await;
        match self.call(self.backend.signup(&credentials)).await {
            Ok(session) => {
                tracing::info!("Signed up user {}", session.user.user_id);
                self.establish(&session).await;
                Ok(session)
            }
            Err(e) => {
                tracing::debug!("Signup failed: {}", e);
                self.set_state(SessionState::Anonymous).await;
                Err(e)
            }
        }
    }

    /// Sign out. Always ends anonymous, even when the backend fails.
    pub async fn logout(&self) {
        let held = match &*self.state.read().await {
            SessionState::Authenticated(session) => Some(session.clone()),
            SessionState::Anonymous | SessionState::Pending => None,
        };
        self.set_state(SessionState::Pending).await;

        if let Err(e) = self.call(self.backend.logout(held.as_ref())).await {
            tracing::warn!("Backend logout failed: {}", e);
        }

        self.drop_session().await;
        tracing::info!("Signed out");
    }

    /// The live session, refreshing it once if the access token expired.
    pub async fn current_session(&self) -> Option<Session> {
        let held = match &*self.state.read().await {
            SessionState::Authenticated(session) => session.clone(),
            SessionState::Anonymous | SessionState::Pending => return None,
        };

        if !held.is_expired() {
            return Some(held);
        }

        tracing::debug!("Access token expired, refreshing");
        self.set_state(SessionState::Pending).await;

        match self.call(self.backend.refresh_session(&held.refresh_token)).await {
            Ok(session) => {
                self.establish(&session).await;
                Some(session)
            }
            Err(e) => {
                tracing::warn!("Session refresh failed, signing out: {}", e);
                self.drop_session().await;
                None
            }
        }
    }

    /// Gate for actions that need a signed-in user.
    pub async fn require_session(&self) -> Result<Session, AuthError> {
        self.current_session()
            .await
            .ok_or(AuthError::NotAuthenticated)
    }
}
