//! Mock credential backend for development and testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use uuid::Uuid;

use super::traits::*;
use crate::config::ACCESS_TOKEN_TTL_SECS;
use crate::error::AuthError;

/// Mock backend.
///
/// Accepts any credentials, fabricates users, and remembers the last
/// session it issued. Failures and latency are configurable for tests.
pub struct MockBackend {
    session: Mutex<Option<Session>>,
    access_ttl: chrono::Duration,
    latency: Duration,
    fail_login: AtomicBool,
    fail_refresh: AtomicBool,
    fail_logout: AtomicBool,
    login_calls: AtomicU32,
    refresh_calls: AtomicU32,
    next_user_id: AtomicI64,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            session: Mutex::new(None),
            access_ttl: chrono::Duration::seconds(ACCESS_TOKEN_TTL_SECS),
            latency: Duration::ZERO,
            fail_login: AtomicBool::new(false),
            fail_refresh: AtomicBool::new(false),
            fail_logout: AtomicBool::new(false),
            login_calls: AtomicU32::new(0),
            refresh_calls: AtomicU32::new(0),
            next_user_id: AtomicI64::new(1),
        }
    }

    /// Lifetime of issued access tokens. A negative value issues sessions
    /// that are already expired.
    pub fn with_access_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    /// Simulated network delay applied to every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn set_fail_login(&self, fail: bool) {
        self.fail_login.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_refresh(&self, fail: bool) {
        self.fail_refresh.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_logout(&self, fail: bool) {
        self.fail_logout.store(fail, Ordering::SeqCst);
    }

    /// Number of login and signup calls.
    pub fn login_calls(&self) -> u32 {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> u32 {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn stored(&self) -> Option<Session> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn remember(&self, session: Option<Session>) {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = session;
    }

    fn issue(&self, user: User) -> Session {
        let session = Session::issue(user, self.access_ttl);
        self.remember(Some(session.clone()));
        session
    }

    fn offline() -> AuthError {
        AuthError::Backend("Mock backend offline".to_string())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<Session, AuthError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("Mock login for {}", credentials.email);
        self.simulate_latency().await;

        if self.fail_login.load(Ordering::SeqCst) {
            return Err(AuthError::InvalidCredentials);
        }

        let user = User {
            user_id: 1,
            user_name: email_local_part(&credentials.email),
            user_profile_pic: None,
            user_credential_id: Some(credentials.email.clone()),
            user_uuid: Uuid::new_v4().to_string(),
        };

        Ok(self.issue(user))
    }

    async fn signup(&self, credentials: &SignupCredentials) -> Result<Session, AuthError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("Mock signup for {}", credentials.email);
        self.simulate_latency().await;

        if self.fail_login.load(Ordering::SeqCst) {
            return Err(Self::offline());
        }

        let user = User {
            user_id: self.next_user_id.fetch_add(1, Ordering::SeqCst),
            user_name: credentials.display_name(),
            user_profile_pic: None,
            user_credential_id: Some(credentials.email.clone()),
            user_uuid: Uuid::new_v4().to_string(),
        };

        Ok(self.issue(user))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.fail_refresh.load(Ordering::SeqCst) {
            return Err(Self::offline());
        }

        match self.stored() {
            Some(current) if current.refresh_token == refresh_token => Ok(self.issue(current.user)),
            _ => Err(AuthError::InvalidRefreshToken),
        }
    }

    async fn logout(&self, _session: Option<&Session>) -> Result<(), AuthError> {
        self.simulate_latency().await;

        if self.fail_logout.load(Ordering::SeqCst) {
            return Err(Self::offline());
        }

        self.remember(None);
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.stored())
    }
}
