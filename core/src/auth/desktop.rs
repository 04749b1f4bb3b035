//! Desktop backend: the remote API first, local accounts when it fails.

use async_trait::async_trait;

use super::local::LocalBackend;
use super::remote::RemoteBackend;
use super::traits::*;
use crate::error::AuthError;

/// Remote-first backend with offline fallback.
///
/// Login, refresh and current-session lookups fall back to local accounts
/// when the remote call fails. Signup only goes to the remote API.
pub struct DesktopBackend {
    remote: RemoteBackend,
    local: LocalBackend,
}

impl DesktopBackend {
    pub fn new(remote: RemoteBackend, local: LocalBackend) -> Self {
        Self { remote, local }
    }
}

#[async_trait]
impl CredentialBackend for DesktopBackend {
    fn name(&self) -> &str {
        "desktop"
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<Session, AuthError> {
        match self.remote.login(credentials).await {
            Ok(session) => Ok(session),
            Err(e) => {
                tracing::warn!("Remote login failed, falling back to local: {}", e);
                self.local.login(credentials).await
            }
        }
    }

    async fn signup(&self, credentials: &SignupCredentials) -> Result<Session, AuthError> {
        self.remote.signup(credentials).await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError> {
        match self.remote.refresh_session(refresh_token).await {
            Ok(session) => Ok(session),
            Err(e) => {
                tracing::warn!("Remote refresh failed, falling back to local: {}", e);
                self.local.refresh_session(refresh_token).await
            }
        }
    }

    async fn logout(&self, session: Option<&Session>) -> Result<(), AuthError> {
        let remote = self.remote.logout(session).await;
        if let Err(e) = &remote {
            tracing::warn!("Remote logout failed: {}", e);
        }

        self.local.logout(session).await?;
        remote
    }

    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        match self.remote.current_session().await {
            Ok(Some(session)) => Ok(Some(session)),
            Ok(None) => self.local.current_session().await,
            Err(e) => {
                tracing::warn!("Remote profile lookup failed: {}", e);
                self.local.current_session().await
            }
        }
    }
}
