//! Offline credential backend backed by the local account table.
//!
//! Secrets are stored as Argon2id PHC strings. Refresh tokens are kept in
//! SQLite so a session restored after a restart can still be refreshed.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::PoisonError;
use uuid::Uuid;

use super::traits::*;
use crate::config::{ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_DAYS};
use crate::database::{NewUserRecord, Repository, UserRecord};
use crate::error::AuthError;

/// Local account backend.
pub struct LocalBackend {
    repo: Repository,
    access_ttl: chrono::Duration,
    refresh_ttl: chrono::Duration,
    /// uuid of the user signed in through this backend
    active_user: Mutex<Option<String>>,
}

impl LocalBackend {
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            access_ttl: chrono::Duration::seconds(ACCESS_TOKEN_TTL_SECS),
            refresh_ttl: chrono::Duration::days(REFRESH_TOKEN_TTL_DAYS),
            active_user: Mutex::new(None),
        }
    }

    pub fn with_access_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    pub fn with_refresh_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    async fn open_session(&self, record: &UserRecord) -> Result<Session, AuthError> {
        let now = chrono::Utc::now();
        self.repo.prune_refresh_tokens(now).await?;

        let session = Session::issue(User::from(record), self.access_ttl);
        self.repo
            .store_refresh_token(&session.refresh_token, &record.user_uuid, now + self.refresh_ttl)
            .await?;

        *self.active_user.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(record.user_uuid.clone());

        Ok(session)
    }
}

/// Hash a secret with Argon2id on the blocking pool.
async fn hash_secret(secret: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Storage(format!("Failed to hash secret: {}", e)))
    })
    .await
    .map_err(|e| AuthError::Storage(format!("Hashing task failed: {}", e)))?
}

async fn verify_secret(secret: String, stored_hash: String) -> bool {
    tokio::task::spawn_blocking(move || {
        PasswordHash::new(&stored_hash)
            .and_then(|parsed| Argon2::default().verify_password(secret.as_bytes(), &parsed))
            .is_ok()
    })
    .await
    .unwrap_or(false)
}

#[async_trait]
impl CredentialBackend for LocalBackend {
    fn name(&self) -> &str {
        "local"
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<Session, AuthError> {
        let record = self
            .repo
            .find_user_by_credential_id(&credentials.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // Accounts mirrored from the remote API carry no local secret
        let stored_hash = record
            .user_credential_code
            .clone()
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_secret(credentials.password.clone(), stored_hash).await {
            tracing::debug!("Local login rejected for {}", credentials.email);
            return Err(AuthError::InvalidCredentials);
        }

        self.repo.update_last_login(record.user_id).await?;
        tracing::info!("Local login for user {}", record.user_id);

        self.open_session(&record).await
    }

    async fn signup(&self, credentials: &SignupCredentials) -> Result<Session, AuthError> {
        if self
            .repo
            .find_user_by_credential_id(&credentials.email)
            .await?
            .is_some()
        {
            return Err(AuthError::AccountExists(credentials.email.clone()));
        }

        let hash = hash_secret(credentials.password.clone()).await?;
        let record = self
            .repo
            .create_user(NewUserRecord {
                user_uuid: Uuid::new_v4().to_string(),
                user_name: credentials.display_name(),
                user_profile_pic: None,
                user_credential_id: Some(credentials.email.clone()),
                user_credential_code: Some(hash),
            })
            .await?;

        tracing::info!("Created local account {}", record.user_id);
        self.open_session(&record).await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let user_uuid = self
            .repo
            .take_refresh_token(refresh_token)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        let record = self
            .repo
            .find_user_by_uuid(&user_uuid)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        self.open_session(&record).await
    }

    async fn logout(&self, session: Option<&Session>) -> Result<(), AuthError> {
        let active = self
            .active_user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        // A session restored from the vault was never opened here
        let user_uuid = session.map(|s| s.user.user_uuid.clone()).or(active);

        if let Some(user_uuid) = user_uuid {
            let revoked = self.repo.revoke_refresh_tokens(&user_uuid).await?;
            tracing::debug!("Revoked {} refresh tokens for {}", revoked, user_uuid);
        }
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        // Sessions are persisted by the session vault, not by this backend
        Ok(None)
    }
}
