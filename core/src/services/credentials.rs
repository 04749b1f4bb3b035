/// Session vault
/// Persists the signed-in session across restarts using the OS credential store
use crate::auth::Session;
use crate::config::{CREDENTIAL_SERVICE_NAME, SESSION_CREDENTIAL_KEY};
use crate::error::{AppError, Result};
use keyring::credential::{CredentialBuilderApi, CredentialPersistence};
use keyring::Entry;
use std::sync::{Mutex, PoisonError};

/// Storage for the one persisted session
pub trait SessionVault: Send + Sync {
    fn load(&self) -> Result<Option<Session>>;
    fn store(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Vault backed by the OS credential store
pub struct KeyringVault {
    service: String,
    key: String,
}

impl KeyringVault {
    pub fn new() -> Self {
        Self::with_entry(CREDENTIAL_SERVICE_NAME, SESSION_CREDENTIAL_KEY)
    }

    pub fn with_entry(service: &str, key: &str) -> Self {
        Self {
            service: service.to_string(),
            key: key.to_string(),
        }
    }

    /// Whether the platform store keeps entries after this process exits.
    /// False when keyring fell back to its in-memory mock store.
    pub fn is_persistent() -> bool {
        !matches!(
            keyring::default::default_credential_builder().persistence(),
            CredentialPersistence::EntryOnly | CredentialPersistence::ProcessOnly
        )
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, &self.key)
            .map_err(|e| AppError::Credential(format!("Failed to create keyring entry: {}", e)))
    }
}

impl Default for KeyringVault {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionVault for KeyringVault {
    fn load(&self) -> Result<Option<Session>> {
        let json = match self.entry()?.get_password() {
            Ok(json) => json,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(e) => {
                return Err(AppError::Credential(format!(
                    "Failed to retrieve session: {}",
                    e
                )))
            }
        };

        // A corrupt entry is treated as no session
        match serde_json::from_str(&json) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!("Discarding unreadable stored session: {}", e);
                Ok(None)
            }
        }
    }

    fn store(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_string(session)?;
        self.entry()?
            .set_password(&json)
            .map_err(|e| AppError::Credential(format!("Failed to store session: {}", e)))?;

        tracing::debug!("Session stored in credential manager");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {
                tracing::debug!("Session removed from credential manager");
                Ok(())
            }
            Err(e) => Err(AppError::Credential(format!(
                "Failed to delete session: {}",
                e
            ))),
        }
    }
}

/// In-process vault for tests and headless use
#[derive(Default)]
pub struct MemoryVault {
    session: Mutex<Option<Session>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionVault for MemoryVault {
    fn load(&self) -> Result<Option<Session>> {
        Ok(self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn store(&self, session: &Session) -> Result<()> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
