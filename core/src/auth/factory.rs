//! Backend selection from settings.

use std::sync::Arc;

use super::desktop::DesktopBackend;
use super::local::LocalBackend;
use super::mock::MockBackend;
use super::remote::RemoteBackend;
use super::traits::CredentialBackend;
use crate::database::Repository;
use crate::error::AuthError;
use crate::services::settings::{AuthBackendKind, AuthSettings};

/// Build the credential backend named in the auth settings.
pub fn create_backend(
    settings: &AuthSettings,
    repo: Repository,
) -> Result<Arc<dyn CredentialBackend>, AuthError> {
    let timeout = settings.request_timeout();

    let backend: Arc<dyn CredentialBackend> = match settings.backend {
        AuthBackendKind::Local => Arc::new(LocalBackend::new(repo)),
        AuthBackendKind::Mock => Arc::new(MockBackend::new()),
        AuthBackendKind::Remote => {
            Arc::new(RemoteBackend::new(settings.remote_base_url.as_str(), timeout)?)
        }
        AuthBackendKind::Desktop => Arc::new(DesktopBackend::new(
            RemoteBackend::new(settings.remote_base_url.as_str(), timeout)?,
            LocalBackend::new(repo),
        )),
    };

    tracing::info!("Using {} credential backend", backend.name());
    Ok(backend)
}
