//! Remote account API backend.
//!
//! JSON over HTTP:
//! - `POST {base}/auth/login`, `/auth/signup`, `/auth/refresh` return a session
//! - `POST {base}/auth/logout`
//! - `GET {base}/user/profile` with a bearer token returns the user

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::traits::*;
use crate::error::AuthError;

/// Remote backend.
pub struct RemoteBackend {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
    /// Last session obtained from the API
    last_session: Mutex<Option<Session>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

impl RemoteBackend {
    /// Create a client for the API at `base_url`, with an optional
    /// per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, AuthError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| AuthError::Backend(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            last_session: Mutex::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn remembered(&self) -> Option<Session> {
        self.last_session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn remember(&self, session: Option<Session>) {
        *self.last_session.lock().unwrap_or_else(PoisonError::into_inner) = session;
    }

    fn transport_error(&self, err: reqwest::Error) -> AuthError {
        match self.timeout {
            Some(limit) if err.is_timeout() => AuthError::Timeout(limit),
            _ => AuthError::from(err),
        }
    }

    /// Reject non-2xx responses with their status line.
    fn check(response: Response) -> Result<Response, AuthError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        Err(AuthError::Rejected {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        })
    }

    async fn post_for_session<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Session, AuthError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let session: Session = Self::check(response)?
            .json()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.remember(Some(session.clone()));
        Ok(session)
    }
}

#[async_trait]
impl CredentialBackend for RemoteBackend {
    fn name(&self) -> &str {
        "remote"
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<Session, AuthError> {
        tracing::debug!("Remote login for {}", credentials.email);
        self.post_for_session("auth/login", credentials).await
    }

    async fn signup(&self, credentials: &SignupCredentials) -> Result<Session, AuthError> {
        tracing::debug!("Remote signup for {}", credentials.email);
        self.post_for_session("auth/signup", credentials).await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError> {
        self.post_for_session("auth/refresh", &RefreshRequest { refresh_token })
            .await
    }

    async fn logout(&self, session: Option<&Session>) -> Result<(), AuthError> {
        // Forget locally before telling the server
        let previous = self.remembered();
        self.remember(None);

        let access_token = session
            .map(|s| s.access_token.clone())
            .or(previous.map(|s| s.access_token));

        let mut request = self.client.post(self.url("auth/logout"));
        if let Some(access_token) = access_token {
            request = request.bearer_auth(access_token);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        Self::check(response)?;
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        let Some(session) = self.remembered() else {
            return Ok(None);
        };

        // Expired tokens are the session manager's to refresh
        if session.is_expired() {
            return Ok(Some(session));
        }

        let response = self
            .client
            .get(self.url("user/profile"))
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let user: User = Self::check(response)?
            .json()
            .await
            .map_err(|e| self.transport_error(e))?;

        let session = Session { user, ..session };
        self.remember(Some(session.clone()));
        Ok(Some(session))
    }
}
