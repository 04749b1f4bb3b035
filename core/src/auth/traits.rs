//! Core types for credential backends.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::TOKEN_LENGTH;
use crate::database::{NewUserRecord, UserRecord};
use crate::error::AuthError;

/// Identity carried by a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "lofi_zone_user_id")]
    pub user_id: i64,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_profile_pic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_credential_id: Option<String>,
    pub user_uuid: String,
}

impl User {
    /// Record used to mirror this identity into the local account table.
    pub fn to_record(&self) -> NewUserRecord {
        NewUserRecord {
            user_uuid: self.user_uuid.clone(),
            user_name: self.user_name.clone(),
            user_profile_pic: self.user_profile_pic.clone(),
            user_credential_id: self.user_credential_id.clone(),
            user_credential_code: None,
        }
    }
}

impl From<&UserRecord> for User {
    fn from(record: &UserRecord) -> Self {
        Self {
            user_id: record.user_id,
            user_name: record.user_name.clone(),
            user_profile_pic: record.user_profile_pic.clone(),
            user_credential_id: record.user_credential_id.clone(),
            user_uuid: record.user_uuid.clone(),
        }
    }
}

/// Authenticated session: tokens plus the identity they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry of the access token, epoch milliseconds on the wire.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

impl Session {
    /// Mint a session with fresh random tokens.
    pub fn issue(user: User, access_ttl: Duration) -> Self {
        Self {
            access_token: random_token(),
            refresh_token: random_token(),
            expires_at: millis_precision(Utc::now() + access_ttl),
            user,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

fn random_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

// The wire format carries milliseconds; keep in-memory sessions equal to
// their serialized form.
fn millis_precision(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at)
}

/// Login request.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Signup request.
#[derive(Clone, Serialize, Deserialize)]
pub struct SignupCredentials {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SignupCredentials {
    /// Display name for the new account, falling back to the e-mail local part.
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => email_local_part(&self.email),
        }
    }
}

impl fmt::Debug for SignupCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

/// The part of an e-mail address before the `@`.
pub fn email_local_part(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

/// Credential backend trait.
///
/// Implemented by every way the app can obtain a session: offline local
/// accounts, the remote account API, and a mock for development.
#[async_trait]
pub trait CredentialBackend: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Exchange credentials for a session.
    async fn login(&self, credentials: &LoginCredentials) -> Result<Session, AuthError>;

    /// Create an identity, then a session for it.
    async fn signup(&self, credentials: &SignupCredentials) -> Result<Session, AuthError>;

    /// Trade a refresh token for a new session.
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError>;

    /// Discard whatever the backend holds for `session`, the session being
    /// signed out. It may predate this process, e.g. one restored from the
    /// vault after a restart.
    async fn logout(&self, session: Option<&Session>) -> Result<(), AuthError>;

    /// The session the backend itself considers current, if any.
    async fn current_session(&self) -> Result<Option<Session>, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            user_id: 7,
            user_name: "ada".to_string(),
            user_profile_pic: None,
            user_credential_id: Some("ada@example.com".to_string()),
            user_uuid: "uuid-7".to_string(),
        }
    }

    #[test]
    fn test_session_wire_format() {
        let session = Session::issue(user(), Duration::minutes(15));
        let json = serde_json::to_value(&session).unwrap();

        assert!(json["accessToken"].is_string());
        assert!(json["refreshToken"].is_string());
        assert_eq!(json["expiresAt"], session.expires_at.timestamp_millis());
        assert_eq!(json["user"]["lofi_zone_user_id"], 7);
        assert_eq!(json["user"]["user_credential_id"], "ada@example.com");
        assert!(json["user"].get("user_profile_pic").is_none());

        let back: Session = serde_json::from_value(json).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn test_issued_tokens_differ() {
        let a = Session::issue(user(), Duration::minutes(15));
        let b = Session::issue(user(), Duration::minutes(15));

        assert_eq!(a.access_token.len(), TOKEN_LENGTH);
        assert_ne!(a.access_token, b.access_token);
        assert_ne!(a.access_token, a.refresh_token);
    }

    #[test]
    fn test_expiry() {
        let live = Session::issue(user(), Duration::minutes(15));
        let stale = Session::issue(user(), Duration::seconds(-1));

        assert!(!live.is_expired());
        assert!(stale.is_expired());
        assert!(live.is_expired_at(live.expires_at));
    }

    #[test]
    fn test_display_name_fallback() {
        let named = SignupCredentials {
            email: "ada@example.com".to_string(),
            password: "pw".to_string(),
            name: Some("Ada Lovelace".to_string()),
        };
        assert_eq!(named.display_name(), "Ada Lovelace");

        let unnamed = SignupCredentials {
            name: Some("  ".to_string()),
            ..named.clone()
        };
        assert_eq!(unnamed.display_name(), "ada");
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = LoginCredentials {
            email: "ada@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("hunter2"));
    }
}
