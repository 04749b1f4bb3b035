//! Error types for LofiZone
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to the frontend.

use crate::database::QuestType;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Credential store error: {0}")]
    Credential(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Generic(String),
}

/// Rejections raised when a quest write would break the quest hierarchy
/// or carries an unusable field value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Quest title must not be empty")]
    EmptyTitle,

    #[error("Estimated time must be at least one minute")]
    InvalidEstimatedTime,

    #[error("A chapter cannot depend on another quest")]
    ChapterCannotHaveParent,

    #[error("A {child} cannot depend on a {parent}")]
    InvalidParentType { child: QuestType, parent: QuestType },

    #[error("Parent quest not found: {0}")]
    ParentNotFound(String),

    #[error("Quest {0} cannot depend on itself")]
    SelfReference(String),

    #[error("Depending on {0} would create a cycle")]
    Cycle(String),
}

/// Authentication failures surfaced by credential backends and the
/// session manager.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account already exists for {0}")]
    AccountExists(String),

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Request rejected ({status}): {reason}")]
    Rejected { status: u16, reason: String },

    #[error("Authentication backend unavailable: {0}")]
    Backend(String),

    #[error("Authentication request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Account storage error: {0}")]
    Storage(String),
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Auth(auth) => auth,
            other => AuthError::Storage(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Backend(err.to_string())
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl serde::Serialize for AuthError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
