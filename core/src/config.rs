//! Application configuration constants
//!
//! Central location for all configuration constants, resource limits,
//! and validation boundaries used throughout the application.

use std::path::PathBuf;

// ===== Storage =====

/// Per-user data directory, used when the host does not supply one
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("LofiZone")
}

/// SQLite database file name inside the app data directory
pub const DATABASE_FILE_NAME: &str = "lofizone.db";

/// Connections in the shared SQLite pool
pub const DATABASE_MAX_CONNECTIONS: u32 = 5;

/// How long a connection waits on a locked database before failing
pub const DATABASE_BUSY_TIMEOUT_SECS: u64 = 5;

/// Settings file name inside the app data directory
pub const SETTINGS_FILE_NAME: &str = "settings.json";

// ===== Quests =====

/// Estimated time in minutes assumed for quests that don't declare one.
/// Matches a single pomodoro focus session.
pub const DEFAULT_ESTIMATED_MINUTES: u32 = 25;

// ===== Sessions =====

/// Lifetime of access tokens issued by the local and mock backends (15 minutes)
pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;

/// Lifetime of refresh tokens issued by the local backend (30 days)
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 30;

/// Service name used for entries in the OS credential store
pub const CREDENTIAL_SERVICE_NAME: &str = "LofiZone";

/// Credential store entry holding the persisted session
pub const SESSION_CREDENTIAL_KEY: &str = "session";

/// Length of randomly generated access and refresh tokens
pub const TOKEN_LENGTH: usize = 32;

/// Maximum accepted network timeout for authentication requests (2 minutes)
pub const MAX_AUTH_TIMEOUT_SECS: u64 = 120;

/// Default base URL of the remote account API
pub const DEFAULT_REMOTE_BASE_URL: &str = "http://localhost:8080/api";

// ===== Pomodoro Limits =====

/// Default focus session length in minutes
pub const DEFAULT_FOCUS_MINUTES: u32 = 25;

/// Default short break length in minutes
pub const DEFAULT_SHORT_BREAK_MINUTES: u32 = 5;

/// Default long break length in minutes
pub const DEFAULT_LONG_BREAK_MINUTES: u32 = 15;

/// Focus sessions completed before a long break is due
pub const DEFAULT_SESSIONS_BEFORE_LONG_BREAK: u32 = 4;

/// Maximum length of any single pomodoro phase in minutes (3 hours)
pub const MAX_POMODORO_MINUTES: u32 = 180;

// ===== Volume and Brightness =====

/// Upper bound for every volume and brightness slider
pub const MAX_LEVEL: u8 = 100;

/// Default master volume of the ambient mixer
pub const DEFAULT_MASTER_VOLUME: u8 = 70;

/// Default UI brightness
pub const DEFAULT_BRIGHTNESS: u8 = 70;

/// Background used until the user picks one
pub const DEFAULT_BACKGROUND: &str = "lofi-girl";
