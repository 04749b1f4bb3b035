//! Settings service
//!
//! Manages application settings persistence using JSON file storage.

use crate::config::{
    DEFAULT_BACKGROUND, DEFAULT_BRIGHTNESS, DEFAULT_FOCUS_MINUTES, DEFAULT_LONG_BREAK_MINUTES,
    DEFAULT_MASTER_VOLUME, DEFAULT_REMOTE_BASE_URL, DEFAULT_SESSIONS_BEFORE_LONG_BREAK,
    DEFAULT_SHORT_BREAK_MINUTES, MAX_AUTH_TIMEOUT_SECS, MAX_LEVEL, MAX_POMODORO_MINUTES,
    SETTINGS_FILE_NAME,
};
use crate::error::{AppError, Result};
use crate::services::ambient::AmbientSound;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;

/// Which credential backend the app authenticates against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthBackendKind {
    /// Offline accounts in the local database
    #[default]
    Local,
    Mock,
    Remote,
    /// Remote API with local fallback
    Desktop,
}

/// Authentication configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub backend: AuthBackendKind,
    #[serde(default = "default_remote_base_url")]
    pub remote_base_url: String,
    /// Per-request timeout in seconds; `None` waits indefinitely
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: Option<u64>,
}

fn default_remote_base_url() -> String {
    DEFAULT_REMOTE_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> Option<u64> {
    Some(30)
}

impl AuthSettings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            backend: AuthBackendKind::default(),
            remote_base_url: default_remote_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Pomodoro phase lengths in minutes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroSettings {
    #[serde(default = "default_focus_minutes")]
    pub focus_minutes: u32,
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,
    #[serde(default = "default_sessions_before_long_break")]
    pub sessions_before_long_break: u32,
}

fn default_focus_minutes() -> u32 {
    DEFAULT_FOCUS_MINUTES
}

fn default_short_break_minutes() -> u32 {
    DEFAULT_SHORT_BREAK_MINUTES
}

fn default_long_break_minutes() -> u32 {
    DEFAULT_LONG_BREAK_MINUTES
}

fn default_sessions_before_long_break() -> u32 {
    DEFAULT_SESSIONS_BEFORE_LONG_BREAK
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        Self {
            focus_minutes: default_focus_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            sessions_before_long_break: default_sessions_before_long_break(),
        }
    }
}

/// Ambient mixer levels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbientSettings {
    #[serde(default = "default_master_volume")]
    pub master_volume: u8,
    #[serde(default = "AmbientSound::defaults")]
    pub sounds: Vec<AmbientSound>,
}

fn default_master_volume() -> u8 {
    DEFAULT_MASTER_VOLUME
}

impl Default for AmbientSettings {
    fn default() -> Self {
        Self {
            master_volume: default_master_volume(),
            sounds: AmbientSound::defaults(),
        }
    }
}

/// Look and feel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppearanceSettings {
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_brightness")]
    pub brightness: u8,
    #[serde(default = "default_true")]
    pub dark_mode: bool,
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}

fn default_brightness() -> u8 {
    DEFAULT_BRIGHTNESS
}

fn default_true() -> bool {
    true
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            background: default_background(),
            brightness: default_brightness(),
            dark_mode: true,
        }
    }
}

/// Music playback state restored at start-up
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybackSettings {
    #[serde(default)]
    pub current_playlist_id: Option<String>,
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppSettings {
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub pomodoro: PomodoroSettings,
    #[serde(default)]
    pub ambient: AmbientSettings,
    #[serde(default)]
    pub appearance: AppearanceSettings,
    #[serde(default)]
    pub playback: PlaybackSettings,
}

impl AppSettings {
    /// Reject values outside the ranges the UI can represent.
    pub fn validate(&self) -> Result<()> {
        if let Some(secs) = self.auth.request_timeout_secs {
            if secs == 0 || secs > MAX_AUTH_TIMEOUT_SECS {
                return Err(AppError::Settings(format!(
                    "Request timeout must be between 1 and {} seconds",
                    MAX_AUTH_TIMEOUT_SECS
                )));
            }
        }

        if self.auth.remote_base_url.trim().is_empty() {
            return Err(AppError::Settings(
                "Remote base URL must not be empty".to_string(),
            ));
        }

        let pomodoro = &self.pomodoro;
        for (name, minutes) in [
            ("Focus", pomodoro.focus_minutes),
            ("Short break", pomodoro.short_break_minutes),
            ("Long break", pomodoro.long_break_minutes),
        ] {
            if minutes == 0 || minutes > MAX_POMODORO_MINUTES {
                return Err(AppError::Settings(format!(
                    "{} length must be between 1 and {} minutes",
                    name, MAX_POMODORO_MINUTES
                )));
            }
        }

        if pomodoro.sessions_before_long_break == 0 {
            return Err(AppError::Settings(
                "Sessions before a long break must be at least 1".to_string(),
            ));
        }

        if self.ambient.master_volume > MAX_LEVEL
            || self.ambient.sounds.iter().any(|s| s.volume > MAX_LEVEL)
        {
            return Err(AppError::Settings(format!(
                "Volumes must be between 0 and {}",
                MAX_LEVEL
            )));
        }

        if self.appearance.brightness > MAX_LEVEL {
            return Err(AppError::Settings(format!(
                "Brightness must be between 0 and {}",
                MAX_LEVEL
            )));
        }

        Ok(())
    }
}

/// Service for managing application settings
#[derive(Clone)]
pub struct SettingsService {
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new(app_data_dir: PathBuf) -> Self {
        Self {
            settings_path: app_data_dir.join(SETTINGS_FILE_NAME),
        }
    }

    /// Load settings from disk or create default if not exists
    pub async fn load(&self) -> Result<AppSettings> {
        if !fs::try_exists(&self.settings_path).await? {
            tracing::info!("Settings file not found, creating default settings");
            let default = AppSettings::default();
            self.save(&default).await?;
            return Ok(default);
        }

        let content = fs::read_to_string(&self.settings_path).await?;
        let settings: AppSettings = serde_json::from_str(&content)
            .map_err(|e| AppError::Settings(format!("Failed to parse settings: {}", e)))?;
        settings.validate()?;

        Ok(settings)
    }

    /// Validate and save settings to disk
    pub async fn save(&self, settings: &AppSettings) -> Result<()> {
        settings.validate()?;

        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.settings_path, content).await?;
        tracing::info!("Settings saved to {:?}", self.settings_path);

        Ok(())
    }

    pub async fn get_auth(&self) -> Result<AuthSettings> {
        Ok(self.load().await?.auth)
    }

    /// Update auth settings. Takes effect at the next start-up.
    pub async fn update_auth(&self, auth: AuthSettings) -> Result<()> {
        let mut settings = self.load().await?;
        settings.auth = auth;
        self.save(&settings).await
    }

    pub async fn get_pomodoro(&self) -> Result<PomodoroSettings> {
        Ok(self.load().await?.pomodoro)
    }

    pub async fn update_pomodoro(&self, pomodoro: PomodoroSettings) -> Result<()> {
        let mut settings = self.load().await?;
        settings.pomodoro = pomodoro;
        self.save(&settings).await
    }

    pub async fn get_ambient(&self) -> Result<AmbientSettings> {
        Ok(self.load().await?.ambient)
    }

    pub async fn update_ambient(&self, ambient: AmbientSettings) -> Result<()> {
        let mut settings = self.load().await?;
        settings.ambient = ambient;
        self.save(&settings).await
    }

    pub async fn get_appearance(&self) -> Result<AppearanceSettings> {
        Ok(self.load().await?.appearance)
    }

    pub async fn update_appearance(&self, appearance: AppearanceSettings) -> Result<()> {
        let mut settings = self.load().await?;
        settings.appearance = appearance;
        self.save(&settings).await
    }

    pub async fn get_playback(&self) -> Result<PlaybackSettings> {
        Ok(self.load().await?.playback)
    }

    pub async fn update_playback(&self, playback: PlaybackSettings) -> Result<()> {
        let mut settings = self.load().await?;
        settings.playback = playback;
        self.save(&settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_service() -> (SettingsService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let service = SettingsService::new(temp_dir.path().to_path_buf());
        (service, temp_dir)
    }

    #[tokio::test]
    async fn test_default_settings_created_on_load() {
        let (service, temp) = create_test_service();

        let settings = service.load().await.unwrap();

        assert!(temp.path().join(SETTINGS_FILE_NAME).exists());
        assert_eq!(settings.auth.backend, AuthBackendKind::Local);
        assert_eq!(settings.auth.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(settings.pomodoro.focus_minutes, 25);
        assert_eq!(settings.pomodoro.short_break_minutes, 5);
        assert_eq!(settings.pomodoro.long_break_minutes, 15);
        assert_eq!(settings.pomodoro.sessions_before_long_break, 4);
        assert_eq!(settings.ambient.master_volume, 70);
        assert_eq!(settings.ambient.sounds.len(), 6);
        assert_eq!(settings.appearance.brightness, 70);
        assert!(settings.appearance.dark_mode);
        assert_eq!(settings.playback.current_playlist_id, None);
    }

    #[tokio::test]
    async fn test_missing_fields_use_defaults() {
        let (service, temp) = create_test_service();
        std::fs::write(
            temp.path().join(SETTINGS_FILE_NAME),
            r#"{ "auth": { "backend": "remote" }, "pomodoro": { "focus_minutes": 50 } }"#,
        )
        .unwrap();

        let settings = service.load().await.unwrap();

        assert_eq!(settings.auth.backend, AuthBackendKind::Remote);
        assert_eq!(settings.auth.remote_base_url, DEFAULT_REMOTE_BASE_URL);
        assert_eq!(settings.auth.request_timeout_secs, Some(30));
        assert_eq!(settings.pomodoro.focus_minutes, 50);
        assert_eq!(settings.pomodoro.short_break_minutes, 5);
        assert_eq!(settings.appearance.background, DEFAULT_BACKGROUND);
    }

    #[tokio::test]
    async fn test_null_timeout_disables_limit() {
        let (service, temp) = create_test_service();
        std::fs::write(
            temp.path().join(SETTINGS_FILE_NAME),
            r#"{ "auth": { "request_timeout_secs": null } }"#,
        )
        .unwrap();

        let auth = service.get_auth().await.unwrap();
        assert_eq!(auth.request_timeout(), None);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_settings_error() {
        let (service, temp) = create_test_service();
        std::fs::write(temp.path().join(SETTINGS_FILE_NAME), "{ not json").unwrap();

        assert!(matches!(service.load().await, Err(AppError::Settings(_))));
    }

    #[tokio::test]
    async fn test_out_of_range_file_is_settings_error() {
        let (service, temp) = create_test_service();
        let mut settings = serde_json::to_value(AppSettings::default()).unwrap();
        settings["pomodoro"]["focus_minutes"] = serde_json::json!(u32::MAX);
        std::fs::write(
            temp.path().join(SETTINGS_FILE_NAME),
            settings.to_string(),
        )
        .unwrap();

        assert!(matches!(service.load().await, Err(AppError::Settings(_))));
        assert!(matches!(
            service.get_pomodoro().await,
            Err(AppError::Settings(_))
        ));
    }

    #[tokio::test]
    async fn test_pomodoro_settings_get_and_update() {
        let (service, _temp) = create_test_service();

        let updated = PomodoroSettings {
            focus_minutes: 50,
            short_break_minutes: 10,
            long_break_minutes: 30,
            sessions_before_long_break: 3,
        };
        service.update_pomodoro(updated.clone()).await.unwrap();

        assert_eq!(service.get_pomodoro().await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_invalid_settings_rejected() {
        let (service, _temp) = create_test_service();

        let zero_focus = PomodoroSettings {
            focus_minutes: 0,
            ..PomodoroSettings::default()
        };
        assert!(matches!(
            service.update_pomodoro(zero_focus).await,
            Err(AppError::Settings(_))
        ));

        let loud = AmbientSettings {
            master_volume: 101,
            ..AmbientSettings::default()
        };
        assert!(service.update_ambient(loud).await.is_err());

        let slow = AuthSettings {
            request_timeout_secs: Some(MAX_AUTH_TIMEOUT_SECS + 1),
            ..AuthSettings::default()
        };
        assert!(service.update_auth(slow).await.is_err());

        // Nothing was written
        assert_eq!(service.load().await.unwrap(), AppSettings::default());
    }

    #[tokio::test]
    async fn test_settings_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let settings_path = temp_dir.path().to_path_buf();

        {
            let service = SettingsService::new(settings_path.clone());
            service
                .update_playback(PlaybackSettings {
                    current_playlist_id: Some("chill-beats".to_string()),
                })
                .await
                .unwrap();
        }

        {
            let service = SettingsService::new(settings_path);
            let playback = service.get_playback().await.unwrap();
            assert_eq!(playback.current_playlist_id.as_deref(), Some("chill-beats"));
        }
    }

    #[tokio::test]
    async fn test_other_sections_preserved_after_update() {
        let (service, _temp) = create_test_service();

        service
            .update_appearance(AppearanceSettings {
                background: "rainy-window".to_string(),
                brightness: 40,
                dark_mode: false,
            })
            .await
            .unwrap();

        let settings = service.load().await.unwrap();
        assert_eq!(settings.appearance.background, "rainy-window");
        assert_eq!(settings.pomodoro, PomodoroSettings::default());
        assert_eq!(settings.auth, AuthSettings::default());
    }
}
