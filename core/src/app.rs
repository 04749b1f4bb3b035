//! Application state and initialization
//!
//! This module manages the central application state and lifecycle.
//! All services are initialized here, once, and handed to whoever needs
//! them through AppState.

use crate::auth::create_backend;
use crate::config::DATABASE_FILE_NAME;
use crate::database::{create_pool, Repository};
use crate::error::Result;
use crate::services::{
    AmbientMixer, PlaylistDeck, PomodoroTimer, QuestService, SessionManager, SessionVault,
    SettingsService,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub app_data_dir: PathBuf,
    pub repo: Repository,
    pub quests: QuestService,
    pub sessions: Arc<SessionManager>,
    pub settings: SettingsService,
}

impl AppState {
    /// Application setup - called once on startup
    pub async fn initialize(app_data_dir: PathBuf, vault: Arc<dyn SessionVault>) -> Result<Self> {
        tracing::info!("Initializing application");
        tracing::info!("App data directory: {:?}", app_data_dir);

        // Create necessary directories
        std::fs::create_dir_all(&app_data_dir)?;
        std::fs::create_dir_all(app_data_dir.join("logs"))?;

        let settings = SettingsService::new(app_data_dir.clone());
        let app_settings = settings.load().await?;

        let pool = create_pool(&app_data_dir.join(DATABASE_FILE_NAME)).await?;
        let repo = Repository::new(pool);

        let quests = QuestService::load(repo.clone()).await?;

        let backend = create_backend(&app_settings.auth, repo.clone())?;
        let sessions = SessionManager::new(backend, vault)
            .with_request_timeout(app_settings.auth.request_timeout())
            .with_user_records(repo.clone());

        let phase = sessions.restore().await;
        tracing::info!("Session state after restore: {:?}", phase);

        tracing::info!("Application initialized successfully");

        Ok(Self {
            app_data_dir,
            repo,
            quests,
            sessions: Arc::new(sessions),
            settings,
        })
    }

    /// A stopped timer configured from the saved phase lengths
    pub async fn pomodoro_timer(&self) -> Result<PomodoroTimer> {
        Ok(PomodoroTimer::new(self.settings.get_pomodoro().await?))
    }

    /// The mixer at its saved levels
    pub async fn ambient_mixer(&self) -> Result<AmbientMixer> {
        Ok(AmbientMixer::from(self.settings.get_ambient().await?))
    }

    /// The built-in playlists, positioned on the last one played
    pub async fn playlist_deck(&self) -> Result<PlaylistDeck> {
        let mut deck = PlaylistDeck::default();
        if let Some(id) = self.settings.get_playback().await?.current_playlist_id {
            deck.select_playlist(&id);
        }
        Ok(deck)
    }
}
