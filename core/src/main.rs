// LofiZone headless host
// Boots the application state against the user's data directory and
// reports what it found.

use lofizone::app::AppState;
use lofizone::config::default_data_dir;
use lofizone::services::KeyringVault;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> lofizone::error::Result<()> {
    lofizone::init_tracing();

    tracing::info!("Starting LofiZone");

    let app_data_dir = std::env::var_os("LOFIZONE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(default_data_dir);

    if !KeyringVault::is_persistent() {
        tracing::warn!("No persistent credential store on this platform, sign-in will not survive a restart");
    }

    let state = AppState::initialize(app_data_dir, Arc::new(KeyringVault::new())).await?;

    let quests = state.quests.list_quests().await;
    let session = state.sessions.current_session().await;
    tracing::info!(
        "{} quests loaded, {} backend, signed in: {}",
        quests.len(),
        state.sessions.backend_name(),
        session.is_some()
    );

    Ok(())
}
