//! Services module
//!
//! Business logic services that sit between the UI layer and the
//! repository.

pub mod ambient;
pub mod credentials;
pub mod playlists;
pub mod pomodoro;
pub mod quest_ordering;
pub mod quest_store;
pub mod quest_validation;
pub mod quests;
pub mod session;
pub mod settings;

pub use ambient::{AmbientMixer, AmbientSound};
pub use credentials::{KeyringVault, MemoryVault, SessionVault};
pub use playlists::{Playlist, PlaylistDeck, Track};
pub use pomodoro::{PomodoroEvent, PomodoroMode, PomodoroTimer};
pub use quest_ordering::{
    active_task_view, compare_quests, sort_for_display, CompletionSuppression,
};
pub use quest_store::QuestStore;
pub use quests::QuestService;
pub use session::{SessionManager, SessionPhase, SessionState};
pub use settings::{AppSettings, AuthBackendKind, AuthSettings, SettingsService};
