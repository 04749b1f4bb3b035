//! Music playlists
//!
//! The catalogue of streams and the cursor into it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    Youtube,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub source_type: SourceType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub tracks: Vec<Track>,
}

impl Playlist {
    fn youtube(id: &str, name: &str, video_id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            tracks: vec![Track {
                id: video_id.to_string(),
                title: title.to_string(),
                source_type: SourceType::Youtube,
            }],
        }
    }

    /// Built-in lofi streams.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::youtube(
                "PLhK5MCJLYPpcXgj7BI009xIrcLg8rZ2Jl",
                "LOFI GIRL",
                "jfKfPfyJRdk",
                "LOFI GIRL - beats to relax/study to",
            ),
            Self::youtube(
                "PLQkQfzsIUwRZ9FVWVE8KpIOVkQsUZH9t8",
                "Lofi Coffee Shop",
                "0H87zumc8DU",
                "Coffee Shop Radio • 24/7 lofi & jazzy hip-hop beats",
            ),
            Self::youtube(
                "PLOzDu-MXXLliO9fBNZOQTBDddQBrX0vTc",
                "SynthWave",
                "4xDzrJKXOOY",
                "SYNTHWAVE • GAME & FOCUS",
            ),
            Self::youtube(
                "PLvTTekbgYTB-rRpEyNdPQVYwOSxISHLMc",
                "Tokyo CityPop Lofi",
                "bJt8lSOMQ4k",
                "Tokyo CityPop Lofi • Focus and Concentration",
            ),
            Self::youtube(
                "PLOfcuKHGZ0eO9nLAL6OjhZ27AEH21Zk0-",
                "LOFI HIPHOP",
                "n61ULEU7CO0",
                "LOFI HIPHOP • STUDY and FOCUS",
            ),
        ]
    }
}

/// Playlist catalogue with the current playlist and track.
#[derive(Debug, Clone)]
pub struct PlaylistDeck {
    playlists: Vec<Playlist>,
    current_playlist_id: Option<String>,
    current_track_index: usize,
}

impl Default for PlaylistDeck {
    fn default() -> Self {
        Self::new(Playlist::defaults())
    }
}

impl PlaylistDeck {
    /// Start on the first playlist of the catalogue.
    pub fn new(playlists: Vec<Playlist>) -> Self {
        let current_playlist_id = playlists.first().map(|p| p.id.clone());
        Self {
            playlists,
            current_playlist_id,
            current_track_index: 0,
        }
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn get_playlist_by_id(&self, id: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.id == id)
    }

    pub fn current_playlist_id(&self) -> Option<&str> {
        self.current_playlist_id.as_deref()
    }

    pub fn current_playlist(&self) -> Option<&Playlist> {
        self.current_playlist_id
            .as_deref()
            .and_then(|id| self.get_playlist_by_id(id))
    }

    pub fn current_track_index(&self) -> usize {
        self.current_track_index
    }

    /// The track to play, with the index clamped to the playlist length.
    pub fn current_track(&self) -> Option<&Track> {
        let tracks = &self.current_playlist()?.tracks;
        let last = tracks.len().checked_sub(1)?;
        tracks.get(self.current_track_index.min(last))
    }

    /// Switch playlist. Unknown ids are ignored. Returns whether it switched.
    pub fn select_playlist(&mut self, id: &str) -> bool {
        if self.get_playlist_by_id(id).is_none() {
            tracing::debug!("Ignoring unknown playlist {}", id);
            return false;
        }
        self.current_playlist_id = Some(id.to_string());
        self.current_track_index = 0;
        true
    }

    pub fn set_track_index(&mut self, index: usize) {
        self.current_track_index = index;
    }

    fn current_position(&self) -> Option<usize> {
        let id = self.current_playlist_id.as_deref()?;
        self.playlists.iter().position(|p| p.id == id)
    }

    fn move_by(&mut self, forward: bool) -> Option<&Playlist> {
        let len = self.playlists.len();
        let position = self.current_position()?;
        let next = if forward {
            (position + 1) % len
        } else {
            (position + len - 1) % len
        };

        self.current_playlist_id = Some(self.playlists[next].id.clone());
        self.current_track_index = 0;
        self.playlists.get(next)
    }

    /// Advance to the next playlist, wrapping at the end.
    pub fn next_playlist(&mut self) -> Option<&Playlist> {
        self.move_by(true)
    }

    /// Step back to the previous playlist, wrapping at the start.
    pub fn previous_playlist(&mut self) -> Option<&Playlist> {
        self.move_by(false)
    }
}
