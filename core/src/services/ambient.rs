//! Ambient sound mixer
//!
//! Background sounds layered under the music, each with its own level and
//! scaled by a master volume.

use crate::config::{DEFAULT_MASTER_VOLUME, MAX_LEVEL};
use crate::services::settings::AmbientSettings;
use serde::{Deserialize, Serialize};

/// One ambient sound channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbientSound {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub volume: u8,
}

impl AmbientSound {
    fn new(id: &str, name: &str, active: bool, volume: u8) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            active,
            volume,
        }
    }

    /// The built-in channels with their starting levels.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("rain", "Rain", true, 50),
            Self::new("thunder", "Thunder", false, 40),
            Self::new("cafe", "Cafe Ambience", true, 30),
            Self::new("keyboard", "Keyboard Typing", false, 60),
            Self::new("forest", "Forest Sounds", false, 50),
            Self::new("waves", "Ocean Waves", false, 40),
        ]
    }
}

/// Mixer state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbientMixer {
    master_volume: u8,
    sounds: Vec<AmbientSound>,
}

impl Default for AmbientMixer {
    fn default() -> Self {
        Self {
            master_volume: DEFAULT_MASTER_VOLUME,
            sounds: AmbientSound::defaults(),
        }
    }
}

impl From<AmbientSettings> for AmbientMixer {
    fn from(settings: AmbientSettings) -> Self {
        let mut mixer = Self {
            master_volume: 0,
            sounds: settings.sounds,
        };
        mixer.set_master_volume(settings.master_volume);
        for sound in &mut mixer.sounds {
            sound.volume = sound.volume.min(MAX_LEVEL);
        }
        mixer
    }
}

impl AmbientMixer {
    pub fn sounds(&self) -> &[AmbientSound] {
        &self.sounds
    }

    pub fn master_volume(&self) -> u8 {
        self.master_volume
    }

    fn sound_mut(&mut self, id: &str) -> Option<&mut AmbientSound> {
        self.sounds.iter_mut().find(|s| s.id == id)
    }

    /// Flip a channel on or off. Returns the new state, `None` for an
    /// unknown id.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let sound = self.sound_mut(id)?;
        sound.active = !sound.active;
        Some(sound.active)
    }

    /// Set a channel level, clamped to the slider range.
    pub fn set_volume(&mut self, id: &str, volume: u8) -> Option<u8> {
        let sound = self.sound_mut(id)?;
        sound.volume = volume.min(MAX_LEVEL);
        Some(sound.volume)
    }

    pub fn set_master_volume(&mut self, volume: u8) {
        self.master_volume = volume.min(MAX_LEVEL);
    }

    /// Output level of a channel after the master volume is applied.
    /// Inactive and unknown channels are silent.
    pub fn effective_volume(&self, id: &str) -> u8 {
        self.sounds
            .iter()
            .find(|s| s.id == id && s.active)
            .map(|s| (u16::from(s.volume) * u16::from(self.master_volume) / 100) as u8)
            .unwrap_or(0)
    }

    pub fn to_settings(&self) -> AmbientSettings {
        AmbientSettings {
            master_volume: self.master_volume,
            sounds: self.sounds.clone(),
        }
    }
}
