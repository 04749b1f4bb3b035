//! Pomodoro timer
//!
//! A second-resolution countdown that cycles focus sessions and breaks.
//! The caller drives it by calling [`PomodoroTimer::tick`] once per second.

use crate::services::settings::PomodoroSettings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PomodoroMode {
    Focus,
    ShortBreak,
    LongBreak,
}

/// Emitted by `tick` when a phase runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PomodoroEvent {
    pub finished: PomodoroMode,
    pub next: PomodoroMode,
    /// Focus sessions completed so far, including this one
    pub completed_sessions: u32,
}

#[derive(Debug, Clone)]
pub struct PomodoroTimer {
    settings: PomodoroSettings,
    mode: PomodoroMode,
    seconds_left: u32,
    active: bool,
    completed_sessions: u32,
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(PomodoroSettings::default())
    }
}

impl PomodoroTimer {
    pub fn new(settings: PomodoroSettings) -> Self {
        let seconds_left = settings.focus_minutes.saturating_mul(60);
        Self {
            settings,
            mode: PomodoroMode::Focus,
            seconds_left,
            active: false,
            completed_sessions: 0,
        }
    }

    pub fn mode(&self) -> PomodoroMode {
        self.mode
    }

    pub fn seconds_left(&self) -> u32 {
        self.seconds_left
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn completed_sessions(&self) -> u32 {
        self.completed_sessions
    }

    /// Full length of a phase in seconds.
    pub fn duration_of(&self, mode: PomodoroMode) -> u32 {
        let minutes = match mode {
            PomodoroMode::Focus => self.settings.focus_minutes,
            PomodoroMode::ShortBreak => self.settings.short_break_minutes,
            PomodoroMode::LongBreak => self.settings.long_break_minutes,
        };
        minutes.saturating_mul(60)
    }

    /// Start or pause. Returns whether the timer is now running.
    pub fn toggle(&mut self) -> bool {
        self.active = !self.active;
        self.active
    }

    /// Stop and rewind the current phase.
    pub fn reset(&mut self) {
        self.active = false;
        self.seconds_left = self.duration_of(self.mode);
    }

    /// Switch phase manually. The timer stops and starts the phase from full.
    pub fn set_mode(&mut self, mode: PomodoroMode) {
        self.mode = mode;
        self.reset();
    }

    /// Advance one second. Does nothing while paused.
    pub fn tick(&mut self) -> Option<PomodoroEvent> {
        if !self.active {
            return None;
        }

        self.seconds_left = self.seconds_left.saturating_sub(1);
        if self.seconds_left > 0 {
            return None;
        }

        let finished = self.mode;
        let next = match finished {
            PomodoroMode::Focus => {
                self.completed_sessions = self.completed_sessions.saturating_add(1);
                let every = self.settings.sessions_before_long_break.max(1);
                if self.completed_sessions % every == 0 {
                    PomodoroMode::LongBreak
                } else {
                    PomodoroMode::ShortBreak
                }
            }
            PomodoroMode::ShortBreak | PomodoroMode::LongBreak => PomodoroMode::Focus,
        };

        self.set_mode(next);
        tracing::debug!("Pomodoro {:?} finished, next {:?}", finished, next);

        Some(PomodoroEvent {
            finished,
            next,
            completed_sessions: self.completed_sessions,
        })
    }

    /// Remaining time as `MM:SS`.
    pub fn format_remaining(&self) -> String {
        format!("{:02}:{:02}", self.seconds_left / 60, self.seconds_left % 60)
    }
}
